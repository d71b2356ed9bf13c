use rig_core::{InputRouter, Key, PoseState, Reaction, Session};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Scripted key presses and ticks, replayed against a [`Session`] without
/// a window or clock.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplayScript {
    #[serde(default = "default_body_size")]
    pub body_size: f32,
    pub steps: Vec<ReplayStep>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayStep {
    /// Single characters (case-sensitive) or named keys such as "Left".
    #[serde(default)]
    pub keys: Vec<String>,
    /// Animation ticks to run after the keys.
    #[serde(default)]
    pub ticks: u32,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub pose: PoseState,
    pub ticks_run: u32,
    pub quit: bool,
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplayScript, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplayScript = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

pub fn parse_key(name: &str) -> Result<Key, String> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(Key::Char(c));
    }
    match name {
        "Left" => Ok(Key::Left),
        "Right" => Ok(Key::Right),
        "Up" => Ok(Key::Up),
        "Down" => Ok(Key::Down),
        "F1" => Ok(Key::F1),
        "F3" => Ok(Key::F3),
        _ => Err(format!("unknown key '{name}'")),
    }
}

impl ReplayScript {
    /// Run every step against a fresh session. Stops at the first quit key.
    pub fn run(&self) -> Result<ReplayOutcome, String> {
        let mut session = Session::new(rig_core::BodyDimensions::from_body_size(self.body_size));
        let router = InputRouter::new();
        let mut ticks_run = 0;

        for step in &self.steps {
            let keys = step
                .keys
                .iter()
                .map(|k| parse_key(k))
                .collect::<Result<Vec<_>, _>>()?;
            for _ in 0..step.repeat.max(1) {
                for key in &keys {
                    if router.handle_key(*key, &mut session) == Reaction::Quit {
                        return Ok(ReplayOutcome {
                            pose: session.pose,
                            ticks_run,
                            quit: true,
                        });
                    }
                }
                for _ in 0..step.ticks {
                    session.tick();
                    ticks_run += 1;
                }
            }
        }

        Ok(ReplayOutcome {
            pose: session.pose,
            ticks_run,
            quit: false,
        })
    }
}

fn validate_replay(replay: &ReplayScript) -> Result<(), String> {
    if !(replay.body_size.is_finite() && replay.body_size > 0.0) {
        return Err(format!(
            "Replay validation failed: body_size must be > 0, got {}",
            replay.body_size
        ));
    }
    if replay.steps.is_empty() {
        return Err("Replay validation failed: steps list is empty".to_string());
    }
    for step in &replay.steps {
        for key in &step.keys {
            parse_key(key).map_err(|e| format!("Replay validation failed: {e}"))?;
        }
    }
    Ok(())
}

const fn default_body_size() -> f32 {
    rig_core::dimensions::DEFAULT_BODY_SIZE
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "rig_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn load(name_hint: &str, body: &str) -> Result<ReplayScript, String> {
        let path = temp_file_path(name_hint);
        fs::write(&path, body).expect("write replay file");
        let replay = load_replay_from_path(&path);
        let _ = fs::remove_file(path);
        replay
    }

    #[test]
    fn replay_file_parses_with_defaults() {
        let replay = load(
            "parse",
            r#"{
              "steps": [
                { "keys": ["h", "Right"], "repeat": 3 },
                { "ticks": 10 }
              ]
            }"#,
        )
        .expect("replay should load");
        assert_eq!(replay.body_size, 2.0);
        assert_eq!(replay.steps.len(), 2);
        assert_eq!(replay.steps[1].repeat, 1);
        assert!(replay.steps[1].keys.is_empty());
    }

    #[test]
    fn steering_script_moves_selected_joint() {
        let replay = load(
            "steer",
            r#"{ "steps": [ { "keys": ["h"] }, { "keys": ["Right"], "repeat": 3 }, { "keys": ["k", "Left"] } ] }"#,
        )
        .expect("replay should load");
        let outcome = replay.run().expect("replay should run");
        assert_eq!(outcome.pose.right.hip, 6.0);
        assert_eq!(outcome.pose.right.knee, 358.0);
        assert!(!outcome.quit);
    }

    #[test]
    fn walk_step_settles_at_fixed_pose() {
        let replay = load(
            "gait",
            r#"{ "steps": [ { "keys": ["w"], "ticks": 150 } ] }"#,
        )
        .expect("replay should load");
        let outcome = replay.run().expect("replay should run");
        assert_eq!(outcome.ticks_run, 150);
        assert!((outcome.pose.left.hip - -20.0).abs() < 1e-3);
        assert!((outcome.pose.left.knee - 13.5).abs() < 1e-3);
        assert_eq!(outcome.pose.right, Default::default());
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay = load(
            "deterministic",
            r#"{
              "steps": [
                { "keys": ["c", "w", "a"], "ticks": 40 },
                { "keys": ["s", "v"], "repeat": 5 },
                { "keys": ["C"], "ticks": 200 },
                { "keys": ["b", "Right"], "repeat": 7, "ticks": 3 }
              ]
            }"#,
        )
        .expect("replay should load");

        let run_a = replay.run().expect("first run");
        let run_b = replay.run().expect("second run");
        assert_eq!(run_a, run_b);
        assert_eq!(run_a.pose.yaw, 10.0);
        assert_eq!(run_a.pose.body_tilt, 14.0);
        // The stop request is honoured on the next tick without moving.
        assert_eq!(run_a.pose.cannon_yaw, 40.0);
    }

    #[test]
    fn quit_stops_the_script() {
        let replay = load(
            "quit",
            r#"{ "steps": [ { "keys": ["c"], "ticks": 5 }, { "keys": ["q"] }, { "ticks": 50 } ] }"#,
        )
        .expect("replay should load");
        let outcome = replay.run().expect("replay should run");
        assert!(outcome.quit);
        assert_eq!(outcome.ticks_run, 5);
        assert_eq!(outcome.pose.cannon_yaw, 5.0);
    }

    #[test]
    fn unknown_key_names_are_rejected() {
        let err = load("bad_key", r#"{ "steps": [ { "keys": ["Escape"] } ] }"#)
            .expect_err("unknown key should fail");
        assert!(err.contains("Escape"));
    }

    #[test]
    fn non_positive_or_nan_body_size_is_rejected() {
        let err = load("zero_body", r#"{ "body_size": 0.0, "steps": [ { "ticks": 1 } ] }"#)
            .expect_err("zero body size should fail");
        assert!(err.contains("body_size"), "unexpected error: {err}");

        let replay = ReplayScript {
            body_size: f32::NAN,
            steps: vec![ReplayStep {
                keys: Vec::new(),
                ticks: 1,
                repeat: 1,
            }],
        };
        let err = validate_replay(&replay).expect_err("NaN body size should fail");
        assert!(err.contains("body_size"), "unexpected error: {err}");
    }

    #[test]
    fn empty_script_is_rejected() {
        let err = load("empty", r#"{ "steps": [] }"#).expect_err("empty steps should fail");
        assert!(err.contains("steps"));
    }

    #[test]
    fn named_keys_parse() {
        assert_eq!(parse_key("W"), Ok(Key::Char('W')));
        assert_eq!(parse_key("Down"), Ok(Key::Down));
        assert_eq!(parse_key("F3"), Ok(Key::F3));
        assert!(parse_key("").is_err());
    }
}
