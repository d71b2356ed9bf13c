//! Keyboard routing.
//!
//! Keys arrive as discrete key-down events (auto-repeat included) and are
//! turned into [`Command`]s. Character keys are case-sensitive: lowercase
//! usually arms something, uppercase undoes or stops it. The router only
//! mutates the [`Session`]; drawing is left to whoever receives the
//! [`Reaction`].

use crate::pose::{AngleId, Side};
use crate::session::Session;

/// Degrees per arrow press or orientation key press.
pub const STEER_STEP_DEG: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Left,
    Right,
    Up,
    Down,
    F1,
    F3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Make an angle the target of the arrow keys.
    Select(AngleId),
    /// Move the selected angle by this many degrees, wrapped.
    Steer(f32),
    StartGait,
    ResetLeg,
    StartArmSwing,
    ResetArm,
    StartCannon,
    StopCannon,
    /// Turn an orientation angle by this many degrees, wrapped.
    Turn(AngleId, f32),
    Quit,
}

impl Command {
    pub fn for_key(key: Key) -> Option<Command> {
        let command = match key {
            Key::Char('b') => Command::Select(AngleId::BodyTilt),
            Key::Char('h') => Command::Select(AngleId::Hip(Side::Right)),
            Key::Char('k') => Command::Select(AngleId::Knee(Side::Right)),
            Key::Left => Command::Steer(-STEER_STEP_DEG),
            Key::Right => Command::Steer(STEER_STEP_DEG),
            Key::Char('w') => Command::StartGait,
            Key::Char('W') => Command::ResetLeg,
            Key::Char('a') => Command::StartArmSwing,
            Key::Char('A') => Command::ResetArm,
            Key::Char('c') => Command::StartCannon,
            Key::Char('C') => Command::StopCannon,
            Key::Char('s') => Command::Turn(AngleId::Yaw, STEER_STEP_DEG),
            Key::Char('S') => Command::Turn(AngleId::Yaw, -STEER_STEP_DEG),
            Key::Char('v') => Command::Turn(AngleId::Pitch, STEER_STEP_DEG),
            Key::Char('V') => Command::Turn(AngleId::Pitch, -STEER_STEP_DEG),
            Key::Char('q') | Key::Char('Q') => Command::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// What the event loop should do after a key was routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Redraw,
    Quit,
}

/// Key bindings in help-screen order.
pub const KEY_HELP: &[(&str, &str)] = &[
    ("b / h / k", "steer body tilt / right hip / right knee"),
    ("Left / Right", "turn the steered joint"),
    ("w / W", "walk step with left leg / reset leg"),
    ("a / A", "swing right arm / reset arm"),
    ("c / C", "spin cannon / stop cannon"),
    ("s / S", "turn robot left / right"),
    ("v / V", "tip robot forward / back"),
    ("F1 / F3", "key help / debug overlay"),
    ("q", "quit"),
];

/// Applies key presses to a session. Which limb the gait and arm swing
/// drive is owned by the session's animation driver.
#[derive(Debug, Clone, Default)]
pub struct InputRouter;

impl InputRouter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key(&self, key: Key, session: &mut Session) -> Reaction {
        match Command::for_key(key) {
            Some(command) => self.apply(command, session),
            None => {
                log::trace!("Unbound key {:?}", key);
                Reaction::Redraw
            }
        }
    }

    pub fn apply(&self, command: Command, session: &mut Session) -> Reaction {
        log::debug!("Command {:?}", command);
        match command {
            Command::Select(id) => {
                session.selected = Some(id);
                log::info!("Steering {}", id);
            }
            Command::Steer(delta) => match session.selected {
                Some(id) => {
                    session.pose.nudge(id, delta);
                }
                None => log::debug!("No joint selected, ignoring steer"),
            },
            Command::StartGait => {
                let Session { pose, driver, .. } = session;
                driver.gait.arm(pose);
                log::info!("Gait cycle started ({} leg)", driver.gait.side.label());
            }
            Command::ResetLeg => {
                let side = session.driver.gait.side;
                session.pose.reset_leg(side);
            }
            Command::StartArmSwing => {
                let Session { pose, driver, .. } = session;
                driver.arm_swing.arm(pose);
                log::info!("Arm swing started ({} arm)", driver.arm_swing.side.label());
            }
            Command::ResetArm => {
                let side = session.driver.arm_swing.side;
                session.pose.reset_arm(side);
            }
            Command::StartCannon => {
                if session.driver.cannon.start() {
                    log::info!("Cannon spin started");
                }
            }
            Command::StopCannon => {
                session.driver.cannon.request_stop();
            }
            Command::Turn(id, delta) => {
                session.pose.nudge(id, delta);
            }
            Command::Quit => {
                log::info!("Quit requested");
                return Reaction::Quit;
            }
        }
        Reaction::Redraw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(session: &mut Session, keys: &str) {
        let router = InputRouter::new();
        for c in keys.chars() {
            router.handle_key(Key::Char(c), session);
        }
    }

    #[test]
    fn steer_without_selection_is_noop() {
        let mut session = Session::default();
        let router = InputRouter::new();
        assert_eq!(router.handle_key(Key::Right, &mut session), Reaction::Redraw);
        assert_eq!(router.handle_key(Key::Left, &mut session), Reaction::Redraw);
        assert_eq!(session.pose, crate::pose::PoseState::new());
    }

    #[test]
    fn selection_routes_arrows_to_that_joint() {
        let mut session = Session::default();
        let router = InputRouter::new();
        press(&mut session, "h");
        router.handle_key(Key::Right, &mut session);
        router.handle_key(Key::Right, &mut session);
        assert_eq!(session.pose.right.hip, 4.0);

        press(&mut session, "k");
        router.handle_key(Key::Left, &mut session);
        assert_eq!(session.pose.right.knee, 358.0);
        assert_eq!(session.pose.right.hip, 4.0);

        press(&mut session, "b");
        router.handle_key(Key::Right, &mut session);
        assert_eq!(session.pose.body_tilt, 2.0);
    }

    #[test]
    fn steering_wraps_at_360() {
        let mut session = Session::default();
        let router = InputRouter::new();
        press(&mut session, "b");
        session.pose.body_tilt = 359.0;
        router.handle_key(Key::Right, &mut session);
        assert_eq!(session.pose.body_tilt, 1.0);
    }

    #[test]
    fn orientation_keys_wrap() {
        let mut session = Session::default();
        press(&mut session, "S");
        assert_eq!(session.pose.yaw, 358.0);
        press(&mut session, "ss");
        assert_eq!(session.pose.yaw, 2.0);
        press(&mut session, "vV V");
        assert_eq!(session.pose.pitch, 358.0);
    }

    #[test]
    fn lowercase_w_resets_and_arms_gait() {
        let mut session = Session::default();
        session.pose.left.hip = 17.0;
        session.pose.left.knee = -3.0;
        press(&mut session, "w");
        assert_eq!(session.pose.left.hip, 0.0);
        assert_eq!(session.pose.left.knee, 0.0);
        assert!(session.driver.gait.is_running());
        session.tick();
        assert_eq!(session.pose.left.hip, 1.0);
    }

    #[test]
    fn uppercase_w_only_resets() {
        let mut session = Session::default();
        session.pose.left.hip = 17.0;
        press(&mut session, "W");
        assert_eq!(session.pose.left.hip, 0.0);
        assert!(!session.driver.gait.is_running());
    }

    #[test]
    fn arm_keys() {
        let mut session = Session::default();
        press(&mut session, "a");
        assert!(session.driver.arm_swing.is_running());
        for _ in 0..10 {
            session.tick();
        }
        assert_eq!(session.pose.right.shoulder, -7.5);
        press(&mut session, "A");
        assert_eq!(session.pose.right.shoulder, 0.0);
        assert_eq!(session.pose.right.elbow, 0.0);
    }

    #[test]
    fn cannon_start_is_idempotent_and_stop_keeps_angle() {
        let mut session = Session::default();
        press(&mut session, "cc");
        for _ in 0..3 {
            session.tick();
        }
        assert_eq!(session.pose.cannon_yaw, 3.0);

        press(&mut session, "C");
        session.tick();
        assert!(!session.is_animating());
        assert_eq!(session.pose.cannon_yaw, 3.0);
    }

    #[test]
    fn quit_keys() {
        let mut session = Session::default();
        let router = InputRouter::new();
        assert_eq!(router.handle_key(Key::Char('q'), &mut session), Reaction::Quit);
        assert_eq!(router.handle_key(Key::Char('Q'), &mut session), Reaction::Quit);
    }

    #[test]
    fn unbound_keys_still_redraw() {
        let mut session = Session::default();
        let router = InputRouter::new();
        assert_eq!(router.handle_key(Key::Char('z'), &mut session), Reaction::Redraw);
        assert_eq!(router.handle_key(Key::Up, &mut session), Reaction::Redraw);
        assert_eq!(session.pose, crate::pose::PoseState::new());
    }
}
