use glam::Vec3;
use rig_core::dimensions::DEFAULT_BODY_SIZE;
use rig_core::{BodyDimensions, CameraRig, QuadMesh, SceneAssembler};
use rig_platform::PlatformConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const SETTINGS_VERSION: &str = "0.1";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RigSettings {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_body_size")]
    pub body_size: f32,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub ground: GroundSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraSettings {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GroundSettings {
    pub subdivisions: u32,
    pub size: f32,
    pub offset_y: f32,
}

impl Default for RigSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            body_size: default_body_size(),
            window: WindowSettings::default(),
            camera: CameraSettings::default(),
            ground: GroundSettings::default(),
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        let platform = PlatformConfig::default();
        Self {
            title: platform.title,
            width: platform.width,
            height: platform.height,
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        let rig = CameraRig::default();
        Self {
            eye: rig.eye.to_array(),
            target: rig.target.to_array(),
            fov_y_deg: 60.0,
            near: 0.2,
            far: 40.0,
        }
    }
}

impl Default for GroundSettings {
    fn default() -> Self {
        Self {
            subdivisions: 16,
            size: 32.0,
            offset_y: SceneAssembler::DEFAULT_GROUND_OFFSET.y,
        }
    }
}

impl RigSettings {
    pub fn platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            title: self.window.title.clone(),
            width: self.window.width,
            height: self.window.height,
        }
    }

    pub fn dimensions(&self) -> BodyDimensions {
        BodyDimensions::from_body_size(self.body_size)
    }

    pub fn camera_rig(&self) -> CameraRig {
        CameraRig {
            eye: Vec3::from(self.camera.eye),
            target: Vec3::from(self.camera.target),
            up: Vec3::Y,
        }
    }

    pub fn scene_assembler(&self) -> SceneAssembler {
        SceneAssembler::new(
            self.camera_rig(),
            QuadMesh::ground(self.ground.subdivisions, self.ground.size),
            Vec3::new(0.0, self.ground.offset_y, 0.0),
        )
    }
}

pub struct SettingsWatcher {
    settings_path: PathBuf,
    last_seen_modified: Option<SystemTime>,
}

impl SettingsWatcher {
    pub fn new(settings_path: PathBuf) -> Self {
        let last_seen_modified = modified_time(&settings_path);
        Self {
            settings_path,
            last_seen_modified,
        }
    }

    pub fn should_reload(&mut self) -> bool {
        let current = modified_time(&self.settings_path);
        match (self.last_seen_modified, current) {
            (Some(old), Some(now)) if now > old => {
                self.last_seen_modified = Some(now);
                true
            }
            (None, Some(now)) => {
                self.last_seen_modified = Some(now);
                true
            }
            _ => false,
        }
    }
}

pub fn load_settings_from_path(settings_path: &Path) -> Result<RigSettings, String> {
    let raw = fs::read_to_string(settings_path)
        .map_err(|e| format!("Failed to read settings file {}: {e}", settings_path.display()))?;
    let settings: RigSettings = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse settings JSON {}: {e}", settings_path.display()))?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Startup variant: a missing file means defaults, a broken one is reported
/// and also falls back to defaults.
pub fn load_settings_or_default(settings_path: &Path) -> RigSettings {
    if !settings_path.exists() {
        log::info!(
            "No settings file at {}, using defaults",
            settings_path.display()
        );
        return RigSettings::default();
    }
    match load_settings_from_path(settings_path) {
        Ok(settings) => {
            log::info!("Loaded settings from {}", settings_path.display());
            settings
        }
        Err(e) => {
            log::error!("{e}; using defaults");
            RigSettings::default()
        }
    }
}

fn validate_settings(settings: &RigSettings) -> Result<(), String> {
    if settings.version != SETTINGS_VERSION {
        return Err(format!(
            "Settings validation failed: unsupported version '{}' (expected '{}')",
            settings.version, SETTINGS_VERSION
        ));
    }
    if !(settings.body_size.is_finite() && settings.body_size > 0.0) {
        return Err(format!(
            "Settings validation failed: body_size must be > 0, got {}",
            settings.body_size
        ));
    }
    if settings.window.width == 0 || settings.window.height == 0 {
        return Err("Settings validation failed: window size must be non-zero".to_string());
    }
    let camera = &settings.camera;
    if !(camera.fov_y_deg > 0.0 && camera.fov_y_deg < 180.0) {
        return Err(format!(
            "Settings validation failed: fov_y_deg must be in (0, 180), got {}",
            camera.fov_y_deg
        ));
    }
    if !(camera.near > 0.0 && camera.near < camera.far) {
        return Err(format!(
            "Settings validation failed: need 0 < near < far, got near {} far {}",
            camera.near, camera.far
        ));
    }
    if camera.eye == camera.target {
        return Err("Settings validation failed: camera eye and target coincide".to_string());
    }
    if settings.ground.subdivisions == 0 {
        return Err("Settings validation failed: ground subdivisions must be > 0".to_string());
    }
    if !(settings.ground.size.is_finite() && settings.ground.size > 0.0) {
        return Err(format!(
            "Settings validation failed: ground size must be > 0, got {}",
            settings.ground.size
        ));
    }
    Ok(())
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}

fn default_version() -> String {
    SETTINGS_VERSION.to_string()
}

const fn default_body_size() -> f32 {
    DEFAULT_BODY_SIZE
}
