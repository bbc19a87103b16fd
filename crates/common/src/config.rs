use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Key;

/// Errors from loading or validating an [`AppConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level application configuration.
///
/// Every field has a default, so a config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    pub projection: ProjectionSettings,
    pub scene: SceneSettings,
    pub controls: ControlSettings,
    /// Show the camera HUD overlay at startup.
    pub show_hud: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "cubeview".into(),
            width: 800,
            height: 600,
        }
    }
}

/// Initial camera state and tuning. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    pub fov_degrees: f32,
    /// World units per second.
    pub speed: f32,
    /// Degrees of rotation per pointer unit.
    pub sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw_degrees: -90.0,
            pitch_degrees: 0.0,
            fov_degrees: 45.0,
            speed: 8.0,
            sensitivity: 0.1,
        }
    }
}

/// Where the projection takes its vertical field of view from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FovSource {
    /// Follow the camera's scroll-driven field of view every frame.
    #[default]
    Camera,
    /// Use `fixed_fov_degrees` regardless of scroll input.
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    pub fov_source: FovSource,
    pub fixed_fov_degrees: f32,
    /// Fixed aspect ratio. `None` derives it from the configured window size.
    pub aspect: Option<f32>,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            fov_source: FovSource::Camera,
            fixed_fov_degrees: 90.0,
            aspect: None,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Static scene content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub cube_positions: Vec<Vec3>,
    /// How many of `cube_positions` to draw, front to back of the list.
    pub cube_count: usize,
    pub object_color: [f32; 4],
    pub clear_color: [f32; 4],
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            cube_positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(2.0, 5.0, -15.0),
                Vec3::new(-1.5, -2.2, -2.5),
                Vec3::new(-3.8, -2.0, -12.3),
                Vec3::new(2.4, -0.4, -3.5),
                Vec3::new(-1.7, 3.0, -7.5),
                Vec3::new(1.3, -2.0, -2.5),
                Vec3::new(1.5, 2.0, -2.5),
                Vec3::new(1.5, 0.2, -1.5),
                Vec3::new(-1.3, 1.0, -1.5),
            ],
            cube_count: 1,
            object_color: [0.5, 0.5, 0.5, 1.0],
            clear_color: [0.2, 0.3, 0.3, 1.0],
        }
    }
}

/// Key assignments for the bindable actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    pub forward: Key,
    pub backward: Key,
    pub left: Key,
    pub right: Key,
    pub quit: Key,
    pub toggle_hud: Key,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            forward: Key::KeyW,
            backward: Key::KeyS,
            left: Key::KeyA,
            right: Key::KeyD,
            quit: Key::Escape,
            toggle_hud: Key::F1,
        }
    }
}

impl AppConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Save the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Reject values that would leave the window or projection ill-defined.
    ///
    /// Camera angles are not checked here; the camera saturates them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if !positive(self.camera.speed) {
            return Err(ConfigError::Invalid(format!(
                "camera speed must be positive, got {}",
                self.camera.speed
            )));
        }
        if !positive(self.camera.sensitivity) {
            return Err(ConfigError::Invalid(format!(
                "camera sensitivity must be positive, got {}",
                self.camera.sensitivity
            )));
        }
        let p = &self.projection;
        if !positive(p.near) || !positive(p.far - p.near) {
            return Err(ConfigError::Invalid(format!(
                "projection planes must satisfy 0 < near < far, got near={} far={}",
                p.near, p.far
            )));
        }
        if !positive(p.fixed_fov_degrees) || !positive(180.0 - p.fixed_fov_degrees) {
            return Err(ConfigError::Invalid(format!(
                "fixed field of view must lie in (0, 180) degrees, got {}",
                p.fixed_fov_degrees
            )));
        }
        if let Some(aspect) = p.aspect {
            if !positive(aspect) {
                return Err(ConfigError::Invalid(format!(
                    "aspect ratio must be positive, got {aspect}"
                )));
            }
        }
        Ok(())
    }

    /// Aspect ratio used by the projection for the lifetime of the window.
    pub fn aspect_ratio(&self) -> f32 {
        self.projection
            .aspect
            .unwrap_or(self.window.width as f32 / self.window.height.max(1) as f32)
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.camera.position, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(config.camera.yaw_degrees, -90.0);
        assert_eq!(config.camera.fov_degrees, 45.0);
        assert_eq!(config.camera.speed, 8.0);
        assert_eq!(config.camera.sensitivity, 0.1);
        assert_eq!(config.projection.fov_source, FovSource::Camera);
        assert_eq!(config.scene.cube_positions.len(), 10);
        assert_eq!(config.scene.cube_count, 1);
    }

    #[test]
    fn aspect_from_window_size() {
        let config = AppConfig::default();
        assert!((config.aspect_ratio() - 800.0 / 600.0).abs() < 1e-6);

        let mut fixed = AppConfig::default();
        fixed.projection.aspect = Some(2.0);
        assert_eq!(fixed.aspect_ratio(), 2.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{
            "camera": { "speed": 2.5 },
            "projection": { "fov_source": "fixed" },
            "controls": { "forward": "ArrowUp" }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.camera.speed, 2.5);
        assert_eq!(config.camera.sensitivity, 0.1);
        assert_eq!(config.projection.fov_source, FovSource::Fixed);
        assert_eq!(config.projection.fixed_fov_degrees, 90.0);
        assert_eq!(config.controls.forward, Key::ArrowUp);
        assert_eq!(config.controls.backward, Key::KeyS);
        assert_eq!(config.window, WindowSettings::default());
    }

    #[test]
    fn rejects_zero_window() {
        let mut config = AppConfig::default();
        config.window.height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_bad_planes() {
        let mut config = AppConfig::default();
        config.projection.near = 10.0;
        config.projection.far = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.projection.near = 0.0;
        config.projection.far = 100.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_bad_fixed_fov() {
        let mut config = AppConfig::default();
        config.projection.fov_source = FovSource::Fixed;
        for fov in [0.0, -10.0, 180.0, 200.0, f32::NAN, f32::INFINITY] {
            config.projection.fixed_fov_degrees = fov;
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "fixed fov {fov} accepted"
            );
        }

        config.projection.fixed_fov_degrees = 179.0;
        config.validate().unwrap();
        config.projection.fixed_fov_degrees = 1.0;
        config.validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_speed() {
        let mut config = AppConfig::default();
        config.camera.speed = 0.0;
        assert!(config.validate().is_err());
        config.camera.speed = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut config = AppConfig::default();
        config.scene.cube_count = 4;
        config.show_hud = true;
        config.save(tmp.path()).unwrap();

        let loaded = AppConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_rejects_invalid_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), r#"{ "window": { "width": 0 } }"#).unwrap();
        assert!(matches!(
            AppConfig::load(tmp.path()),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(tmp.path(), "not json").unwrap();
        assert!(matches!(AppConfig::load(tmp.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
