//! Shared value types and application configuration.
//!
//! Every other crate in the workspace depends on this one; it depends on none of them.

pub mod config;
mod types;

pub use config::{
    AppConfig, CameraSettings, ConfigError, ControlSettings, FovSource, ProjectionSettings,
    SceneSettings, WindowSettings,
};
pub use types::{Key, MoveDirection};
