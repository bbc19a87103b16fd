//! First-person fly camera.
//!
//! The camera owns position, yaw/pitch orientation and field of view, and is
//! driven by three entry points: per-frame translation, per-event pointer look
//! and per-event scroll zoom. It never fails; out-of-range input is saturated.
//!
//! # Invariants
//! - `pitch` stays within [-89°, 89°], so `front` is never parallel to `up`.
//! - `field_of_view` stays within [1°, 90°].
//! - `front` is always unit length and derived from yaw/pitch.

mod camera;

pub use camera::{FOV_MAX_DEGREES, FOV_MIN_DEGREES, FirstPersonCamera, PITCH_LIMIT_DEGREES};
pub use cubeview_common::MoveDirection;
