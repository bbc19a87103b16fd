//! Rendering adapter: everything a backend needs to draw a frame, minus the GPU.
//!
//! # Invariants
//! - Renderers read a [`FrameView`] and a [`Scene`]; they never mutate the camera.
//! - Aspect ratio and clip planes are fixed for the lifetime of the window.

mod projection;
mod scene;

pub use projection::{FrameView, Projection};
pub use scene::Scene;
