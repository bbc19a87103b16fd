//! wgpu render backend.
//!
//! Uploads one static mesh (unit cube plus floor quad) and an instance per
//! visible cube at startup, then each frame writes the view/projection
//! uniforms and issues a single instanced draw.
//!
//! # Invariants
//! - The renderer never mutates camera state.
//! - Only the camera uniforms change between frames.

mod gpu;
mod mesh;
mod shaders;

pub use gpu::WgpuRenderer;
