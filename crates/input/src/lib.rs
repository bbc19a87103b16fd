//! Input layer: held keys, key bindings and pointer/scroll normalisation.
//!
//! The windowing layer pushes raw events in; the frame loop queries the held
//! key set once per frame. Nothing here talks to the window directly.
//!
//! # Invariants
//! - The camera only ever sees movement intents, absolute pointer positions and
//!   line-based scroll offsets, never window-system types.

pub mod action;
mod bindings;
mod pointer;

pub use action::Action;
pub use bindings::{HeldKeys, KeyBindings, apply_movement};
pub use pointer::{PIXELS_PER_LINE, ScrollDelta, VirtualCursor};
