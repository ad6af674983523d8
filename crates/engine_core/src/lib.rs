//! Core engine types and utilities for the otter world simulation.
//!
//! This crate provides the foundational types shared by terrain and agents:
//! - Frame timing with a clamped delta
//! - Presentation poses handed to an external renderer
//! - Frame-rate independent smoothing math
//! - Per-agent components (lifetimes, LOD tick decimation)

pub mod components;
pub mod math;
pub mod time;
pub mod transform;

pub use components::*;
pub use math::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
