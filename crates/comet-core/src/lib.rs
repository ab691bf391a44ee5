//! Comet Core - Foundational types for the Comet swarm
//!
//! This crate provides the types that all other Comet crates depend on:
//! - `ParticleId` - Stable particle identifiers
//! - `Transform`, `Vec3`, `Color` - Spatial types
//! - `spline` - Catmull-Rom curves, arc-length sampling and Frenet frames
//! - Error types and Result alias

mod error;
mod id;
pub mod spline;
mod types;

pub use error::{CometError, Result};
pub use id::ParticleId;
pub use types::{mat4_mul, Color, Transform, Vec3};
