//! Comet Particles - seeking swarm with spline tube tails
//!
//! Provides the per-particle simulation:
//! - Mass-scaled seek steering with a hard speed cap
//! - Fixed-length position history per particle
//! - Distance-dependent tail curve fitted through four history samples
//! - Tube mesh swept along the curve, regenerated every step
//! - TOML swarm configuration and a [`MeshSink`] for renderers

pub mod config;
pub mod particle;
pub mod sink;
pub mod spawn;
pub mod steering;
pub mod tail;
pub mod tube;
pub mod world;

pub use config::{load_config, SwarmConfig, ValueRange, MAX_PARTICLES, MIN_PARTICLES};
pub use particle::{Particle, ParticleParams};
pub use sink::{BodyInstance, FrameStats, MeshSink};
pub use steering::{seek_step, Steering};
pub use tail::{length_factor, sample_indices, TailBuilder, TailHistory, TailSettings};
pub use tube::{build_tube_mesh, rebuild_tube_mesh, tube_indices, TubeMesh, TubeSettings};
pub use world::{SimulationWorld, StepStats};
