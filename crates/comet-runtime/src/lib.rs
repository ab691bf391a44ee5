//! Comet Runtime - Frame loop infrastructure
//!
//! Provides the building blocks the player loop runs on:
//! - `FrameClock`: frame counter with a simulation-step divider and step budget
//! - `PointerState`: cursor tracking in window pixels and NDC
//! - `Ray` / `PickPlane`: cursor unprojection onto an invisible plane
//! - `OrbitTarget`: seek target circling the picked anchor

mod clock;
mod input;
mod picking;
mod target;

pub use clock::{FrameClock, STEP_BUDGET};
pub use input::PointerState;
pub use picking::{unproject, PickPlane, Ray};
pub use target::OrbitTarget;
