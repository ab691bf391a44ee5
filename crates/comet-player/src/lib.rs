//! Comet Player - interactive and headless front ends for the swarm
//!
//! [`SwarmApp`] opens a window and follows the cursor; [`run_headless`]
//! replays a scripted cursor path and logs step statistics.

mod app;
mod headless;
mod session;

pub use app::SwarmApp;
pub use headless::{run_headless, scripted_pointer, HeadlessSummary};
pub use session::{StepReport, SwarmSession};
