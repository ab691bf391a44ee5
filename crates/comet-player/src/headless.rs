//! Windowless run: drive the cursor along a scripted path and log numbers

use crate::session::{StepReport, SwarmSession};
use comet_core::Result;
use comet_particles::{FrameStats, SwarmConfig};
use comet_render::Camera;
use std::time::Duration;

/// Window size the scripted pointer is projected through
const VIRTUAL_SIZE: (u32, u32) = (1280, 720);
/// Steps between info-level progress lines
const LOG_EVERY: u64 = 10;

/// Totals from a headless run
#[derive(Debug, Clone, Default)]
pub struct HeadlessSummary {
    pub frames: u64,
    pub steps: u64,
    pub over_budget: u64,
    pub worst_step: Duration,
    pub final_mean_distance: f32,
    /// Non-finite tail vertices summed over step frames
    pub non_finite_vertices: usize,
    pub last_frame: FrameStats,
}

impl HeadlessSummary {
    /// Fold in a step frame. Meshes only change on steps, so `published`
    /// is counted once per step rather than once per display frame.
    fn record_step(&mut self, report: &StepReport, published: &FrameStats) {
        self.steps = report.step;
        self.final_mean_distance = report.stats.mean_distance;
        self.non_finite_vertices += published.non_finite_vertices;
    }
}

/// Scripted cursor position in NDC for frame `frame`: a slow figure-eight
/// over the middle of the view.
pub fn scripted_pointer(frame: u64) -> (f32, f32) {
    let t = frame as f32 * 0.01;
    (0.6 * t.sin(), 0.4 * (2.0 * t).sin())
}

/// Run `ticks` display frames without a window.
pub fn run_headless(config: SwarmConfig, ticks: u64) -> Result<HeadlessSummary> {
    let mut session = SwarmSession::new(config)?;
    let camera = Camera::for_window(VIRTUAL_SIZE.0, VIRTUAL_SIZE.1);
    let inv_view_proj = camera.inverse_view_projection_matrix();
    let mut sink = FrameStats::default();
    let mut summary = HeadlessSummary::default();

    log::info!(
        "[headless] Running {ticks} frame(s) with {} particle(s)",
        session.world.particle_count()
    );

    for frame in 0..ticks {
        session.pick(&inv_view_proj, scripted_pointer(frame));
        let report = session.frame()?;
        session.publish(&mut sink);
        if let Some(report) = report {
            summary.record_step(&report, &sink);
            let line = format!(
                "[headless] step {:>5}  mean dist {:.3}  mean factor {:.3}  speed/max {:.3}  tail verts {}  {:.3} ms",
                report.step,
                report.stats.mean_distance,
                report.stats.mean_length_factor,
                report.stats.max_speed_ratio,
                report.stats.tail_vertices,
                report.elapsed.as_secs_f64() * 1000.0,
            );
            if report.step % LOG_EVERY == 0 {
                log::info!("{line}");
            } else {
                log::debug!("{line}");
            }
        }
    }

    summary.frames = session.clock.frame;
    summary.over_budget = session.clock.over_budget;
    summary.worst_step = session.clock.worst_step;
    summary.last_frame = sink;

    log::info!(
        "[headless] Done: {} step(s), worst {:.2} ms, {} over budget, centroid {:?}",
        summary.steps,
        summary.worst_step.as_secs_f64() * 1000.0,
        summary.over_budget,
        summary.last_frame.centroid
    );
    Ok(summary)
}
