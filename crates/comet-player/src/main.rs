//! Comet Player - cursor-seeking particle swarm with spline tube tails
//!
//! Usage:
//!   comet-player [--config <swarm.toml>] [--count N] [--seed S]
//!   comet-player --headless --ticks 600

use anyhow::{Context, Result};
use clap::Parser;
use comet_particles::{load_config, SwarmConfig};
use comet_player::{run_headless, SwarmApp, SwarmSession};
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "comet-player")]
#[command(about = "Particle swarm that seeks the cursor, trailing spline tubes")]
struct Args {
    /// Swarm configuration file (TOML)
    #[arg(long)]
    config: Option<String>,

    /// Number of particles (1-1000), overrides the config file
    #[arg(long)]
    count: Option<usize>,

    /// RNG seed for reproducible swarms
    #[arg(long)]
    seed: Option<u64>,

    /// Run without a window, driving the cursor along a scripted path
    #[arg(long)]
    headless: bool,

    /// Display frames to simulate in headless mode
    #[arg(long, default_value_t = 600)]
    ticks: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("Failed to load config '{path}'"))?,
        None => SwarmConfig::default(),
    };
    if let Some(count) = args.count {
        config.particle_count = count;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate().context("Invalid swarm configuration")?;

    if args.headless {
        let summary = run_headless(config, args.ticks).context("Headless run failed")?;
        if summary.non_finite_vertices > 0 {
            log::warn!(
                "[headless] {} non-finite tail vertices were produced",
                summary.non_finite_vertices
            );
        }
        return Ok(());
    }

    let session = SwarmSession::new(config).context("Failed to create swarm")?;

    log::info!("Controls:");
    log::info!("  Mouse    - Move the target");
    log::info!("  Panel    - Change particle count");
    log::info!("  Escape   - Exit");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = SwarmApp::new(session);
    event_loop.run_app(&mut app)?;

    app.finish()
}
