//! Frame-by-frame driver shared by the window and headless modes

use comet_core::{Result, Vec3};
use comet_particles::{MeshSink, SimulationWorld, StepStats, SwarmConfig};
use comet_runtime::{FrameClock, OrbitTarget, PickPlane, Ray};
use std::time::{Duration, Instant};

/// What happened on a frame that ran a simulation step
#[derive(Debug, Clone, Copy)]
pub struct StepReport {
    pub step: u64,
    pub elapsed: Duration,
    pub over_budget: bool,
    pub stats: StepStats,
}

/// Owns the swarm together with the frame clock, the orbiting target and
/// the pick plane.
pub struct SwarmSession {
    pub world: SimulationWorld,
    pub clock: FrameClock,
    pub orbit: OrbitTarget,
    pub plane: PickPlane,
}

impl SwarmSession {
    pub fn new(config: SwarmConfig) -> Result<Self> {
        let clock = FrameClock::with_update_interval(config.update_interval);
        let orbit = OrbitTarget::new(config.orbit_step, config.orbit_radius);
        let plane = PickPlane::facing_camera(config.plane_size);
        let world = SimulationWorld::init(config)?;
        Ok(Self {
            world,
            clock,
            orbit,
            plane,
        })
    }

    /// Move the anchor to where the cursor ray meets the pick plane.
    /// Misses leave the anchor where it was.
    pub fn pick(&mut self, inv_view_proj: &[[f32; 4]; 4], ndc: (f32, f32)) -> Option<Vec3> {
        let ray = Ray::from_ndc(inv_view_proj, ndc.0, ndc.1);
        let hit = self.plane.intersect(&ray)?;
        self.orbit.set_anchor(hit);
        Some(hit)
    }

    pub fn anchor(&self) -> Vec3 {
        self.orbit.anchor
    }

    /// Advance one display frame: the orbit angle always moves, the swarm
    /// only on step frames.
    pub fn frame(&mut self) -> Result<Option<StepReport>> {
        let step_frame = self.clock.tick();
        self.orbit.advance();
        if !step_frame {
            return Ok(None);
        }

        let target = self.orbit.target();
        let started = Instant::now();
        self.world.step(self.orbit.anchor, target)?;
        let elapsed = started.elapsed();
        let over_budget = self.clock.record_step(elapsed);
        if over_budget {
            log::warn!(
                "[swarm] Step {} took {:.2} ms ({} particles)",
                self.world.steps(),
                elapsed.as_secs_f64() * 1000.0,
                self.world.particle_count()
            );
        }

        Ok(Some(StepReport {
            step: self.world.steps(),
            elapsed,
            over_budget,
            stats: self.world.stats(target),
        }))
    }

    /// Publish the swarm and the anchor marker to a sink
    pub fn publish(&self, sink: &mut dyn MeshSink) {
        self.world.publish(sink, self.orbit.anchor);
    }

    /// Replace the swarm with `count` particles and restart frame counting
    pub fn respawn(&mut self, count: usize) -> Result<()> {
        self.world.respawn(count)?;
        self.clock.reset();
        Ok(())
    }
}
