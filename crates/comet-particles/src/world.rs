//! Owns the swarm and drives it one simulation step at a time

use crate::config::{SwarmConfig, MAX_PARTICLES, MIN_PARTICLES};
use crate::particle::Particle;
use crate::sink::{BodyInstance, MeshSink};
use crate::spawn::{random_params, swarm_rng};
use comet_core::{CometError, Result, Transform, Vec3};
use rand::rngs::StdRng;

/// Aggregate numbers for one step, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepStats {
    pub particles: usize,
    pub mean_distance: f32,
    pub mean_length_factor: f32,
    pub max_speed_ratio: f32,
    pub tail_vertices: usize,
}

/// The particle swarm plus the container transform its bodies live under.
pub struct SimulationWorld {
    config: SwarmConfig,
    particles: Vec<Particle>,
    container: Transform,
    rng: StdRng,
    /// Set after (re)spawn: the next step first seeks the bare anchor
    warm_up_pending: bool,
    steps: u64,
}

impl SimulationWorld {
    /// Validate `config` and spawn `config.particle_count` particles at the
    /// container origin.
    pub fn init(config: SwarmConfig) -> Result<Self> {
        config.validate()?;
        let mut world = Self {
            rng: swarm_rng(config.seed),
            config,
            particles: Vec::new(),
            container: Transform::IDENTITY,
            warm_up_pending: true,
            steps: 0,
        };
        world.spawn(world.config.particle_count)?;
        log::info!(
            "[swarm] Spawned {} particle(s), update every {} frame(s)",
            world.particles.len(),
            world.config.update_interval
        );
        Ok(world)
    }

    /// Replace the swarm with `count` fresh particles.
    pub fn respawn(&mut self, count: usize) -> Result<()> {
        if !(MIN_PARTICLES..=MAX_PARTICLES).contains(&count) {
            return Err(CometError::ValueOutOfRange {
                field: "particle_count".into(),
                min: MIN_PARTICLES as f64,
                max: MAX_PARTICLES as f64,
                value: count as f64,
            });
        }
        self.spawn(count)?;
        self.config.particle_count = count;
        log::info!("[swarm] Respawned with {count} particle(s)");
        Ok(())
    }

    fn spawn(&mut self, count: usize) -> Result<()> {
        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            let params = random_params(&self.config, &mut self.rng);
            particles.push(Particle::new(
                Vec3::ZERO,
                params,
                self.config.tail,
                self.config.tube,
                &self.container,
            )?);
        }
        self.particles = particles;
        self.warm_up_pending = true;
        self.steps = 0;
        Ok(())
    }

    /// Advance every particle one seek toward `target`.
    ///
    /// The first step after a spawn is preceded by a seek toward the bare
    /// `anchor`.
    pub fn step(&mut self, anchor: Vec3, target: Vec3) -> Result<()> {
        if self.warm_up_pending {
            for p in &mut self.particles {
                p.seek(anchor, &self.container)?;
            }
            self.warm_up_pending = false;
            log::debug!("[swarm] Warm-up seek toward {anchor:?}");
        }
        for p in &mut self.particles {
            p.seek(target, &self.container)?;
        }
        self.steps += 1;
        Ok(())
    }

    /// Push current bodies, tails and the target marker to `sink`.
    pub fn publish(&self, sink: &mut dyn MeshSink, marker: Vec3) {
        sink.begin_frame(self.particles.len());
        for (i, p) in self.particles.iter().enumerate() {
            let body = BodyInstance {
                position: p.world_position(&self.container),
                radius: p.radius(),
                color: p.color(),
                model: p.body_matrix(&self.container),
            };
            sink.update_body(i, &body);
            sink.update_tail(i, p.tail().mesh());
        }
        sink.update_target(marker);
    }

    pub fn stats(&self, target: Vec3) -> StepStats {
        let n = self.particles.len();
        if n == 0 {
            return StepStats::default();
        }
        let mut stats = StepStats {
            particles: n,
            ..Default::default()
        };
        for p in &self.particles {
            stats.mean_distance += p.world_position(&self.container).distance(&target);
            stats.mean_length_factor += p.tail().length_factor();
            stats.tail_vertices += p.tail().mesh().vertex_count();
            if p.max_speed() > 0.0 {
                stats.max_speed_ratio = stats
                    .max_speed_ratio
                    .max(p.velocity().length() / p.max_speed());
            }
        }
        stats.mean_distance /= n as f32;
        stats.mean_length_factor /= n as f32;
        stats
    }

    /// Drop every particle.
    pub fn teardown(&mut self) {
        let n = self.particles.len();
        self.particles.clear();
        log::info!("[swarm] Torn down {n} particle(s) after {} step(s)", self.steps);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn container(&self) -> &Transform {
        &self.container
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn warm_up_pending(&self) -> bool {
        self.warm_up_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::FrameStats;

    fn seeded(count: usize) -> SimulationWorld {
        SimulationWorld::init(SwarmConfig {
            particle_count: count,
            seed: Some(5),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn init_spawns_at_origin_with_full_tails() {
        let world = seeded(10);
        assert_eq!(world.particle_count(), 10);
        for p in world.particles() {
            assert_eq!(p.position(), Vec3::ZERO);
            assert_eq!(p.tail().history().len(), 8);
        }
        assert!(world.warm_up_pending());
    }

    #[test]
    fn first_step_seeks_twice() {
        let mut world = seeded(1);
        let v0 = world.particles()[0].velocity();
        world.step(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.5)).unwrap();
        assert!(!world.warm_up_pending());
        assert_eq!(world.steps(), 1);
        // two pushes into the history
        let newest = world.particles()[0].tail().history().iter().rev().nth(1).copied();
        assert_ne!(newest, Some(Vec3::ZERO));
        assert_ne!(world.particles()[0].velocity(), v0);
    }

    #[test]
    fn speed_cap_holds_every_step() {
        let mut world = seeded(50);
        for i in 0..60 {
            let a = i as f32 * 0.15;
            let anchor = Vec3::new(a.cos() * 3.0, a.sin() * 2.0, 0.0);
            let target = anchor + Vec3::new(a.sin() * 0.5, 0.0, a.cos() * 0.5);
            world.step(anchor, target).unwrap();
            for p in world.particles() {
                assert!(p.velocity().length() <= p.max_speed() + 1e-4);
                assert_eq!(p.tail().history().len(), 8);
                assert_eq!(p.tail().mesh().vertex_count(), 49);
            }
        }
        assert!(world.stats(Vec3::ZERO).max_speed_ratio <= 1.0 + 1e-4);
    }

    #[test]
    fn swarm_closes_in_on_a_fixed_target() {
        let mut world = seeded(20);
        let target = Vec3::new(2.0, 1.0, 0.0);
        world.step(target, target).unwrap();
        let start = world.stats(target).mean_distance;
        let mut closest = start;
        for _ in 0..20 {
            world.step(target, target).unwrap();
            closest = closest.min(world.stats(target).mean_distance);
        }
        assert!(closest < start);
    }

    #[test]
    fn publish_reports_every_particle() {
        let mut world = seeded(7);
        world.step(Vec3::ONE, Vec3::ONE).unwrap();
        let mut stats = FrameStats::default();
        world.publish(&mut stats, Vec3::ONE);
        assert_eq!(stats.particle_count, 7);
        assert_eq!(stats.bodies, 7);
        assert_eq!(stats.tails, 7);
        assert_eq!(stats.tail_vertices, 7 * 49);
        assert_eq!(stats.non_finite_vertices, 0);
        assert_eq!(stats.target, Some(Vec3::ONE));
    }

    #[test]
    fn respawn_resets_swarm() {
        let mut world = seeded(5);
        world.step(Vec3::ONE, Vec3::ONE).unwrap();
        world.respawn(12).unwrap();
        assert_eq!(world.particle_count(), 12);
        assert_eq!(world.config().particle_count, 12);
        assert!(world.warm_up_pending());
        assert_eq!(world.steps(), 0);
        assert!(world.respawn(0).is_err());
        assert!(world.respawn(1001).is_err());
        assert_eq!(world.particle_count(), 12);
    }

    #[test]
    fn teardown_empties() {
        let mut world = seeded(3);
        world.teardown();
        assert_eq!(world.particle_count(), 0);
        assert_eq!(world.stats(Vec3::ZERO), StepStats::default());
    }
}
