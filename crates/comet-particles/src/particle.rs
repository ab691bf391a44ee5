//! A single seeking particle with its tail

use crate::steering::Steering;
use crate::tail::{TailBuilder, TailSettings};
use crate::tube::{TubeMesh, TubeSettings};
use comet_core::{mat4_mul, Color, ParticleId, Result, Transform, Vec3};

/// Per-particle values drawn at spawn time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleParams {
    pub mass: f32,
    pub radius: f32,
    pub max_speed: f32,
    /// Initial velocity
    pub drift: Vec3,
    pub color: Color,
}

/// One swarm member.
///
/// The steering position is local to the swarm container; the body mesh sits
/// at the particle origin scaled by `radius`. Tail geometry is kept in world
/// space so it does not move with the container.
#[derive(Debug, Clone)]
pub struct Particle {
    id: ParticleId,
    steering: Steering,
    color: Color,
    radius: f32,
    body: Transform,
    tail: TailBuilder,
}

impl Particle {
    pub fn new(
        position: Vec3,
        params: ParticleParams,
        tail: TailSettings,
        tube: TubeSettings,
        container: &Transform,
    ) -> Result<Self> {
        let steering = Steering::new(position, params.drift, params.mass, params.max_speed)?;
        let tail = TailBuilder::new(container.transform_point(position), tail, tube)?;
        Ok(Self {
            id: ParticleId::new(),
            steering,
            color: params.color,
            radius: params.radius,
            body: Transform::IDENTITY.with_scale(Vec3::splat(params.radius)),
            tail,
        })
    }

    /// Steer one tick toward the world-space `target` and rebuild the tail
    /// from the new world position. Steering runs in container space.
    pub fn seek(&mut self, target: Vec3, container: &Transform) -> Result<&TubeMesh> {
        let local = self.steering.seek(container.inverse_transform_point(target));
        let world = container.transform_point(local);
        self.tail.on_position_update(world, target)
    }

    pub fn world_position(&self, container: &Transform) -> Vec3 {
        container.transform_point(self.steering.position)
    }

    /// World matrix of the body sphere (column-major)
    pub fn body_matrix(&self, container: &Transform) -> [[f32; 4]; 4] {
        let local = Transform::from_position(self.steering.position).to_matrix();
        let parent = mat4_mul(&container.to_matrix(), &local);
        mat4_mul(&parent, &self.body.to_matrix())
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.steering.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.steering.velocity
    }

    pub fn mass(&self) -> f32 {
        self.steering.mass()
    }

    pub fn max_speed(&self) -> f32 {
        self.steering.max_speed()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn tail(&self) -> &TailBuilder {
        &self.tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ParticleParams {
        ParticleParams {
            mass: 16.0,
            radius: 0.05,
            max_speed: 0.3,
            drift: Vec3::new(1.0, 0.0, 0.0),
            color: Color::from_hex(0x5689a0),
        }
    }

    #[test]
    fn seek_feeds_tail_with_world_position() {
        let container = Transform::from_position(Vec3::new(0.0, 1.0, 0.0));
        let mut p = Particle::new(
            Vec3::ZERO,
            params(),
            TailSettings::default(),
            TubeSettings::default(),
            &container,
        )
        .unwrap();
        assert_eq!(p.tail().history().newest(), Some(Vec3::new(0.0, 1.0, 0.0)));

        p.seek(Vec3::new(10.0, 1.0, 0.0), &container).unwrap();
        let world = p.world_position(&container);
        assert_eq!(p.tail().history().newest(), Some(world));
        assert!((world.y - 1.0).abs() < 1e-6);
        assert!(p.velocity().length() <= 0.3 + 1e-5);
    }

    #[test]
    fn scaled_container_seeks_world_target() {
        let container =
            Transform::from_position(Vec3::new(-1.0, 2.0, 0.0)).with_scale(Vec3::splat(2.0));
        let mut p = Particle::new(
            Vec3::ZERO,
            ParticleParams {
                drift: Vec3::ZERO,
                ..params()
            },
            TailSettings::default(),
            TubeSettings::default(),
            &container,
        )
        .unwrap();
        let target = Vec3::new(-1.0, 5.0, 0.0);
        let start = p.world_position(&container).distance(&target);
        for _ in 0..5 {
            p.seek(target, &container).unwrap();
            let world = p.world_position(&container);
            // straight up toward the target, no sideways drift
            assert!((world.x + 1.0).abs() < 1e-5);
            assert!(world.z.abs() < 1e-5);
        }
        assert!(p.world_position(&container).distance(&target) < start);
    }

    #[test]
    fn body_matrix_places_scaled_sphere() {
        let container = Transform::from_position(Vec3::new(2.0, 0.0, 0.0));
        let p = Particle::new(
            Vec3::new(1.0, 0.0, 0.0),
            params(),
            TailSettings::default(),
            TubeSettings::default(),
            &container,
        )
        .unwrap();
        let m = p.body_matrix(&container);
        assert!((m[0][0] - 0.05).abs() < 1e-6);
        assert!((m[3][0] - 3.0).abs() < 1e-6);
        assert!((m[3][3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_mass_fails_creation() {
        let bad = ParticleParams {
            mass: 0.0,
            ..params()
        };
        let result = Particle::new(
            Vec3::ZERO,
            bad,
            TailSettings::default(),
            TubeSettings::default(),
            &Transform::IDENTITY,
        );
        assert!(result.is_err());
    }

    #[test]
    fn ids_are_unique() {
        let make = || {
            Particle::new(
                Vec3::ZERO,
                params(),
                TailSettings::default(),
                TubeSettings::default(),
                &Transform::IDENTITY,
            )
            .unwrap()
        };
        assert_ne!(make().id(), make().id());
    }
}
