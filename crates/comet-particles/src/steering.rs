//! Seek steering: mass-scaled acceleration toward a target with a hard speed cap

use comet_core::{CometError, Result, Vec3};

/// Kinematic state of one seeking particle.
///
/// Mass and speed cap are fixed at construction and validated there, so
/// [`Steering::seek`] cannot divide by zero.
#[derive(Debug, Clone)]
pub struct Steering {
    pub position: Vec3,
    pub velocity: Vec3,
    mass: f32,
    max_speed: f32,
}

impl Steering {
    pub fn new(position: Vec3, velocity: Vec3, mass: f32, max_speed: f32) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(CometError::config(format!(
                "particle mass must be a positive number, got {mass}"
            )));
        }
        if !max_speed.is_finite() || max_speed < 0.0 {
            return Err(CometError::config(format!(
                "particle max speed must be non-negative, got {max_speed}"
            )));
        }
        if !position.is_finite() || !velocity.is_finite() {
            return Err(CometError::config("particle position and velocity must be finite"));
        }
        Ok(Self {
            position,
            velocity,
            mass,
            max_speed,
        })
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Advance one tick toward `target`, returning the new position.
    pub fn seek(&mut self, target: Vec3) -> Vec3 {
        let (position, velocity) =
            integrate(self.position, self.velocity, self.mass, self.max_speed, target);
        self.position = position;
        self.velocity = velocity;
        position
    }
}

/// One seek step on raw state, returning `(position, velocity)`.
///
/// Unlike [`Steering::seek`] this accepts unvalidated input, so a zero mass is
/// reported instead of silently producing NaN.
pub fn seek_step(
    position: Vec3,
    velocity: Vec3,
    mass: f32,
    max_speed: f32,
    target: Vec3,
) -> Result<(Vec3, Vec3)> {
    if mass == 0.0 {
        return Err(CometError::DivisionByZero(
            "seek acceleration with zero mass".into(),
        ));
    }
    Ok(integrate(position, velocity, mass, max_speed, target))
}

/// Scale `velocity` down to `max_speed` if it is faster, keeping direction.
pub fn clamp_speed(velocity: Vec3, max_speed: f32) -> Vec3 {
    if velocity.length() > max_speed {
        velocity.normalized() * max_speed
    } else {
        velocity
    }
}

fn integrate(
    position: Vec3,
    velocity: Vec3,
    mass: f32,
    max_speed: f32,
    target: Vec3,
) -> (Vec3, Vec3) {
    let steering_force = target - position;
    let acceleration = steering_force / mass;
    let velocity = clamp_speed(velocity + acceleration, max_speed);
    (position + velocity, velocity)
}
