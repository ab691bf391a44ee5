//! Random per-particle parameters

use crate::config::SwarmConfig;
use crate::particle::ParticleParams;
use comet_core::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// RNG for a swarm: seeded when the config fixes a seed, otherwise from entropy.
pub fn swarm_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Unit vector from a point drawn uniformly in the `[-1, 1]` cube.
///
/// Not uniform on the sphere (corners are favoured), which is fine for an
/// initial drift. A draw at the exact origin falls back to +Y.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let v = Vec3::new(
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
    );
    if v.length_squared() < 1e-12 {
        Vec3::UP
    } else {
        v.normalized()
    }
}

/// Draw mass, radius, speed cap and initial velocity for one particle.
pub fn random_params<R: Rng + ?Sized>(config: &SwarmConfig, rng: &mut R) -> ParticleParams {
    let mass = config.mass.sample(rng);
    let radius = config.radius.sample(rng);
    let max_speed = config.max_speed.sample(rng);
    let drift = random_direction(rng) * config.drift_speed.sample(rng);
    ParticleParams {
        mass,
        radius,
        max_speed,
        drift,
        color: config.color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_fall_in_configured_ranges() {
        let config = SwarmConfig::default();
        let mut rng = swarm_rng(Some(11));
        for _ in 0..500 {
            let p = random_params(&config, &mut rng);
            assert!(config.mass.contains(p.mass));
            assert!(config.radius.contains(p.radius));
            assert!(config.max_speed.contains(p.max_speed));
            let speed = p.drift.length();
            assert!(speed > config.drift_speed.min - 1e-4 && speed < config.drift_speed.max + 1e-4);
            assert_eq!(p.color, config.color);
        }
    }

    #[test]
    fn directions_are_unit_length() {
        let mut rng = swarm_rng(Some(123));
        for _ in 0..100 {
            let d = random_direction(&mut rng);
            assert!((d.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn same_seed_same_params() {
        let config = SwarmConfig::default();
        let a = random_params(&config, &mut swarm_rng(Some(9)));
        let b = random_params(&config, &mut swarm_rng(Some(9)));
        assert_eq!(a, b);
    }
}
