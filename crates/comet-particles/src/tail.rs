//! Tail history and tail-curve reconstruction
//!
//! Each particle remembers its last few world positions. Every tick four of
//! them are picked (how far back depends on the distance to the target), a
//! Catmull-Rom curve is fitted through them and a tube is swept along it.

use crate::tube::{rebuild_tube_mesh, TubeMesh, TubeSettings};
use comet_core::spline::{CatmullRomCurve, CurveType};
use comet_core::{CometError, Result, Vec3};
use std::collections::VecDeque;

/// Curve parameters the four control points are sampled at.
pub const SAMPLE_STEPS: [f64; 4] = [0.0, 0.33, 0.66, 1.0];

/// Tail shape parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailSettings {
    /// Number of world positions remembered (K)
    pub capacity: usize,
    /// Fraction of the history always spanned by the curve
    pub min_length: f32,
    /// Below this distance to the target the tail is at its shortest
    pub min_distance: f32,
    /// Above this distance to the target the tail spans the whole history
    pub max_distance: f32,
    /// Knot parameterisation of the fitted curve
    pub curve_type: CurveType,
}

impl Default for TailSettings {
    fn default() -> Self {
        Self {
            capacity: 8,
            min_length: 0.6,
            min_distance: 0.02,
            max_distance: 7.0,
            curve_type: CurveType::Centripetal,
        }
    }
}

impl TailSettings {
    pub fn validate(&self) -> Result<()> {
        if self.capacity < 4 {
            return Err(CometError::config(format!(
                "tail capacity must hold at least 4 positions, got {}",
                self.capacity
            )));
        }
        if !(0.0..=1.0).contains(&self.min_length) {
            return Err(CometError::ValueOutOfRange {
                field: "tail.min_length".into(),
                min: 0.0,
                max: 1.0,
                value: self.min_length as f64,
            });
        }
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(CometError::config(format!(
                "tail max_distance must be positive, got {}",
                self.max_distance
            )));
        }
        if !(self.min_distance >= 0.0 && self.min_distance <= self.max_distance) {
            return Err(CometError::config(format!(
                "tail min_distance must lie in [0, {}], got {}",
                self.max_distance, self.min_distance
            )));
        }
        Ok(())
    }
}

/// Map the particle-to-target distance to a length factor in `[0, 1]`.
///
/// Near the target the factor is 1, far away (or for a NaN distance) it is 0.
pub fn length_factor(distance: f32, settings: &TailSettings) -> f32 {
    let raw = if distance < settings.min_distance {
        0.0
    } else if distance > settings.max_distance || distance.is_nan() {
        1.0
    } else {
        distance / settings.max_distance
    };
    (1.0 - raw).clamp(0.0, 1.0)
}

/// History indices of the four tail control points, newest first.
///
/// A factor of 1 keeps the curve within the newest `min_length` share of the
/// history; a factor of 0 reaches back to the oldest entry.
pub fn sample_indices(len: usize, min_length: f32, factor: f32) -> [usize; 4] {
    if len == 0 {
        return [0; 4];
    }
    let total = (len - 1) as f64;
    let minimum = (total * min_length as f64).floor();
    let left = total - minimum;
    let available = (minimum + (left * (1.0 - factor as f64)).floor()).floor();

    SAMPLE_STEPS.map(|t| {
        let back = (available * t).floor() as usize;
        len.saturating_sub(back + 1)
    })
}

/// Bounded FIFO of recent world positions, oldest at the front.
#[derive(Debug, Clone)]
pub struct TailHistory {
    positions: VecDeque<Vec3>,
    capacity: usize,
}

impl TailHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// A full history holding `capacity` copies of `position`
    pub fn filled(capacity: usize, position: Vec3) -> Self {
        Self {
            positions: std::iter::repeat(position).take(capacity).collect(),
            capacity,
        }
    }

    /// Append `position`, evicting the oldest entry when full.
    pub fn push(&mut self, position: Vec3) {
        if self.positions.len() == self.capacity {
            self.positions.pop_front();
        }
        self.positions.push_back(position);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn newest(&self) -> Option<Vec3> {
        self.positions.back().copied()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Vec3> {
        self.positions.iter()
    }

    /// The four curve control points for `factor`, newest first.
    ///
    /// With fewer than four entries the available positions are used newest
    /// first and the rest repeat the earliest one. Returns `None` when empty.
    pub fn control_points(&self, min_length: f32, factor: f32) -> Option<[Vec3; 4]> {
        let len = self.positions.len();
        let earliest = *self.positions.front()?;

        if len < 4 {
            let mut points = [earliest; 4];
            for (slot, p) in points.iter_mut().zip(self.positions.iter().rev()) {
                *slot = *p;
            }
            return Some(points);
        }

        Some(sample_indices(len, min_length, factor).map(|i| self.positions[i]))
    }
}

/// Rebuilds one particle's tail curve and tube on every position update.
#[derive(Debug, Clone)]
pub struct TailBuilder {
    settings: TailSettings,
    tube: TubeSettings,
    history: TailHistory,
    length_factor: f32,
    curve: Option<CatmullRomCurve>,
    mesh: TubeMesh,
}

impl TailBuilder {
    /// Start a tail at `start` with a full history and the shortest curve.
    pub fn new(start: Vec3, settings: TailSettings, tube: TubeSettings) -> Result<Self> {
        settings.validate()?;
        tube.validate()?;
        let mut builder = Self {
            settings,
            tube,
            history: TailHistory::filled(settings.capacity, start),
            length_factor: 1.0,
            curve: None,
            mesh: TubeMesh::default(),
        };
        builder.rebuild()?;
        Ok(builder)
    }

    /// A tail with an empty history; the first updates pad the curve with the
    /// earliest known position.
    pub fn starting_empty(settings: TailSettings, tube: TubeSettings) -> Result<Self> {
        settings.validate()?;
        tube.validate()?;
        Ok(Self {
            settings,
            tube,
            history: TailHistory::new(settings.capacity),
            length_factor: 1.0,
            curve: None,
            mesh: TubeMesh::default(),
        })
    }

    /// Record a new world position and regenerate the tube.
    pub fn on_position_update(&mut self, world_position: Vec3, target: Vec3) -> Result<&TubeMesh> {
        self.length_factor = length_factor(world_position.distance(&target), &self.settings);
        self.history.push(world_position);
        self.rebuild()?;
        Ok(&self.mesh)
    }

    fn rebuild(&mut self) -> Result<()> {
        let points = self
            .history
            .control_points(self.settings.min_length, self.length_factor)
            .ok_or_else(|| CometError::config("tail history is empty"))?;
        let curve = CatmullRomCurve::new(points.to_vec(), false, self.settings.curve_type)?;
        rebuild_tube_mesh(&mut self.mesh, &curve, &self.tube);
        self.curve = Some(curve);
        Ok(())
    }

    pub fn length_factor(&self) -> f32 {
        self.length_factor
    }

    pub fn history(&self) -> &TailHistory {
        &self.history
    }

    pub fn curve(&self) -> Option<&CatmullRomCurve> {
        self.curve.as_ref()
    }

    pub fn mesh(&self) -> &TubeMesh {
        &self.mesh
    }

    pub fn settings(&self) -> &TailSettings {
        &self.settings
    }

    pub fn tube_settings(&self) -> &TubeSettings {
        &self.tube
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_for_default_history() {
        assert_eq!(sample_indices(8, 0.6, 1.0), [7, 6, 5, 3]);
        assert_eq!(sample_indices(8, 0.6, 0.0), [7, 5, 3, 0]);
    }

    #[test]
    fn indices_stay_in_bounds() {
        for len in 1..40 {
            for step in 0..=10 {
                let factor = step as f32 / 10.0;
                let idx = sample_indices(len, 0.6, factor);
                assert_eq!(idx[0], len - 1);
                assert!(idx.iter().all(|&i| i < len));
                assert!(idx.windows(2).all(|w| w[0] >= w[1]));
            }
        }
    }

    #[test]
    fn factor_thresholds() {
        let s = TailSettings::default();
        assert_eq!(length_factor(0.0, &s), 1.0);
        assert_eq!(length_factor(0.01, &s), 1.0);
        assert_eq!(length_factor(7.5, &s), 0.0);
        assert_eq!(length_factor(f32::INFINITY, &s), 0.0);
        assert_eq!(length_factor(f32::NAN, &s), 0.0);
        assert!((length_factor(3.5, &s) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn factor_always_in_unit_range() {
        let s = TailSettings::default();
        for i in 0..1000 {
            let f = length_factor(i as f32 * 0.01, &s);
            assert!((0.0..=1.0).contains(&f));
        }
    }

    #[test]
    fn history_evicts_oldest() {
        let mut h = TailHistory::filled(8, Vec3::ZERO);
        for i in 1..=20 {
            h.push(Vec3::new(i as f32, 0.0, 0.0));
            assert_eq!(h.len(), 8);
        }
        assert_eq!(h.newest(), Some(Vec3::new(20.0, 0.0, 0.0)));
        assert_eq!(h.iter().next(), Some(&Vec3::new(13.0, 0.0, 0.0)));
        let newest_first: Vec<f32> = h.iter().rev().take(3).map(|p| p.x).collect();
        assert_eq!(newest_first, vec![20.0, 19.0, 18.0]);
    }

    #[test]
    fn short_history_pads_with_earliest() {
        let mut h = TailHistory::new(8);
        assert!(h.control_points(0.6, 1.0).is_none());

        h.push(Vec3::new(1.0, 0.0, 0.0));
        h.push(Vec3::new(2.0, 0.0, 0.0));
        let pts = h.control_points(0.6, 1.0).unwrap();
        assert_eq!(pts[0], Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(pts[1], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(pts[2], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(pts[3], Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn new_builder_has_collapsed_finite_tube() {
        let b = TailBuilder::new(
            Vec3::new(0.5, -0.5, 0.0),
            TailSettings::default(),
            TubeSettings::default(),
        )
        .unwrap();
        assert_eq!(b.history().len(), 8);
        assert_eq!(b.length_factor(), 1.0);
        assert_eq!(b.mesh().vertex_count(), 49);
        assert!(b.mesh().is_finite());
    }

    #[test]
    fn update_keeps_history_full_and_mesh_sized() {
        let mut b =
            TailBuilder::new(Vec3::ZERO, TailSettings::default(), TubeSettings::default()).unwrap();
        let target = Vec3::new(0.0, 0.0, 0.0);
        for i in 1..=30 {
            let p = Vec3::new(i as f32 * 0.1, (i as f32 * 0.3).sin(), 0.0);
            let mesh = b.on_position_update(p, target).unwrap();
            assert_eq!(mesh.vertex_count(), 49);
            assert!(mesh.is_finite());
            assert_eq!(b.history().len(), 8);
        }
        assert_eq!(b.curve().unwrap().points()[0], b.history().newest().unwrap());
    }

    #[test]
    fn factor_tracks_distance_on_update() {
        let mut b =
            TailBuilder::new(Vec3::ZERO, TailSettings::default(), TubeSettings::default()).unwrap();
        b.on_position_update(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO).unwrap();
        assert_eq!(b.length_factor(), 0.0);
        b.on_position_update(Vec3::new(0.01, 0.0, 0.0), Vec3::ZERO).unwrap();
        assert_eq!(b.length_factor(), 1.0);
    }

    #[test]
    fn starting_empty_builds_on_first_update() {
        let mut b =
            TailBuilder::starting_empty(TailSettings::default(), TubeSettings::default()).unwrap();
        assert!(b.curve().is_none());
        assert_eq!(b.mesh().vertex_count(), 0);
        let mesh = b.on_position_update(Vec3::ONE, Vec3::ZERO).unwrap();
        assert_eq!(mesh.vertex_count(), 49);
        assert!(mesh.is_finite());
    }

    #[test]
    fn small_capacity_is_rejected() {
        let settings = TailSettings {
            capacity: 3,
            ..Default::default()
        };
        assert!(TailBuilder::new(Vec3::ZERO, settings, TubeSettings::default()).is_err());
    }
}
