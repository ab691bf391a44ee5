//! Tube geometry swept along a curve
//!
//! A circle of `radial_segments` is placed on each of `tubular_segments + 1`
//! parallel-transport frames. Positions and normals are regenerated in full on
//! every rebuild; the index buffer depends only on the segment counts.

use comet_core::spline::CatmullRomCurve;
use comet_core::{CometError, Result};
use std::f32::consts::TAU;

/// Shape parameters for a tail tube
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeSettings {
    pub tubular_segments: usize,
    pub radius: f32,
    pub radial_segments: usize,
    pub closed: bool,
}

impl Default for TubeSettings {
    fn default() -> Self {
        Self {
            tubular_segments: 6,
            radius: 0.037,
            radial_segments: 6,
            closed: false,
        }
    }
}

impl TubeSettings {
    pub fn validate(&self) -> Result<()> {
        if self.tubular_segments == 0 {
            return Err(CometError::config("tube needs at least 1 tubular segment"));
        }
        if self.radial_segments < 3 {
            return Err(CometError::config(format!(
                "tube needs at least 3 radial segments, got {}",
                self.radial_segments
            )));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(CometError::config(format!(
                "tube radius must be positive, got {}",
                self.radius
            )));
        }
        Ok(())
    }

    /// Vertices in one ring (the seam vertex is duplicated for UVs)
    pub fn ring_size(&self) -> usize {
        self.radial_segments + 1
    }

    /// `(tubular + 1) * (radial + 1)`
    pub fn vertex_count(&self) -> usize {
        (self.tubular_segments + 1) * self.ring_size()
    }

    pub fn index_count(&self) -> usize {
        self.tubular_segments * self.radial_segments * 6
    }
}

/// Vertex buffers of one tube
#[derive(Debug, Clone, Default)]
pub struct TubeMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
}

impl TubeMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.uvs.clear();
    }

    pub fn is_finite(&self) -> bool {
        self.positions
            .iter()
            .chain(self.normals.iter())
            .all(|v| v.iter().all(|c| c.is_finite()))
    }
}

/// Build a fresh tube mesh around `curve`.
pub fn build_tube_mesh(curve: &CatmullRomCurve, settings: &TubeSettings) -> TubeMesh {
    let mut mesh = TubeMesh::default();
    rebuild_tube_mesh(&mut mesh, curve, settings);
    mesh
}

/// Replace the contents of `mesh` with a tube around `curve`, reusing its
/// allocations.
pub fn rebuild_tube_mesh(mesh: &mut TubeMesh, curve: &CatmullRomCurve, settings: &TubeSettings) {
    let tubular = settings.tubular_segments;
    let radial = settings.radial_segments;
    let frames = curve.frenet_frames(tubular);

    mesh.clear();
    mesh.positions.reserve(settings.vertex_count());
    mesh.normals.reserve(settings.vertex_count());
    mesh.uvs.reserve(settings.vertex_count());

    for i in 0..=tubular {
        // A closed tube repeats its first ring so the seam shares positions
        let ring = if settings.closed && i == tubular { 0 } else { i };
        let u = ring as f32 / tubular as f32;
        let center = curve.point_at(u);
        let n = frames.normals[ring];
        let b = frames.binormals[ring];

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            let sin = v.sin();
            let cos = -v.cos();

            let normal = (n * cos + b * sin).normalized();
            let vertex = center + normal * settings.radius;

            mesh.normals.push(normal.to_array());
            mesh.positions.push(vertex.to_array());
            mesh.uvs.push([i as f32 / tubular as f32, j as f32 / radial as f32]);
        }
    }
}

/// Triangle indices for a tube with the given segment counts.
pub fn tube_indices(settings: &TubeSettings) -> Vec<u32> {
    let ring = settings.ring_size() as u32;
    let mut indices = Vec::with_capacity(settings.index_count());

    for j in 1..=settings.tubular_segments as u32 {
        for i in 1..=settings.radial_segments as u32 {
            let a = ring * (j - 1) + (i - 1);
            let b = ring * j + (i - 1);
            let c = ring * j + i;
            let d = ring * (j - 1) + i;

            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use comet_core::Vec3;

    fn straight_curve() -> CatmullRomCurve {
        CatmullRomCurve::centripetal(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::new(0.0, 0.0, -3.0),
        ])
        .unwrap()
    }

    #[test]
    fn vertex_count_matches_segments() {
        let settings = TubeSettings::default();
        let mesh = build_tube_mesh(&straight_curve(), &settings);
        assert_eq!(mesh.vertex_count(), 49);
        assert_eq!(mesh.normals.len(), 49);
        assert_eq!(mesh.uvs.len(), 49);

        let wide = TubeSettings {
            tubular_segments: 20,
            radial_segments: 8,
            ..settings
        };
        let mesh = build_tube_mesh(&straight_curve(), &wide);
        assert_eq!(mesh.vertex_count(), 21 * 9);
    }

    #[test]
    fn vertices_sit_on_radius() {
        let settings = TubeSettings {
            radius: 0.25,
            ..Default::default()
        };
        let curve = straight_curve();
        let mesh = build_tube_mesh(&curve, &settings);
        for (ring, chunk) in mesh.positions.chunks(settings.ring_size()).enumerate() {
            let center = curve.point_at(ring as f32 / settings.tubular_segments as f32);
            for p in chunk {
                let d = Vec3::from_array(*p).distance(&center);
                assert!((d - 0.25).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn normals_are_unit_and_perpendicular_to_path() {
        let mesh = build_tube_mesh(&straight_curve(), &TubeSettings::default());
        for n in &mesh.normals {
            let n = Vec3::from_array(*n);
            assert!((n.length() - 1.0).abs() < 1e-4);
            assert!(n.z.abs() < 1e-4);
        }
    }

    #[test]
    fn rebuild_replaces_buffers() {
        let settings = TubeSettings::default();
        let mut mesh = build_tube_mesh(&straight_curve(), &settings);
        let moved = CatmullRomCurve::centripetal(vec![
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(6.0, 1.0, 0.0),
            Vec3::new(7.0, 0.0, 0.0),
            Vec3::new(8.0, 1.0, 0.0),
        ])
        .unwrap();
        rebuild_tube_mesh(&mut mesh, &moved, &settings);
        assert_eq!(mesh.vertex_count(), settings.vertex_count());
        assert!(mesh.positions.iter().all(|p| p[0] > 4.9));
    }

    #[test]
    fn indices_cover_every_quad() {
        let settings = TubeSettings::default();
        let indices = tube_indices(&settings);
        assert_eq!(indices.len(), settings.index_count());
        let max = *indices.iter().max().unwrap() as usize;
        assert_eq!(max, settings.vertex_count() - 1);
    }

    #[test]
    fn closed_tube_repeats_first_ring() {
        let settings = TubeSettings {
            closed: true,
            tubular_segments: 8,
            ..Default::default()
        };
        let curve = CatmullRomCurve::new(
            vec![
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::new(0.0, -1.0, 0.0),
            ],
            true,
            Default::default(),
        )
        .unwrap();
        let mesh = build_tube_mesh(&curve, &settings);
        let ring = settings.ring_size();
        let last = mesh.positions.len() - ring;
        for j in 0..ring {
            let a = Vec3::from_array(mesh.positions[j]);
            let b = Vec3::from_array(mesh.positions[last + j]);
            assert!(a.distance(&b) < 1e-5);
        }
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let base = TubeSettings::default();
        assert!(base.validate().is_ok());
        assert!(TubeSettings { tubular_segments: 0, ..base }.validate().is_err());
        assert!(TubeSettings { radial_segments: 2, ..base }.validate().is_err());
        assert!(TubeSettings { radius: 0.0, ..base }.validate().is_err());
    }
}
