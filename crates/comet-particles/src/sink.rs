//! Rendering sink interface and a headless implementation

use crate::tube::TubeMesh;
use comet_core::{Color, Vec3};

/// Receives per-frame swarm geometry.
///
/// Indices are stable for the lifetime of a swarm and run `0..count` as
/// announced by [`MeshSink::begin_frame`]. Bodies are positioned in world
/// space with their container already applied; tails are world-space buffers.
pub trait MeshSink {
    fn begin_frame(&mut self, particle_count: usize);
    fn update_body(&mut self, index: usize, body: &BodyInstance);
    fn update_tail(&mut self, index: usize, mesh: &TubeMesh);
    fn update_target(&mut self, position: Vec3);
}

/// Body sphere placement for one particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyInstance {
    pub position: Vec3,
    pub radius: f32,
    pub color: Color,
    /// Full world matrix (column-major), scale included
    pub model: [[f32; 4]; 4],
}

/// Sink that only tallies what it was sent; used by the headless player and
/// by tests.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    pub frames: u64,
    pub particle_count: usize,
    pub bodies: usize,
    pub tails: usize,
    pub tail_vertices: usize,
    pub non_finite_vertices: usize,
    pub target: Option<Vec3>,
    pub centroid: Vec3,
}

impl MeshSink for FrameStats {
    fn begin_frame(&mut self, particle_count: usize) {
        self.frames += 1;
        self.particle_count = particle_count;
        self.bodies = 0;
        self.tails = 0;
        self.tail_vertices = 0;
        self.non_finite_vertices = 0;
        self.centroid = Vec3::ZERO;
    }

    fn update_body(&mut self, _index: usize, body: &BodyInstance) {
        self.bodies += 1;
        // running mean
        self.centroid += (body.position - self.centroid) / self.bodies as f32;
    }

    fn update_tail(&mut self, _index: usize, mesh: &TubeMesh) {
        self.tails += 1;
        self.tail_vertices += mesh.vertex_count();
        if !mesh.is_finite() {
            self.non_finite_vertices += mesh
                .positions
                .iter()
                .filter(|p| !p.iter().all(|c| c.is_finite()))
                .count();
        }
    }

    fn update_target(&mut self, position: Vec3) {
        self.target = Some(position);
    }
}
