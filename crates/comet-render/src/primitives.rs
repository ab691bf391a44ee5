//! Mesh primitives (sphere, tube vertex packing)

use bytemuck::{Pod, Zeroable};
use comet_particles::TubeMesh;
use std::f32::consts::PI;

/// A vertex with position and normal. Color comes from the instance or
/// the draw's uniforms.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// A mesh with vertices and indices
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// UV sphere with `width_segments` around and `height_segments` pole to pole.
///
/// Each row carries a duplicate seam vertex, so there are
/// `(w + 1) * (h + 1)` vertices. Pole rows emit a single triangle per quad.
pub fn create_sphere_mesh(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let w = width_segments.max(3);
    let h = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        let theta = v * PI;
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let phi = u * 2.0 * PI;
            let normal = [-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin()];
            vertices.push(Vertex {
                position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
            });
        }
    }

    let row = w + 1;
    let mut indices = Vec::with_capacity((6 * w * (h - 1)) as usize);
    for iy in 0..h {
        for ix in 0..w {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Mesh { vertices, indices }
}

/// Interleave a tube's position and normal buffers for upload
pub fn tube_vertices(mesh: &TubeMesh, out: &mut Vec<Vertex>) {
    out.extend(
        mesh.positions
            .iter()
            .zip(&mesh.normals)
            .map(|(&position, &normal)| Vertex { position, normal }),
    );
}
