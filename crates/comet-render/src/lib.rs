//! Comet Render - wgpu renderer for the particle swarm
//!
//! Draws particle bodies as instanced lit spheres and their tails as
//! double-sided tubes, plus a white marker and point light at the cursor
//! anchor. [`SwarmRenderer`] receives geometry through
//! [`comet_particles::MeshSink`].

mod camera;
mod context;
mod gpu_mesh;
mod pipeline;
mod primitives;
mod swarm_renderer;

pub use camera::Camera;
pub use context::{RenderContext, RenderError, DEPTH_FORMAT};
pub use gpu_mesh::{GpuMesh, GrowableBuffer};
pub use pipeline::{BodyInstanceGpu, SceneLighting, SwarmPipeline, SwarmUniforms};
pub use primitives::{create_sphere_mesh, tube_vertices, Mesh, Vertex};
pub use swarm_renderer::{
    SwarmFrame, SwarmRenderer, TailRange, BACKGROUND, BODY_MESH_RADIUS, MARKER_RADIUS,
};

#[cfg(test)]
mod tests {
    #[test]
    fn swarm_shader_wgsl_parses() {
        let source = include_str!("swarm_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("swarm_shader.wgsl failed to parse");
    }
}
