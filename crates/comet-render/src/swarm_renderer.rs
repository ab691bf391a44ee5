//! Draws the swarm: body instances, tail tubes and the target marker

use crate::camera::Camera;
use crate::context::RenderContext;
use crate::gpu_mesh::{GpuMesh, GrowableBuffer};
use crate::pipeline::{BodyInstanceGpu, SceneLighting, SwarmPipeline, SwarmUniforms};
use crate::primitives::{create_sphere_mesh, tube_vertices, Vertex};
use comet_core::{Color, Transform, Vec3};
use comet_particles::{tube_indices, BodyInstance, MeshSink, TubeMesh, TubeSettings};
use wgpu::util::DeviceExt;

/// Radius of the shared body sphere before per-instance scaling
pub const BODY_MESH_RADIUS: f32 = 0.5;
/// Radius of the white sphere drawn at the pick anchor
pub const MARKER_RADIUS: f32 = 0.04;
/// CSS `lightblue`
pub const BACKGROUND: Color = Color::new(0.678_431, 0.847_059, 0.901_961, 1.0);

/// Where one particle's tail sits inside the shared tail vertex buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TailRange {
    pub base_vertex: u32,
    pub vertex_count: u32,
}

/// CPU-side staging for one frame of swarm geometry.
#[derive(Debug, Default)]
pub struct SwarmFrame {
    pub instances: Vec<BodyInstanceGpu>,
    pub tail_vertices: Vec<Vertex>,
    pub tails: Vec<TailRange>,
    pub target: Option<Vec3>,
}

impl SwarmFrame {
    /// Marker instance for the current target, if one was reported
    pub fn marker_instance(&self) -> Option<BodyInstanceGpu> {
        self.target.map(|position| BodyInstanceGpu {
            model: Transform::from_position(position)
                .with_scale(Vec3::splat(MARKER_RADIUS / BODY_MESH_RADIUS))
                .to_matrix(),
            color: Color::WHITE.to_array(),
        })
    }

    /// Body instances followed by the marker
    pub fn instances_with_marker(&self) -> Vec<BodyInstanceGpu> {
        let mut all = Vec::with_capacity(self.instances.len() + 1);
        all.extend_from_slice(&self.instances);
        all.extend(self.marker_instance());
        all
    }
}

impl MeshSink for SwarmFrame {
    fn begin_frame(&mut self, particle_count: usize) {
        self.instances.clear();
        self.instances.reserve(particle_count);
        self.tail_vertices.clear();
        self.tails.clear();
        self.tails.reserve(particle_count);
        self.target = None;
    }

    fn update_body(&mut self, index: usize, body: &BodyInstance) {
        if self.instances.len() <= index {
            self.instances.resize(index + 1, BodyInstanceGpu::default());
        }
        self.instances[index] = BodyInstanceGpu {
            model: body.model,
            color: body.color.to_array(),
        };
    }

    fn update_tail(&mut self, index: usize, mesh: &TubeMesh) {
        if self.tails.len() <= index {
            self.tails.resize(index + 1, TailRange::default());
        }
        let base_vertex = self.tail_vertices.len() as u32;
        tube_vertices(mesh, &mut self.tail_vertices);
        self.tails[index] = TailRange {
            base_vertex,
            vertex_count: self.tail_vertices.len() as u32 - base_vertex,
        };
    }

    fn update_target(&mut self, position: Vec3) {
        self.target = Some(position);
    }
}

/// wgpu renderer for the swarm. Feed it through [`MeshSink`], then call
/// [`SwarmRenderer::render`] (or `upload` + `draw` inside your own pass).
pub struct SwarmRenderer {
    pipeline: SwarmPipeline,
    sphere: GpuMesh,
    tail_index_buffer: wgpu::Buffer,
    tail_index_count: u32,
    tail_vertex_count: u32,
    instance_buffer: GrowableBuffer,
    instance_bind_group: wgpu::BindGroup,
    tail_buffer: GrowableBuffer,
    frame: SwarmFrame,
    instance_count: u32,
    pub lighting: SceneLighting,
    pub background: Color,
}

impl SwarmRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, tube: &TubeSettings) -> Self {
        let pipeline = SwarmPipeline::new(device, format);
        let sphere = GpuMesh::upload(device, &create_sphere_mesh(BODY_MESH_RADIUS, 32, 32), "Body Sphere");

        let indices = tube_indices(tube);
        let tail_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Tail Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = GrowableBuffer::new(
            device,
            "Body Instance Buffer",
            wgpu::BufferUsages::STORAGE,
            (std::mem::size_of::<BodyInstanceGpu>() * 128) as u64,
        );
        let instance_bind_group =
            pipeline.create_instance_bind_group(device, instance_buffer.buffer());
        let tail_buffer = GrowableBuffer::new(
            device,
            "Tail Vertex Buffer",
            wgpu::BufferUsages::VERTEX,
            (std::mem::size_of::<Vertex>() * tube.vertex_count() * 128) as u64,
        );

        log::info!(
            "[render] Swarm renderer ready ({} tail vertices / {} indices per particle)",
            tube.vertex_count(),
            indices.len()
        );

        Self {
            pipeline,
            sphere,
            tail_index_buffer,
            tail_index_count: indices.len() as u32,
            tail_vertex_count: tube.vertex_count() as u32,
            instance_buffer,
            instance_bind_group,
            tail_buffer,
            frame: SwarmFrame::default(),
            instance_count: 0,
            lighting: SceneLighting::default(),
            background: BACKGROUND,
        }
    }

    pub fn frame(&self) -> &SwarmFrame {
        &self.frame
    }

    /// Push the staged frame and camera to the GPU
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, camera: &Camera) {
        // the light rides with the marker
        let light_position = self.frame.target.unwrap_or(Vec3::ZERO);
        let uniforms = SwarmUniforms::new(camera.view_projection_matrix(), light_position, &self.lighting);
        queue.write_buffer(&self.pipeline.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let instances = self.frame.instances_with_marker();
        if self.instance_buffer.write(device, queue, bytemuck::cast_slice(&instances)) {
            self.instance_bind_group = self
                .pipeline
                .create_instance_bind_group(device, self.instance_buffer.buffer());
        }
        self.instance_count = instances.len() as u32;

        self.tail_buffer
            .write(device, queue, bytemuck::cast_slice(&self.frame.tail_vertices));
    }

    /// Record draws into an open render pass. Call after [`SwarmRenderer::upload`].
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.pipeline.uniform_bind_group, &[]);
        pass.set_bind_group(1, &self.instance_bind_group, &[]);

        if self.instance_count > 0 {
            pass.set_pipeline(&self.pipeline.body_pipeline);
            pass.set_vertex_buffer(0, self.sphere.vertex_buffer.slice(..));
            pass.set_index_buffer(self.sphere.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.sphere.index_count, 0, 0..self.instance_count);
        }

        if !self.frame.tail_vertices.is_empty() {
            pass.set_pipeline(&self.pipeline.tail_pipeline);
            pass.set_vertex_buffer(0, self.tail_buffer.buffer().slice(..));
            pass.set_index_buffer(self.tail_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            for tail in &self.frame.tails {
                // tails without a full tube yet are skipped
                if tail.vertex_count == self.tail_vertex_count {
                    pass.draw_indexed(0..self.tail_index_count, tail.base_vertex as i32, 0..1);
                }
            }
        }
    }

    /// Clear to the background, draw the swarm into `view` and submit.
    pub fn render(&mut self, context: &RenderContext, camera: &Camera, view: &wgpu::TextureView) {
        self.upload(&context.device, &context.queue, camera);

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Swarm Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Swarm Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: self.background.r as f64,
                            g: self.background.g as f64,
                            b: self.background.b as f64,
                            a: self.background.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &context.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.draw(&mut pass);
        }

        context.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl MeshSink for SwarmRenderer {
    fn begin_frame(&mut self, particle_count: usize) {
        self.frame.begin_frame(particle_count);
    }

    fn update_body(&mut self, index: usize, body: &BodyInstance) {
        self.frame.update_body(index, body);
    }

    fn update_tail(&mut self, index: usize, mesh: &TubeMesh) {
        self.frame.update_tail(index, mesh);
    }

    fn update_target(&mut self, position: Vec3) {
        self.frame.update_target(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comet_particles::{SimulationWorld, SwarmConfig};

    fn world(count: usize) -> SimulationWorld {
        SimulationWorld::init(SwarmConfig {
            particle_count: count,
            seed: Some(11),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_frame_collects_world() {
        let mut w = world(4);
        let target = Vec3::new(1.0, -1.0, 0.0);
        w.step(target, target).unwrap();

        let mut frame = SwarmFrame::default();
        w.publish(&mut frame, target);

        assert_eq!(frame.instances.len(), 4);
        assert_eq!(frame.tails.len(), 4);
        assert_eq!(frame.tail_vertices.len(), 4 * 49);
        for (i, tail) in frame.tails.iter().enumerate() {
            assert_eq!(tail.base_vertex, (i * 49) as u32);
            assert_eq!(tail.vertex_count, 49);
        }
        assert_eq!(frame.target, Some(target));
        assert_eq!(frame.instances_with_marker().len(), 5);
    }

    #[test]
    fn test_begin_frame_clears() {
        let mut w = world(3);
        let mut frame = SwarmFrame::default();
        w.publish(&mut frame, Vec3::ZERO);
        w.respawn(1).unwrap();
        w.publish(&mut frame, Vec3::ZERO);
        assert_eq!(frame.instances.len(), 1);
        assert_eq!(frame.tails.len(), 1);
        assert_eq!(frame.tail_vertices.len(), 49);
    }

    #[test]
    fn test_marker_scale_and_color() {
        let frame = SwarmFrame {
            target: Some(Vec3::new(2.0, 3.0, 0.0)),
            ..Default::default()
        };
        let marker = frame.marker_instance().unwrap();
        assert!((marker.model[0][0] - 0.08).abs() < 1e-6);
        assert_eq!(marker.model[3][0], 2.0);
        assert_eq!(marker.model[3][1], 3.0);
        assert_eq!(marker.color, [1.0, 1.0, 1.0, 1.0]);
        assert!(SwarmFrame::default().marker_instance().is_none());
    }

    #[test]
    fn test_body_instance_carries_model() {
        let mut frame = SwarmFrame::default();
        frame.begin_frame(2);
        let body = BodyInstance {
            position: Vec3::new(1.0, 0.0, 0.0),
            radius: 0.05,
            color: Color::from_hex(0x5689a0),
            model: Transform::from_position(Vec3::new(1.0, 0.0, 0.0))
                .with_scale(Vec3::splat(0.05))
                .to_matrix(),
        };
        // out-of-order updates still land at their index
        frame.update_body(1, &body);
        assert_eq!(frame.instances.len(), 2);
        assert_eq!(frame.instances[1].model, body.model);
        assert_eq!(frame.instances[1].color, body.color.to_array());
    }
}
