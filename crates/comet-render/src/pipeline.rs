//! Swarm render pipelines
//!
//! Bodies are drawn as instances of one sphere mesh, with per-instance model
//! matrices and colors read from a storage buffer. Tails are world-space
//! tubes drawn one indexed draw each, without culling so both sides show.

use crate::context::DEPTH_FORMAT;
use crate::primitives::Vertex;
use bytemuck::{Pod, Zeroable};
use comet_core::{Color, Vec3};
use wgpu::util::DeviceExt;

/// Scene lighting and the tail material color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLighting {
    pub ambient: Color,
    pub light_color: Color,
    pub light_intensity: f32,
    /// Range of the point light; 0 means unlimited
    pub light_distance: f32,
    pub tail_color: Color,
}

impl Default for SceneLighting {
    fn default() -> Self {
        Self {
            ambient: Color::from_hex(0x333333),
            light_color: Color::WHITE,
            light_intensity: 3.0,
            light_distance: 5.0,
            tail_color: Color::BLACK,
        }
    }
}

/// Per-frame uniforms (bind group 0), matches `SwarmUniforms` in WGSL
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SwarmUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = position, w = intensity
    pub light_position: [f32; 4],
    /// rgb = color, w = cutoff distance
    pub light_color: [f32; 4],
    pub ambient: [f32; 4],
    pub tail_color: [f32; 4],
}

impl SwarmUniforms {
    pub fn new(view_proj: [[f32; 4]; 4], light_position: Vec3, lighting: &SceneLighting) -> Self {
        let c = lighting.light_color;
        Self {
            view_proj,
            light_position: [
                light_position.x,
                light_position.y,
                light_position.z,
                lighting.light_intensity,
            ],
            light_color: [c.r, c.g, c.b, lighting.light_distance],
            ambient: lighting.ambient.to_array(),
            tail_color: lighting.tail_color.to_array(),
        }
    }
}

/// GPU body instance (bind group 1 storage). 80 bytes, 16-byte aligned.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BodyInstanceGpu {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// Body and tail pipelines sharing one layout
pub struct SwarmPipeline {
    pub body_pipeline: wgpu::RenderPipeline,
    pub tail_pipeline: wgpu::RenderPipeline,
    pub uniform_bind_group_layout: wgpu::BindGroupLayout,
    pub instance_bind_group_layout: wgpu::BindGroupLayout,
    pub uniform_buffer: wgpu::Buffer,
    pub uniform_bind_group: wgpu::BindGroup,
}

impl SwarmPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Swarm Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("swarm_shader.wgsl").into()),
        });

        // Group 0: camera + lights
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("Swarm Uniform Bind Group Layout"),
            });

        // Group 1: body instance storage buffer (read-only)
        let instance_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("Swarm Instance Bind Group Layout"),
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Swarm Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &instance_bind_group_layout],
            push_constant_ranges: &[],
        });

        let depth_stencil = wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let make_pipeline = |label: &str, entry_point: &str, cull_mode: Option<wgpu::Face>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(entry_point),
                    buffers: &[Vertex::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(depth_stencil.clone()),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let body_pipeline = make_pipeline("Swarm Body Pipeline", "vs_body", Some(wgpu::Face::Back));
        // Double-sided tails
        let tail_pipeline = make_pipeline("Swarm Tail Pipeline", "vs_tail", None);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Swarm Uniform Buffer"),
            contents: bytemuck::cast_slice(&[SwarmUniforms::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("Swarm Uniform Bind Group"),
        });

        Self {
            body_pipeline,
            tail_pipeline,
            uniform_bind_group_layout,
            instance_bind_group_layout,
            uniform_buffer,
            uniform_bind_group,
        }
    }

    /// Bind group over a body instance storage buffer
    pub fn create_instance_bind_group(
        &self,
        device: &wgpu::Device,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.instance_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Swarm Instance Bind Group"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_struct_sizes() {
        // must match the WGSL layouts
        assert_eq!(std::mem::size_of::<SwarmUniforms>(), 128);
        assert_eq!(std::mem::size_of::<BodyInstanceGpu>(), 80);
    }

    #[test]
    fn test_uniforms_pack_lighting() {
        let u = SwarmUniforms::new(
            [[0.0; 4]; 4],
            Vec3::new(1.0, 2.0, 3.0),
            &SceneLighting::default(),
        );
        assert_eq!(u.light_position, [1.0, 2.0, 3.0, 3.0]);
        assert_eq!(u.light_color, [1.0, 1.0, 1.0, 5.0]);
        assert_eq!(u.tail_color, [0.0, 0.0, 0.0, 1.0]);
        assert!((u.ambient[0] - 0x33 as f32 / 255.0).abs() < 1e-6);
    }
}
