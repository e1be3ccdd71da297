//! Render pipeline creation.

use std::num::NonZeroU64;

use super::{Vertex, DEPTH_FORMAT};

/// The three pipelines the scene is drawn with.
pub(super) struct ScenePipelines {
    pub mesh: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
    pub lines: wgpu::RenderPipeline,
}

impl ScenePipelines {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        globals_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/scene.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene pipeline layout"),
            bind_group_layouts: &[globals_layout, object_layout],
            push_constant_ranges: &[],
        });

        let builder = PipelineBuilder {
            device,
            shader: &shader,
            layout: &layout,
            color_format,
        };

        Self {
            mesh: builder.build(
                "mesh pipeline",
                wgpu::PrimitiveTopology::TriangleList,
                None,
                true,
            ),
            // Translucent faces are seen from both sides and never occlude each other.
            transparent: builder.build(
                "transparent mesh pipeline",
                wgpu::PrimitiveTopology::TriangleList,
                Some(wgpu::BlendState::ALPHA_BLENDING),
                false,
            ),
            lines: builder.build(
                "line pipeline",
                wgpu::PrimitiveTopology::LineList,
                Some(wgpu::BlendState::ALPHA_BLENDING),
                true,
            ),
        }
    }
}

struct PipelineBuilder<'a> {
    device: &'a wgpu::Device,
    shader: &'a wgpu::ShaderModule,
    layout: &'a wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
}

impl PipelineBuilder<'_> {
    fn build(
        &self,
        label: &str,
        topology: wgpu::PrimitiveTopology,
        blend: Option<wgpu::BlendState>,
        depth_write: bool,
    ) -> wgpu::RenderPipeline {
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(self.layout),
                vertex: wgpu::VertexState {
                    module: self.shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: self.shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.color_format,
                        blend: Some(blend.unwrap_or(wgpu::BlendState::REPLACE)),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }
}

/// Bind group layout with a single uniform buffer sized for `T`.
pub(super) fn uniform_layout<T>(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
            },
            count: None,
        }],
    })
}
