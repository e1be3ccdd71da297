//! Scene upload and the main render pass.

use glam::{Mat4, Vec3};
use ledcal_core::{NodeContent, NodeId, Scene};
use wgpu::util::DeviceExt;

use super::{GlobalUniforms, GpuNode, ObjectUniforms, RenderEngine, Vertex};
use crate::camera::Camera;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DrawPass {
    Opaque,
    Lines,
    Transparent,
}

struct Draw {
    node: NodeId,
    pass: DrawPass,
    distance: f32,
}

impl RenderEngine {
    /// Draws `scene` as seen from `camera` into `view`, clearing it first.
    ///
    /// `viewport` is `[x, y, width, height]` in pixels; `None` uses the whole target.
    /// Opaque meshes go first, then lines, then translucent meshes back to front.
    pub fn render_scene(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &Camera,
        viewport: Option<[f32; 4]>,
    ) {
        self.write_globals(scene, camera);
        let draws = self.prepare_draws(scene, camera);

        let bg = self.background_color;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(bg.x),
                        g: f64::from(bg.y),
                        b: f64::from(bg.z),
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Some([x, y, width, height]) = viewport {
            let width = width.min(self.width as f32 - x);
            let height = height.min(self.height as f32 - y);
            if x < 0.0 || y < 0.0 || width < 1.0 || height < 1.0 {
                return;
            }
            pass.set_viewport(x, y, width, height, 0.0, 1.0);
        }
        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        for draw in &draws {
            let Some(gpu) = self.nodes.get(&draw.node) else {
                continue;
            };
            let pipeline = match draw.pass {
                DrawPass::Opaque => &self.mesh_pipeline,
                DrawPass::Lines => &self.line_pipeline,
                DrawPass::Transparent => &self.transparent_pipeline,
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, &gpu.bind_group, &[]);
            pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
            match &gpu.index_buffer {
                Some(indices) => {
                    pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..gpu.element_count, 0, 0..1);
                }
                None => pass.draw(0..gpu.element_count, 0..1),
            }
        }
    }

    /// Drops all uploaded geometry. Call when the scene is replaced.
    pub fn forget_nodes(&mut self) {
        self.nodes.clear();
    }

    fn write_globals(&self, scene: &Scene, camera: &Camera) {
        let mut uniforms = GlobalUniforms {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            ambient: Vec3::splat(scene.ambient).extend(1.0).to_array(),
            ..GlobalUniforms::default()
        };

        let mut depth_light_found = false;
        let mut point_light_found = false;
        for id in scene.visible_nodes() {
            match &scene.node(id).content {
                NodeContent::DirectionalLight {
                    direction,
                    intensity,
                } if !depth_light_found => {
                    uniforms.depth_light = direction.extend(*intensity).to_array();
                    depth_light_found = true;
                }
                NodeContent::PointLight {
                    color,
                    intensity,
                    range,
                } if !point_light_found => {
                    uniforms.point_light_pos =
                        scene.world_position(id).extend(*intensity).to_array();
                    uniforms.point_light_color = color.extend(*range).to_array();
                    point_light_found = true;
                }
                _ => {}
            }
        }

        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    fn prepare_draws(&mut self, scene: &Scene, camera: &Camera) -> Vec<Draw> {
        let mut draws = Vec::new();

        for id in scene.visible_nodes() {
            let node = scene.node(id);
            let Some(material) = node.content.material().copied() else {
                continue;
            };
            if !self.nodes.contains_key(&id) {
                match self.upload(&node.content) {
                    Some(gpu) => {
                        self.nodes.insert(id, gpu);
                    }
                    None => continue,
                }
            }

            let position = scene.world_position(id);
            let uniforms = ObjectUniforms {
                model: Mat4::from_translation(position).to_cols_array_2d(),
                color: material.color.extend(material.opacity).to_array(),
                params: [if material.lit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
            };
            if let Some(gpu) = self.nodes.get(&id) {
                self.queue
                    .write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
            }

            let pass = match node.content {
                NodeContent::Lines { .. } => DrawPass::Lines,
                _ if material.is_transparent() => DrawPass::Transparent,
                _ => DrawPass::Opaque,
            };
            draws.push(Draw {
                node: id,
                pass,
                distance: camera.position.distance(position),
            });
        }

        draws.sort_by(|a, b| {
            a.pass.cmp(&b.pass).then_with(|| match a.pass {
                DrawPass::Transparent => b.distance.total_cmp(&a.distance),
                DrawPass::Opaque | DrawPass::Lines => std::cmp::Ordering::Equal,
            })
        });
        draws
    }

    fn upload(&self, content: &NodeContent) -> Option<GpuNode> {
        let (vertices, indices): (Vec<Vertex>, Option<&[u32]>) = match content {
            NodeContent::Mesh { geometry, .. } => (
                geometry
                    .positions
                    .iter()
                    .zip(&geometry.normals)
                    .map(|(p, n)| Vertex {
                        position: p.to_array(),
                        normal: n.to_array(),
                    })
                    .collect(),
                Some(geometry.indices.as_slice()),
            ),
            NodeContent::Lines { lines, .. } => (
                lines
                    .vertices()
                    .into_iter()
                    .map(|p| Vertex {
                        position: p.to_array(),
                        normal: [0.0; 3],
                    })
                    .collect(),
                None,
            ),
            _ => return None,
        };
        if vertices.is_empty() || indices.is_some_and(<[u32]>::is_empty) {
            return None;
        }

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("node vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = indices.map(|indices| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("node indices"),
                    contents: bytemuck::cast_slice(indices),
                    usage: wgpu::BufferUsages::INDEX,
                })
        });
        let element_count = indices.map_or(vertices.len(), <[u32]>::len) as u32;

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("node uniforms"),
                contents: bytemuck::cast_slice(&[ObjectUniforms::default()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("node bind group"),
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Some(GpuNode {
            vertex_buffer,
            index_buffer,
            element_count,
            uniform_buffer,
            bind_group,
        })
    }
}
