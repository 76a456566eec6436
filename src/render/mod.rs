mod shared;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bytemuck::{bytes_of, Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use crate::lighting::Finish;
use crate::mesh::MeshData;
use crate::scene::{NodeKind, SceneNode};

/// Camera state consumed by the renderer's uniform buffer.
///
/// View and projection are kept separate because the lighting pipelines
/// work in view space and need the view matrix per object.
#[derive(Clone, Debug)]
pub struct CameraParams {
    pub view: Mat4,
    pub proj: Mat4,
    pub position: Vec3,
}

/// GPU renderer backed by wgpu that draws the scene graph snapshot.
pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    depth: DepthBuffer,
    plastic_pipeline: wgpu::RenderPipeline,
    metal_pipeline: wgpu::RenderPipeline,
    unlit_pipeline: wgpu::RenderPipeline,
    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    text_meshes: HashMap<String, MeshBuffers>,
    cube_mesh: MeshBuffers,
}

impl Renderer {
    /// Initializes the GPU renderer for the provided window.
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!("window has zero area"));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: Default::default(),
            backend_options: Default::default(),
        });
        let surface = instance.create_surface(Arc::clone(&window))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;

        let device_descriptor = wgpu::DeviceDescriptor {
            label: Some("renderer-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
        };
        let (device, queue) = adapter
            .request_device(&device_descriptor)
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|mode| {
                    matches!(
                        mode,
                        wgpu::PresentMode::Mailbox | wgpu::PresentMode::Immediate
                    )
                })
                .unwrap_or(wgpu::PresentMode::Fifo),
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("renderer-shader"),
            source: wgpu::ShaderSource::Wgsl(shared::SHADER.into()),
        });

        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("global-bind-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(std::mem::size_of::<GlobalUniform>() as u64)
                            .unwrap(),
                    ),
                },
                count: None,
            }],
        });

        // Per-object uniform layout
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object-bind-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(std::mem::size_of::<ObjectConstants>() as u64)
                            .unwrap(),
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("renderer-pipeline-layout"),
            bind_group_layouts: &[&global_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let global_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("global-uniform"),
            size: std::mem::size_of::<GlobalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("global-bind-group"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_buffer.as_entire_binding(),
            }],
        });

        let build_pipeline = |label: &str, fragment_entry: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: (MeshData::FLOATS_PER_VERTEX * std::mem::size_of::<f32>())
                            as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x3,
                                offset: 0,
                                shader_location: 0,
                            },
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x3,
                                offset: (3 * std::mem::size_of::<f32>()) as u64,
                                shader_location: 1,
                            },
                        ],
                    }],
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DepthBuffer::FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fragment_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        // Opaque output; components above 1 clamp on write.
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
                cache: None,
            })
        };

        let plastic_pipeline = build_pipeline("plastic-pipeline", "fs_plastic");
        let metal_pipeline = build_pipeline("metal-pipeline", "fs_metal");
        let unlit_pipeline = build_pipeline("unlit-pipeline", "fs_unlit");

        let cube_mesh = MeshBuffers::from_mesh(&device, &MeshData::unit_cube(), "light-cube");

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth,
            plastic_pipeline,
            metal_pipeline,
            unlit_pipeline,
            global_buffer,
            global_bind_group,
            object_layout,
            text_meshes: HashMap::new(),
            cube_mesh,
        })
    }

    /// Returns the identifier of the window owned by the renderer.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Exposes the inner window for event handling.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resizes the swap chain to match the new dimensions.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Uploads an extruded glyph mesh for a text node. Called once per
    /// node when the font resolves; the node renders from then on.
    pub fn upload_text_mesh(&mut self, node_name: &str, mesh: &MeshData) {
        self.text_meshes.insert(
            node_name.to_string(),
            MeshBuffers::from_mesh(&self.device, mesh, node_name),
        );
    }

    pub fn has_text_mesh(&self, node_name: &str) -> bool {
        self.text_meshes.contains_key(node_name)
    }

    /// Updates the projection and lighting uniforms before rendering.
    ///
    /// `light_position` must already be in view space; it is published
    /// exactly once per frame so both lighting variants observe the same
    /// value.
    pub fn update_globals(&self, camera: &CameraParams, light_position: Vec3, ambient: f32) {
        let uniform = GlobalUniform {
            proj: camera.proj.to_cols_array_2d(),
            light_position: light_position.extend(1.0).into(),
            ambient: [ambient, 0.0, 0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.global_buffer, 0, bytes_of(&uniform));
    }

    /// Draws the scene snapshot. Text nodes without an uploaded mesh are
    /// skipped, which is exactly the behavior while the font is pending
    /// or failed.
    pub fn render(
        &mut self,
        nodes: &[SceneNode],
        camera: &CameraParams,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("renderer-encoder"),
            });

        // Build the draw list with per-object bind groups up front.
        let mut draws: Vec<(DrawKind, wgpu::BindGroup)> = Vec::new();
        for node in nodes {
            let kind = match node.kind {
                NodeKind::LightCube => DrawKind::Cube,
                NodeKind::Text if self.text_meshes.contains_key(&node.name) => {
                    DrawKind::Text(node.name.clone(), node.finish.unwrap_or(Finish::Plastic))
                }
                _ => continue,
            };

            let model_view = camera.view * node_model_matrix(node);
            let normal = Mat3::from_mat4(model_view).inverse().transpose();
            let constants = ObjectConstants {
                model_view: model_view.to_cols_array_2d(),
                normal: mat3_to_3x4(normal),
                color: node.color.extend(1.0).into(),
            };

            let object_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("object-uniform"),
                    contents: bytes_of(&constants),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &self.object_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: object_buffer.as_entire_binding(),
                }],
                label: Some("object-bind-group"),
            });
            draws.push((kind, bind_group));
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("main-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.0,
                        g: 0.0,
                        b: 0.0,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_bind_group(0, &self.global_bind_group, &[]);

        for (kind, bind_group) in &draws {
            let mesh = match kind {
                DrawKind::Cube => {
                    pass.set_pipeline(&self.unlit_pipeline);
                    &self.cube_mesh
                }
                DrawKind::Text(name, finish) => {
                    pass.set_pipeline(match finish {
                        Finish::Plastic => &self.plastic_pipeline,
                        Finish::Metal => &self.metal_pipeline,
                    });
                    &self.text_meshes[name]
                }
            };
            pass.set_vertex_buffer(0, mesh.vertex.slice(..));
            pass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
            pass.set_bind_group(1, bind_group, &[]);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }

        drop(pass); // explicit to satisfy lifetimes on some backends
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

enum DrawKind {
    Cube,
    Text(String, Finish),
}

fn node_model_matrix(node: &SceneNode) -> Mat4 {
    let translation = Mat4::from_translation(node.position);
    // Rotations are radians, applied in XYZ order.
    let rotation = Mat4::from_rotation_z(node.rotation.z)
        * Mat4::from_rotation_y(node.rotation.y)
        * Mat4::from_rotation_x(node.rotation.x);
    let scale = Mat4::from_scale(node.scale);
    translation * rotation * scale
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn from_mesh(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
        }
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GlobalUniform {
    proj: [[f32; 4]; 4],
    light_position: [f32; 4],
    ambient: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ObjectConstants {
    model_view: [[f32; 4]; 4],
    normal: [[f32; 4]; 3],
    color: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_matrix_applies_translation_last() {
        let node = SceneNode {
            position: Vec3::new(1.0, 2.0, 3.0),
            ..cube_node()
        };
        let matrix = node_model_matrix(&node);
        let origin = matrix * Vec3::ZERO.extend(1.0);
        assert_eq!(origin.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn rotation_is_interpreted_as_radians() {
        let node = SceneNode {
            rotation: Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2),
            ..cube_node()
        };
        let matrix = node_model_matrix(&node);
        let x = (matrix * Vec3::X.extend(1.0)).truncate();
        assert!((x - Vec3::Y).length() < 1e-6);
    }

    fn cube_node() -> SceneNode {
        let scene =
            crate::scene::Scene::from_config(&crate::config::SceneConfig::default());
        scene
            .nodes
            .into_iter()
            .find(|n| n.kind == NodeKind::LightCube)
            .unwrap()
    }
}
