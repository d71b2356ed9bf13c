use glam::{Mat4, Vec3};
use rig_core::{Material, PrimitiveRenderer, QuadMesh};
use wgpu::util::DeviceExt;

use crate::camera::{Camera3D, CameraUniform};
use crate::gpu_context::DEPTH_FORMAT;
use crate::primitives::{MeshKind, MeshLibrary, MeshRange};
use crate::vertex::{InstanceRaw, MeshVertex};

const MESH_SHADER: &str = include_str!("shaders/mesh.wgsl");

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.4,
    g: 0.4,
    b: 0.4,
    a: 1.0,
};

/// A run of consecutive instances that share one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub mesh: MeshKind,
    pub instance_start: u32,
    pub instance_count: u32,
}

/// CPU side of one frame. The scene draws into this through
/// [`PrimitiveRenderer`]; the pipeline then uploads and replays it.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    view: Mat4,
    instances: Vec<InstanceRaw>,
    draw_calls: Vec<DrawCall>,
    finished: bool,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous frame's contents, keeping allocations.
    pub fn begin(&mut self) {
        self.instances.clear();
        self.draw_calls.clear();
        self.finished = false;
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn instances(&self) -> &[InstanceRaw] {
        &self.instances
    }

    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn push(&mut self, mesh: MeshKind, instance: InstanceRaw) {
        if self.finished {
            log::warn!("Primitive recorded after finish_frame; starting a new frame");
            self.begin();
        }
        let instance_start = self.instances.len() as u32;
        self.instances.push(instance);
        push_draw_call(&mut self.draw_calls, mesh, instance_start);
    }
}

impl PrimitiveRenderer for FrameRecorder {
    fn set_camera(&mut self, view: Mat4) {
        self.view = view;
    }

    fn draw_sphere(&mut self, transform: Mat4, material: &Material) {
        self.push(MeshKind::Sphere, InstanceRaw::new(transform, material));
    }

    fn draw_cylinder(
        &mut self,
        transform: Mat4,
        base_radius: f32,
        top_radius: f32,
        height: f32,
        material: &Material,
    ) {
        let radius = base_radius.abs().max(top_radius.abs());
        let (base, top) = if radius > 0.0 {
            (base_radius / radius, top_radius / radius)
        } else {
            (0.0, 0.0)
        };
        let model = transform * Mat4::from_scale(Vec3::new(radius, radius, height));
        self.push(
            MeshKind::Cylinder,
            InstanceRaw::new(model, material).with_taper(base, top),
        );
    }

    fn draw_cube(&mut self, transform: Mat4, material: &Material) {
        self.push(MeshKind::Cube, InstanceRaw::new(transform, material));
    }

    fn draw_quad_mesh(&mut self, mesh: &QuadMesh, transform: Mat4) {
        self.push(MeshKind::Ground, InstanceRaw::new(transform, &mesh.material));
    }

    fn finish_frame(&mut self) {
        self.finished = true;
    }
}

/// Append one instance, extending the previous draw call when it uses the
/// same mesh and the instances are contiguous.
fn push_draw_call(draw_calls: &mut Vec<DrawCall>, mesh: MeshKind, instance_start: u32) {
    if let Some(last) = draw_calls.last_mut() {
        let contiguous = last.instance_start + last.instance_count == instance_start;
        if last.mesh == mesh && contiguous {
            last.instance_count += 1;
            return;
        }
    }
    draw_calls.push(DrawCall {
        mesh,
        instance_start,
        instance_count: 1,
    });
}

pub struct MeshPipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    ranges: [MeshRange; 4],
    // Grows (power-of-two) but never shrinks.
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
}

impl MeshPipeline {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, ground: &QuadMesh) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(MESH_SHADER.into()),
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[Camera3D::new(1, 1).build_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout(), InstanceRaw::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Tubes are open, their insides must stay visible.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let library = MeshLibrary::build(ground);
        let (vertex_buffer, index_buffer) = create_mesh_buffers(device, &library);
        let instance_capacity = 32;

        Self {
            render_pipeline,
            camera_buffer,
            camera_bind_group,
            vertex_buffer,
            index_buffer,
            ranges: MeshKind::ALL.map(|kind| library.range(kind)),
            instance_buffer: create_instance_buffer(device, instance_capacity),
            instance_capacity,
        }
    }

    /// Regenerate the static geometry, e.g. after the ground grid changed.
    pub fn rebuild_meshes(&mut self, device: &wgpu::Device, ground: &QuadMesh) {
        let library = MeshLibrary::build(ground);
        let (vertex_buffer, index_buffer) = create_mesh_buffers(device, &library);
        self.vertex_buffer = vertex_buffer;
        self.index_buffer = index_buffer;
        self.ranges = MeshKind::ALL.map(|kind| library.range(kind));
        log::info!("Rebuilt mesh library ({} ground quads)", ground.quad_count());
    }

    /// Upload camera and per-instance data for `frame`.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &Camera3D,
        frame: &FrameRecorder,
    ) {
        let uniform: CameraUniform = camera.build_uniform();
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));

        let needed = frame.instances().len().max(1);
        if needed > self.instance_capacity {
            self.instance_capacity = needed.next_power_of_two();
            self.instance_buffer = create_instance_buffer(device, self.instance_capacity);
        }
        if !frame.instances().is_empty() {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(frame.instances()),
            );
        }
    }

    /// Clear colour and depth, then replay the recorded draw calls.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        frame: &FrameRecorder,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        for draw in frame.draw_calls() {
            let range = self.ranges[draw.mesh.index()];
            render_pass.draw_indexed(
                range.index_start..range.index_start + range.index_count,
                range.base_vertex,
                draw.instance_start..draw.instance_start + draw.instance_count,
            );
        }
    }
}

fn create_mesh_buffers(device: &wgpu::Device, library: &MeshLibrary) -> (wgpu::Buffer, wgpu::Buffer) {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Vertex Buffer"),
        contents: bytemuck::cast_slice(&library.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Index Buffer"),
        contents: bytemuck::cast_slice(&library.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    (vertex_buffer, index_buffer)
}

fn create_instance_buffer(device: &wgpu::Device, instance_capacity: usize) -> wgpu::Buffer {
    let byte_len = (instance_capacity * std::mem::size_of::<InstanceRaw>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rig_core::{SceneAssembler, Session};

    fn record_default_frame() -> FrameRecorder {
        let mut recorder = FrameRecorder::new();
        SceneAssembler::default().assemble(&Session::default(), &mut recorder);
        recorder
    }

    #[test]
    fn consecutive_same_mesh_draws_merge() {
        let recorder = record_default_frame();
        assert!(recorder.is_finished());
        assert_eq!(recorder.instances().len(), 18);

        let meshes: Vec<(MeshKind, u32)> = recorder
            .draw_calls()
            .iter()
            .map(|d| (d.mesh, d.instance_count))
            .collect();
        use MeshKind::*;
        assert_eq!(
            meshes,
            vec![
                (Sphere, 1),
                (Cylinder, 1),
                (Cube, 1),
                (Cylinder, 1),
                (Cube, 3),
                (Cylinder, 1),
                (Cube, 3),
                (Cylinder, 1),
                (Cube, 1),
                (Cylinder, 2),
                (Cube, 1),
                (Cylinder, 1),
                (Ground, 1),
            ]
        );
    }

    #[test]
    fn draw_calls_cover_instances_without_gaps() {
        let recorder = record_default_frame();
        let mut next = 0;
        for draw in recorder.draw_calls() {
            assert_eq!(draw.instance_start, next);
            next += draw.instance_count;
        }
        assert_eq!(next as usize, recorder.instances().len());
    }

    #[test]
    fn camera_view_is_captured() {
        let recorder = record_default_frame();
        let eye = recorder.view().inverse().transform_point3(Vec3::ZERO);
        assert!((eye - Vec3::new(0.0, 6.0, 22.0)).length() < 1e-4);
    }

    #[test]
    fn cylinder_radius_and_height_go_into_scale_and_taper() {
        let mut recorder = FrameRecorder::new();
        recorder.draw_cylinder(Mat4::IDENTITY, 2.0, 1.0, 3.0, &Material::LIMB);
        let raw = recorder.instances()[0];
        assert_eq!(raw.model[0][0], 2.0);
        assert_eq!(raw.model[1][1], 2.0);
        assert_eq!(raw.model[2][2], 3.0);
        assert_eq!([raw.params[1], raw.params[2]], [1.0, 0.5]);
    }

    #[test]
    fn ground_uses_mesh_material() {
        let recorder = record_default_frame();
        let ground = recorder.instances().last().copied().unwrap();
        assert_eq!(ground.diffuse, Material::GROUND.diffuse);
        assert_eq!(ground.model[3], [0.0, -10.0, 0.0, 1.0]);
    }

    #[test]
    fn begin_resets_frame() {
        let mut recorder = record_default_frame();
        recorder.begin();
        assert!(recorder.instances().is_empty());
        assert!(recorder.draw_calls().is_empty());
        assert!(!recorder.is_finished());
    }
}
