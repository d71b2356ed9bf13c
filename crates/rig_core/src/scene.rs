//! Per-frame scene assembly: camera, robot hierarchy, ground.

use glam::{Mat4, Vec3};

use crate::composer::{compose, Primitive};
use crate::ground::QuadMesh;
use crate::material::Material;
use crate::session::Session;

/// Immediate-mode drawing backend. Every call carries the full world
/// transform of the primitive, so implementations need no matrix stack.
pub trait PrimitiveRenderer {
    fn set_camera(&mut self, view: Mat4);
    /// Unit sphere centred on the origin.
    fn draw_sphere(&mut self, transform: Mat4, material: &Material);
    /// Open tube along +Z, radius `base_radius` at `z = 0` narrowing or
    /// widening to `top_radius` at `z = height`.
    fn draw_cylinder(
        &mut self,
        transform: Mat4,
        base_radius: f32,
        top_radius: f32,
        height: f32,
        material: &Material,
    );
    /// Unit cube centred on the origin.
    fn draw_cube(&mut self, transform: Mat4, material: &Material);
    fn draw_quad_mesh(&mut self, mesh: &QuadMesh, transform: Mat4);
    fn finish_frame(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl CameraRig {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 6.0, 22.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

pub struct SceneAssembler {
    pub camera: CameraRig,
    pub ground: QuadMesh,
    pub ground_offset: Vec3,
}

impl SceneAssembler {
    pub const DEFAULT_GROUND_OFFSET: Vec3 = Vec3::new(0.0, -10.0, 0.0);

    pub fn new(camera: CameraRig, ground: QuadMesh, ground_offset: Vec3) -> Self {
        Self {
            camera,
            ground,
            ground_offset,
        }
    }

    /// Draw one complete frame of `session`. Returns the number of draw calls
    /// issued.
    pub fn assemble<R: PrimitiveRenderer + ?Sized>(
        &self,
        session: &Session,
        renderer: &mut R,
    ) -> usize {
        renderer.set_camera(self.camera.view_matrix());

        let robot = compose(&session.pose, session.dims());
        for placement in robot.parts() {
            match placement.primitive {
                Primitive::Sphere => renderer.draw_sphere(placement.transform, &placement.material),
                Primitive::Cylinder {
                    base_radius,
                    top_radius,
                    height,
                } => renderer.draw_cylinder(
                    placement.transform,
                    base_radius,
                    top_radius,
                    height,
                    &placement.material,
                ),
                Primitive::Cube => renderer.draw_cube(placement.transform, &placement.material),
            }
        }

        self.ground
            .draw(renderer, Mat4::from_translation(self.ground_offset));
        renderer.finish_frame();

        robot.len() + 1
    }
}

impl Default for SceneAssembler {
    fn default() -> Self {
        Self::new(
            CameraRig::default(),
            QuadMesh::ground(16, 32.0),
            Self::DEFAULT_GROUND_OFFSET,
        )
    }
}
