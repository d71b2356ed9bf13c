use glam::{Mat4, Vec4};

/// Light positions in eye space, so they stay fixed relative to the viewer.
pub const EYE_LIGHTS: [[f32; 4]; 2] = [[-4.0, 8.0, 8.0, 1.0], [4.0, 8.0, 8.0, 1.0]];
pub const LIGHT_AMBIENT: f32 = 0.2;
pub const LIGHT_DIFFUSE: f32 = 1.0;
pub const LIGHT_SPECULAR: f32 = 1.0;
pub const GLOBAL_AMBIENT: f32 = 0.2;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub light_positions: [[f32; 4]; 2],
    /// x: light ambient, y: light diffuse, z: light specular, w: global ambient.
    pub light_terms: [f32; 4],
}

/// Perspective camera. The view matrix is pushed in from the scene each
/// frame; projection follows the window's aspect ratio.
pub struct Camera3D {
    pub view: Mat4,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub viewport: (u32, u32),
}

impl Camera3D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            view: Mat4::IDENTITY,
            fov_y_deg: 60.0,
            near: 0.2,
            far: 40.0,
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.0.max(1) as f32 / self.viewport.1.max(1) as f32
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect(), self.near, self.far)
    }

    pub fn build_uniform(&self) -> CameraUniform {
        CameraUniform {
            view: self.view.to_cols_array_2d(),
            proj: self.projection().to_cols_array_2d(),
            light_positions: EYE_LIGHTS,
            light_terms: Vec4::new(LIGHT_AMBIENT, LIGHT_DIFFUSE, LIGHT_SPECULAR, GLOBAL_AMBIENT)
                .to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn aspect_tracks_viewport() {
        let mut camera = Camera3D::new(650, 500);
        assert!((camera.aspect() - 1.3).abs() < 1e-6);
        camera.viewport = (500, 0);
        assert_eq!(camera.aspect(), 500.0);
    }

    #[test]
    fn near_and_far_planes_map_to_depth_range() {
        let camera = Camera3D::new(650, 500);
        let proj = camera.projection();
        let near = proj.project_point3(Vec3::new(0.0, 0.0, -0.2));
        let far = proj.project_point3(Vec3::new(0.0, 0.0, -40.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn uniform_carries_view_and_lights() {
        let mut camera = Camera3D::new(100, 100);
        camera.view = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let uniform = camera.build_uniform();
        assert_eq!(uniform.view[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.light_positions[0], [-4.0, 8.0, 8.0, 1.0]);
        assert_eq!(uniform.light_terms, [0.2, 1.0, 1.0, 0.2]);
    }
}
