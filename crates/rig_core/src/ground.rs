use glam::{Mat4, Vec3};

use crate::material::Material;
use crate::scene::PrimitiveRenderer;

/// Flat, subdivided quad grid. Built once; drawn every frame with whatever
/// offset transform the scene gives it.
#[derive(Debug, Clone)]
pub struct QuadMesh {
    subdivisions: u32,
    positions: Vec<Vec3>,
    normal: Vec3,
    indices: Vec<u32>,
    pub material: Material,
}

impl QuadMesh {
    /// Grid spanning `origin + s * length * dir1 + t * width * dir2` for
    /// `s, t` in `[0, 1]`, split into `subdivisions` quads per side. The
    /// face normal is `dir1 x dir2`.
    pub fn new(
        subdivisions: u32,
        origin: Vec3,
        length: f32,
        width: f32,
        dir1: Vec3,
        dir2: Vec3,
    ) -> Self {
        let n = subdivisions.max(1);
        let step_a = dir1.normalize_or_zero() * (length / n as f32);
        let step_b = dir2.normalize_or_zero() * (width / n as f32);
        let normal = dir1.cross(dir2).normalize_or_zero();

        let row = n + 1;
        let mut positions = Vec::with_capacity((row * row) as usize);
        for j in 0..row {
            for i in 0..row {
                positions.push(origin + step_a * i as f32 + step_b * j as f32);
            }
        }

        // Two counter-clockwise triangles per quad when seen from `normal`.
        let mut indices = Vec::with_capacity((n * n * 6) as usize);
        for j in 0..n {
            for i in 0..n {
                let v00 = j * row + i;
                let v10 = v00 + 1;
                let v01 = v00 + row;
                let v11 = v01 + 1;
                indices.extend_from_slice(&[v00, v10, v11, v00, v11, v01]);
            }
        }

        Self {
            subdivisions: n,
            positions,
            normal,
            indices,
            material: Material::GROUND,
        }
    }

    /// Square floor of side `size` centred on the origin in the XZ plane,
    /// facing +Y.
    pub fn ground(subdivisions: u32, size: f32) -> Self {
        let half = 0.5 * size;
        Self::new(
            subdivisions,
            Vec3::new(-half, 0.0, half),
            size,
            size,
            Vec3::X,
            Vec3::NEG_Z,
        )
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn subdivisions(&self) -> u32 {
        self.subdivisions
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    pub fn draw<R: PrimitiveRenderer + ?Sized>(&self, renderer: &mut R, transform: Mat4) {
        renderer.draw_quad_mesh(self, transform);
    }
}
