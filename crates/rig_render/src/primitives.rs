//! CPU-side geometry for the handful of shapes the robot is made of.
//!
//! Everything is generated once at unit size and packed into a single
//! vertex/index buffer pair. Draws pick a sub-range through [`MeshRange`] and
//! size/position the shape with the instance transform.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rig_core::QuadMesh;

use crate::vertex::MeshVertex;

pub const SPHERE_SLICES: u32 = 48;
pub const SPHERE_STACKS: u32 = 24;
pub const CYLINDER_SLICES: u32 = 48;
pub const CYLINDER_STACKS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Sphere,
    Cylinder,
    Cube,
    Ground,
}

impl MeshKind {
    pub const ALL: [MeshKind; 4] = [
        MeshKind::Sphere,
        MeshKind::Cylinder,
        MeshKind::Cube,
        MeshKind::Ground,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            MeshKind::Sphere => 0,
            MeshKind::Cylinder => 1,
            MeshKind::Cube => 2,
            MeshKind::Ground => 3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Unit sphere centred on the origin with its poles on the Z axis.
pub fn unit_sphere(slices: u32, stacks: u32) -> MeshData {
    let slices = slices.max(3);
    let stacks = stacks.max(2);
    let row = slices + 1;
    let mut mesh = MeshData::default();

    for i in 0..=stacks {
        let phi = PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = TAU * j as f32 / slices as f32;
            let p = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
            mesh.vertices.push(MeshVertex::new(p, p));
        }
    }

    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + row;
            let c = b + 1;
            let d = a + 1;
            mesh.indices.extend_from_slice(&[a, b, d, d, b, c]);
        }
    }
    mesh
}

/// Open tube of radius 1 from `z = 0` to `z = 1`, no end caps.
pub fn unit_cylinder(slices: u32, stacks: u32) -> MeshData {
    let slices = slices.max(3);
    let stacks = stacks.max(1);
    let row = slices + 1;
    let mut mesh = MeshData::default();

    for k in 0..=stacks {
        let z = k as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = TAU * j as f32 / slices as f32;
            let (sin, cos) = theta.sin_cos();
            mesh.vertices.push(MeshVertex::new(
                Vec3::new(cos, sin, z),
                Vec3::new(cos, sin, 0.0),
            ));
        }
    }

    for k in 0..stacks {
        for j in 0..slices {
            let a = k * row + j;
            let b = a + row;
            let c = b + 1;
            let d = a + 1;
            mesh.indices.extend_from_slice(&[a, d, b, d, c, b]);
        }
    }
    mesh
}

/// Cube of side 1 centred on the origin, flat normals per face.
pub fn unit_cube() -> MeshData {
    // (normal, u, v) with u x v == normal
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let mut mesh = MeshData::default();
    for (normal, u, v) in FACES {
        let base = mesh.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = 0.5 * (normal + u * su + v * sv);
            mesh.vertices.push(MeshVertex::new(p, normal));
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

pub fn quad_mesh(ground: &QuadMesh) -> MeshData {
    let normal = ground.normal();
    MeshData {
        vertices: ground
            .positions()
            .iter()
            .map(|p| MeshVertex::new(*p, normal))
            .collect(),
        indices: ground.indices().to_vec(),
    }
}

/// Where one shape lives inside the packed buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshRange {
    pub base_vertex: i32,
    pub index_start: u32,
    pub index_count: u32,
}

/// All shapes packed back to back. Indices stay local to each shape and are
/// offset at draw time through `base_vertex`.
#[derive(Debug, Clone)]
pub struct MeshLibrary {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    ranges: [MeshRange; 4],
}

impl MeshLibrary {
    pub fn build(ground: &QuadMesh) -> Self {
        let mut library = Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            ranges: [MeshRange::default(); 4],
        };
        for kind in MeshKind::ALL {
            let data = match kind {
                MeshKind::Sphere => unit_sphere(SPHERE_SLICES, SPHERE_STACKS),
                MeshKind::Cylinder => unit_cylinder(CYLINDER_SLICES, CYLINDER_STACKS),
                MeshKind::Cube => unit_cube(),
                MeshKind::Ground => quad_mesh(ground),
            };
            library.ranges[kind.index()] = MeshRange {
                base_vertex: library.vertices.len() as i32,
                index_start: library.indices.len() as u32,
                index_count: data.indices.len() as u32,
            };
            library.vertices.extend(data.vertices);
            library.indices.extend(data.indices);
        }
        log::debug!(
            "Mesh library: {} vertices, {} indices",
            library.vertices.len(),
            library.indices.len()
        );
        library
    }

    pub fn range(&self, kind: MeshKind) -> MeshRange {
        self.ranges[kind.index()]
    }
}
