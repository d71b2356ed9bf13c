/// Fixed-function style surface parameters (RGBA reflectances + Phong exponent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
}

impl Material {
    /// Red trunk sphere.
    pub const BODY: Material = Material {
        ambient: [0.0215, 0.1745, 0.0215, 0.55],
        diffuse: [0.9, 0.0, 0.0, 1.0],
        specular: [0.7, 0.6, 0.6, 1.0],
        shininess: 32.0,
    };

    /// Dark metal used for the cannon and all limbs.
    pub const LIMB: Material = Material {
        ambient: [0.25, 0.25, 0.25, 1.0],
        diffuse: [0.05, 0.05, 0.05, 1.0],
        specular: [0.7746, 0.7746, 0.7746, 1.0],
        shininess: 100.0,
    };

    pub const GROUND: Material = Material {
        ambient: [0.0, 0.05, 0.0, 1.0],
        diffuse: [0.4, 0.8, 0.4, 1.0],
        specular: [0.04, 0.04, 0.04, 1.0],
        shininess: 0.2,
    };
}

impl Default for Material {
    fn default() -> Self {
        Self::LIMB
    }
}
