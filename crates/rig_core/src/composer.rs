//! Hierarchical placement of every robot part.
//!
//! Each part's frame is its parent's frame right-multiplied by the local
//! joint steps (translate, rotate, ...), the same order a matrix stack would
//! apply them. Frames are passed down as values, so sibling subtrees never
//! see each other's transforms and every part is computable on its own.
//!
//! ```text
//! root (yaw, pitch)
//! ├── trunk (body tilt)
//! │   ├── body sphere
//! │   └── cannon (cannon yaw) ── notch
//! ├── hip (per side) ── upper leg ── knee ── lower leg ── foot
//! └── shoulder (per side) ── upper arm ── elbow ── arm gun
//! ```

use glam::{Mat4, Vec3};

use crate::dimensions::BodyDimensions;
use crate::material::Material;
use crate::pose::{LimbAngles, PoseState, Side};

/// Fixed bend between hip and upper leg in the rest pose.
const HIP_BEND_DEG: f32 = 45.0;
/// Counter-bend that keeps the foot level.
const FOOT_LEVEL_DEG: f32 = -45.0;
/// Fixed bend between shoulder and upper arm.
const SHOULDER_BEND_DEG: f32 = -45.0;
/// Turns the arm gun's cylinder axis outward at the elbow.
const ELBOW_TURN_DEG: f32 = -90.0;
/// Aligns hip and shoulder cylinders with the body's X axis.
const LIMB_AXIS_DEG: f32 = 90.0;

pub const PART_COUNT: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartId {
    Body,
    Cannon,
    Notch,
    Hip(Side),
    UpperLeg(Side),
    LowerLeg(Side),
    Foot(Side),
    Shoulder(Side),
    UpperArm(Side),
    ArmGun(Side),
}

/// Unit-sized solid drawn for a part; the placement's transform carries the
/// part's actual size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// Radius 1, centred on the origin.
    Sphere,
    /// Open tube along +Z from `z = 0` to `z = height`.
    Cylinder {
        base_radius: f32,
        top_radius: f32,
        height: f32,
    },
    /// Edge length 1, centred on the origin.
    Cube,
}

impl Primitive {
    const UNIT_CYLINDER: Primitive = Primitive::Cylinder {
        base_radius: 1.0,
        top_radius: 1.0,
        height: 1.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartPlacement {
    pub part: PartId,
    pub primitive: Primitive,
    /// Joint frame of the part, without the primitive's size.
    pub frame: Mat4,
    /// `frame` with the primitive's scale applied; what gets drawn.
    pub transform: Mat4,
    pub material: Material,
}

impl PartPlacement {
    /// Where the primitive's local origin lands in world space. For cubes
    /// and the sphere this is the centre, for cylinders the base.
    pub fn origin(&self) -> Vec3 {
        self.transform.transform_point3(Vec3::ZERO)
    }
}

/// World placements of all parts for one pose, in draw order.
#[derive(Debug, Clone, Default)]
pub struct RobotFrame {
    parts: Vec<PartPlacement>,
}

impl RobotFrame {
    pub fn parts(&self) -> &[PartPlacement] {
        &self.parts
    }

    pub fn get(&self, part: PartId) -> Option<&PartPlacement> {
        self.parts.iter().find(|p| p.part == part)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

pub fn compose(pose: &PoseState, dims: &BodyDimensions) -> RobotFrame {
    let mut parts = Vec::with_capacity(PART_COUNT);

    let root = rot_y(pose.yaw) * rot_x(pose.pitch);
    let trunk = root * rot_x(pose.body_tilt);

    place(
        &mut parts,
        PartId::Body,
        Primitive::Sphere,
        trunk,
        Vec3::splat(dims.body_size()),
        Material::BODY,
    );
    compose_cannon(&mut parts, trunk, pose.cannon_yaw, dims);

    for side in Side::BOTH {
        compose_leg(&mut parts, root, side, pose.limb(side), dims);
    }
    for side in Side::BOTH {
        compose_arm(&mut parts, root, side, pose.limb(side), dims);
    }

    RobotFrame { parts }
}

fn compose_cannon(parts: &mut Vec<PartPlacement>, trunk: Mat4, cannon_yaw: f32, d: &BodyDimensions) {
    let cannon = trunk
        * translate(0.0, 0.0, d.body_size() - 0.25 * d.cannon_length())
        * rot_z(cannon_yaw);
    place(
        parts,
        PartId::Cannon,
        Primitive::UNIT_CYLINDER,
        cannon,
        Vec3::new(d.cannon_width(), d.cannon_width(), d.cannon_length()),
        Material::LIMB,
    );

    let notch = cannon
        * translate(
            0.0,
            d.cannon_width() + 0.5 * d.notch_size(),
            d.cannon_length() - 0.5 * d.notch_length(),
        );
    place(
        parts,
        PartId::Notch,
        Primitive::Cube,
        notch,
        Vec3::new(d.notch_size(), d.notch_size(), d.notch_length()),
        Material::LIMB,
    );
}

fn compose_leg(
    parts: &mut Vec<PartPlacement>,
    root: Mat4,
    side: Side,
    angles: &LimbAngles,
    d: &BodyDimensions,
) {
    // The hip cylinder grows along +X once rotated, so the right one starts
    // a full hip length further out.
    let lateral = match side {
        Side::Left => d.body_size(),
        Side::Right => -(d.body_size() + d.hip_length()),
    };
    let hip = root
        * translate(lateral, -1.5 * d.hip_radius(), 0.0)
        * rot_y(LIMB_AXIS_DEG)
        * rot_z(angles.hip);
    place(
        parts,
        PartId::Hip(side),
        Primitive::UNIT_CYLINDER,
        hip,
        Vec3::new(d.hip_radius(), d.hip_radius(), d.hip_length()),
        Material::LIMB,
    );

    let upper_leg = hip
        * rot_z(HIP_BEND_DEG)
        * translate(
            0.0,
            -(d.hip_radius() + 0.5 * d.upper_leg_length()),
            0.5 * d.hip_length(),
        );
    place(
        parts,
        PartId::UpperLeg(side),
        Primitive::Cube,
        upper_leg,
        Vec3::new(d.upper_leg_height(), d.upper_leg_length(), d.upper_leg_width()),
        Material::LIMB,
    );

    let lower_leg = upper_leg
        * translate(0.0, -0.5 * d.upper_leg_length(), 0.0)
        * rot_z(angles.knee)
        * translate(-0.5 * d.lower_leg_length(), 0.0, 0.0);
    place(
        parts,
        PartId::LowerLeg(side),
        Primitive::Cube,
        lower_leg,
        Vec3::new(d.lower_leg_length(), d.lower_leg_height(), d.lower_leg_width()),
        Material::LIMB,
    );

    let foot = lower_leg
        * translate(-0.5 * d.lower_leg_length(), 0.0, 0.0)
        * rot_z(FOOT_LEVEL_DEG);
    place(
        parts,
        PartId::Foot(side),
        Primitive::Cube,
        foot,
        Vec3::new(d.foot_length(), d.foot_height(), d.foot_depth()),
        Material::LIMB,
    );
}

fn compose_arm(
    parts: &mut Vec<PartPlacement>,
    root: Mat4,
    side: Side,
    angles: &LimbAngles,
    d: &BodyDimensions,
) {
    let lateral = match side {
        Side::Left => d.body_size(),
        Side::Right => -(d.body_size() + d.shoulder_length()),
    };
    let shoulder = root
        * translate(lateral, 1.5 * d.shoulder_radius(), 0.0)
        * rot_y(LIMB_AXIS_DEG)
        * rot_z(angles.shoulder);
    place(
        parts,
        PartId::Shoulder(side),
        Primitive::UNIT_CYLINDER,
        shoulder,
        Vec3::new(d.shoulder_radius(), d.shoulder_radius(), d.shoulder_length()),
        Material::LIMB,
    );

    // Left and right upper arms sit at different depths along the shoulder.
    // Kept as-is; the two sides are not mirror images of each other here.
    let depth = match side {
        Side::Left => d.shoulder_length() - 0.5 * d.upper_arm_width(),
        Side::Right => 0.5 * d.upper_arm_width(),
    };
    let upper_arm = shoulder
        * rot_z(SHOULDER_BEND_DEG)
        * translate(
            0.0,
            -(d.shoulder_radius() + 0.5 * d.upper_arm_length()),
            depth,
        );
    place(
        parts,
        PartId::UpperArm(side),
        Primitive::Cube,
        upper_arm,
        Vec3::new(d.upper_arm_height(), d.upper_arm_length(), d.upper_arm_width()),
        Material::LIMB,
    );

    let arm_gun = upper_arm
        * translate(0.0, -0.5 * d.upper_arm_length(), 0.0)
        * rot_z(angles.elbow)
        * rot_y(ELBOW_TURN_DEG);
    place(
        parts,
        PartId::ArmGun(side),
        Primitive::UNIT_CYLINDER,
        arm_gun,
        Vec3::new(d.arm_gun_radius(), d.arm_gun_radius(), d.arm_gun_length()),
        Material::LIMB,
    );
}

fn place(
    parts: &mut Vec<PartPlacement>,
    part: PartId,
    primitive: Primitive,
    frame: Mat4,
    scale: Vec3,
    material: Material,
) {
    parts.push(PartPlacement {
        part,
        primitive,
        frame,
        transform: frame * Mat4::from_scale(scale),
        material,
    });
}

fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

fn rot_x(degrees: f32) -> Mat4 {
    Mat4::from_rotation_x(degrees.to_radians())
}

fn rot_y(degrees: f32) -> Mat4 {
    Mat4::from_rotation_y(degrees.to_radians())
}

fn rot_z(degrees: f32) -> Mat4 {
    Mat4::from_rotation_z(degrees.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::AngleId;

    const EPS: f32 = 1e-4;

    fn assert_vec_near(actual: Vec3, expected: Vec3) {
        assert!(
            (actual - expected).length() < EPS,
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn assert_mat_near(actual: Mat4, expected: Mat4) {
        assert!(
            actual.abs_diff_eq(expected, EPS),
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn origin_of(frame: &RobotFrame, part: PartId) -> Vec3 {
        frame.get(part).expect("part should be composed").origin()
    }

    #[test]
    fn composes_every_part_once() {
        let frame = compose(&PoseState::new(), &BodyDimensions::default());
        assert_eq!(frame.len(), PART_COUNT);
        let mut seen = std::collections::HashSet::new();
        for placement in frame.parts() {
            assert!(seen.insert(placement.part), "{:?} twice", placement.part);
        }
    }

    #[test]
    fn rest_pose_left_foot_golden_value() {
        // hip T(2, -1.5, 0) · Ry(90) · Rz(45) · T(0, -2, 0.5) · T(0, -1, 0)
        // · T(-1.2, 0, 0) · T(-1.2, 0, 0) · Rz(-45)
        let frame = compose(&PoseState::new(), &BodyDimensions::from_body_size(2.0));
        let foot = origin_of(&frame, PartId::Foot(Side::Left));
        let s = std::f32::consts::FRAC_1_SQRT_2;
        let expected = Vec3::new(2.5, -1.5 - 5.4 * s, -0.6 * s);
        assert_vec_near(foot, expected);
        assert_vec_near(foot, Vec3::new(2.5, -5.318377, -0.424264));
    }

    #[test]
    fn rest_pose_feet_mirror_across_x() {
        let frame = compose(&PoseState::new(), &BodyDimensions::default());
        let left = origin_of(&frame, PartId::Foot(Side::Left));
        let right = origin_of(&frame, PartId::Foot(Side::Right));
        assert_vec_near(right, Vec3::new(-left.x, left.y, left.z));
    }

    #[test]
    fn upper_arm_depth_differs_between_sides() {
        let d = BodyDimensions::default();
        let frame = compose(&PoseState::new(), &d);
        let left = frame.get(PartId::UpperArm(Side::Left)).unwrap();
        let right = frame.get(PartId::UpperArm(Side::Right)).unwrap();
        let left_local = frame.get(PartId::Shoulder(Side::Left)).unwrap().frame.inverse()
            * left.frame;
        let right_local = frame.get(PartId::Shoulder(Side::Right)).unwrap().frame.inverse()
            * right.frame;
        let left_z = left_local.transform_point3(Vec3::ZERO).z;
        let right_z = right_local.transform_point3(Vec3::ZERO).z;
        assert!((left_z - (d.shoulder_length() - 0.5 * d.upper_arm_width())).abs() < EPS);
        assert!((right_z - 0.5 * d.upper_arm_width()).abs() < EPS);
    }

    #[test]
    fn root_applies_yaw_then_pitch_in_yawed_frame() {
        let dims = BodyDimensions::from_body_size(2.0);
        let mut pose = PoseState::new();
        pose.set(AngleId::Yaw, 30.0);
        pose.set(AngleId::Pitch, 20.0);
        let frame = compose(&pose, &dims);

        let root = rot_y(30.0) * rot_x(20.0);
        let body = frame.get(PartId::Body).expect("body should be composed");
        assert_mat_near(body.frame, root);
        assert!(!body.frame.abs_diff_eq(rot_x(20.0) * rot_y(30.0), EPS));

        // Limbs hang off the same root.
        assert_vec_near(
            origin_of(&frame, PartId::Hip(Side::Left)),
            root.transform_point3(Vec3::new(2.0, -1.5, 0.0)),
        );
        assert_vec_near(
            origin_of(&frame, PartId::Shoulder(Side::Right)),
            root.transform_point3(Vec3::new(-4.0, 1.5, 0.0)),
        );
    }

    #[test]
    fn rest_pose_arm_golden_values() {
        // shoulder T(±, 1.5, 0) · Ry(90) · Rz(-45) · T(0, -2.3, depth)
        // · T(0, -1.3, 0) · Ry(-90)
        let frame = compose(&PoseState::new(), &BodyDimensions::from_body_size(2.0));
        let s = std::f32::consts::FRAC_1_SQRT_2;

        let upper = Vec3::new(3.7, 1.5 - 2.3 * s, 2.3 * s);
        assert_vec_near(origin_of(&frame, PartId::UpperArm(Side::Left)), upper);
        assert_vec_near(upper, Vec3::new(3.7, -0.126346, 1.626346));
        assert_vec_near(
            origin_of(&frame, PartId::UpperArm(Side::Right)),
            Vec3::new(-3.7, upper.y, upper.z),
        );

        let gun = Vec3::new(3.7, 1.5 - 3.6 * s, 3.6 * s);
        assert_vec_near(origin_of(&frame, PartId::ArmGun(Side::Left)), gun);
        assert_vec_near(gun, Vec3::new(3.7, -1.045584, 2.545584));
        assert_vec_near(
            origin_of(&frame, PartId::ArmGun(Side::Right)),
            Vec3::new(-3.7, gun.y, gun.z),
        );

        // At rest both guns point up and forward.
        for side in Side::BOTH {
            let gun = frame.get(PartId::ArmGun(side)).expect("gun should be composed");
            let axis = gun.frame.transform_vector3(Vec3::Z);
            assert_vec_near(axis, Vec3::new(0.0, s, s));
            let tip = gun.transform.transform_point3(Vec3::Z);
            assert_vec_near(tip - gun.origin(), axis * 3.12);
        }
    }

    #[test]
    fn rest_pose_notch_sits_on_top_of_cannon_tip() {
        let frame = compose(&PoseState::new(), &BodyDimensions::from_body_size(2.0));
        assert_vec_near(origin_of(&frame, PartId::Cannon), Vec3::new(0.0, 0.0, 1.75));
        assert_vec_near(origin_of(&frame, PartId::Notch), Vec3::new(0.0, 0.56, 2.5));
    }

    #[test]
    fn yaw_rotates_notch_exactly_like_cannon() {
        let dims = BodyDimensions::default();
        let rest = compose(&PoseState::new(), &dims);

        let mut pose = PoseState::new();
        pose.set(AngleId::Yaw, 37.0);
        pose.set(AngleId::CannonYaw, 12.0);
        let turned = compose(&pose, &dims);

        let mut spun_only = PoseState::new();
        spun_only.set(AngleId::CannonYaw, 12.0);
        let spun = compose(&spun_only, &dims);

        let yaw = rot_y(37.0);
        for part in [PartId::Cannon, PartId::Notch] {
            assert_mat_near(
                turned.get(part).unwrap().transform,
                yaw * spun.get(part).unwrap().transform,
            );
        }

        // Notch relative to cannon is unchanged by any ancestor rotation.
        let relative = |f: &RobotFrame| {
            f.get(PartId::Cannon).unwrap().frame.inverse() * f.get(PartId::Notch).unwrap().frame
        };
        assert_mat_near(relative(&turned), relative(&rest));
    }

    #[test]
    fn cannon_yaw_moves_notch_but_not_cannon_base() {
        let dims = BodyDimensions::default();
        let mut pose = PoseState::new();
        pose.set(AngleId::CannonYaw, 90.0);
        let frame = compose(&pose, &dims);

        assert_vec_near(origin_of(&frame, PartId::Cannon), Vec3::new(0.0, 0.0, 1.75));
        // +Y offset swings to -X under a 90 degree roll about Z.
        assert_vec_near(origin_of(&frame, PartId::Notch), Vec3::new(-0.56, 0.0, 2.5));
    }

    #[test]
    fn body_tilt_carries_cannon_but_not_limbs() {
        let dims = BodyDimensions::default();
        let rest = compose(&PoseState::new(), &dims);
        let mut pose = PoseState::new();
        pose.set(AngleId::BodyTilt, 30.0);
        let tilted = compose(&pose, &dims);

        assert!(
            (origin_of(&tilted, PartId::Cannon) - origin_of(&rest, PartId::Cannon)).length() > 0.1
        );
        for side in Side::BOTH {
            for part in [PartId::Foot(side), PartId::ArmGun(side)] {
                assert_vec_near(origin_of(&tilted, part), origin_of(&rest, part));
            }
        }
    }

    #[test]
    fn hip_angle_carries_leg_below_it_only() {
        let dims = BodyDimensions::default();
        let rest = compose(&PoseState::new(), &dims);
        let mut pose = PoseState::new();
        pose.set(AngleId::Hip(Side::Left), 25.0);
        let bent = compose(&pose, &dims);

        assert_vec_near(
            origin_of(&bent, PartId::Hip(Side::Left)),
            origin_of(&rest, PartId::Hip(Side::Left)),
        );
        for part in [PartId::UpperLeg(Side::Left), PartId::Foot(Side::Left)] {
            assert!((origin_of(&bent, part) - origin_of(&rest, part)).length() > 0.1);
        }
        assert_vec_near(
            origin_of(&bent, PartId::Foot(Side::Right)),
            origin_of(&rest, PartId::Foot(Side::Right)),
        );
    }

    #[test]
    fn knee_angle_pivots_at_knee() {
        let dims = BodyDimensions::default();
        let rest = compose(&PoseState::new(), &dims);
        let mut pose = PoseState::new();
        pose.set(AngleId::Knee(Side::Right), -60.0);
        let bent = compose(&pose, &dims);

        assert_vec_near(
            origin_of(&bent, PartId::UpperLeg(Side::Right)),
            origin_of(&rest, PartId::UpperLeg(Side::Right)),
        );
        // The lower leg keeps its distance from the knee pivot.
        let knee_pivot = |f: &RobotFrame| {
            (f.get(PartId::UpperLeg(Side::Right)).unwrap().frame
                * translate(0.0, -0.5 * dims.upper_leg_length(), 0.0))
            .transform_point3(Vec3::ZERO)
        };
        let pivot = knee_pivot(&bent);
        assert_vec_near(pivot, knee_pivot(&rest));
        let reach = (origin_of(&bent, PartId::LowerLeg(Side::Right)) - pivot).length();
        assert!((reach - 0.5 * dims.lower_leg_length()).abs() < EPS);
    }

    #[test]
    fn positions_scale_with_body_size() {
        let small = compose(&PoseState::new(), &BodyDimensions::from_body_size(1.0));
        let large = compose(&PoseState::new(), &BodyDimensions::from_body_size(3.0));
        for (a, b) in small.parts().iter().zip(large.parts()) {
            assert_vec_near(b.origin(), a.origin() * 3.0);
        }
    }

    #[test]
    fn large_angles_stay_finite() {
        let mut pose = PoseState::new();
        for (i, id) in crate::pose::AngleId::ALL.into_iter().enumerate() {
            pose.set(id, 1.0e5 * (i as f32 + 1.0));
        }
        let frame = compose(&pose, &BodyDimensions::default());
        for placement in frame.parts() {
            assert!(placement.transform.is_finite(), "{:?}", placement.part);
        }
    }
}
