//! Joint angles that fully determine the robot's configuration.
//!
//! All angles are in degrees and unconstrained. Only the arrow-key steering
//! path (`nudge`) wraps values back into `[0, 360)`; animation and direct
//! assignment store whatever they are given.

/// Which side of the body a limb hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn label(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Per-side joint angles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LimbAngles {
    pub hip: f32,
    pub knee: f32,
    pub shoulder: f32,
    pub elbow: f32,
}

/// Selector for one named angle in [`PoseState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AngleId {
    Yaw,
    Pitch,
    BodyTilt,
    CannonYaw,
    Hip(Side),
    Knee(Side),
    Shoulder(Side),
    Elbow(Side),
}

impl AngleId {
    /// Every angle in display order.
    pub const ALL: [AngleId; 12] = [
        AngleId::Yaw,
        AngleId::Pitch,
        AngleId::BodyTilt,
        AngleId::CannonYaw,
        AngleId::Hip(Side::Left),
        AngleId::Knee(Side::Left),
        AngleId::Hip(Side::Right),
        AngleId::Knee(Side::Right),
        AngleId::Shoulder(Side::Left),
        AngleId::Elbow(Side::Left),
        AngleId::Shoulder(Side::Right),
        AngleId::Elbow(Side::Right),
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Yaw => "yaw",
            Self::Pitch => "pitch",
            Self::BodyTilt => "body tilt",
            Self::CannonYaw => "cannon yaw",
            Self::Hip(Side::Left) => "left hip",
            Self::Hip(Side::Right) => "right hip",
            Self::Knee(Side::Left) => "left knee",
            Self::Knee(Side::Right) => "right knee",
            Self::Shoulder(Side::Left) => "left shoulder",
            Self::Shoulder(Side::Right) => "right shoulder",
            Self::Elbow(Side::Left) => "left elbow",
            Self::Elbow(Side::Right) => "right elbow",
        }
    }
}

impl std::fmt::Display for AngleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoseState {
    /// Whole-figure rotation about world Y.
    pub yaw: f32,
    /// Whole-figure rotation about X, applied in the yawed frame.
    pub pitch: f32,
    pub body_tilt: f32,
    pub cannon_yaw: f32,
    pub left: LimbAngles,
    pub right: LimbAngles,
}

impl PoseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limb(&self, side: Side) -> &LimbAngles {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn limb_mut(&mut self, side: Side) -> &mut LimbAngles {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    fn slot_mut(&mut self, id: AngleId) -> &mut f32 {
        match id {
            AngleId::Yaw => &mut self.yaw,
            AngleId::Pitch => &mut self.pitch,
            AngleId::BodyTilt => &mut self.body_tilt,
            AngleId::CannonYaw => &mut self.cannon_yaw,
            AngleId::Hip(side) => &mut self.limb_mut(side).hip,
            AngleId::Knee(side) => &mut self.limb_mut(side).knee,
            AngleId::Shoulder(side) => &mut self.limb_mut(side).shoulder,
            AngleId::Elbow(side) => &mut self.limb_mut(side).elbow,
        }
    }

    pub fn get(&self, id: AngleId) -> f32 {
        match id {
            AngleId::Yaw => self.yaw,
            AngleId::Pitch => self.pitch,
            AngleId::BodyTilt => self.body_tilt,
            AngleId::CannonYaw => self.cannon_yaw,
            AngleId::Hip(side) => self.limb(side).hip,
            AngleId::Knee(side) => self.limb(side).knee,
            AngleId::Shoulder(side) => self.limb(side).shoulder,
            AngleId::Elbow(side) => self.limb(side).elbow,
        }
    }

    /// Direct assignment. Not range-checked.
    pub fn set(&mut self, id: AngleId, degrees: f32) {
        *self.slot_mut(id) = degrees;
    }

    /// Unwrapped increment, used by the animation tweens.
    pub fn add(&mut self, id: AngleId, delta: f32) {
        *self.slot_mut(id) += delta;
    }

    /// Increment and wrap once into `[0, 360)`. Callers only pass small
    /// deltas, so a single correction is enough.
    pub fn nudge(&mut self, id: AngleId, delta: f32) -> f32 {
        let slot = self.slot_mut(id);
        *slot = wrap_once(*slot + delta);
        *slot
    }

    pub fn reset_leg(&mut self, side: Side) {
        let limb = self.limb_mut(side);
        limb.hip = 0.0;
        limb.knee = 0.0;
    }

    pub fn reset_arm(&mut self, side: Side) {
        let limb = self.limb_mut(side);
        limb.shoulder = 0.0;
        limb.elbow = 0.0;
    }
}

fn wrap_once(degrees: f32) -> f32 {
    if degrees >= 360.0 {
        degrees - 360.0
    } else if degrees < 0.0 {
        degrees + 360.0
    } else {
        degrees
    }
}
