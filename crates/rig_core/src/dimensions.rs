/// Default body sphere radius. Every other part is a fixed proportion of it.
pub const DEFAULT_BODY_SIZE: f32 = 2.0;

macro_rules! dimension_getters {
    ($($name:ident),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&self) -> f32 {
                self.$name
            }
        )*
    };
}

/// Part sizes derived from a single body size. The only constructor is
/// [`BodyDimensions::from_body_size`]; build a new value to rescale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDimensions {
    body_size: f32,
    cannon_length: f32,
    cannon_width: f32,
    notch_size: f32,
    notch_length: f32,
    hip_radius: f32,
    hip_length: f32,
    upper_leg_length: f32,
    upper_leg_height: f32,
    upper_leg_width: f32,
    lower_leg_length: f32,
    lower_leg_height: f32,
    lower_leg_width: f32,
    foot_length: f32,
    foot_height: f32,
    foot_depth: f32,
    shoulder_radius: f32,
    shoulder_length: f32,
    upper_arm_length: f32,
    upper_arm_height: f32,
    upper_arm_width: f32,
    arm_gun_length: f32,
    arm_gun_radius: f32,
}

impl BodyDimensions {
    pub fn from_body_size(body_size: f32) -> Self {
        let cannon_length = 0.5 * body_size;
        let cannon_width = 0.2 * body_size;
        let hip_radius = 0.5 * body_size;
        let hip_length = 0.5 * body_size;
        let upper_leg_length = body_size;
        let upper_leg_height = 0.2 * body_size;
        let upper_leg_width = 0.3 * body_size;
        let upper_arm_length = 1.3 * upper_leg_length;
        let upper_arm_width = upper_leg_width;

        Self {
            body_size,
            cannon_length,
            cannon_width,
            notch_size: 0.8 * cannon_width,
            notch_length: 0.5 * cannon_length,
            hip_radius,
            hip_length,
            upper_leg_length,
            upper_leg_height,
            upper_leg_width,
            lower_leg_length: 1.2 * upper_leg_length,
            lower_leg_height: upper_leg_height,
            lower_leg_width: upper_leg_width,
            foot_length: body_size,
            foot_height: 0.5 * body_size,
            foot_depth: body_size,
            shoulder_radius: hip_radius,
            shoulder_length: 2.0 * hip_length,
            upper_arm_length,
            upper_arm_height: upper_leg_height,
            upper_arm_width,
            arm_gun_length: 1.2 * upper_arm_length,
            arm_gun_radius: 0.5 * upper_arm_width,
        }
    }

    dimension_getters!(
        body_size,
        cannon_length,
        cannon_width,
        notch_size,
        notch_length,
        hip_radius,
        hip_length,
        upper_leg_length,
        upper_leg_height,
        upper_leg_width,
        lower_leg_length,
        lower_leg_height,
        lower_leg_width,
        foot_length,
        foot_height,
        foot_depth,
        shoulder_radius,
        shoulder_length,
        upper_arm_length,
        upper_arm_height,
        upper_arm_width,
        arm_gun_length,
        arm_gun_radius,
    );

    #[cfg(test)]
    fn all(&self) -> [f32; 23] {
        [
            self.body_size,
            self.cannon_length,
            self.cannon_width,
            self.notch_size,
            self.notch_length,
            self.hip_radius,
            self.hip_length,
            self.upper_leg_length,
            self.upper_leg_height,
            self.upper_leg_width,
            self.lower_leg_length,
            self.lower_leg_height,
            self.lower_leg_width,
            self.foot_length,
            self.foot_height,
            self.foot_depth,
            self.shoulder_radius,
            self.shoulder_length,
            self.upper_arm_length,
            self.upper_arm_height,
            self.upper_arm_width,
            self.arm_gun_length,
            self.arm_gun_radius,
        ]
    }
}

impl Default for BodyDimensions {
    fn default() -> Self {
        Self::from_body_size(DEFAULT_BODY_SIZE)
    }
}
