use crate::animation::AnimationDriver;
use crate::dimensions::BodyDimensions;
use crate::pose::{AngleId, PoseState};

/// Everything that changes while the viewer runs: the pose, the figure's
/// proportions, the steering selection and the tween processes.
#[derive(Debug, Clone)]
pub struct Session {
    pub pose: PoseState,
    dims: BodyDimensions,
    /// Angle moved by the arrow keys. `None` until a joint is picked.
    pub selected: Option<AngleId>,
    pub driver: AnimationDriver,
}

impl Session {
    pub fn new(dims: BodyDimensions) -> Self {
        Self {
            pose: PoseState::new(),
            dims,
            selected: None,
            driver: AnimationDriver::new(),
        }
    }

    /// Advance all running tweens by one tick. Returns true if the pose moved
    /// and a redraw is needed.
    pub fn tick(&mut self) -> bool {
        self.driver.tick(&mut self.pose)
    }

    pub fn dims(&self) -> &BodyDimensions {
        &self.dims
    }

    pub fn is_animating(&self) -> bool {
        self.driver.is_active()
    }

    /// Rebuild part proportions from a new body size, keeping the pose.
    pub fn rescale(&mut self, body_size: f32) {
        self.dims = BodyDimensions::from_body_size(body_size);
    }

    /// Zero every angle and stop all tweens. Selection is kept.
    pub fn reset_pose(&mut self) {
        self.pose = PoseState::new();
        self.driver = AnimationDriver::new();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(BodyDimensions::default())
    }
}
