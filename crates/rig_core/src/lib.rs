//! Pose, hierarchy and animation core of the robot viewer.
//!
//! Nothing in here touches a window or a GPU: the scene is handed to any
//! [`scene::PrimitiveRenderer`] as a list of transformed primitives.

pub mod animation;
pub mod composer;
pub mod dimensions;
pub mod ground;
pub mod input;
pub mod material;
pub mod pose;
pub mod scene;
pub mod session;
pub mod time;

pub use animation::{AnimationDriver, TickResult, TICK_INTERVAL_MS};
pub use composer::{compose, PartId, PartPlacement, Primitive, RobotFrame};
pub use dimensions::BodyDimensions;
pub use ground::QuadMesh;
pub use input::{InputRouter, Key, Reaction};
pub use material::Material;
pub use pose::{AngleId, PoseState, Side};
pub use scene::{CameraRig, PrimitiveRenderer, SceneAssembler};
pub use session::Session;
