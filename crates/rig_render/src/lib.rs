pub mod camera;
pub mod gpu_context;
pub mod mesh_pipeline;
pub mod primitives;
pub mod vertex;

pub use camera::{Camera3D, CameraUniform};
pub use gpu_context::GpuContext;
pub use mesh_pipeline::{DrawCall, FrameRecorder, MeshPipeline};
pub use primitives::{MeshKind, MeshLibrary};
pub use vertex::{InstanceRaw, MeshVertex};
