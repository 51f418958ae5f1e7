pub mod backend;
pub mod headless;
pub mod mesh;
pub mod primitives;
pub mod visual_world;

pub use backend::{BackendError, BackendResult, RenderBackend};
pub use headless::HeadlessBackend;
pub use mesh::{CpuMesh, CpuVertex, MeshFactory, PrimitiveTopology};
pub use primitives::{Color, GeometryHandle, Material, Transform};
pub use visual_world::{Instance, VisualWorld};
