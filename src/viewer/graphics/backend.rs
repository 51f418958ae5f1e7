use thiserror::Error;

use crate::viewer::graphics::mesh::CpuMesh;
use crate::viewer::graphics::primitives::{GeometryHandle, Material, Transform};
use crate::viewer::graphics::visual_world::VisualWorld;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown geometry handle {0:?}")]
    UnknownHandle(GeometryHandle),
    #[error("mesh upload failed: {0}")]
    Upload(String),
    #[error("surface lost")]
    SurfaceLost,
    #[error("backend error: {0}")]
    Other(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Rendering backend collaborator.
///
/// The viewer never looks behind a `GeometryHandle`; it uploads CPU meshes,
/// mutates per-handle state, releases handles it no longer needs, and asks for
/// one composite draw per frame.
pub trait RenderBackend {
    /// Upload a mesh with an initial material. The returned handle is owned by
    /// the caller until passed to `release`.
    fn upload_mesh(&mut self, mesh: &CpuMesh, material: &Material) -> BackendResult<GeometryHandle>;

    fn set_material(&mut self, handle: GeometryHandle, material: &Material) -> BackendResult<()>;

    fn set_transform(&mut self, handle: GeometryHandle, transform: &Transform) -> BackendResult<()>;

    fn set_visible(&mut self, handle: GeometryHandle, visible: bool) -> BackendResult<()>;

    /// Free GPU-side resources behind `handle`.
    fn release(&mut self, handle: GeometryHandle) -> BackendResult<()>;

    /// Presentation surface changed size.
    fn resize(&mut self, width: u32, height: u32);

    fn draw_frame(&mut self, visual_world: &VisualWorld) -> BackendResult<()>;
}
