//! Recording backend with no GPU behind it.
//!
//! Keeps just enough per-handle state to answer "what would be on screen",
//! which is what the demo binary logs and what tests assert against.

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::viewer::graphics::backend::{BackendError, BackendResult, RenderBackend};
use crate::viewer::graphics::mesh::{CpuMesh, PrimitiveTopology};
use crate::viewer::graphics::primitives::{GeometryHandle, Material, Transform};
use crate::viewer::graphics::visual_world::VisualWorld;

#[derive(Debug, Clone)]
pub struct HeadlessGeometry {
    pub topology: PrimitiveTopology,
    pub vertex_count: u32,
    pub material: Material,
    pub transform: Transform,
    pub visible: bool,
}

/// Summary of one `draw_frame` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRecord {
    pub instances: usize,
}

/// Entries kept per history; older ones are dropped, totals keep counting.
pub const HISTORY_LIMIT: usize = 64;

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u64,
    live: BTreeMap<GeometryHandle, HeadlessGeometry>,
    released: VecDeque<GeometryHandle>,
    released_count: u64,
    frames: VecDeque<FrameRecord>,
    frame_count: u64,
    resizes: VecDeque<(u32, u32)>,
    fail_release: HashSet<GeometryHandle>,
}

fn push_bounded<T>(history: &mut VecDeque<T>, entry: T) {
    if history.len() == HISTORY_LIMIT {
        history.pop_front();
    }
    history.push_back(entry);
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn geometry(&self, handle: GeometryHandle) -> Option<&HeadlessGeometry> {
        self.live.get(&handle)
    }

    /// Most recent releases, oldest first.
    pub fn recent_releases(&self) -> &VecDeque<GeometryHandle> {
        &self.released
    }

    pub fn released_count(&self) -> u64 {
        self.released_count
    }

    /// Most recent frames, oldest first.
    pub fn recent_frames(&self) -> &VecDeque<FrameRecord> {
        &self.frames
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn last_frame(&self) -> Option<FrameRecord> {
        self.frames.back().copied()
    }

    /// Most recent resizes, oldest first.
    pub fn resizes(&self) -> &VecDeque<(u32, u32)> {
        &self.resizes
    }

    /// Make the next `release` of `handle` fail (the handle stays live).
    pub fn fail_release_of(&mut self, handle: GeometryHandle) {
        self.fail_release.insert(handle);
    }

    fn live_mut(&mut self, handle: GeometryHandle) -> BackendResult<&mut HeadlessGeometry> {
        self.live
            .get_mut(&handle)
            .ok_or(BackendError::UnknownHandle(handle))
    }
}

impl RenderBackend for HeadlessBackend {
    fn upload_mesh(&mut self, mesh: &CpuMesh, material: &Material) -> BackendResult<GeometryHandle> {
        if mesh.vertices.is_empty() {
            return Err(BackendError::Upload("empty mesh".to_string()));
        }
        let h = GeometryHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(
            h,
            HeadlessGeometry {
                topology: mesh.topology,
                vertex_count: mesh.vertex_count(),
                material: *material,
                transform: Transform::default(),
                visible: true,
            },
        );
        log::trace!(
            "[HeadlessBackend] upload {:?}: {} vertices {:?}",
            h,
            mesh.vertex_count(),
            mesh.topology
        );
        Ok(h)
    }

    fn set_material(&mut self, handle: GeometryHandle, material: &Material) -> BackendResult<()> {
        self.live_mut(handle)?.material = *material;
        Ok(())
    }

    fn set_transform(&mut self, handle: GeometryHandle, transform: &Transform) -> BackendResult<()> {
        self.live_mut(handle)?.transform = *transform;
        Ok(())
    }

    fn set_visible(&mut self, handle: GeometryHandle, visible: bool) -> BackendResult<()> {
        self.live_mut(handle)?.visible = visible;
        Ok(())
    }

    fn release(&mut self, handle: GeometryHandle) -> BackendResult<()> {
        if self.fail_release.remove(&handle) {
            return Err(BackendError::Other(format!("release of {handle:?} refused")));
        }
        self.live
            .remove(&handle)
            .ok_or(BackendError::UnknownHandle(handle))?;
        push_bounded(&mut self.released, handle);
        self.released_count += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        log::debug!("[HeadlessBackend] resize {}x{}", width, height);
        push_bounded(&mut self.resizes, (width, height));
    }

    fn draw_frame(&mut self, visual_world: &VisualWorld) -> BackendResult<()> {
        for inst in visual_world.instances() {
            if !self.live.contains_key(&inst.handle) {
                return Err(BackendError::UnknownHandle(inst.handle));
            }
        }
        push_bounded(
            &mut self.frames,
            FrameRecord {
                instances: visual_world.instances().len(),
            },
        );
        self.frame_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::graphics::mesh::MeshFactory;
    use crate::viewer::graphics::primitives::Color;

    #[test]
    fn long_sessions_keep_history_bounded() {
        let mut backend = HeadlessBackend::new();
        let world = VisualWorld::default();
        for _ in 0..10_000 {
            backend.draw_frame(&world).unwrap();
        }
        assert_eq!(backend.frame_count(), 10_000);
        assert_eq!(backend.recent_frames().len(), HISTORY_LIMIT);
        assert_eq!(backend.last_frame(), Some(FrameRecord { instances: 0 }));

        let mesh = MeshFactory::crosshair(10.0);
        let mut last = None;
        for _ in 0..(HISTORY_LIMIT * 3) {
            let h = backend.upload_mesh(&mesh, &Material::opaque(Color::WHITE)).unwrap();
            backend.release(h).unwrap();
            last = Some(h);
        }
        assert_eq!(backend.released_count(), (HISTORY_LIMIT * 3) as u64);
        assert_eq!(backend.recent_releases().len(), HISTORY_LIMIT);
        assert_eq!(backend.recent_releases().back().copied(), last);
        assert_eq!(backend.live_count(), 0);
    }

    #[test]
    fn failed_release_keeps_handle_live() {
        let mut backend = HeadlessBackend::new();
        let h = backend
            .upload_mesh(&MeshFactory::crosshair(10.0), &Material::opaque(Color::WHITE))
            .unwrap();
        backend.fail_release_of(h);
        assert!(backend.release(h).is_err());
        assert_eq!(backend.live_count(), 1);
        assert_eq!(backend.released_count(), 0);
        backend.release(h).unwrap();
        assert_eq!(backend.released_count(), 1);
    }
}
