use glam::Mat4;

use crate::viewer::camera::{CameraState, OrbitCamera};
use crate::viewer::graphics::primitives::GeometryHandle;
use crate::viewer::scene::{ObjectId, SceneGraph};

/// Per-handle draw payload.
#[derive(Debug, Clone, Copy)]
pub struct Instance {
    pub object: ObjectId,
    pub handle: GeometryHandle,
    pub model: Mat4,
}

/// Renderer-friendly snapshot of one frame: camera matrices plus every
/// visible geometry handle with its model matrix.
///
/// Rebuilt from scratch on each tick, so it never holds a handle that was
/// released since the previous frame.
#[derive(Debug, Clone)]
pub struct VisualWorld {
    pub camera: CameraState,
    pub view: Mat4,
    pub proj: Mat4,
    instances: Vec<Instance>,
}

impl Default for VisualWorld {
    fn default() -> Self {
        Self {
            camera: CameraState::default(),
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            instances: Vec::new(),
        }
    }
}

impl VisualWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Re-read camera + scene into this snapshot.
    pub fn rebuild(&mut self, camera: &OrbitCamera, scene: &SceneGraph, aspect: f32) {
        self.camera = camera.state();
        self.view = camera.view_matrix();
        self.proj = camera.projection_matrix(aspect);

        self.instances.clear();
        for (id, object) in scene.drawable() {
            let model = object.transform().model_matrix();
            self.instances.extend(object.handles().iter().map(|&handle| Instance {
                object: id,
                handle,
                model,
            }));
        }
    }
}
