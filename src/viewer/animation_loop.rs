use std::time::{Duration, Instant};

use crate::viewer::ViewerHost;
use crate::viewer::camera::OrbitCamera;
use crate::viewer::graphics::{RenderBackend, VisualWorld};
use crate::viewer::scene::SceneGraph;
use crate::viewer::viewer::ContainerBounds;

/// What one `tick` did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub drew: bool,
    /// Bounds applied by a deferred resize that fired on this tick.
    pub resized: Option<ContainerBounds>,
}

/// Frame driver: one draw per host frame callback, plus the single-shot
/// deferred resize that follows a maximize toggle.
#[derive(Debug)]
pub struct AnimationLoop {
    running: bool,
    frame_requested: bool,
    frames: u64,
    settle: Duration,
    resize_deadline: Option<Instant>,
    visuals: VisualWorld,
}

impl AnimationLoop {
    pub fn new(settle: Duration) -> Self {
        Self {
            running: false,
            frame_requested: false,
            frames: 0,
            settle,
            resize_deadline: None,
            visuals: VisualWorld::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn resize_deadline(&self) -> Option<Instant> {
        self.resize_deadline
    }

    /// Snapshot handed to the backend on the last tick.
    pub fn visuals(&self) -> &VisualWorld {
        &self.visuals
    }

    pub fn start(&mut self, host: &mut dyn ViewerHost) {
        if self.running {
            return;
        }
        self.running = true;
        self.request_frame(host);
    }

    /// Cancel frame scheduling and drop any pending resize. Idempotent.
    pub fn stop(&mut self, host: &mut dyn ViewerHost) {
        if !self.running {
            return;
        }
        self.running = false;
        self.frame_requested = false;
        self.resize_deadline = None;
        self.visuals.clear();
        host.cancel_frames();
    }

    /// At most one frame callback is outstanding at a time.
    pub fn request_frame(&mut self, host: &mut dyn ViewerHost) {
        if self.running && !self.frame_requested {
            self.frame_requested = true;
            host.request_frame();
        }
    }

    /// Arm the deferred resize, replacing any pending one.
    pub fn schedule_resize(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        if self.resize_deadline.is_some() {
            log::trace!("[AnimationLoop] deferred resize rescheduled");
        }
        self.resize_deadline = Some(now + self.settle);
    }

    /// One frame: fire the deferred resize if it is due, rebuild the visual
    /// snapshot, draw, and ask for the next frame.
    pub fn tick(
        &mut self,
        now: Instant,
        camera: &OrbitCamera,
        scene: &SceneGraph,
        backend: &mut dyn RenderBackend,
        bounds: ContainerBounds,
        host: &mut dyn ViewerHost,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !self.running {
            return outcome;
        }
        self.frame_requested = false;

        if self.resize_deadline.is_some_and(|deadline| deadline <= now) {
            self.resize_deadline = None;
            let (w, h) = bounds.surface_size();
            backend.resize(w, h);
            outcome.resized = Some(bounds);
            log::debug!("[AnimationLoop] deferred resize applied: {}x{}", w, h);
        }

        self.visuals.rebuild(camera, scene, bounds.aspect());
        match backend.draw_frame(&self.visuals) {
            Ok(()) => {
                self.frames += 1;
                outcome.drew = true;
            }
            Err(err) => log::warn!("[AnimationLoop] frame {} dropped: {}", self.frames, err),
        }

        self.request_frame(host);
        outcome
    }
}
