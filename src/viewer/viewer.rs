//! The viewer façade the host shell talks to.
//!
//! Owns the camera, scene, tool state, dispatcher and render loop, and
//! routes queued side effects to the host after every call. A viewer built
//! without a backend or a container is inert: it shows a fallback message
//! once and ignores everything afterwards.

use std::time::Instant;

use uuid::Uuid;
use winit::window::CursorIcon;

use crate::viewer::animation_loop::AnimationLoop;
use crate::viewer::camera::{CameraState, OrbitCamera};
use crate::viewer::command_queue::{CommandQueue, ViewerCommand};
use crate::viewer::config::ViewerConfig;
use crate::viewer::context_menu::{ContextMenu, MenuAction, MenuContext, MenuItem};
use crate::viewer::dispatcher::{DispatchContext, InteractionDispatcher, ViewerEvent};
use crate::viewer::graphics::RenderBackend;
use crate::viewer::mock_data::ScenePreset;
use crate::viewer::scene::{BeamSpec, DisplayMode, ObjectId, RoiSpec, SceneGraph, TeardownReport};
use crate::viewer::tool_mode::{SelectionSource, ToolMode, ToolModeState};
use crate::viewer::ViewerHost;

/// Size of the host container, in physical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerBounds {
    pub width: u32,
    pub height: u32,
}

impl ContainerBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size handed to the backend; never zero.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.width.max(1), self.height.max(1))
    }

    pub fn aspect(&self) -> f32 {
        let (w, h) = self.surface_size();
        w as f32 / h as f32
    }
}

/// Toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    SelectTool(ToolMode),
    ToggleMaximize,
    ResetView,
    RotateStep,
    ToggleBeams,
    SetDisplayMode(DisplayMode),
}

struct ViewerCore<B> {
    backend: B,
    bounds: ContainerBounds,
    camera: OrbitCamera,
    scene: SceneGraph,
    tools: ToolModeState,
    menu: ContextMenu,
    dispatcher: InteractionDispatcher,
    queue: CommandQueue,
    animation: AnimationLoop,
    cursor: CursorIcon,
}

pub struct Viewer<B: RenderBackend, H: ViewerHost> {
    session: Uuid,
    config: ViewerConfig,
    host: H,
    core: Option<ViewerCore<B>>,
    destroyed: bool,
}

impl<B: RenderBackend, H: ViewerHost> Viewer<B, H> {
    /// Viewer populated with the built-in mock scene.
    pub fn new(config: ViewerConfig, backend: Option<B>, container: Option<ContainerBounds>, host: H) -> Self {
        Self::with_preset(config, &ScenePreset::default(), backend, container, host)
    }

    pub fn with_preset(
        config: ViewerConfig,
        preset: &ScenePreset,
        backend: Option<B>,
        container: Option<ContainerBounds>,
        mut host: H,
    ) -> Self {
        let session = Uuid::new_v4();
        let (backend, bounds) = match (backend, container) {
            (Some(backend), Some(bounds)) => (backend, bounds),
            (backend, _) => {
                let missing = if backend.is_none() { "rendering backend" } else { "container" };
                log::error!("[Viewer {}] initialization failed: no {}", session, missing);
                host.show_fallback(&format!("3D view unavailable: no {missing}"));
                return Self {
                    session,
                    config,
                    host,
                    core: None,
                    destroyed: false,
                };
            }
        };

        let mut core = ViewerCore {
            backend,
            bounds,
            camera: OrbitCamera::new(config.camera),
            scene: SceneGraph::new(config.scene),
            tools: ToolModeState::new(),
            menu: ContextMenu::new(),
            dispatcher: InteractionDispatcher::new(),
            queue: CommandQueue::new(),
            animation: AnimationLoop::new(config.resize_settle_delay()),
            cursor: ToolMode::default().cursor(false),
        };
        core.populate(preset);

        let (w, h) = bounds.surface_size();
        core.backend.resize(w, h);
        host.set_cursor(core.cursor);
        core.animation.start(&mut host);

        log::info!(
            "[Viewer {}] ready: {} objects, {}x{}",
            session,
            core.scene.len(),
            w,
            h
        );
        Self {
            session,
            config,
            host,
            core: Some(core),
            destroyed: false,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn is_inert(&self) -> bool {
        self.core.is_none()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn backend(&self) -> Option<&B> {
        self.core.as_ref().map(|c| &c.backend)
    }

    pub fn camera_state(&self) -> Option<CameraState> {
        self.core.as_ref().map(|c| c.camera.state())
    }

    pub fn tool_mode(&self) -> Option<ToolMode> {
        self.core.as_ref().map(|c| c.tools.mode())
    }

    pub fn maximized(&self) -> bool {
        self.core.as_ref().is_some_and(|c| c.tools.maximized())
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.core.as_ref().map(|c| &c.scene)
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.core.as_ref().map(|c| &c.menu)
    }

    /// Items of the context menu with checkmarks for the current state.
    pub fn menu_items(&self) -> Vec<MenuItem> {
        match &self.core {
            Some(c) => c.menu.items(&c.menu_context()),
            None => Vec::new(),
        }
    }

    pub fn cursor(&self) -> Option<CursorIcon> {
        self.core.as_ref().map(|c| c.cursor)
    }

    pub fn container_bounds(&self) -> Option<ContainerBounds> {
        self.core.as_ref().map(|c| c.bounds)
    }

    pub fn animation(&self) -> Option<&AnimationLoop> {
        self.core.as_ref().map(|c| &c.animation)
    }

    pub fn handle_event(&mut self, event: ViewerEvent) {
        let config = self.config;
        let Some(core) = self.live_core() else {
            return;
        };
        let action = core.dispatcher.dispatch(
            event,
            DispatchContext {
                camera: &mut core.camera,
                tools: &mut core.tools,
                menu: &mut core.menu,
                queue: &mut core.queue,
            },
        );
        if let Some(action) = action {
            log::debug!("[Viewer] menu item {:?}", action);
            core.apply_menu_action(action, &config);
        }
        self.flush();
    }

    pub fn toolbar(&mut self, action: ToolbarAction) {
        let orbit_step = self.config.orbit_step_degrees;
        let Some(core) = self.live_core() else {
            return;
        };
        match action {
            ToolbarAction::SelectTool(mode) => {
                core.tools.select(mode, SelectionSource::Toolbar, &mut core.queue);
            }
            ToolbarAction::ToggleMaximize => {
                core.tools.toggle_maximize(&mut core.queue);
            }
            ToolbarAction::ResetView => {
                core.camera.reset();
                core.tools.reset_mode(&mut core.queue);
            }
            ToolbarAction::RotateStep => core.camera.orbit_by_step(orbit_step),
            ToolbarAction::ToggleBeams => {
                let visible = !core.scene.beams_visible();
                core.scene.set_beams_visible(&mut core.backend, visible);
            }
            ToolbarAction::SetDisplayMode(mode) => {
                core.scene.set_display_mode(&mut core.backend, mode);
            }
        }
        core.queue.queue_request_frame();
        self.flush();
    }

    /// Activate a context-menu item directly (keyboard navigation, tests).
    /// Closes the menu.
    pub fn activate_menu_item(&mut self, action: MenuAction) {
        let config = self.config;
        let Some(core) = self.live_core() else {
            return;
        };
        core.menu.close();
        core.tools.close_context_menu();
        core.apply_menu_action(action, &config);
        self.flush();
    }

    /// Host frame callback.
    pub fn tick(&mut self, now: Instant) {
        if self.destroyed {
            return;
        }
        let Some(core) = self.core.as_mut() else {
            return;
        };
        core.animation.tick(
            now,
            &core.camera,
            &core.scene,
            &mut core.backend,
            core.bounds,
            &mut self.host,
        );
    }

    /// New container size. Applied through the deferred resize, so bursts of
    /// layout changes collapse into one backend resize.
    pub fn set_container_bounds(&mut self, bounds: ContainerBounds) {
        let Some(core) = self.live_core() else {
            return;
        };
        if core.bounds == bounds {
            return;
        }
        core.bounds = bounds;
        core.queue.queue_schedule_resize();
        self.flush();
    }

    pub fn set_roi_list(&mut self, list: &[RoiSpec]) -> Vec<ObjectId> {
        let Some(core) = self.live_core() else {
            return Vec::new();
        };
        let ids = core.scene.replace_rois(&mut core.backend, list);
        log::info!("[Viewer] ROI list replaced: {} ROIs", ids.len());
        ids
    }

    pub fn set_beam_list(&mut self, list: &[BeamSpec]) -> Vec<ObjectId> {
        let Some(core) = self.live_core() else {
            return Vec::new();
        };
        let ids = core.scene.replace_beams(&mut core.backend, list);
        log::info!("[Viewer] beam list replaced: {} beams", ids.len());
        ids
    }

    /// Stop the render loop, release every scene resource, detach listeners.
    /// Later calls do nothing.
    pub fn destroy(&mut self) -> TeardownReport {
        if self.destroyed {
            return TeardownReport::default();
        }
        self.destroyed = true;
        let Some(core) = self.core.as_mut() else {
            self.host.detach_listeners();
            return TeardownReport::default();
        };

        core.animation.stop(&mut self.host);
        let report = core.scene.remove_all(&mut core.backend);
        core.menu.close();
        core.queue.drain();
        self.host.detach_listeners();

        log::info!(
            "[Viewer {}] destroyed: {} resources released, {} failed",
            self.session,
            report.released,
            report.failed
        );
        report
    }

    fn live_core(&mut self) -> Option<&mut ViewerCore<B>> {
        if self.destroyed {
            return None;
        }
        self.core.as_mut()
    }

    /// Deliver queued side effects to the host and the render loop.
    fn flush(&mut self) {
        let Some(core) = self.core.as_mut() else {
            return;
        };
        for command in core.queue.drain() {
            match command {
                ViewerCommand::SetCursor(cursor) => {
                    if core.cursor != cursor {
                        core.cursor = cursor;
                        self.host.set_cursor(cursor);
                    }
                }
                ViewerCommand::ScheduleResize => core.animation.schedule_resize(Instant::now()),
                ViewerCommand::RequestFrame => core.animation.request_frame(&mut self.host),
            }
        }
    }
}

impl<B: RenderBackend> ViewerCore<B> {
    fn populate(&mut self, preset: &ScenePreset) {
        if let Err(err) = self.scene.add_reference_plane(&mut self.backend) {
            log::warn!("[Viewer] reference plane skipped: {}", err);
        }
        self.scene.replace_rois(&mut self.backend, &preset.rois);
        self.scene.replace_beams(&mut self.backend, &preset.beams);
        if let Err(err) = self.scene.add_isocenter(&mut self.backend, preset.isocenter) {
            log::warn!("[Viewer] isocenter skipped: {}", err);
        }
    }

    fn menu_context(&self) -> MenuContext {
        MenuContext {
            tool: self.tools.mode(),
            maximized: self.tools.maximized(),
            beams_visible: self.scene.beams_visible(),
            display_mode: self.scene.display_mode(),
        }
    }

    fn apply_menu_action(&mut self, action: MenuAction, config: &ViewerConfig) {
        match action {
            MenuAction::SelectTool(mode) => {
                self.tools.select(mode, SelectionSource::ContextMenu, &mut self.queue);
            }
            MenuAction::ResetView => {
                self.camera.reset();
                self.tools.reset_mode(&mut self.queue);
            }
            MenuAction::RotateStep => self.camera.orbit_by_step(config.orbit_step_degrees),
            MenuAction::ToggleMaximize => {
                self.tools.toggle_maximize(&mut self.queue);
            }
            MenuAction::ToggleBeams => {
                let visible = !self.scene.beams_visible();
                self.scene.set_beams_visible(&mut self.backend, visible);
            }
            MenuAction::SetDisplayMode(mode) => {
                self.scene.set_display_mode(&mut self.backend, mode);
            }
        }
        self.queue.queue_request_frame();
    }
}

impl<B: RenderBackend, H: ViewerHost> Drop for Viewer<B, H> {
    fn drop(&mut self) {
        self.destroy();
    }
}
