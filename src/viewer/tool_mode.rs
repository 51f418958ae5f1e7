//! Active tool, context-menu flag and maximized flag.
//!
//! Three independent axes. ToolMode changes always queue a cursor update;
//! maximize changes always queue a deferred resize.

use serde::{Deserialize, Serialize};
use winit::window::CursorIcon;

use crate::viewer::camera::OrbitCamera;
use crate::viewer::command_queue::CommandQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    #[default]
    Rotate,
    Zoom,
    Pan,
}

impl ToolMode {
    pub const ALL: [ToolMode; 3] = [ToolMode::Rotate, ToolMode::Zoom, ToolMode::Pan];

    pub fn label(self) -> &'static str {
        match self {
            ToolMode::Rotate => "Rotate",
            ToolMode::Zoom => "Zoom",
            ToolMode::Pan => "Pan",
        }
    }

    /// Pointer affordance for this tool.
    pub fn cursor(self, dragging: bool) -> CursorIcon {
        match (self, dragging) {
            (ToolMode::Rotate, _) => CursorIcon::Crosshair,
            (ToolMode::Zoom, _) => CursorIcon::ZoomIn,
            (ToolMode::Pan, false) => CursorIcon::Grab,
            (ToolMode::Pan, true) => CursorIcon::Grabbing,
        }
    }
}

/// Where a tool selection came from. Only toolbar re-selection toggles off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Toolbar,
    ContextMenu,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolModeState {
    mode: ToolMode,
    context_menu_open: bool,
    maximized: bool,
}

impl ToolModeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn context_menu_open(&self) -> bool {
        self.context_menu_open
    }

    pub fn maximized(&self) -> bool {
        self.maximized
    }

    /// Select a tool. From the toolbar, picking the active tool again falls
    /// back to `Rotate`; from the context menu it always sets.
    pub fn select(&mut self, mode: ToolMode, source: SelectionSource, queue: &mut CommandQueue) -> ToolMode {
        let next = match source {
            SelectionSource::Toolbar if self.mode == mode => ToolMode::default(),
            SelectionSource::Toolbar | SelectionSource::ContextMenu => mode,
        };
        self.set_mode(next, queue);
        next
    }

    /// Back to the default tool.
    pub fn reset_mode(&mut self, queue: &mut CommandQueue) {
        self.set_mode(ToolMode::default(), queue);
    }

    /// Flip the maximized flag. Returns the new value.
    pub fn toggle_maximize(&mut self, queue: &mut CommandQueue) -> bool {
        self.maximized = !self.maximized;
        log::debug!("[ToolModeState] maximized -> {}", self.maximized);
        queue.queue_schedule_resize();
        self.maximized
    }

    /// Escape key: camera reset plus default tool, and leave maximized state.
    pub fn escape(&mut self, camera: &mut OrbitCamera, queue: &mut CommandQueue) {
        camera.reset();
        self.reset_mode(queue);
        if self.maximized {
            self.toggle_maximize(queue);
        }
        queue.queue_request_frame();
    }

    pub fn open_context_menu(&mut self) {
        self.context_menu_open = true;
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu_open = false;
    }

    pub fn cursor(&self, dragging: bool) -> CursorIcon {
        self.mode.cursor(dragging)
    }

    fn set_mode(&mut self, mode: ToolMode, queue: &mut CommandQueue) {
        if self.mode != mode {
            log::debug!("[ToolModeState] tool {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        queue.queue_set_cursor(mode.cursor(false));
    }
}
