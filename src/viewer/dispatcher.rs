//! Routes pointer, wheel and keyboard events to the camera, the tool-mode
//! state machine and the context menu.

use crate::viewer::camera::OrbitCamera;
use crate::viewer::command_queue::CommandQueue;
use crate::viewer::context_menu::{ContextMenu, MenuAction};
use crate::viewer::tool_mode::{ToolMode, ToolModeState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    Escape,
    Other,
}

/// Host-agnostic input event. Coordinates are surface pixels and may lie
/// outside the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    PointerDown { x: f32, y: f32, button: PointerButton },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32, button: PointerButton },
    /// Positive `delta_y` scrolls down (away from the user).
    Wheel { delta_y: f32 },
    KeyDown(ViewerKey),
}

/// Everything a dispatch may touch.
pub struct DispatchContext<'a> {
    pub camera: &'a mut OrbitCamera,
    pub tools: &'a mut ToolModeState,
    pub menu: &'a mut ContextMenu,
    pub queue: &'a mut CommandQueue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionDispatcher {
    is_dragging: bool,
    last_pointer: (f32, f32),
}

impl InteractionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn last_pointer(&self) -> (f32, f32) {
        self.last_pointer
    }

    /// Handle one event. Returns a menu action when a context-menu item was
    /// activated; the caller owns the state those actions change.
    pub fn dispatch(&mut self, event: ViewerEvent, ctx: DispatchContext<'_>) -> Option<MenuAction> {
        match event {
            ViewerEvent::PointerDown { x, y, button } => self.pointer_down(x, y, button, ctx),
            ViewerEvent::PointerMove { x, y } => {
                self.pointer_move(x, y, ctx);
                None
            }
            ViewerEvent::PointerUp { button, .. } => {
                self.pointer_up(button, ctx);
                None
            }
            ViewerEvent::Wheel { delta_y } => {
                // Wheel zooms whatever tool is active; scrolling up moves closer.
                ctx.camera.zoom(-delta_y);
                None
            }
            ViewerEvent::KeyDown(ViewerKey::Escape) => {
                self.is_dragging = false;
                ctx.menu.close();
                ctx.tools.close_context_menu();
                ctx.tools.escape(ctx.camera, ctx.queue);
                None
            }
            ViewerEvent::KeyDown(ViewerKey::Other) => None,
        }
    }

    fn pointer_down(
        &mut self,
        x: f32,
        y: f32,
        button: PointerButton,
        ctx: DispatchContext<'_>,
    ) -> Option<MenuAction> {
        match button {
            PointerButton::Primary if ctx.menu.is_open() => {
                let action = ctx.menu.action_at(x, y);
                ctx.menu.close();
                ctx.tools.close_context_menu();
                action
            }
            PointerButton::Primary => {
                if !(x.is_finite() && y.is_finite()) {
                    return None;
                }
                self.is_dragging = true;
                self.last_pointer = (x, y);
                if ctx.tools.mode() == ToolMode::Pan {
                    ctx.queue.queue_set_cursor(ctx.tools.cursor(true));
                }
                None
            }
            PointerButton::Secondary => {
                if self.is_dragging {
                    self.is_dragging = false;
                    ctx.queue.queue_set_cursor(ctx.tools.cursor(false));
                }
                ctx.menu.open_at(x, y);
                ctx.tools.open_context_menu();
                None
            }
            PointerButton::Middle => None,
        }
    }

    fn pointer_move(&mut self, x: f32, y: f32, ctx: DispatchContext<'_>) {
        if !self.is_dragging || !(x.is_finite() && y.is_finite()) {
            return;
        }
        let dx = x - self.last_pointer.0;
        let dy = y - self.last_pointer.1;
        match ctx.tools.mode() {
            ToolMode::Rotate => ctx.camera.orbit(dx, dy),
            ToolMode::Zoom => ctx.camera.zoom(dy),
            ToolMode::Pan => ctx.camera.pan(dx, dy),
        }
        self.last_pointer = (x, y);
    }

    fn pointer_up(&mut self, button: PointerButton, ctx: DispatchContext<'_>) {
        if button != PointerButton::Primary || !self.is_dragging {
            return;
        }
        self.is_dragging = false;
        ctx.queue.queue_set_cursor(ctx.tools.cursor(false));
    }
}
