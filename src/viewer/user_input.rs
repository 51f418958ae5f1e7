//! Input handling (winit -> viewer events).
//!
//! winit reports button presses without a position, so `UserInput` keeps
//! the last cursor position and stamps it onto pointer events.

use std::collections::HashSet;

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use crate::viewer::dispatcher::{PointerButton, ViewerEvent, ViewerKey};

/// Pixels per wheel "line", so line and pixel deltas share one scale.
pub const LINE_HEIGHT_PX: f32 = 50.0;

#[derive(Default, Debug, Clone)]
pub struct UserInput {
    /// Cursor position in physical pixels (as reported by winit).
    cursor_pos: Option<(f32, f32)>,
    mouse_down: HashSet<MouseButton>,
}

impl UserInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor_pos(&self) -> Option<(f32, f32)> {
        self.cursor_pos
    }

    #[inline]
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_down.contains(&button)
    }

    /// Translate a winit event. Returns `None` for events the viewer does
    /// not consume.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Option<ViewerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.cursor_moved(position.x as f32, position.y as f32))
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_pos = None;
                None
            }
            WindowEvent::MouseInput { state, button, .. } => self.mouse_input(*state, *button),
            WindowEvent::MouseWheel { delta, .. } => Some(ViewerEvent::Wheel {
                delta_y: wheel_delta_y(delta),
            }),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                Some(ViewerEvent::KeyDown(viewer_key(&event.logical_key)))
            }
            _ => None,
        }
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) -> ViewerEvent {
        self.cursor_pos = Some((x, y));
        ViewerEvent::PointerMove { x, y }
    }

    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton) -> Option<ViewerEvent> {
        let pointer = pointer_button(button)?;
        let (x, y) = self.cursor_pos.unwrap_or((0.0, 0.0));
        match state {
            ElementState::Pressed => {
                if !self.mouse_down.insert(button) {
                    // Key-repeat style duplicate.
                    return None;
                }
                Some(ViewerEvent::PointerDown { x, y, button: pointer })
            }
            ElementState::Released => {
                self.mouse_down.remove(&button);
                Some(ViewerEvent::PointerUp { x, y, button: pointer })
            }
        }
    }
}

pub fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        MouseButton::Back | MouseButton::Forward | MouseButton::Other(_) => None,
    }
}

/// winit reports "scroll up" as positive; viewer events use positive for down.
pub fn wheel_delta_y(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT_PX,
        MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
    }
}

pub fn viewer_key(key: &Key) -> ViewerKey {
    match key {
        Key::Named(NamedKey::Escape) => ViewerKey::Escape,
        _ => ViewerKey::Other,
    }
}
