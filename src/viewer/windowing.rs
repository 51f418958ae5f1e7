use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::Key;
use winit::window::{CursorIcon, Window, WindowAttributes, WindowId};

use crate::viewer::config::ViewerConfig;
use crate::viewer::graphics::HeadlessBackend;
use crate::viewer::mock_data::ScenePreset;
use crate::viewer::scene::DisplayMode;
use crate::viewer::tool_mode::ToolMode;
use crate::viewer::user_input::UserInput;
use crate::viewer::viewer::{ContainerBounds, ToolbarAction, Viewer};
use crate::viewer::{ViewerError, ViewerHost, ViewerResult};

/// Demo host: a winit window standing in for the surrounding UI shell.
pub struct Windowing;

impl Windowing {
    pub fn run_app(config: ViewerConfig, preset: ScenePreset) -> ViewerResult<()> {
        let event_loop = EventLoop::new().map_err(|e| ViewerError::Initialization(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = App {
            config,
            preset,
            input: UserInput::new(),
            viewer: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| ViewerError::Initialization(e.to_string()))?;

        Ok(())
    }
}

/// `ViewerHost` backed by a winit window.
pub struct WindowHost {
    window: Arc<Window>,
    listening: bool,
    frames_cancelled: bool,
    /// Last viewer maximized flag pushed to the window.
    applied_maximized: bool,
}

impl WindowHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            listening: true,
            frames_cancelled: false,
            applied_maximized: false,
        }
    }

    pub fn listening(&self) -> bool {
        self.listening
    }

    /// Maximize or restore the window when the viewer's flag changed.
    /// Window-manager maximizes are left alone until the flag moves.
    pub fn sync_maximized(&mut self, maximized: bool) {
        if let Some(next) = maximize_change(self.applied_maximized, maximized) {
            log::debug!("[WindowHost] maximized -> {}", next);
            self.window.set_maximized(next);
            self.applied_maximized = next;
        }
    }
}

/// New window state if the viewer's flag moved since it was last applied.
fn maximize_change(applied: bool, viewer: bool) -> Option<bool> {
    (applied != viewer).then_some(viewer)
}

impl ViewerHost for WindowHost {
    fn request_frame(&mut self) {
        if !self.frames_cancelled {
            self.window.request_redraw();
        }
    }

    fn cancel_frames(&mut self) {
        self.frames_cancelled = true;
    }

    fn set_cursor(&mut self, cursor: CursorIcon) {
        self.window.set_cursor(cursor);
    }

    fn detach_listeners(&mut self) {
        self.listening = false;
    }

    fn show_fallback(&mut self, message: &str) {
        log::warn!("[WindowHost] {}", message);
        self.window.set_title(&format!("rt-scene-viewer: {message}"));
    }
}

struct App {
    config: ViewerConfig,
    preset: ScenePreset,
    input: UserInput,
    viewer: Option<Viewer<HeadlessBackend, WindowHost>>,
}

/// Keyboard stand-ins for the toolbar buttons.
fn toolbar_shortcut(key: &Key, current_mode: DisplayMode) -> Option<ToolbarAction> {
    let Key::Character(c) = key else {
        return None;
    };
    let action = match c.as_str() {
        "1" => ToolbarAction::SelectTool(ToolMode::Rotate),
        "2" => ToolbarAction::SelectTool(ToolMode::Zoom),
        "3" => ToolbarAction::SelectTool(ToolMode::Pan),
        "m" => ToolbarAction::ToggleMaximize,
        "r" => ToolbarAction::ResetView,
        "t" => ToolbarAction::RotateStep,
        "b" => ToolbarAction::ToggleBeams,
        "w" => {
            let idx = DisplayMode::ALL.iter().position(|&m| m == current_mode).unwrap_or(0);
            ToolbarAction::SetDisplayMode(DisplayMode::ALL[(idx + 1) % DisplayMode::ALL.len()])
        }
        _ => return None,
    };
    Some(action)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }

        let attrs: WindowAttributes = Window::default_attributes()
            .with_title("rt-scene-viewer")
            .with_inner_size(winit::dpi::LogicalSize::new(1024.0, 768.0));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("[Windowing] failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let viewer = Viewer::with_preset(
            self.config,
            &self.preset,
            Some(HeadlessBackend::new()),
            Some(ContainerBounds::new(size.width, size.height)),
            WindowHost::new(window),
        );
        self.viewer = Some(viewer);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                viewer.destroy();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                viewer.set_container_bounds(ContainerBounds::new(size.width, size.height));
            }

            WindowEvent::RedrawRequested => {
                viewer.tick(Instant::now());
                let frames = viewer.animation().map_or(0, |a| a.frame_count());
                if frames > 0 && frames % 600 == 0 {
                    log::debug!("[Windowing] {} frames drawn", frames);
                }
            }

            other => {
                if !viewer.host().listening() {
                    return;
                }
                if let WindowEvent::KeyboardInput { event: key, .. } = &other {
                    let mode = viewer.scene().map(|s| s.display_mode()).unwrap_or_default();
                    let action = match key.state {
                        ElementState::Pressed => toolbar_shortcut(&key.logical_key, mode),
                        ElementState::Released => None,
                    };
                    if let Some(action) = action {
                        viewer.toolbar(action);
                        let maximized = viewer.maximized();
                        viewer.host_mut().sync_maximized(maximized);
                        return;
                    }
                }
                if let Some(ev) = self.input.handle_window_event(&other) {
                    viewer.handle_event(ev);
                    let maximized = viewer.maximized();
                    viewer.host_mut().sync_maximized(maximized);
                }
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use winit::keyboard::SmolStr;

    use super::*;

    #[test]
    fn shortcuts_map_to_toolbar_actions() {
        let key = |s: &str| Key::Character(SmolStr::new(s));
        assert_eq!(
            toolbar_shortcut(&key("3"), DisplayMode::Solid),
            Some(ToolbarAction::SelectTool(ToolMode::Pan))
        );
        assert_eq!(
            toolbar_shortcut(&key("w"), DisplayMode::Vertex),
            Some(ToolbarAction::SetDisplayMode(DisplayMode::Solid))
        );
        assert_eq!(toolbar_shortcut(&key("q"), DisplayMode::Solid), None);
    }

    #[test]
    fn window_follows_viewer_maximize() {
        assert_eq!(maximize_change(false, true), Some(true));
        assert_eq!(maximize_change(true, false), Some(false));
        assert_eq!(maximize_change(true, true), None);
        assert_eq!(maximize_change(false, false), None);
    }
}
