pub mod animation_loop;
pub mod camera;
pub mod cli;
pub mod command_queue;
pub mod config;
pub mod context_menu;
pub mod dispatcher;
pub mod graphics;
pub mod mock_data;
pub mod scene;
pub mod tool_mode;
pub mod user_input;
pub mod viewer;
pub mod windowing;

#[cfg(test)]
mod viewer_tests;

pub use animation_loop::AnimationLoop;
pub use camera::{CameraSettings, CameraState, OrbitCamera};
pub use config::ViewerConfig;
pub use context_menu::{ContextMenu, MenuAction, MenuItem};
pub use dispatcher::{InteractionDispatcher, PointerButton, ViewerEvent, ViewerKey};
pub use scene::{DisplayMode, ObjectId, SceneGraph};
pub use tool_mode::{SelectionSource, ToolMode, ToolModeState};
pub use viewer::{ContainerBounds, ToolbarAction, Viewer};

use thiserror::Error;
use winit::window::CursorIcon;

use crate::viewer::graphics::BackendError;

/// Viewer-level error type.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Required collaborator missing at construction.
    #[error("viewer initialization failed: {0}")]
    Initialization(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ViewerResult<T> = Result<T, ViewerError>;

/// Host UI shell collaborator: frame scheduling, cursor, listeners.
pub trait ViewerHost {
    /// Ask for one more frame callback (`Viewer::tick`).
    fn request_frame(&mut self);

    /// Drop any frame callback that has been requested but not yet delivered.
    fn cancel_frames(&mut self);

    fn set_cursor(&mut self, cursor: CursorIcon);

    /// Stop delivering pointer/wheel/keyboard events to the viewer.
    fn detach_listeners(&mut self);

    /// Show a visible message in place of the 3D view.
    fn show_fallback(&mut self, message: &str);
}
