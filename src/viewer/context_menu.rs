//! Transient right-click menu. Items mirror the toolbar and carry checkmarks
//! for the state they toggle.

use crate::viewer::scene::DisplayMode;
use crate::viewer::tool_mode::ToolMode;

pub const MENU_WIDTH: f32 = 180.0;
pub const ITEM_HEIGHT: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    SelectTool(ToolMode),
    ResetView,
    RotateStep,
    ToggleMaximize,
    ToggleBeams,
    SetDisplayMode(DisplayMode),
}

impl MenuAction {
    /// Every action, in menu order.
    pub const ALL: [MenuAction; 10] = [
        MenuAction::SelectTool(ToolMode::Rotate),
        MenuAction::SelectTool(ToolMode::Zoom),
        MenuAction::SelectTool(ToolMode::Pan),
        MenuAction::ResetView,
        MenuAction::RotateStep,
        MenuAction::ToggleMaximize,
        MenuAction::ToggleBeams,
        MenuAction::SetDisplayMode(DisplayMode::Solid),
        MenuAction::SetDisplayMode(DisplayMode::Wireframe),
        MenuAction::SetDisplayMode(DisplayMode::Vertex),
    ];
}

/// State the checkmarks are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuContext {
    pub tool: ToolMode,
    pub maximized: bool,
    pub beams_visible: bool,
    pub display_mode: DisplayMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub action: MenuAction,
    pub label: String,
    /// `None` for plain commands, `Some(checked)` for stateful entries.
    pub checked: Option<bool>,
}

impl MenuItem {
    fn build(action: MenuAction, ctx: &MenuContext) -> Self {
        let (label, checked) = match action {
            MenuAction::SelectTool(mode) => (mode.label().to_string(), Some(ctx.tool == mode)),
            MenuAction::ResetView => ("Reset view".to_string(), None),
            MenuAction::RotateStep => ("Rotate 90°".to_string(), None),
            MenuAction::ToggleMaximize => ("Maximize".to_string(), Some(ctx.maximized)),
            MenuAction::ToggleBeams => ("Beam spots".to_string(), Some(ctx.beams_visible)),
            MenuAction::SetDisplayMode(mode) => (mode.label().to_string(), Some(ctx.display_mode == mode)),
        };
        Self { action, label, checked }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextMenu {
    /// Top-left corner, in surface pixels, while open.
    anchor: Option<(f32, f32)>,
}

impl ContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_at(&mut self, x: f32, y: f32) {
        let sane = |v: f32| if v.is_finite() { v } else { 0.0 };
        self.anchor = Some((sane(x), sane(y)));
    }

    pub fn close(&mut self) {
        self.anchor = None;
    }

    pub fn is_open(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<(f32, f32)> {
        self.anchor
    }

    pub fn items(&self, ctx: &MenuContext) -> Vec<MenuItem> {
        MenuAction::ALL.iter().map(|&a| MenuItem::build(a, ctx)).collect()
    }

    /// Index of the item under `(x, y)`, if the menu is open and the point is on it.
    pub fn item_at(&self, x: f32, y: f32) -> Option<usize> {
        let (ax, ay) = self.anchor?;
        if !(x >= ax && x < ax + MENU_WIDTH && y >= ay) {
            return None;
        }
        let index = ((y - ay) / ITEM_HEIGHT) as usize;
        (index < MenuAction::ALL.len()).then_some(index)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.item_at(x, y).is_some()
    }

    pub fn action_at(&self, x: f32, y: f32) -> Option<MenuAction> {
        self.item_at(x, y).map(|i| MenuAction::ALL[i])
    }
}
