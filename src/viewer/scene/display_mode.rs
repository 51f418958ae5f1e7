use serde::{Deserialize, Serialize};

use crate::viewer::graphics::{Color, Material};

/// How ROI surfaces are drawn. Applies to every ROI at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Solid,
    Wireframe,
    /// Point-cloud look, approximated as a lighter wireframe.
    Vertex,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 3] = [DisplayMode::Solid, DisplayMode::Wireframe, DisplayMode::Vertex];

    pub const SOLID_OPACITY: f32 = 0.6;
    pub const VERTEX_OPACITY: f32 = 0.8;

    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Solid => "Solid",
            DisplayMode::Wireframe => "Wireframe",
            DisplayMode::Vertex => "Vertex",
        }
    }

    /// ROI surface material in this mode.
    pub fn roi_material(self, color: Color) -> Material {
        match self {
            DisplayMode::Solid => Material::translucent(color, Self::SOLID_OPACITY),
            DisplayMode::Wireframe => Material::wireframe(color, 1.0),
            DisplayMode::Vertex => Material::wireframe(color, Self::VERTEX_OPACITY),
        }
    }
}
