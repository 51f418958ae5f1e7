//! Stand-in clinical geometry until real plan data is wired in.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::viewer::graphics::Color;
use crate::viewer::scene::{BeamSpec, RoiShape, RoiSpec};
use crate::viewer::{ViewerError, ViewerResult};

/// Everything needed to populate a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePreset {
    pub rois: Vec<RoiSpec>,
    pub beams: Vec<BeamSpec>,
    #[serde(default)]
    pub isocenter: Vec3,
}

impl Default for ScenePreset {
    fn default() -> Self {
        Self {
            rois: roi_list(),
            beams: beam_list(),
            isocenter: Vec3::ZERO,
        }
    }
}

impl ScenePreset {
    pub fn from_json_file(path: impl AsRef<Path>) -> ViewerResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ViewerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn write_json_file(&self, path: impl AsRef<Path>) -> ViewerResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ViewerError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Target volume plus one organ at risk.
pub fn roi_list() -> Vec<RoiSpec> {
    vec![
        RoiSpec {
            name: "PTV".to_string(),
            color: Color::from_hex(0xff4d4d),
            shape: RoiShape::Ellipsoid {
                radii: Vec3::new(45.0, 35.0, 40.0),
            },
            offset: None,
            visible: true,
        },
        RoiSpec {
            name: "Spinal cord".to_string(),
            color: Color::from_hex(0x4da6ff),
            shape: RoiShape::Cylinder {
                radius: 8.0,
                height: 240.0,
            },
            offset: Some(Vec3::new(0.0, 0.0, -70.0)),
            visible: true,
        },
    ]
}

/// Three coplanar fields at 0, 120 and 240 degrees.
pub fn beam_list() -> Vec<BeamSpec> {
    [0.0_f32, 120.0, 240.0]
        .into_iter()
        .enumerate()
        .map(|(i, angle)| BeamSpec {
            name: format!("Beam {}", i + 1),
            gantry_angle: angle,
            field_size: [100.0, 80.0],
            isocenter: Vec3::ZERO,
            color: Color::from_hex(0x66ff99),
            visible: true,
        })
        .collect()
}
