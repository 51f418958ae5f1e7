//! Viewer configuration, loadable from JSON. Every field has a default, so a
//! config file only needs the keys it overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::viewer::camera::CameraSettings;
use crate::viewer::graphics::mesh::MAX_TESSELLATION;
use crate::viewer::scene::SceneSettings;
use crate::viewer::{ViewerError, ViewerResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraSettings,
    pub scene: SceneSettings,
    /// Step used by the "rotate 90°" action.
    pub orbit_step_degrees: f32,
    /// How long to wait after a maximize toggle before resizing.
    pub resize_settle_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            scene: SceneSettings::default(),
            orbit_step_degrees: 90.0,
            resize_settle_ms: 100,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> ViewerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ViewerResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ViewerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn resize_settle_delay(&self) -> Duration {
        Duration::from_millis(self.resize_settle_ms)
    }

    /// Reject values that cannot be clamped into something sensible.
    pub fn validate(&self) -> ViewerResult<()> {
        let s = &self.scene;
        if !(s.beam_source_distance.is_finite() && s.beam_source_distance > 0.0) {
            return Err(ViewerError::Config(format!(
                "scene.beam_source_distance must be positive, got {}",
                s.beam_source_distance
            )));
        }
        if s.segments > MAX_TESSELLATION || s.rings > MAX_TESSELLATION {
            return Err(ViewerError::Config(format!(
                "scene.segments and scene.rings must be at most {MAX_TESSELLATION}, got {} and {}",
                s.segments, s.rings
            )));
        }
        if !self.orbit_step_degrees.is_finite() {
            return Err(ViewerError::Config("orbit_step_degrees must be finite".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ViewerConfig::from_json_str(r#"{ "camera": { "max_distance": 1500.0 }, "resize_settle_ms": 250 }"#)
            .unwrap();
        assert_eq!(cfg.camera.max_distance, 1500.0);
        assert_eq!(cfg.camera.min_distance, 100.0);
        assert_eq!(cfg.resize_settle_delay(), Duration::from_millis(250));
        assert_eq!(cfg.scene, SceneSettings::default());
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = ViewerConfig::from_json_str(r#"{ "scene": { "beam_source_distance": -5.0 } }"#).unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));

        let err = ViewerConfig::from_json_str(r#"{ "scene": { "segments": 70000, "rings": 70000 } }"#).unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));

        let err = ViewerConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ViewerError::Json(_)));
    }
}
