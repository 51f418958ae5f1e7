use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::viewer::graphics::{Color, GeometryHandle, Transform};

/// Surface primitive used for an ROI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoiShape {
    Ellipsoid { radii: Vec3 },
    Cylinder { radius: f32, height: f32 },
}

/// Input for `SceneGraph::add_roi`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiSpec {
    pub name: String,
    pub color: Color,
    pub shape: RoiShape,
    #[serde(default)]
    pub offset: Option<Vec3>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

/// Input for `SceneGraph::add_beam`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSpec {
    pub name: String,
    /// Gantry angle in degrees, clockwise from +Z seen from above.
    pub gantry_angle: f32,
    /// Aperture width and height.
    pub field_size: [f32; 2],
    #[serde(default)]
    pub isocenter: Vec3,
    pub color: Color,
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq)]
pub struct Roi {
    pub color: Color,
    pub shape: RoiShape,
    pub offset: Option<Vec3>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    pub gantry_angle: f32,
    pub field_size: [f32; 2],
    pub isocenter: Vec3,
    pub color: Color,
    pub aperture: Transform,
}

impl Beam {
    /// Aperture placement for a gantry angle: on a circle of radius `distance`
    /// around the isocenter in the transverse (XZ) plane, facing the isocenter.
    pub fn aperture_transform(gantry_angle_deg: f32, isocenter: Vec3, distance: f32) -> Transform {
        let angle = gantry_angle_deg.to_radians();
        let position = isocenter + distance * Vec3::new(angle.sin(), 0.0, angle.cos());
        Transform::looking_at(position, isocenter, Vec3::Y)
    }

    /// Position of the radiation source (the aperture origin).
    pub fn source_position(&self) -> Vec3 {
        self.aperture.translation
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Isocenter {
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePlane {
    pub size: f32,
}

/// Type-specific payload of a scene object.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneObjectKind {
    Roi(Roi),
    Beam(Beam),
    Isocenter(Isocenter),
    ReferencePlane(ReferencePlane),
}

/// Payload-free discriminant, handy for filters and counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Roi,
    Beam,
    Isocenter,
    ReferencePlane,
}

impl SceneObjectKind {
    pub fn kind(&self) -> ObjectKind {
        match self {
            SceneObjectKind::Roi(_) => ObjectKind::Roi,
            SceneObjectKind::Beam(_) => ObjectKind::Beam,
            SceneObjectKind::Isocenter(_) => ObjectKind::Isocenter,
            SceneObjectKind::ReferencePlane(_) => ObjectKind::ReferencePlane,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub visible: bool,
    pub kind: SceneObjectKind,
    pub(crate) transform: Transform,
    pub(crate) handles: Vec<GeometryHandle>,
}

impl SceneObject {
    pub fn kind(&self) -> ObjectKind {
        self.kind.kind()
    }

    pub fn is(&self, kind: ObjectKind) -> bool {
        self.kind() == kind
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Backend resources owned by this object.
    pub fn handles(&self) -> &[GeometryHandle] {
        &self.handles
    }

    pub fn as_roi(&self) -> Option<&Roi> {
        match &self.kind {
            SceneObjectKind::Roi(roi) => Some(roi),
            _ => None,
        }
    }

    pub fn as_beam(&self) -> Option<&Beam> {
        match &self.kind {
            SceneObjectKind::Beam(beam) => Some(beam),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roi_spec_from_json() {
        let spec: RoiSpec = serde_json::from_str(
            r#"{
                "name": "PTV",
                "color": [1.0, 0.0, 0.0],
                "shape": { "kind": "ellipsoid", "radii": [40.0, 30.0, 35.0] }
            }"#,
        )
        .unwrap();
        assert_eq!(spec.shape, RoiShape::Ellipsoid { radii: Vec3::new(40.0, 30.0, 35.0) });
        assert!(spec.visible);
        assert_eq!(spec.offset, None);
    }

    #[test]
    fn aperture_at_cardinal_angles() {
        let iso = Vec3::new(5.0, -3.0, 2.0);
        let t0 = Beam::aperture_transform(0.0, iso, 400.0);
        assert!((t0.translation - (iso + Vec3::new(0.0, 0.0, 400.0))).length() < 1e-3);

        let t90 = Beam::aperture_transform(90.0, iso, 400.0);
        assert!((t90.translation - (iso + Vec3::new(400.0, 0.0, 0.0))).length() < 1e-3);

        let t180 = Beam::aperture_transform(180.0, iso, 400.0);
        assert!((t180.translation - (iso + Vec3::new(0.0, 0.0, -400.0))).length() < 1e-3);
    }

    #[test]
    fn aperture_faces_isocenter() {
        let iso = Vec3::ZERO;
        for angle in [0.0, 45.0, 120.0, 240.0, 315.0] {
            let t = Beam::aperture_transform(angle, iso, 400.0);
            let to_iso = (iso - t.translation).normalize();
            assert!((t.forward() - to_iso).length() < 1e-4, "angle {angle}");
        }
    }
}
