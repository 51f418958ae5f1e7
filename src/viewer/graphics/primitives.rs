//! Backend-facing value types: handles, transforms, materials.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Backend-owned geometry resource. Opaque to the viewer; only the backend
/// knows what sits behind the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryHandle(pub u64);

/// RGB color, each channel in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color(pub [f32; 3]);

impl Color {
    pub const WHITE: Color = Color([1.0, 1.0, 1.0]);
    pub const GREY: Color = Color([0.5, 0.5, 0.5]);
    pub const YELLOW: Color = Color([1.0, 0.9, 0.1]);

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b])
    }

    /// `0xRRGGBB` hex color.
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;
        Self([r, g, b])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Translation + rotation + scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    /// Place an object at `eye`, rotated so its local -Z axis points at `target`.
    pub fn looking_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let view = Mat4::look_at_rh(eye, target, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        Self {
            translation: eye,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// World-space direction of the local -Z axis.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

/// How a surface is shaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub wireframe: bool,
}

impl Material {
    pub fn opaque(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            wireframe: false,
        }
    }

    pub fn translucent(color: Color, opacity: f32) -> Self {
        Self {
            color,
            opacity: opacity.clamp(0.0, 1.0),
            wireframe: false,
        }
    }

    pub fn wireframe(color: Color, opacity: f32) -> Self {
        Self {
            color,
            opacity: opacity.clamp(0.0, 1.0),
            wireframe: true,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}
