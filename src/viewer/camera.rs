//! Orbit camera around a fixed look-at target.
//!
//! Every mutation keeps two invariants: the distance to `target` stays in
//! `[min_distance, max_distance]`, and the polar angle stays in
//! `[pole_epsilon, PI - pole_epsilon]`. Inputs are clamped, never rejected.

use std::f32::consts::PI;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Camera position/orientation snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for CameraState {
    fn default() -> Self {
        CameraSettings::default().default_state()
    }
}

impl CameraState {
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Unit vector from the camera toward the target.
    pub fn view_direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Unit vector pointing to the camera's right.
    pub fn right(&self) -> Vec3 {
        let right = self.view_direction().cross(self.up).normalize_or_zero();
        if right == Vec3::ZERO { Vec3::X } else { right }
    }
}

/// Spherical coordinates of the camera offset from the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Azimuth, `atan2(x, z)`.
    pub theta: f32,
    /// Polar angle from +Y, `acos(y / radius)`.
    pub phi: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return Self {
                radius: 0.0,
                theta: 0.0,
                phi: PI / 2.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(
            self.radius * sin_phi * sin_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * cos_theta,
        )
    }
}

/// Tunables for the orbit camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub min_distance: f32,
    pub max_distance: f32,
    pub default_position: [f32; 3],
    /// Radians per pointer pixel.
    pub rotate_sensitivity: f32,
    /// World units per zoom unit.
    pub zoom_speed: f32,
    /// World units per pointer pixel.
    pub pan_speed: f32,
    pub pole_epsilon: f32,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            min_distance: 100.0,
            max_distance: 2000.0,
            default_position: [0.0, 200.0, 600.0],
            rotate_sensitivity: 0.01,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            pole_epsilon: 0.01,
            fov_y_degrees: 45.0,
            near: 1.0,
            far: 10_000.0,
        }
    }
}

impl CameraSettings {
    /// Repair settings that would make the invariants unsatisfiable.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let finite_pos = |v: f32, d: f32| if v.is_finite() && v > 0.0 { v } else { d };

        self.min_distance = finite_pos(self.min_distance, defaults.min_distance);
        self.max_distance = finite_pos(self.max_distance, defaults.max_distance);
        if self.max_distance < self.min_distance {
            std::mem::swap(&mut self.min_distance, &mut self.max_distance);
        }
        self.rotate_sensitivity = finite_pos(self.rotate_sensitivity, defaults.rotate_sensitivity);
        self.zoom_speed = finite_pos(self.zoom_speed, defaults.zoom_speed);
        self.pan_speed = finite_pos(self.pan_speed, defaults.pan_speed);
        self.pole_epsilon = finite_pos(self.pole_epsilon, defaults.pole_epsilon).min(PI / 4.0);
        self.fov_y_degrees = finite_pos(self.fov_y_degrees, defaults.fov_y_degrees).min(170.0);
        self.near = finite_pos(self.near, defaults.near);
        self.far = finite_pos(self.far, defaults.far).max(self.near * 2.0);
        if !self.default_position.iter().all(|c| c.is_finite()) {
            self.default_position = defaults.default_position;
        }
        self
    }

    /// Canonical state: default position pushed into the distance range and
    /// off the poles.
    pub fn default_state(&self) -> CameraState {
        let mut state = CameraState {
            position: Vec3::from_array(self.default_position),
            target: Vec3::ZERO,
            up: Vec3::Y,
        };
        let mut s = Spherical::from_offset(state.position - state.target);
        if s.radius <= f32::EPSILON {
            s = Spherical {
                radius: self.min_distance,
                theta: 0.0,
                phi: PI / 2.0,
            };
        }
        s.radius = s.radius.clamp(self.min_distance, self.max_distance);
        s.phi = s.phi.clamp(self.pole_epsilon, PI - self.pole_epsilon);
        state.position = state.target + s.to_offset();
        state
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    settings: CameraSettings,
    state: CameraState,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}

impl OrbitCamera {
    pub fn new(settings: CameraSettings) -> Self {
        let settings = settings.sanitized();
        Self {
            state: settings.default_state(),
            settings,
        }
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn distance(&self) -> f32 {
        self.state.distance()
    }

    pub fn spherical(&self) -> Spherical {
        Spherical::from_offset(self.state.position - self.state.target)
    }

    /// Continuous drag rotation around the target.
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        let mut s = self.spherical();
        s.theta += finite_or_zero(delta_yaw) * self.settings.rotate_sensitivity;
        s.phi += finite_or_zero(delta_pitch) * self.settings.rotate_sensitivity;
        self.apply_spherical(s);
    }

    /// Discrete rotation about the vertical axis; radius and height are kept.
    pub fn orbit_by_step(&mut self, degrees: f32) {
        let angle = finite_or_zero(degrees).to_radians();
        let offset = self.state.position - self.state.target;
        let horizontal = (offset.x * offset.x + offset.z * offset.z).sqrt();
        let theta = offset.x.atan2(offset.z) + angle;
        let (sin_t, cos_t) = theta.sin_cos();
        self.state.position =
            self.state.target + Vec3::new(horizontal * sin_t, offset.y, horizontal * cos_t);
    }

    /// Dolly along the view direction. Positive `delta` moves toward the target.
    pub fn zoom(&mut self, delta: f32) {
        let step = finite_or_zero(delta) * self.settings.zoom_speed;
        if step == 0.0 {
            return;
        }
        let offset = self.state.position - self.state.target;
        let dir = self.state.view_direction();
        let moved = offset + dir * step;

        // Passing through the target flips the offset; land on the near bound instead.
        let new_offset = if moved.dot(offset) <= 0.0 {
            offset.normalize_or_zero() * self.settings.min_distance
        } else {
            moved
        };
        self.state.position = self.state.target + new_offset;
        self.clamp_radius();
    }

    /// Screen-space pan. Only the camera moves; `target` stays put.
    pub fn pan(&mut self, delta_right: f32, delta_up: f32) {
        let right = self.state.right();
        let up = self.state.up;
        let speed = self.settings.pan_speed;
        self.state.position += right * (-finite_or_zero(delta_right) * speed)
            + up * (finite_or_zero(delta_up) * speed);
        self.clamp_radius();
        self.clamp_polar();
    }

    pub fn reset(&mut self) {
        self.state = self.settings.default_state();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.state.position, self.state.target, self.state.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(
            self.settings.fov_y_degrees.to_radians(),
            aspect,
            self.settings.near,
            self.settings.far,
        )
    }

    fn apply_spherical(&mut self, mut s: Spherical) {
        let eps = self.settings.pole_epsilon;
        s.phi = s.phi.clamp(eps, PI - eps);
        s.radius = s.radius.clamp(self.settings.min_distance, self.settings.max_distance);
        self.state.position = self.state.target + s.to_offset();
    }

    fn clamp_radius(&mut self) {
        let offset = self.state.position - self.state.target;
        let r = offset.length();
        let clamped = r.clamp(self.settings.min_distance, self.settings.max_distance);
        if r == clamped {
            return;
        }
        let dir = if r <= f32::EPSILON { Vec3::Z } else { offset / r };
        self.state.position = self.state.target + dir * clamped;
    }

    fn clamp_polar(&mut self) {
        let s = self.spherical();
        let eps = self.settings.pole_epsilon;
        if s.phi < eps || s.phi > PI - eps {
            self.apply_spherical(s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f32 = 1e-3;

    fn in_range(cam: &OrbitCamera) -> bool {
        let d = cam.distance();
        d >= cam.settings().min_distance - TOL && d <= cam.settings().max_distance + TOL
    }

    #[test]
    fn default_state_looks_at_origin_within_range() {
        let cam = OrbitCamera::default();
        assert_eq!(cam.state().target, Vec3::ZERO);
        assert!(in_range(&cam));
    }

    #[test]
    fn zoom_sequences_stay_in_range() {
        let mut cam = OrbitCamera::default();
        let deltas = [
            1.0e6, -1.0e6, 50.0, -3.0, 599.0, 601.0, -20_000.0, 1.0e9, f32::NAN,
            f32::INFINITY, -250.0, 0.5, 1999.0,
        ];
        for d in deltas {
            cam.zoom(d);
            assert!(in_range(&cam), "distance {} after zoom({d})", cam.distance());
        }
    }

    #[test]
    fn zoom_is_idempotent_at_bounds() {
        let mut cam = OrbitCamera::default();
        cam.zoom(-1.0e7);
        let at_max = cam.state();
        assert!((cam.distance() - 2000.0).abs() < TOL);
        cam.zoom(-1.0e7);
        assert!((cam.state().position - at_max.position).length() < TOL);

        cam.zoom(1.0e7);
        assert!((cam.distance() - 100.0).abs() < TOL);
        let at_min = cam.state();
        cam.zoom(1.0e7);
        assert!((cam.state().position - at_min.position).length() < TOL);
        // Still on the original side of the target.
        assert!(at_min.position.dot(at_max.position) > 0.0);
    }

    #[test]
    fn orbit_never_crosses_poles() {
        let mut cam = OrbitCamera::default();
        let eps = cam.settings().pole_epsilon;
        for i in 0..500 {
            let pitch = if i % 3 == 0 { -1.0e4 } else { 337.0 };
            cam.orbit(13.0 * i as f32, pitch);
            let phi = cam.spherical().phi;
            assert!(phi >= eps - 1e-4 && phi <= PI - eps + 1e-4, "phi = {phi}");
            assert!(in_range(&cam));
        }
    }

    #[test]
    fn orbit_keeps_radius() {
        let mut cam = OrbitCamera::default();
        let r0 = cam.distance();
        cam.orbit(40.0, -15.0);
        assert!((cam.distance() - r0).abs() < TOL);
    }

    #[test]
    fn orbit_by_step_preserves_height_and_radius() {
        let mut cam = OrbitCamera::default();
        let before = cam.state().position;
        cam.orbit_by_step(90.0);
        let after = cam.state().position;
        assert!((after.y - before.y).abs() < TOL);
        assert!((after.length() - before.length()).abs() < TOL);
        // (0, y, 600) rotated by +90 deg about Y lands on +X.
        assert!((after.x - 600.0).abs() < TOL && after.z.abs() < TOL);

        for _ in 0..3 {
            cam.orbit_by_step(90.0);
        }
        assert!((cam.state().position - before).length() < TOL);
    }

    #[test]
    fn pan_moves_along_right_vector_only() {
        let mut cam = OrbitCamera::default();
        let before = cam.state();
        cam.pan(10.0, 0.0);
        let after = cam.state();
        let moved = after.position - before.position;
        let right = before.right();
        // Parallel to right (negative direction for positive delta).
        assert!(moved.cross(right).length() < TOL);
        assert!((moved.dot(right) + 10.0).abs() < TOL);
        assert_eq!(after.target, before.target);
    }

    #[test]
    fn pan_up_and_clamp() {
        let mut cam = OrbitCamera::default();
        cam.pan(0.0, 5.0);
        assert_eq!(cam.state().target, Vec3::ZERO);
        for _ in 0..100 {
            cam.pan(1.0e4, -1.0e4);
            assert!(in_range(&cam));
        }
    }

    #[test]
    fn reset_is_idempotent() {
        let mut cam = OrbitCamera::default();
        cam.orbit(100.0, 20.0);
        cam.zoom(250.0);
        cam.pan(30.0, 12.0);
        cam.reset();
        let first = cam.state();
        cam.reset();
        assert_eq!(first, cam.state());
        assert_eq!(first, CameraState::default());
    }

    #[test]
    fn settings_are_sanitized() {
        let cam = OrbitCamera::new(CameraSettings {
            min_distance: 3000.0,
            max_distance: 50.0,
            default_position: [0.0, 0.0, 0.0],
            rotate_sensitivity: f32::NAN,
            ..CameraSettings::default()
        });
        let s = cam.settings();
        assert!(s.min_distance <= s.max_distance);
        assert!(s.rotate_sensitivity.is_finite());
        assert!(in_range(&cam));
    }
}
