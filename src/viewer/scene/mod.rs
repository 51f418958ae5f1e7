//! Scene graph store: the set of clinical objects on screen.
//!
//! Objects own backend geometry handles. Every path that drops an object
//! (`remove`, `remove_kind`, `remove_all`) releases its handles through the
//! backend, one at a time, so a failed release never blocks the others.

pub mod display_mode;
pub mod object;


use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::viewer::ViewerResult;
use crate::viewer::graphics::{Color, CpuMesh, GeometryHandle, Material, MeshFactory, RenderBackend, Transform};

pub use display_mode::DisplayMode;
pub use object::{
    Beam, BeamSpec, Isocenter, ObjectKind, ReferencePlane, Roi, RoiShape, RoiSpec, SceneObject,
    SceneObjectKind,
};

new_key_type! {
    /// Scene object id. Versioned, so an id is never handed out again after
    /// its object is removed.
    pub struct ObjectId;
}

/// Scene construction tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Source-to-isocenter distance used to place beam apertures.
    pub beam_source_distance: f32,
    pub reference_plane_size: f32,
    /// Height of the reference plane below the origin.
    pub reference_plane_drop: f32,
    pub crosshair_size: f32,
    pub marker_radius: f32,
    pub segments: u32,
    pub rings: u32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            beam_source_distance: 400.0,
            reference_plane_size: 1000.0,
            reference_plane_drop: 200.0,
            crosshair_size: 60.0,
            marker_radius: 4.0,
            segments: 32,
            rings: 16,
        }
    }
}

/// Outcome of a batch of releases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub released: usize,
    pub failed: usize,
}

impl TeardownReport {
    fn merge(&mut self, other: TeardownReport) {
        self.released += other.released;
        self.failed += other.failed;
    }
}

#[derive(Debug)]
pub struct SceneGraph {
    settings: SceneSettings,
    objects: SlotMap<ObjectId, SceneObject>,
    /// Insertion order, for stable enumeration.
    order: Vec<ObjectId>,
    display_mode: DisplayMode,
    beams_visible: bool,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(SceneSettings::default())
    }
}

impl SceneGraph {
    pub fn new(settings: SceneSettings) -> Self {
        Self {
            settings,
            objects: SlotMap::with_key(),
            order: Vec::new(),
            display_mode: DisplayMode::default(),
            beams_visible: true,
        }
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn beams_visible(&self) -> bool {
        self.beams_visible
    }

    pub fn count_by_kind(&self) -> HashMap<ObjectKind, usize> {
        let mut counts = HashMap::new();
        for object in self.objects.values() {
            *counts.entry(object.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Objects matching `predicate`, in insertion order.
    pub fn traverse<P>(&self, predicate: P) -> impl Iterator<Item = (ObjectId, &SceneObject)>
    where
        P: Fn(&SceneObject) -> bool,
    {
        self.order.iter().filter_map(move |&id| {
            let object = self.objects.get(id)?;
            predicate(object).then_some((id, object))
        })
    }

    /// Objects that should end up in the next frame.
    pub fn drawable(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        let beams_visible = self.beams_visible;
        self.traverse(move |o| effective_visibility(o, beams_visible))
    }

    pub fn add_roi(&mut self, backend: &mut dyn RenderBackend, spec: &RoiSpec) -> ViewerResult<ObjectId> {
        let mesh = match spec.shape {
            RoiShape::Ellipsoid { radii } => {
                MeshFactory::ellipsoid(radii, self.settings.segments, self.settings.rings)
            }
            RoiShape::Cylinder { radius, height } => {
                MeshFactory::cylinder(radius, height, self.settings.segments)
            }
        };
        let material = self.display_mode.roi_material(spec.color);
        let offset = spec.offset.filter(|o| o.is_finite());
        let transform = Transform::from_translation(offset.unwrap_or(Vec3::ZERO));

        let kind = SceneObjectKind::Roi(Roi {
            color: spec.color,
            shape: spec.shape,
            offset,
        });
        self.spawn(backend, &spec.name, spec.visible, transform, kind, &[(mesh, material)])
    }

    pub fn add_beam(&mut self, backend: &mut dyn RenderBackend, spec: &BeamSpec) -> ViewerResult<ObjectId> {
        let angle = if spec.gantry_angle.is_finite() { spec.gantry_angle.rem_euclid(360.0) } else { 0.0 };
        let isocenter = if spec.isocenter.is_finite() { spec.isocenter } else { Vec3::ZERO };
        let distance = self.settings.beam_source_distance;
        let aperture = Beam::aperture_transform(angle, isocenter, distance);

        let [w, h] = spec.field_size;
        let meshes = [
            (MeshFactory::rectangle_outline(w, h), Material::opaque(spec.color)),
            // Central axis from the source to the isocenter, in aperture space.
            (
                MeshFactory::segment(Vec3::ZERO, Vec3::new(0.0, 0.0, -distance)),
                Material::translucent(spec.color, 0.5),
            ),
        ];

        let kind = SceneObjectKind::Beam(Beam {
            gantry_angle: angle,
            field_size: [w, h],
            isocenter,
            color: spec.color,
            aperture,
        });
        self.spawn(backend, &spec.name, spec.visible, aperture, kind, &meshes)
    }

    pub fn add_isocenter(&mut self, backend: &mut dyn RenderBackend, position: Vec3) -> ViewerResult<ObjectId> {
        let position = if position.is_finite() { position } else { Vec3::ZERO };
        let material = Material::opaque(Color::YELLOW);
        let r = self.settings.marker_radius;
        let meshes = [
            (MeshFactory::crosshair(self.settings.crosshair_size), material),
            (MeshFactory::ellipsoid(Vec3::splat(r), 12, 6), material),
        ];
        let kind = SceneObjectKind::Isocenter(Isocenter { position });
        self.spawn(
            backend,
            "Isocenter",
            true,
            Transform::from_translation(position),
            kind,
            &meshes,
        )
    }

    pub fn add_reference_plane(&mut self, backend: &mut dyn RenderBackend) -> ViewerResult<ObjectId> {
        let size = self.settings.reference_plane_size;
        let meshes = [(MeshFactory::plane(size, size), Material::translucent(Color::GREY, 0.15))];
        let transform = Transform::from_translation(Vec3::new(0.0, -self.settings.reference_plane_drop, 0.0));
        let kind = SceneObjectKind::ReferencePlane(ReferencePlane { size });
        self.spawn(backend, "Reference plane", true, transform, kind, &meshes)
    }

    /// Returns `false` for an unknown id.
    pub fn set_visibility(&mut self, backend: &mut dyn RenderBackend, id: ObjectId, visible: bool) -> bool {
        let beams_visible = self.beams_visible;
        let Some(object) = self.objects.get_mut(id) else {
            return false;
        };
        object.visible = visible;
        push_visibility(backend, object, effective_visibility(object, beams_visible));
        true
    }

    /// Switch every ROI to `mode`. Returns how many objects were restyled.
    pub fn set_display_mode(&mut self, backend: &mut dyn RenderBackend, mode: DisplayMode) -> usize {
        self.display_mode = mode;
        let mut touched = 0;
        for object in self.objects.values_mut() {
            let material = match &object.kind {
                SceneObjectKind::Roi(roi) => mode.roi_material(roi.color),
                SceneObjectKind::Beam(_)
                | SceneObjectKind::Isocenter(_)
                | SceneObjectKind::ReferencePlane(_) => continue,
            };
            for &h in &object.handles {
                if let Err(err) = backend.set_material(h, &material) {
                    log::warn!("[SceneGraph] set_material {:?} on '{}': {}", h, object.name, err);
                }
            }
            touched += 1;
        }
        log::debug!("[SceneGraph] display mode -> {:?} ({} ROIs)", mode, touched);
        touched
    }

    /// Show or hide all beams at once, independent of each beam's own flag.
    pub fn set_beams_visible(&mut self, backend: &mut dyn RenderBackend, visible: bool) {
        self.beams_visible = visible;
        for object in self.objects.values().filter(|o| o.is(ObjectKind::Beam)) {
            push_visibility(backend, object, effective_visibility(object, visible));
        }
    }

    /// Remove one object and release its resources.
    pub fn remove(&mut self, backend: &mut dyn RenderBackend, id: ObjectId) -> Option<TeardownReport> {
        let object = self.objects.remove(id)?;
        self.order.retain(|&o| o != id);
        Some(release_handles(backend, &object.name, &object.handles))
    }

    pub fn remove_kind(&mut self, backend: &mut dyn RenderBackend, kind: ObjectKind) -> TeardownReport {
        let ids: Vec<ObjectId> = self.traverse(|o| o.is(kind)).map(|(id, _)| id).collect();
        let mut report = TeardownReport::default();
        for id in ids {
            if let Some(r) = self.remove(backend, id) {
                report.merge(r);
            }
        }
        report
    }

    /// Drop every object. Ids stay retired.
    pub fn remove_all(&mut self, backend: &mut dyn RenderBackend) -> TeardownReport {
        let mut report = TeardownReport::default();
        for id in std::mem::take(&mut self.order) {
            if let Some(object) = self.objects.remove(id) {
                report.merge(release_handles(backend, &object.name, &object.handles));
            }
        }
        if report.failed > 0 {
            log::warn!(
                "[SceneGraph] teardown: {} released, {} failed",
                report.released,
                report.failed
            );
        } else {
            log::debug!("[SceneGraph] teardown: {} released", report.released);
        }
        report
    }

    /// Replace every ROI with `list`. Entries the backend rejects are logged and skipped.
    pub fn replace_rois(&mut self, backend: &mut dyn RenderBackend, list: &[RoiSpec]) -> Vec<ObjectId> {
        self.remove_kind(backend, ObjectKind::Roi);
        list.iter()
            .filter_map(|spec| match self.add_roi(backend, spec) {
                Ok(id) => Some(id),
                Err(err) => {
                    log::warn!("[SceneGraph] skipping ROI '{}': {}", spec.name, err);
                    None
                }
            })
            .collect()
    }

    /// Replace every beam with `list`. Entries the backend rejects are logged and skipped.
    pub fn replace_beams(&mut self, backend: &mut dyn RenderBackend, list: &[BeamSpec]) -> Vec<ObjectId> {
        self.remove_kind(backend, ObjectKind::Beam);
        list.iter()
            .filter_map(|spec| match self.add_beam(backend, spec) {
                Ok(id) => Some(id),
                Err(err) => {
                    log::warn!("[SceneGraph] skipping beam '{}': {}", spec.name, err);
                    None
                }
            })
            .collect()
    }

    /// Upload meshes and register the object. A failed upload releases what
    /// was already uploaded for this object.
    fn spawn(
        &mut self,
        backend: &mut dyn RenderBackend,
        name: &str,
        visible: bool,
        transform: Transform,
        kind: SceneObjectKind,
        meshes: &[(CpuMesh, Material)],
    ) -> ViewerResult<ObjectId> {
        let mut handles = Vec::with_capacity(meshes.len());
        for (mesh, material) in meshes {
            match backend.upload_mesh(mesh, material) {
                Ok(h) => handles.push(h),
                Err(err) => {
                    release_handles(backend, name, &handles);
                    return Err(err.into());
                }
            }
        }

        let object = SceneObject {
            name: name.to_string(),
            visible,
            kind,
            transform,
            handles,
        };
        let shown = effective_visibility(&object, self.beams_visible);
        for &h in &object.handles {
            if let Err(err) = backend.set_transform(h, &object.transform) {
                log::warn!("[SceneGraph] set_transform {:?} on '{}': {}", h, name, err);
            }
        }
        push_visibility(backend, &object, shown);

        let kind = object.kind();
        let id = self.objects.insert(object);
        self.order.push(id);
        log::debug!("[SceneGraph] added {:?} '{}' as {:?}", kind, name, id);
        Ok(id)
    }
}

fn effective_visibility(object: &SceneObject, beams_visible: bool) -> bool {
    match object.kind {
        SceneObjectKind::Beam(_) => object.visible && beams_visible,
        SceneObjectKind::Roi(_) | SceneObjectKind::Isocenter(_) | SceneObjectKind::ReferencePlane(_) => {
            object.visible
        }
    }
}

fn push_visibility(backend: &mut dyn RenderBackend, object: &SceneObject, visible: bool) {
    for &h in &object.handles {
        if let Err(err) = backend.set_visible(h, visible) {
            log::warn!("[SceneGraph] set_visible {:?} on '{}': {}", h, object.name, err);
        }
    }
}

fn release_handles(backend: &mut dyn RenderBackend, name: &str, handles: &[GeometryHandle]) -> TeardownReport {
    let mut report = TeardownReport::default();
    for &h in handles {
        match backend.release(h) {
            Ok(()) => report.released += 1,
            Err(err) => {
                log::warn!("[SceneGraph] release {:?} of '{}' failed: {}", h, name, err);
                report.failed += 1;
            }
        }
    }
    report
}
