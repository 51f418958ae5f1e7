use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use glam::Vec3;
use winit::window::CursorIcon;

use crate::viewer::graphics::{
    BackendResult, CpuMesh, GeometryHandle, HeadlessBackend, Material, RenderBackend, Transform,
    VisualWorld,
};
use crate::viewer::scene::{ObjectKind, RoiShape, RoiSpec};
use crate::viewer::{
    ContainerBounds, DisplayMode, MenuAction, PointerButton, ToolMode, ToolbarAction, Viewer,
    ViewerConfig, ViewerEvent, ViewerHost, ViewerKey, mock_data,
};

type Journal = Rc<RefCell<Vec<String>>>;

/// Host that writes every call into a shared journal.
#[derive(Default)]
struct RecordingHost {
    journal: Journal,
    cursors: Vec<CursorIcon>,
    fallback: Option<String>,
}

impl RecordingHost {
    fn with_journal(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            ..Self::default()
        }
    }

    fn count(&self, entry: &str) -> usize {
        self.journal.borrow().iter().filter(|e| *e == entry).count()
    }
}

impl ViewerHost for RecordingHost {
    fn request_frame(&mut self) {
        self.journal.borrow_mut().push("request_frame".to_string());
    }

    fn cancel_frames(&mut self) {
        self.journal.borrow_mut().push("cancel_frames".to_string());
    }

    fn set_cursor(&mut self, cursor: CursorIcon) {
        self.cursors.push(cursor);
    }

    fn detach_listeners(&mut self) {
        self.journal.borrow_mut().push("detach_listeners".to_string());
    }

    fn show_fallback(&mut self, message: &str) {
        self.fallback = Some(message.to_string());
    }
}

/// Headless backend that also journals releases.
struct JournalBackend {
    inner: HeadlessBackend,
    journal: Journal,
}

impl RenderBackend for JournalBackend {
    fn upload_mesh(&mut self, mesh: &CpuMesh, material: &Material) -> BackendResult<GeometryHandle> {
        self.inner.upload_mesh(mesh, material)
    }

    fn set_material(&mut self, handle: GeometryHandle, material: &Material) -> BackendResult<()> {
        self.inner.set_material(handle, material)
    }

    fn set_transform(&mut self, handle: GeometryHandle, transform: &Transform) -> BackendResult<()> {
        self.inner.set_transform(handle, transform)
    }

    fn set_visible(&mut self, handle: GeometryHandle, visible: bool) -> BackendResult<()> {
        self.inner.set_visible(handle, visible)
    }

    fn release(&mut self, handle: GeometryHandle) -> BackendResult<()> {
        self.journal.borrow_mut().push("release".to_string());
        self.inner.release(handle)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.inner.resize(width, height)
    }

    fn draw_frame(&mut self, visual_world: &VisualWorld) -> BackendResult<()> {
        self.inner.draw_frame(visual_world)
    }
}

const BOUNDS: ContainerBounds = ContainerBounds { width: 1024, height: 768 };

fn viewer() -> Viewer<HeadlessBackend, RecordingHost> {
    Viewer::new(
        ViewerConfig::default(),
        Some(HeadlessBackend::new()),
        Some(BOUNDS),
        RecordingHost::default(),
    )
}

fn later() -> Instant {
    Instant::now() + Duration::from_secs(1)
}

fn click(viewer: &mut Viewer<HeadlessBackend, RecordingHost>, x: f32, y: f32, button: PointerButton) {
    viewer.handle_event(ViewerEvent::PointerDown { x, y, button });
    viewer.handle_event(ViewerEvent::PointerUp { x, y, button });
}

#[test]
fn mock_viewer_builds_seven_objects_and_wireframe_touches_rois_only() {
    let mut v = viewer();
    let scene = v.scene().unwrap();
    assert_eq!(scene.len(), 7);
    assert_eq!(v.backend().unwrap().live_count(), 11);

    v.toolbar(ToolbarAction::SetDisplayMode(DisplayMode::Wireframe));

    let scene = v.scene().unwrap();
    let backend = v.backend().unwrap();
    for (_, object) in scene.traverse(|_| true) {
        let wire = object
            .handles()
            .iter()
            .all(|&h| backend.geometry(h).unwrap().material.wireframe);
        assert_eq!(wire, object.is(ObjectKind::Roi), "{}", object.name);
    }
}

#[test]
fn ticks_draw_every_visible_handle() {
    let mut v = viewer();
    v.tick(Instant::now());
    v.tick(Instant::now());
    let backend = v.backend().unwrap();
    assert_eq!(backend.frame_count(), 2);
    assert_eq!(backend.last_frame().unwrap().instances, 11);
    assert_eq!(v.animation().unwrap().frame_count(), 2);
}

#[test]
fn rapid_maximize_toggle_applies_final_bounds_once() {
    let mut v = viewer();
    assert_eq!(v.backend().unwrap().resizes(), &[(1024, 768)]);

    v.toolbar(ToolbarAction::ToggleMaximize);
    v.set_container_bounds(ContainerBounds::new(1920, 1080));
    v.toolbar(ToolbarAction::ToggleMaximize);
    v.set_container_bounds(ContainerBounds::new(1024, 700));
    assert!(!v.maximized());

    // Not settled yet.
    v.tick(Instant::now());
    assert_eq!(v.backend().unwrap().resizes().len(), 1);

    v.tick(later());
    v.tick(later() + Duration::from_secs(1));
    assert_eq!(v.backend().unwrap().resizes(), &[(1024, 768), (1024, 700)]);
}

#[test]
fn destroy_stops_releases_then_detaches() {
    let journal = Journal::default();
    let backend = JournalBackend {
        inner: HeadlessBackend::new(),
        journal: journal.clone(),
    };
    let mut v = Viewer::new(
        ViewerConfig::default(),
        Some(backend),
        Some(BOUNDS),
        RecordingHost::with_journal(&journal),
    );
    journal.borrow_mut().clear();

    let report = v.destroy();
    assert_eq!(report.released, 11);
    assert_eq!(report.failed, 0);

    let entries = journal.borrow().clone();
    assert_eq!(entries.first().map(String::as_str), Some("cancel_frames"));
    assert_eq!(entries.last().map(String::as_str), Some("detach_listeners"));
    assert_eq!(entries.iter().filter(|e| *e == "release").count(), 11);
    assert_eq!(v.backend().unwrap().inner.live_count(), 0);

    // Idempotent, and everything afterwards is a no-op.
    assert_eq!(v.destroy().released, 0);
    v.tick(later());
    v.handle_event(ViewerEvent::Wheel { delta_y: 100.0 });
    v.toolbar(ToolbarAction::ToggleMaximize);
    assert!(v.set_roi_list(&mock_data::roi_list()).is_empty());
    assert_eq!(journal.borrow().len(), entries.len());
    assert_eq!(v.backend().unwrap().inner.frame_count(), 0);
    assert_eq!(v.host().count("detach_listeners"), 1);
}

#[test]
fn teardown_continues_past_failed_release() {
    let mut backend = HeadlessBackend::new();
    backend.fail_release_of(GeometryHandle(3));
    let mut v = Viewer::new(ViewerConfig::default(), Some(backend), Some(BOUNDS), RecordingHost::default());

    let report = v.destroy();
    assert_eq!(report.released, 10);
    assert_eq!(report.failed, 1);
    assert_eq!(v.host().count("detach_listeners"), 1);
}

#[test]
fn missing_backend_makes_an_inert_viewer() {
    let mut v: Viewer<HeadlessBackend, RecordingHost> =
        Viewer::new(ViewerConfig::default(), None, Some(BOUNDS), RecordingHost::default());
    assert!(v.is_inert());
    assert!(v.host().fallback.as_deref().unwrap().contains("backend"));

    v.handle_event(ViewerEvent::PointerDown { x: 1.0, y: 1.0, button: PointerButton::Primary });
    v.toolbar(ToolbarAction::SelectTool(ToolMode::Pan));
    v.tick(later());
    assert_eq!(v.camera_state(), None);
    assert_eq!(v.tool_mode(), None);
    assert!(v.menu_items().is_empty());
    assert_eq!(v.host().count("request_frame"), 0);
}

#[test]
fn missing_container_makes_an_inert_viewer() {
    let v = Viewer::new(
        ViewerConfig::default(),
        Some(HeadlessBackend::new()),
        None,
        RecordingHost::default(),
    );
    assert!(v.is_inert());
    assert!(v.host().fallback.as_deref().unwrap().contains("container"));
    assert!(v.scene().is_none());
}

#[test]
fn toolbar_toggles_but_context_menu_always_sets() {
    let mut v = viewer();
    v.toolbar(ToolbarAction::SelectTool(ToolMode::Pan));
    v.toolbar(ToolbarAction::SelectTool(ToolMode::Pan));
    assert_eq!(v.tool_mode(), Some(ToolMode::Rotate));

    v.activate_menu_item(MenuAction::SelectTool(ToolMode::Pan));
    v.activate_menu_item(MenuAction::SelectTool(ToolMode::Pan));
    assert_eq!(v.tool_mode(), Some(ToolMode::Pan));
}

#[test]
fn pan_cursor_follows_drag() {
    let mut v = viewer();
    assert_eq!(v.host().cursors, vec![CursorIcon::Crosshair]);

    v.toolbar(ToolbarAction::SelectTool(ToolMode::Pan));
    v.handle_event(ViewerEvent::PointerDown { x: 50.0, y: 50.0, button: PointerButton::Primary });
    assert_eq!(v.cursor(), Some(CursorIcon::Grabbing));
    v.handle_event(ViewerEvent::PointerMove { x: 60.0, y: 50.0 });
    v.handle_event(ViewerEvent::PointerUp { x: 60.0, y: 50.0, button: PointerButton::Primary });

    assert_eq!(
        v.host().cursors,
        vec![CursorIcon::Crosshair, CursorIcon::Grab, CursorIcon::Grabbing, CursorIcon::Grab]
    );
    assert_eq!(v.camera_state().unwrap().target, Vec3::ZERO);
}

#[test]
fn context_menu_item_hides_beams() {
    let mut v = viewer();
    click(&mut v, 400.0, 300.0, PointerButton::Secondary);
    assert!(v.context_menu().unwrap().is_open());

    let beams_item = v
        .menu_items()
        .into_iter()
        .find(|i| i.action == MenuAction::ToggleBeams)
        .unwrap();
    assert_eq!(beams_item.checked, Some(true));

    // Seventh row.
    click(&mut v, 410.0, 300.0 + 24.0 * 6.5, PointerButton::Primary);
    assert!(!v.context_menu().unwrap().is_open());
    assert!(!v.scene().unwrap().beams_visible());

    v.tick(Instant::now());
    // 11 handles minus 2 per beam.
    assert_eq!(v.backend().unwrap().last_frame().unwrap().instances, 5);
    // Per-beam flags are untouched.
    let scene = v.scene().unwrap();
    assert!(scene.traverse(|o| o.is(ObjectKind::Beam)).all(|(_, o)| o.visible));
}

#[test]
fn wheel_zooms_in_rotate_mode() {
    let mut v = viewer();
    let before = v.camera_state().unwrap().distance();
    v.handle_event(ViewerEvent::Wheel { delta_y: 100.0 });
    let after = v.camera_state().unwrap().distance();
    assert!((after - before).abs() > 1.0);
}

#[test]
fn escape_resets_view_tool_and_maximize() {
    let mut v = viewer();
    let home = v.camera_state().unwrap();
    v.toolbar(ToolbarAction::SelectTool(ToolMode::Zoom));
    v.toolbar(ToolbarAction::ToggleMaximize);
    v.toolbar(ToolbarAction::RotateStep);
    assert_ne!(v.camera_state().unwrap(), home);

    v.handle_event(ViewerEvent::KeyDown(ViewerKey::Escape));
    assert_eq!(v.camera_state().unwrap(), home);
    assert_eq!(v.tool_mode(), Some(ToolMode::Rotate));
    assert!(!v.maximized());
}

#[test]
fn reset_view_restores_default_tool() {
    let mut v = viewer();
    let home = v.camera_state().unwrap();

    v.toolbar(ToolbarAction::SelectTool(ToolMode::Pan));
    v.toolbar(ToolbarAction::RotateStep);
    v.toolbar(ToolbarAction::ResetView);
    assert_eq!(v.camera_state().unwrap(), home);
    assert_eq!(v.tool_mode(), Some(ToolMode::Rotate));
    assert_eq!(v.cursor(), Some(CursorIcon::Crosshair));
    assert_eq!(v.host().cursors.last(), Some(&CursorIcon::Crosshair));

    v.activate_menu_item(MenuAction::SelectTool(ToolMode::Zoom));
    v.toolbar(ToolbarAction::RotateStep);
    v.activate_menu_item(MenuAction::ResetView);
    assert_eq!(v.camera_state().unwrap(), home);
    assert_eq!(v.tool_mode(), Some(ToolMode::Rotate));
    assert_eq!(v.host().cursors.last(), Some(&CursorIcon::Crosshair));
}

#[test]
fn context_menu_maximize_matches_toolbar() {
    let mut v = viewer();
    v.activate_menu_item(MenuAction::ToggleMaximize);
    assert!(v.maximized());
    let item = v
        .menu_items()
        .into_iter()
        .find(|i| i.action == MenuAction::ToggleMaximize)
        .unwrap();
    assert_eq!(item.checked, Some(true));

    v.toolbar(ToolbarAction::ToggleMaximize);
    assert!(!v.maximized());
}

#[test]
fn replacing_roi_list_keeps_other_objects() {
    let mut v = viewer();
    let ids = v.set_roi_list(&[RoiSpec {
        name: "Heart".to_string(),
        color: crate::viewer::graphics::Color::rgb(0.8, 0.2, 0.2),
        shape: RoiShape::Ellipsoid {
            radii: Vec3::new(50.0, 40.0, 45.0),
        },
        offset: Some(Vec3::new(60.0, 0.0, 0.0)),
        visible: true,
    }]);
    assert_eq!(ids.len(), 1);

    let scene = v.scene().unwrap();
    let counts = scene.count_by_kind();
    assert_eq!(counts[&ObjectKind::Roi], 1);
    assert_eq!(counts[&ObjectKind::Beam], 3);
    assert_eq!(scene.len(), 6);
    assert_eq!(v.backend().unwrap().live_count(), 10);

    v.set_beam_list(&[]);
    assert_eq!(v.scene().unwrap().len(), 3);
}
