//! End-to-end tests driving the viewer with the CPU backend.

use std::f32::consts::PI;
use std::path::Path;

use pathtrace_viewer::viewer::{
    ButtonAction, HeadlessBackend, HostSurface, ImageExporter, InputEvent, Key, KeyAction, MouseButton,
    NoCapture, OutputSurface, SceneDescriptor, Settings, TickOutcome, Viewer,
};
use pathtrace_viewer::Error;

const ORBIT_SCENE: &str = r#"{
    "camera": {
        "resolution": [1000, 4],
        "fov_y": 45.0,
        "position": [0.0, 0.0, 5.0],
        "look_at": [0.0, 0.0, 0.0],
        "image_name": "orbit",
        "iterations": 8
    }
}"#;

fn viewer(json: &str, settings: Settings, out: &Path) -> Viewer<HeadlessBackend, HostSurface> {
    let scene = SceneDescriptor::from_json(json).expect("valid scene");
    let res = scene.camera.resolution();
    Viewer::new(
        scene,
        settings,
        HeadlessBackend::new(),
        HostSurface::new(res.x, res.y),
        ImageExporter::new().with_output_dir(out),
    )
    .expect("backend init")
}

fn primary(action: ButtonAction) -> InputEvent {
    InputEvent::Button { button: MouseButton::Primary, action }
}

#[test]
fn test_load_scene_render_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let scene_path = dir.path().join("scene.json");
    std::fs::write(&scene_path, ORBIT_SCENE).unwrap();

    let scene = SceneDescriptor::load(&scene_path).unwrap();
    assert_eq!(scene.source.as_deref(), Some(scene_path.as_path()));
    let mut v = Viewer::new(
        scene,
        Settings::default(),
        HeadlessBackend::new(),
        HostSurface::new(1000, 4),
        ImageExporter::new().with_output_dir(dir.path()),
    )
    .unwrap();

    while v.sample_count() < 8 {
        v.frame().unwrap();
    }
    let path = v.save_image().unwrap();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("orbit."));
    assert!(name.ends_with(".8samp.png"));

    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (1000, 4));
    assert_eq!(img.as_raw().as_slice(), v.surface().as_bytes());
}

#[test]
fn test_missing_scene_is_fatal() {
    let err = SceneDescriptor::load("does/not/exist.json").unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
}

#[test]
fn test_primary_drag_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let mut v = viewer(ORBIT_SCENE, Settings::default(), dir.path());
    let state = v.state().camera.state();
    assert!((state.theta - PI / 2.0).abs() < 1e-5);
    assert!(state.phi.abs() < 1e-6);

    v.handle_event(primary(ButtonAction::Press), &NoCapture).unwrap();
    v.handle_event(InputEvent::CursorMoved { x: 100.0, y: 0.0 }, &NoCapture).unwrap();
    let report = v.frame().unwrap().unwrap();

    assert!(report.camera_recomputed);
    let cam = &v.state().camera;
    assert!((cam.state().phi + 0.1).abs() < 1e-6);
    let expected = 5.0 * (-0.1f32).sin();
    assert!((cam.frame().position.x - expected).abs() < 1e-4);
}

#[test]
fn test_camera_move_invalidates_without_denoiser() {
    let dir = tempfile::tempdir().unwrap();
    let mut v = viewer(ORBIT_SCENE, Settings::default(), dir.path());
    for _ in 0..5 {
        v.frame().unwrap();
    }
    assert_eq!(v.sample_count(), 5);

    v.handle_event(InputEvent::Key { key: Key::Period, action: KeyAction::Press }, &NoCapture)
        .unwrap();
    let report = v.frame().unwrap().unwrap();
    assert!(report.reset);
    assert_eq!(report.dispatched(), Some(0));
}

#[test]
fn test_denoiser_accumulates_through_motion() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.denoise.enabled = true;
    settings.denoise.temporal = true;
    let mut v = viewer(ORBIT_SCENE, settings, dir.path());

    for expected in 0..6u64 {
        if expected == 3 {
            v.handle_event(InputEvent::Key { key: Key::ArrowUp, action: KeyAction::Press }, &NoCapture)
                .unwrap();
        }
        let report = v.frame().unwrap().unwrap();
        assert_eq!(report.dispatched(), Some(expected));
    }
}

#[test]
fn test_denoiser_toggle_mid_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut v = viewer(ORBIT_SCENE, Settings::default(), dir.path());
    while v.sample_count() < 42 {
        v.frame().unwrap();
    }

    v.state_mut().update_settings(|s| s.denoise.enabled = true);
    assert!(v.state().session.reset_requested);

    let report = v.frame().unwrap().unwrap();
    assert!(report.reset);
    assert!(matches!(report.outcome, TickOutcome::Dispatched { sample_index: 0 }));
    assert!(!v.state().session.reset_requested);
    assert_eq!(v.sample_count(), 1);
}

#[test]
fn test_repeated_cursor_position_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut v = viewer(ORBIT_SCENE, Settings::default(), dir.path());
    v.handle_event(primary(ButtonAction::Press), &NoCapture).unwrap();
    v.handle_event(InputEvent::CursorMoved { x: 40.0, y: 1.0 }, &NoCapture).unwrap();
    v.frame().unwrap();
    let before = *v.state().camera.state();

    v.handle_event(InputEvent::CursorMoved { x: 40.0, y: 1.0 }, &NoCapture).unwrap();
    let report = v.frame().unwrap().unwrap();
    assert!(!report.camera_recomputed);
    assert_eq!(*v.state().camera.state(), before);
    assert_eq!(report.dispatched(), Some(1));
}

#[test]
fn test_automation_drives_camera() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.automation.enabled = true;
    settings.automation.speed_x = 0.05;
    settings.automation.speed_phi = 0.02;
    let mut v = viewer(ORBIT_SCENE, settings, dir.path());

    let mut last = v.state().camera.frame().position;
    for _ in 0..3 {
        let report = v.frame().unwrap().unwrap();
        assert!(report.camera_recomputed);
        let pos = v.state().camera.frame().position;
        assert_ne!(pos, last);
        last = pos;
    }
}

#[test]
fn test_escape_saves_then_quits() {
    let dir = tempfile::tempdir().unwrap();
    let mut v = viewer(ORBIT_SCENE, Settings::default(), dir.path());
    v.frame().unwrap();
    let saved = v
        .handle_event(InputEvent::Key { key: Key::Escape, action: KeyAction::Press }, &NoCapture)
        .unwrap()
        .unwrap();
    assert!(v.should_quit());
    assert!(saved.starts_with(dir.path()));
    assert_eq!(v.surface().size(), (1000, 4));
}
