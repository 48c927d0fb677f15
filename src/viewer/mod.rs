//! Progressive path-tracer viewer: camera, input, automation and render loop.

mod app;
mod automation;
mod backend;
mod camera;
pub mod export;
mod headless;
mod input;
mod scene;
mod session;
mod settings;
mod state;
mod surface;

pub use app::{RunBudget, Viewer, MAX_DEFERRED_RESETS};
pub use automation::{AutomationPath, AutomationSettings, CameraAutomation};
pub use backend::{BackendResources, ComputeBackend, DispatchParams, ResourceState};
pub use camera::{clamp_polar, CameraFrame, CameraUniform, OrbitCamera, SphericalCameraState, POLAR_EPSILON, WORLD_UP};
pub use export::ImageExporter;
pub use headless::HeadlessBackend;
pub use input::{
    camera_action, AppCommand, ButtonAction, ButtonMask, CameraAction, InputCapture, InputController,
    InputEvent, InputResponse, Key, KeyAction, MouseButton, NoCapture, AZIMUTH_STEP, KEY_STEP, PAN_SPEED,
};
pub use scene::{SceneCamera, SceneDescriptor};
pub use session::{CameraSignal, RenderLoop, RenderSession, TickOutcome, TickReport};
pub use settings::{DebugSettings, DebugView, DenoiseSettings, Settings, TracerSettings};
pub use state::ViewerState;
pub use surface::{HostSurface, MappedSurface, OutputSurface, Rgba8};

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;

/// Render `scene_path` headless until its sample target or the tick cap is
/// reached, then save the image.
pub fn run(scene_path: PathBuf) -> Result<()> {
    env_logger::init();

    let _trace_guard = init_tracing();

    let settings = Settings::load();
    let scene = SceneDescriptor::load(&scene_path)
        .with_context(|| format!("Failed to load scene {}", scene_path.display()))?;

    let budget = RunBudget::new(scene.camera.iterations, settings.max_ticks);
    let resolution = scene.camera.resolution();
    log::info!(
        "Rendering {} at {}x{}, {} samples (at most {} ticks)",
        scene_path.display(),
        resolution.x,
        resolution.y,
        budget.iterations,
        budget.max_ticks
    );

    let mut viewer = Viewer::new(
        scene,
        settings.clone(),
        HeadlessBackend::new(),
        HostSurface::new(resolution.x, resolution.y),
        ImageExporter::new(),
    )
    .context("Failed to initialize backend")?;

    let ticks = viewer.run_for(budget).context("Render failed")?;
    log::info!("{} samples after {} ticks", viewer.sample_count(), ticks);

    let path = viewer.save_image().context("Failed to save image")?;
    log::info!("Wrote {}", path.display());
    settings.save();
    Ok(())
}

/// Chrome trace output to `trace.json`, enabled with `PT_TRACE=1`.
fn init_tracing() -> Option<tracing_chrome::FlushGuard> {
    if std::env::var("PT_TRACE").ok().as_deref() != Some("1") {
        return None;
    }

    let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
        .file("trace.json")
        .build();

    let subscriber = tracing_subscriber::registry().with(chrome_layer);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return None;
    }

    Some(guard)
}
