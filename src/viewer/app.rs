//! Host application: owns the viewer state, render loop and output surface
//! and routes window events to them.

use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info, warn};

use super::backend::ComputeBackend;
use super::export::ImageExporter;
use super::input::{AppCommand, InputCapture, InputController, InputEvent};
use super::scene::SceneDescriptor;
use super::session::{CameraSignal, RenderLoop, TickOutcome, TickReport};
use super::settings::Settings;
use super::state::ViewerState;
use super::surface::OutputSurface;
use crate::util::{Error, Result};

/// Consecutive failed resets after which a frame reports the failure.
pub const MAX_DEFERRED_RESETS: u32 = 3;

/// Stop condition for an unattended run.
///
/// Camera motion can keep the sample count from ever reaching `iterations`
/// (without the denoiser every move restarts it), so ticks are capped too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunBudget {
    /// Samples wanted in the final image
    pub iterations: u64,
    /// Ticks after which the run ends regardless of samples
    pub max_ticks: u64,
}

impl RunBudget {
    /// Tick cap defaults to `iterations` when no explicit cap is given.
    pub fn new(iterations: u32, max_ticks: Option<u64>) -> Self {
        let iterations = u64::from(iterations);
        Self {
            iterations,
            max_ticks: max_ticks.unwrap_or(iterations),
        }
    }

    pub fn is_exhausted(&self, ticks: u64, samples: u64) -> bool {
        samples >= self.iterations || ticks >= self.max_ticks
    }
}

pub struct Viewer<B: ComputeBackend, S: OutputSurface> {
    state: ViewerState,
    render: RenderLoop<B>,
    surface: S,
    input: InputController,
    exporter: ImageExporter,
    /// Camera changes since the last tick
    pending: CameraSignal,
    running: bool,
    step_requested: bool,
    deferred_resets: u32,
    quit: bool,
}

impl<B: ComputeBackend, S: OutputSurface> Viewer<B, S> {
    pub fn new(
        scene: SceneDescriptor,
        settings: Settings,
        backend: B,
        surface: S,
        exporter: ImageExporter,
    ) -> Result<Self> {
        let state = ViewerState::new(&scene, settings);
        let render = RenderLoop::new(backend, Arc::new(scene))?;
        Ok(Self {
            state,
            render,
            surface,
            input: InputController::new(),
            exporter,
            pending: CameraSignal::default(),
            running: true,
            step_requested: false,
            deferred_resets: 0,
            quit: false,
        })
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewerState {
        &mut self.state
    }

    pub fn render_loop(&self) -> &RenderLoop<B> {
        &self.render
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn sample_count(&self) -> u64 {
        self.state.session.sample_count
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    /// Render exactly one tick on the next frame while paused.
    pub fn step(&mut self) {
        self.step_requested = true;
    }

    /// Route one window event. Returns the saved path if the event asked for one.
    pub fn handle_event(&mut self, event: InputEvent, capture: &dyn InputCapture) -> Result<Option<PathBuf>> {
        let response = self.input.handle(&mut self.state.camera, event, capture);
        self.pending.merge(response.camera_changed);

        match response.command {
            Some(AppCommand::SaveImage) => self.save_image().map(Some),
            Some(AppCommand::SaveAndQuit) => {
                self.quit = true;
                self.save_image().map(Some)
            }
            None => Ok(None),
        }
    }

    /// Host frame callback. Ticks the render loop unless paused.
    ///
    /// Returns `Ok(None)` when no tick ran. A reset that keeps failing
    /// [`MAX_DEFERRED_RESETS`] times in a row is returned as an error.
    pub fn frame(&mut self) -> Result<Option<TickReport>> {
        if !self.running && !self.step_requested {
            return Ok(None);
        }
        self.step_requested = false;

        let signal = self.pending.take();
        let report = self.render.tick(&mut self.state, signal, &mut self.surface)?;

        match report.outcome {
            TickOutcome::ResetDeferred(e) if self.deferred_resets + 1 >= MAX_DEFERRED_RESETS => {
                error!("backend reset failed {MAX_DEFERRED_RESETS} times in a row");
                self.deferred_resets = 0;
                return Err(e);
            }
            TickOutcome::ResetDeferred(_) => {
                self.deferred_resets += 1;
                warn!("reset deferred ({}/{MAX_DEFERRED_RESETS})", self.deferred_resets);
            }
            TickOutcome::Dispatched { .. } => self.deferred_resets = 0,
        }
        Ok(Some(report))
    }

    /// Tick until `budget` runs out or a quit is requested. Returns the
    /// number of ticks run.
    ///
    /// Resets that keep failing are logged and retried on later ticks.
    /// Surface and dispatch errors end the run.
    pub fn run_for(&mut self, budget: RunBudget) -> Result<u64> {
        let mut ticks = 0;
        while !self.quit && !budget.is_exhausted(ticks, self.sample_count()) {
            match self.frame() {
                Ok(_) => {}
                Err(e @ Error::BackendInit { .. }) => warn!("{e}, retrying"),
                Err(e) => return Err(e),
            }
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Write the current surface contents to disk.
    pub fn save_image(&self) -> Result<PathBuf> {
        let (width, height) = self.surface.size();
        let name = &self.render.scene().camera.image_name;
        let samples = self.state.session.sample_count;
        info!("Saving {name} after {samples} samples");
        self.exporter.save(width, height, self.surface.pixels(), name, samples)
    }
}
