//! Progressive render loop: sample counting, invalidation and dispatch.
//!
//! One [`RenderLoop::tick`] runs, in order:
//! 1. scripted camera motion, if enabled
//! 2. frame recompute when the camera changed; without the denoiser this
//!    also drops every accumulated sample
//! 3. a full backend reset when the sample count is zero or a reset was asked for
//! 4. one dispatch into the mapped output surface, then the sample count advances

use std::sync::Arc;

use log::{debug, warn};

use super::backend::{BackendResources, ComputeBackend, DispatchParams};
use super::scene::SceneDescriptor;
use super::state::ViewerState;
use super::surface::{MappedSurface, OutputSurface};
use crate::util::{Error, Result};

/// Progressive accumulation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderSession {
    /// Samples accumulated into the current image
    pub sample_count: u64,
    /// Discard samples and denoiser history before the next dispatch
    pub reset_requested: bool,
    pub denoiser_enabled: bool,
}

impl RenderSession {
    pub fn new(denoiser_enabled: bool) -> Self {
        Self {
            sample_count: 0,
            reset_requested: false,
            denoiser_enabled,
        }
    }

    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    /// Toggle the denoiser; any change needs fresh buffers.
    pub fn set_denoiser_enabled(&mut self, enabled: bool) {
        if self.denoiser_enabled != enabled {
            self.denoiser_enabled = enabled;
            self.reset_requested = true;
        }
    }

    /// The camera moved since the last tick.
    ///
    /// Without the denoiser every sample is stale. With it, temporal
    /// accumulation absorbs the motion and only explicit resets restart.
    pub fn camera_moved(&mut self) {
        if !self.denoiser_enabled {
            self.sample_count = 0;
        }
    }

    /// First frame, invalidated frame, or explicit request.
    pub fn needs_reset(&self) -> bool {
        self.reset_requested || self.sample_count == 0
    }
}

/// "Camera changed" notifications collected between two ticks.
///
/// Input handlers return whether they moved the camera; the host merges
/// those answers here and hands the signal to the next tick, which consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[must_use]
pub struct CameraSignal {
    raised: bool,
}

impl CameraSignal {
    pub const CHANGED: Self = Self { raised: true };

    pub fn raise(&mut self) {
        self.raised = true;
    }

    pub fn merge(&mut self, changed: bool) {
        self.raised |= changed;
    }

    pub fn is_raised(&self) -> bool {
        self.raised
    }

    /// Take the pending signal, leaving none behind.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

/// What a tick ended up doing.
#[derive(Debug)]
pub enum TickOutcome {
    /// One sample rendered with this index
    Dispatched { sample_index: u64 },
    /// Backend re-init failed; nothing dispatched, reset retried next tick
    ResetDeferred(Error),
}

#[derive(Debug)]
pub struct TickReport {
    pub camera_recomputed: bool,
    /// Backend buffers were rebuilt this tick
    pub reset: bool,
    pub outcome: TickOutcome,
}

impl TickReport {
    pub fn dispatched(&self) -> Option<u64> {
        match self.outcome {
            TickOutcome::Dispatched { sample_index } => Some(sample_index),
            TickOutcome::ResetDeferred(_) => None,
        }
    }
}

/// Owns the backend resources and drives one sample per tick.
pub struct RenderLoop<B: ComputeBackend> {
    scene: Arc<SceneDescriptor>,
    resources: BackendResources<B>,
}

impl<B: ComputeBackend> RenderLoop<B> {
    /// Bring the backend up for `scene`. Failure here is a startup error.
    pub fn new(backend: B, scene: Arc<SceneDescriptor>) -> Result<Self> {
        let mut resources = BackendResources::new(backend);
        resources.reinit(&scene)?;
        Ok(Self { scene, resources })
    }

    pub fn scene(&self) -> &SceneDescriptor {
        &self.scene
    }

    pub fn resources(&self) -> &BackendResources<B> {
        &self.resources
    }

    /// Run one iteration of the host loop.
    ///
    /// Errors are per-tick dispatch failures (surface acquisition, backend
    /// dispatch). They leave the sample count untouched and are not retried.
    pub fn tick<S: OutputSurface + ?Sized>(
        &mut self,
        state: &mut ViewerState,
        signal: CameraSignal,
        surface: &mut S,
    ) -> Result<TickReport> {
        let _span = tracing::info_span!("render_tick", sample = state.session.sample_count).entered();

        let mut changed = signal.is_raised();
        let settings = state.settings().automation;
        changed |= state.automation.step(&settings, state.camera.state_mut());

        if changed {
            state.camera.recompute();
            state.session.camera_moved();
        }

        let mut reset = false;
        if state.session.needs_reset() {
            state.session.reset_requested = true;
            state.session.sample_count = 0;
            if let Err(e) = self.resources.reinit(&self.scene) {
                warn!("backend reset failed, retrying next tick: {e}");
                return Ok(TickReport {
                    camera_recomputed: changed,
                    reset: false,
                    outcome: TickOutcome::ResetDeferred(e),
                });
            }
            state.session.reset_requested = false;
            reset = true;
            debug!("accumulation reset (generation {})", self.resources.generation());
        }

        let resolution = state.camera.resolution();
        if surface.size() != (resolution.x, resolution.y) {
            return Err(Error::surface(format!(
                "surface is {:?}, camera renders {}x{}",
                surface.size(),
                resolution.x,
                resolution.y
            )));
        }

        let sample_index = state.session.sample_count;
        let settings = state.settings();
        let params = DispatchParams {
            sample_index,
            camera: state.camera.frame(),
            fov_y: state.camera.fov_y(),
            resolution,
            max_depth: settings.tracer.trace_depth.min(self.scene.camera.depth),
            tracer: &settings.tracer,
            denoise: &settings.denoise,
            debug: &settings.debug,
        };
        {
            let mut mapped = MappedSurface::map(surface)?;
            self.resources.dispatch(mapped.pixels_mut(), &params)?;
        }
        state.session.sample_count += 1;

        Ok(TickReport {
            camera_recomputed: changed,
            reset,
            outcome: TickOutcome::Dispatched { sample_index },
        })
    }
}
