//! Compute backend contract and its working-buffer lifecycle.
//!
//! A backend owns two sets of working buffers: path tracing accumulation
//! state and denoiser history. [`BackendResources`] wraps a backend in an
//! `Uninitialized -> Ready -> Uninitialized` state machine where a re-init
//! rebuilds both halves as one transition. If either half fails the whole
//! set is torn down again, so a dispatch never sees mismatched generations.

use glam::UVec2;

use super::camera::CameraFrame;
use super::scene::SceneDescriptor;
use super::settings::{DebugSettings, DenoiseSettings, TracerSettings};
use super::surface::Rgba8;
use crate::util::{Error, ResourceStage, Result};

/// Everything a backend needs to render one sample.
#[derive(Debug, Clone, Copy)]
pub struct DispatchParams<'a> {
    /// Progressive sample index; 0 starts a fresh image
    pub sample_index: u64,
    pub camera: &'a CameraFrame,
    /// Vertical FOV in degrees
    pub fov_y: f32,
    pub resolution: UVec2,
    /// Path depth limit: the scene's `depth` capped by the tracer setting
    pub max_depth: u32,
    pub tracer: &'a TracerSettings,
    pub denoise: &'a DenoiseSettings,
    pub debug: &'a DebugSettings,
}

/// Opaque renderer that accumulates samples into an output surface.
///
/// `free` and `denoiser_free` must be safe to call on already-freed state.
pub trait ComputeBackend {
    /// Allocate accumulation state for a scene.
    fn init(&mut self, scene: &SceneDescriptor) -> Result<()>;

    /// Release accumulation state.
    fn free(&mut self);

    /// Allocate denoiser history for a scene.
    fn denoiser_init(&mut self, scene: &SceneDescriptor) -> Result<()>;

    /// Release denoiser history.
    fn denoiser_free(&mut self);

    /// Render one sample into the mapped output pixels.
    fn dispatch(&mut self, output: &mut [Rgba8], params: &DispatchParams<'_>) -> Result<()>;
}

impl<B: ComputeBackend + ?Sized> ComputeBackend for Box<B> {
    fn init(&mut self, scene: &SceneDescriptor) -> Result<()> {
        (**self).init(scene)
    }

    fn free(&mut self) {
        (**self).free()
    }

    fn denoiser_init(&mut self, scene: &SceneDescriptor) -> Result<()> {
        (**self).denoiser_init(scene)
    }

    fn denoiser_free(&mut self) {
        (**self).denoiser_free()
    }

    fn dispatch(&mut self, output: &mut [Rgba8], params: &DispatchParams<'_>) -> Result<()> {
        (**self).dispatch(output, params)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Uninitialized,
    Ready,
}

/// Backend plus the state of its working buffers.
pub struct BackendResources<B: ComputeBackend> {
    backend: B,
    state: ResourceState,
    /// Bumped on every successful re-init
    generation: u64,
}

impl<B: ComputeBackend> BackendResources<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: ResourceState::Uninitialized,
            generation: 0,
        }
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ResourceState::Ready
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Tear down both buffer sets and build them again for `scene`.
    ///
    /// On failure the backend is left `Uninitialized` with nothing allocated.
    #[tracing::instrument(skip_all, fields(generation = self.generation))]
    pub fn reinit(&mut self, scene: &SceneDescriptor) -> Result<()> {
        self.release();

        if let Err(e) = self.backend.init(scene) {
            log::warn!("accumulation init failed: {e}");
            self.backend.free();
            return Err(stage_error(ResourceStage::Accumulation, e));
        }
        if let Err(e) = self.backend.denoiser_init(scene) {
            log::warn!("denoiser init failed, releasing accumulation state: {e}");
            self.backend.denoiser_free();
            self.backend.free();
            return Err(stage_error(ResourceStage::Denoiser, e));
        }

        self.state = ResourceState::Ready;
        self.generation += 1;
        tracing::debug!(generation = self.generation, "backend resources ready");
        Ok(())
    }

    /// Free both buffer sets if allocated.
    pub fn release(&mut self) {
        if self.state == ResourceState::Ready {
            self.backend.free();
            self.backend.denoiser_free();
            self.state = ResourceState::Uninitialized;
        }
    }

    /// Dispatch one sample. Refused unless both buffer sets are live.
    pub fn dispatch(&mut self, output: &mut [Rgba8], params: &DispatchParams<'_>) -> Result<()> {
        if !self.is_ready() {
            return Err(Error::BackendNotReady);
        }
        self.backend.dispatch(output, params)
    }
}

impl<B: ComputeBackend> Drop for BackendResources<B> {
    fn drop(&mut self) {
        self.release();
    }
}

fn stage_error(stage: ResourceStage, e: Error) -> Error {
    match e {
        Error::BackendInit { .. } => e,
        other => Error::backend_init(stage, other.to_string()),
    }
}
