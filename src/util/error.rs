//! Error types for the path tracing viewer.

use std::path::PathBuf;
use thiserror::Error;

/// Which half of the backend working set an init call was building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStage {
    /// Path tracing accumulation state.
    Accumulation,
    /// Denoiser history state.
    Denoiser,
}

impl std::fmt::Display for ResourceStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accumulation => f.write_str("accumulation"),
            Self::Denoiser => f.write_str("denoiser history"),
        }
    }
}

/// Main error type for viewer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Scene descriptor does not exist or cannot be accessed
    #[error("Scene file not found: {0}")]
    FileNotFound(PathBuf),

    /// Scene descriptor parsed but describes an unusable camera or image
    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    /// Backend failed to allocate one half of its working buffers
    #[error("Backend {stage} init failed: {message}")]
    BackendInit { stage: ResourceStage, message: String },

    /// Dispatch attempted while the backend holds no working buffers
    #[error("Backend resources are not initialized")]
    BackendNotReady,

    /// Shared output surface could not be mapped
    #[error("Output surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Compute backend reported a failure for one sample
    #[error("Dispatch of sample {sample} failed: {message}")]
    Dispatch { sample: u64, message: String },

    /// Image export failed
    #[error("Export failed: {0}")]
    Export(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (scene or settings) error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Create an invalid scene error.
    pub fn invalid_scene(msg: impl Into<String>) -> Self {
        Self::InvalidScene(msg.into())
    }

    /// Create a backend init error for the given stage.
    pub fn backend_init(stage: ResourceStage, msg: impl Into<String>) -> Self {
        Self::BackendInit { stage, message: msg.into() }
    }

    /// Create a dispatch error for the given sample index.
    pub fn dispatch(sample: u64, msg: impl Into<String>) -> Self {
        Self::Dispatch { sample, message: msg.into() }
    }

    /// Create a surface error.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::SurfaceUnavailable(msg.into())
    }
}

/// Result type alias for viewer operations.
pub type Result<T> = std::result::Result<T, Error>;
