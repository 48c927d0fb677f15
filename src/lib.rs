//! # pathtrace-viewer
//!
//! Control layer for an interactive progressive path tracer.
//!
//! The renderer itself sits behind [`viewer::ComputeBackend`]; this crate
//! owns everything around it: the spherical orbit camera, keyboard and
//! pointer handling, scripted camera motion, and the render loop that
//! decides when accumulated samples and denoiser history must be thrown away.
//!
//! ## Modules
//!
//! - [`util`] - Errors and small vector helpers
//! - [`viewer`] - Camera, input, automation, render loop and the headless backend
//!
//! ## Example
//!
//! ```ignore
//! use pathtrace_viewer::viewer::{HeadlessBackend, HostSurface, ImageExporter, SceneDescriptor, Settings, Viewer};
//!
//! let scene = SceneDescriptor::load("scenes/sky.json")?;
//! let (w, h) = (scene.camera.resolution[0], scene.camera.resolution[1]);
//! let mut viewer = Viewer::new(scene, Settings::default(), HeadlessBackend::new(),
//!     HostSurface::new(w, h), ImageExporter::new())?;
//! while viewer.sample_count() < 64 {
//!     viewer.frame()?;
//! }
//! viewer.save_image()?;
//! ```

pub mod util;
pub mod viewer;

pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result};
    pub use crate::viewer::{
        ComputeBackend, HeadlessBackend, HostSurface, InputEvent, OrbitCamera, OutputSurface, RenderLoop,
        SceneDescriptor, Settings, Viewer, ViewerState,
    };
}
