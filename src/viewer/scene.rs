//! Scene descriptor loading.
//!
//! Only the camera block is interpreted here; materials and objects are kept
//! as raw JSON and handed to the compute backend untouched.

use std::path::{Path, PathBuf};

use glam::{UVec2, Vec3};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::util::{Error, Result};

/// Camera block of a scene descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneCamera {
    /// Output resolution in pixels (width, height)
    pub resolution: [u32; 2],
    /// Vertical FOV in degrees
    pub fov_y: f32,
    pub position: [f32; 3],
    pub look_at: [f32; 3],
    /// Base name for saved images
    pub image_name: String,
    /// Sample count after which a headless run stops
    pub iterations: u32,
    /// Upper bound on path depth; the tracer setting can only lower it
    pub depth: u32,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            resolution: [800, 800],
            fov_y: 45.0,
            position: [0.0, 5.0, 10.5],
            look_at: [0.0, 5.0, 0.0],
            image_name: "render".to_string(),
            iterations: 5000,
            depth: 8,
        }
    }
}

impl SceneCamera {
    pub fn resolution(&self) -> UVec2 {
        UVec2::from_array(self.resolution)
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn look_at(&self) -> Vec3 {
        Vec3::from_array(self.look_at)
    }

    /// Unit view direction from eye to look-at.
    pub fn view(&self) -> Vec3 {
        (self.look_at() - self.position()).normalize_or_zero()
    }
}

/// Parsed scene descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescriptor {
    pub camera: SceneCamera,
    pub materials: Vec<serde_json::Value>,
    pub objects: Vec<serde_json::Value>,
    /// File the descriptor was loaded from (not serialized)
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl SceneDescriptor {
    /// Load and validate a scene descriptor from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        info!("Loading scene: {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let mut scene = Self::from_json(&text)?;
        scene.source = Some(path.to_path_buf());
        Ok(scene)
    }

    /// Parse and validate a scene descriptor from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let scene: Self = serde_json::from_str(text)?;
        scene.validate()?;
        debug!(
            "scene: {}x{}, {} materials, {} objects",
            scene.camera.resolution[0],
            scene.camera.resolution[1],
            scene.materials.len(),
            scene.objects.len()
        );
        Ok(scene)
    }

    fn validate(&self) -> Result<()> {
        let cam = &self.camera;
        if cam.resolution[0] == 0 || cam.resolution[1] == 0 {
            return Err(Error::invalid_scene(format!(
                "resolution must be non-zero, got {}x{}",
                cam.resolution[0], cam.resolution[1]
            )));
        }
        if cam.position().distance(cam.look_at()) <= f32::EPSILON {
            return Err(Error::invalid_scene("camera position coincides with look_at"));
        }
        if !(cam.fov_y > 0.0 && cam.fov_y < 180.0) {
            return Err(Error::invalid_scene(format!("fov_y out of range: {}", cam.fov_y)));
        }
        if cam.image_name.is_empty() {
            return Err(Error::invalid_scene("image_name is empty"));
        }
        Ok(())
    }

    /// Number of pixels in the output image.
    pub fn pixel_count(&self) -> usize {
        self.camera.resolution[0] as usize * self.camera.resolution[1] as usize
    }
}
