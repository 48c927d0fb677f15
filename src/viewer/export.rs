//! PNG export of the current output surface.
//!
//! Files are named `<name>.<start>.<samples>samp.png`, where `start` is the
//! wall-clock time the exporter was created.

use std::path::{Path, PathBuf};

use log::{debug, info};
use time::macros::format_description;
use time::OffsetDateTime;

use super::surface::Rgba8;
use crate::util::{Error, Result};

/// Writes rendered frames to disk.
#[derive(Debug, Clone)]
pub struct ImageExporter {
    start_stamp: String,
    output_dir: PathBuf,
}

impl ImageExporter {
    /// Exporter writing into the current directory, stamped with now.
    pub fn new() -> Self {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self::with_start(now)
    }

    pub fn with_start(start: OffsetDateTime) -> Self {
        let fmt = format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
        let start_stamp = start.format(fmt).unwrap_or_else(|_| "unknown".to_string());
        Self {
            start_stamp,
            output_dir: PathBuf::new(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn start_stamp(&self) -> &str {
        &self.start_stamp
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target path for an image of `name` after `samples` samples.
    pub fn file_path(&self, name: &str, samples: u64) -> PathBuf {
        self.output_dir
            .join(format!("{name}.{}.{samples}samp.png", self.start_stamp))
    }

    /// Save row-major RGBA pixels as PNG and return the written path.
    pub fn save(&self, width: u32, height: u32, pixels: &[Rgba8], name: &str, samples: u64) -> Result<PathBuf> {
        let _span = tracing::info_span!("export_png", samples).entered();
        let bytes: Vec<u8> = bytemuck::cast_slice(pixels).to_vec();
        let image = image::RgbaImage::from_raw(width, height, bytes).ok_or_else(|| {
            Error::Export(format!(
                "{} pixels do not fill a {width}x{height} image",
                pixels.len()
            ))
        })?;

        if !self.output_dir.as_os_str().is_empty() {
            std::fs::create_dir_all(&self.output_dir)?;
        }
        let path = self.file_path(name, samples);
        debug!("writing {}x{} image", width, height);
        image.save_with_format(&path, image::ImageFormat::Png)?;
        info!("Saved {}", path.display());
        Ok(path)
    }
}

impl Default for ImageExporter {
    fn default() -> Self {
        Self::new()
    }
}
