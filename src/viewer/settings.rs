//! Persistent render settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::automation::AutomationSettings;
use crate::util::Result;

/// Path tracer parameters. Any change invalidates accumulated samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerSettings {
    pub trace_depth: u32,
    pub shadow_ray: bool,
    pub reduce_variance: bool,
    pub light_intensity: f32,
    pub light_radius: f32,
    pub use_kd_tree: bool,
}

impl Default for TracerSettings {
    fn default() -> Self {
        Self {
            trace_depth: 8,
            shadow_ray: true,
            reduce_variance: true,
            light_intensity: 2.7,
            light_radius: 1.4,
            use_kd_tree: true,
        }
    }
}

/// Denoiser parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiseSettings {
    pub enabled: bool,
    pub temporal: bool,
    pub spatial: bool,
    pub color_alpha: f32,
    pub moment_alpha: f32,
    pub blur_variance: bool,
    pub sigma_l: f32,
    pub sigma_x: f32,
    pub sigma_n: f32,
    /// Number of A-trous filter levels
    pub atrous_levels: u32,
    /// A-trous level whose output feeds the history buffer
    pub history_level: u32,
}

impl Default for DenoiseSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            temporal: false,
            spatial: false,
            color_alpha: 0.2,
            moment_alpha: 0.2,
            blur_variance: true,
            sigma_l: 0.70,
            sigma_x: 0.35,
            sigma_n: 0.2,
            atrous_levels: 5,
            history_level: 1,
        }
    }
}

impl DenoiseSettings {
    /// Whether going from `self` to `other` changes the shape of the
    /// denoiser's buffers. Blend and edge weights do not.
    pub fn structure_differs(&self, other: &Self) -> bool {
        self.enabled != other.enabled
            || self.temporal != other.temporal
            || self.spatial != other.spatial
            || self.blur_variance != other.blur_variance
            || self.atrous_levels != other.atrous_levels
            || self.history_level != other.history_level
    }
}

/// Which buffer a half of the viewport shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DebugView {
    /// Denoised output when the denoiser runs, otherwise the accumulated image
    #[default]
    Final,
    /// Raw accumulated samples
    Accumulated,
    /// Denoiser history buffer
    History,
    /// Primary ray directions
    RayDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    pub left_view: DebugView,
    pub right_view: DebugView,
}

/// Application settings that persist between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tracer: TracerSettings,
    pub denoise: DenoiseSettings,
    pub automation: AutomationSettings,
    pub debug: DebugSettings,

    /// Stop a headless run after this many ticks (defaults to the scene's iterations)
    pub max_ticks: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tracer: TracerSettings::default(),
            denoise: DenoiseSettings::default(),
            automation: AutomationSettings::default(),
            debug: DebugSettings::default(),
            max_ticks: None,
        }
    }
}

const MAX_TRACE_DEPTH: u32 = 64;
const MAX_ATROUS_LEVELS: u32 = 10;

impl Settings {
    /// Get settings file path
    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("pathtrace-viewer");
            std::fs::create_dir_all(&p).ok();
            p.push("settings.json");
            p
        })
    }

    /// Load settings from the user config dir, falling back to defaults
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| Self::load_from(&p).ok())
            .unwrap_or_default()
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&text)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Save settings to the user config dir
    pub fn save(&self) {
        if let Some(path) = Self::path() {
            if let Err(e) = self.save_to(&path) {
                log::warn!("Failed to save settings to {}: {}", path.display(), e);
            }
        }
    }

    /// Save settings to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Clamp values a hand-edited file may have pushed out of range.
    pub fn sanitize(&mut self) {
        self.tracer.trace_depth = self.tracer.trace_depth.clamp(1, MAX_TRACE_DEPTH);
        self.tracer.light_intensity = self.tracer.light_intensity.max(0.0);
        self.tracer.light_radius = self.tracer.light_radius.max(0.0);

        let d = &mut self.denoise;
        d.color_alpha = d.color_alpha.clamp(0.0, 1.0);
        d.moment_alpha = d.moment_alpha.clamp(0.0, 1.0);
        d.atrous_levels = d.atrous_levels.clamp(1, MAX_ATROUS_LEVELS);
        d.history_level = d.history_level.min(d.atrous_levels);
    }

    /// Whether switching from `self` to `other` must discard accumulated
    /// samples and denoiser history.
    pub fn requires_reset(&self, other: &Self) -> bool {
        self.tracer != other.tracer || self.denoise.structure_differs(&other.denoise)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_gui() {
        let s = Settings::default();
        assert_eq!(s.tracer.trace_depth, 8);
        assert!(s.tracer.shadow_ray);
        assert!(!s.denoise.enabled);
        assert_eq!(s.denoise.atrous_levels, 5);
        assert_eq!(s.denoise.history_level, 1);
        assert!(!s.automation.enabled);
        assert_eq!(s.debug.left_view, DebugView::Final);
    }

    #[test]
    fn test_requires_reset() {
        let base = Settings::default();

        let mut s = base.clone();
        s.denoise.enabled = true;
        assert!(base.requires_reset(&s));

        let mut s = base.clone();
        s.denoise.atrous_levels = 3;
        assert!(base.requires_reset(&s));

        let mut s = base.clone();
        s.tracer.light_intensity = 5.0;
        assert!(base.requires_reset(&s));

        // Blend weights, debug views and automation keep the samples
        let mut s = base.clone();
        s.denoise.color_alpha = 0.5;
        s.denoise.sigma_l = 1.0;
        s.debug.right_view = DebugView::History;
        s.automation.speed_phi = 0.1;
        assert!(!base.requires_reset(&s));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut s = Settings::default();
        s.denoise.enabled = true;
        s.automation.speed_x = 0.02;
        s.max_ticks = Some(64);
        s.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, s);
    }

    #[test]
    fn test_partial_file_uses_defaults_and_sanitizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "denoise": { "color_alpha": 3.0, "atrous_levels": 0 } }"#).unwrap();

        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.denoise.color_alpha, 1.0);
        assert_eq!(s.denoise.atrous_levels, 1);
        assert_eq!(s.denoise.history_level, 1);
        assert_eq!(s.tracer, TracerSettings::default());
    }
}
