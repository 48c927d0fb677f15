//! The single owned context shared by input, automation and the render loop.

use super::automation::CameraAutomation;
use super::camera::OrbitCamera;
use super::scene::SceneDescriptor;
use super::session::RenderSession;
use super::settings::Settings;

/// Camera, session counters and live settings for one viewer process.
#[derive(Debug, Clone)]
pub struct ViewerState {
    pub camera: OrbitCamera,
    pub session: RenderSession,
    pub automation: CameraAutomation,
    settings: Settings,
}

impl ViewerState {
    pub fn new(scene: &SceneDescriptor, settings: Settings) -> Self {
        Self {
            camera: OrbitCamera::from_scene(&scene.camera),
            session: RenderSession::new(settings.denoise.enabled),
            automation: CameraAutomation::default(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Swap in new settings, requesting a reset if the change invalidates
    /// accumulated samples or denoiser history.
    pub fn apply_settings(&mut self, settings: Settings) {
        if self.settings.requires_reset(&settings) {
            log::debug!("settings change requires reset");
            self.session.request_reset();
        }
        self.session.set_denoiser_enabled(settings.denoise.enabled);
        self.settings = settings;
    }

    /// Edit settings in place; same reset rules as [`apply_settings`](Self::apply_settings).
    pub fn update_settings(&mut self, edit: impl FnOnce(&mut Settings)) {
        let mut next = self.settings.clone();
        edit(&mut next);
        self.apply_settings(next);
    }
}
