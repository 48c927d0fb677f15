//! Scripted camera motion.
//!
//! Each enabled tick advances one phase per axis and writes a bounded
//! sinusoid of that phase into the same spherical fields manual input uses.

use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::camera::{clamp_polar, SphericalCameraState};

/// Per-axis phase speeds (radians per tick) and the enable switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    pub enabled: bool,
    pub speed_x: f32,
    pub speed_y: f32,
    pub speed_z: f32,
    pub speed_theta: f32,
    pub speed_phi: f32,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            speed_x: 0.0,
            speed_y: 0.0,
            speed_z: 0.0,
            speed_theta: 0.0,
            speed_phi: 0.0,
        }
    }
}

/// Center and amplitude of each oscillation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationPath {
    pub center: Vec3,
    pub amplitude: Vec3,
    pub theta_base: f32,
    pub theta_amplitude: f32,
    pub phi_base: f32,
    pub phi_amplitude: f32,
}

impl Default for AutomationPath {
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, 5.0, 0.0),
            amplitude: Vec3::new(2.0, 1.0, 1.5),
            theta_base: PI * 0.5,
            theta_amplitude: PI / 18.0,
            phi_base: 0.0,
            phi_amplitude: PI / 12.0,
        }
    }
}

/// Phase accumulators driven by the tick counter.
#[derive(Debug, Clone, Default)]
pub struct CameraAutomation {
    path: AutomationPath,
    phase: Vec3,
    phase_theta: f32,
    phase_phi: f32,
}

impl CameraAutomation {
    pub fn new(path: AutomationPath) -> Self {
        Self { path, ..Self::default() }
    }

    pub fn path(&self) -> &AutomationPath {
        &self.path
    }

    /// Current (x, y, z, theta, phi) phases.
    pub fn phases(&self) -> [f32; 5] {
        [self.phase.x, self.phase.y, self.phase.z, self.phase_theta, self.phase_phi]
    }

    /// Advance one tick. Returns whether the camera was written.
    ///
    /// Disabled automation leaves both phases and camera untouched.
    pub fn step(&mut self, settings: &AutomationSettings, state: &mut SphericalCameraState) -> bool {
        if !settings.enabled {
            return false;
        }

        self.phase += Vec3::new(settings.speed_x, settings.speed_y, settings.speed_z);
        self.phase_theta += settings.speed_theta;
        self.phase_phi += settings.speed_phi;

        let p = &self.path;
        let wave = Vec3::new(self.phase.x.sin(), self.phase.y.sin(), self.phase.z.sin());
        state.look_at = p.center + p.amplitude * wave;
        state.theta = clamp_polar(p.theta_base + p.theta_amplitude * self.phase_theta.sin());
        state.phi = p.phi_base + p.phi_amplitude * self.phase_phi.sin();
        true
    }
}
