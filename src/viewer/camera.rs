//! Spherical orbit camera and its derived view basis.
//!
//! The camera is stored as spherical parameters around an orbit center
//! (`zoom`, polar angle `theta`, azimuth `phi`, `look_at`). Input and
//! automation only ever touch those parameters; the Cartesian [`CameraFrame`]
//! is rebuilt from them on demand and never integrated incrementally.

use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use glam::{UVec2, Vec2, Vec3};

use super::scene::SceneCamera;

/// Fixed reference used to re-orthogonalize `up` on every recompute.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Distance kept between the polar angle and the poles.
pub const POLAR_EPSILON: f32 = 0.001;

/// Clamp a polar angle into `[POLAR_EPSILON, PI - POLAR_EPSILON]`.
#[inline]
pub fn clamp_polar(theta: f32) -> f32 {
    theta.clamp(POLAR_EPSILON, PI - POLAR_EPSILON)
}

/// Spherical camera parameters around an orbit center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCameraState {
    /// Distance from orbit center to eye
    pub zoom: f32,
    /// Polar angle from +Y in radians
    pub theta: f32,
    /// Azimuth around +Y in radians, wraps freely
    pub phi: f32,
    /// Orbit center the camera faces
    pub look_at: Vec3,
}

impl SphericalCameraState {
    pub fn new(zoom: f32, theta: f32, phi: f32, look_at: Vec3) -> Self {
        Self {
            zoom,
            theta: clamp_polar(theta),
            phi,
            look_at,
        }
    }

    /// Derive spherical parameters from an eye/look-at pair.
    pub fn from_scene(camera: &SceneCamera) -> Self {
        let offset = camera.position() - camera.look_at();
        let zoom = offset.length();
        let theta = (offset.y / zoom).clamp(-1.0, 1.0).acos();
        let phi = offset.x.atan2(offset.z);
        Self::new(zoom, theta, phi, camera.look_at())
    }

    /// Pin `theta` to its clamp bounds.
    pub fn clamp_polar(&mut self) {
        self.theta = clamp_polar(self.theta);
    }

    /// Eye position relative to the orbit center.
    pub fn eye_offset(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.zoom * Vec3::new(sin_phi * sin_theta, cos_theta, cos_phi * sin_theta)
    }

    pub fn frame(&self) -> CameraFrame {
        CameraFrame::from_state(self)
    }
}

/// Cartesian camera derived from [`SphericalCameraState`].
///
/// `view`, `up` and `right` form a right-handed orthonormal basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub position: Vec3,
    pub view: Vec3,
    pub up: Vec3,
    pub right: Vec3,
}

impl CameraFrame {
    /// Build the frame for a spherical state. Pure; same input, same bits.
    pub fn from_state(state: &SphericalCameraState) -> Self {
        let eye = state.eye_offset();
        let view = (-eye).normalize();
        let right = view.cross(WORLD_UP).normalize();
        let up = right.cross(view);
        Self {
            position: eye + state.look_at,
            view,
            up,
            right,
        }
    }

    /// World-space size of one pixel on the image plane at unit distance.
    pub fn pixel_length(fov_y_degrees: f32, resolution: UVec2) -> Vec2 {
        let aspect = resolution.x as f32 / resolution.y as f32;
        let y_scaled = (fov_y_degrees.to_radians() * 0.5).tan();
        let x_scaled = y_scaled * aspect;
        Vec2::new(
            2.0 * x_scaled / resolution.x as f32,
            2.0 * y_scaled / resolution.y as f32,
        )
    }

    /// Unit primary-ray direction through image coordinate `(x, y)`.
    ///
    /// `(0, 0)` is the top-left corner; fractional coordinates jitter within a pixel.
    pub fn ray_direction(&self, pixel_length: Vec2, resolution: UVec2, x: f32, y: f32) -> Vec3 {
        let half = resolution.as_vec2() * 0.5;
        (self.view + self.right * pixel_length.x * (x - half.x) - self.up * pixel_length.y * (y - half.y))
            .normalize()
    }

    /// Pack the frame for upload to a compute backend.
    pub fn uniform(&self, fov_y_degrees: f32, resolution: UVec2) -> CameraUniform {
        CameraUniform {
            position: self.position.to_array(),
            _pad0: 0.0,
            view: self.view.to_array(),
            _pad1: 0.0,
            up: self.up.to_array(),
            _pad2: 0.0,
            right: self.right.to_array(),
            _pad3: 0.0,
            pixel_length: Self::pixel_length(fov_y_degrees, resolution).to_array(),
            resolution: resolution.to_array(),
        }
    }
}

/// Camera data laid out for GPU constant buffers (16-byte aligned rows).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub position: [f32; 3],
    pub _pad0: f32,
    pub view: [f32; 3],
    pub _pad1: f32,
    pub up: [f32; 3],
    pub _pad2: f32,
    pub right: [f32; 3],
    pub _pad3: f32,
    pub pixel_length: [f32; 2],
    pub resolution: [u32; 2],
}

/// Orbit camera: spherical state plus the most recently derived frame.
///
/// Key input moves along the cached frame's axes, so the frame seen by input
/// is the one from the last recompute, not one built from half-applied edits.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    state: SphericalCameraState,
    frame: CameraFrame,
    /// Scene look-at, restored by recenter
    home: Vec3,
    resolution: UVec2,
    /// Vertical FOV in degrees
    fov_y: f32,
}

impl OrbitCamera {
    pub fn new(state: SphericalCameraState, resolution: UVec2, fov_y: f32) -> Self {
        Self {
            state,
            frame: state.frame(),
            home: state.look_at,
            resolution,
            fov_y,
        }
    }

    /// Set up from the camera block of a loaded scene.
    pub fn from_scene(camera: &SceneCamera) -> Self {
        Self::new(
            SphericalCameraState::from_scene(camera),
            camera.resolution(),
            camera.fov_y,
        )
    }

    pub fn state(&self) -> &SphericalCameraState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SphericalCameraState {
        &mut self.state
    }

    /// Frame from the last [`recompute`](Self::recompute).
    pub fn frame(&self) -> &CameraFrame {
        &self.frame
    }

    pub fn home(&self) -> Vec3 {
        self.home
    }

    pub fn resolution(&self) -> UVec2 {
        self.resolution
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// Rebuild the cached frame from the current spherical state.
    pub fn recompute(&mut self) -> &CameraFrame {
        self.frame = self.state.frame();
        &self.frame
    }

    pub fn uniform(&self) -> CameraUniform {
        self.frame.uniform(self.fov_y, self.resolution)
    }
}
