//! CPU reference backend for headless runs and tests.
//!
//! Shades primary-ray directions with a sky gradient instead of tracing a
//! scene, which is enough to exercise progressive accumulation, denoiser
//! history and the output surface without a GPU.

use glam::{UVec2, Vec3};
use rayon::prelude::*;

use super::backend::{ComputeBackend, DispatchParams};
use super::camera::CameraFrame;
use super::scene::SceneDescriptor;
use super::settings::DebugView;
use super::surface::Rgba8;
use crate::util::{Error, Result};

const SKY_ZENITH: Vec3 = Vec3::new(0.25, 0.45, 0.85);
const SKY_HORIZON: Vec3 = Vec3::new(0.85, 0.9, 1.0);
const GROUND: Vec3 = Vec3::new(0.3, 0.27, 0.22);
/// Light intensity the palette above is tuned for.
const REFERENCE_INTENSITY: f32 = 2.7;

/// CPU implementation of [`ComputeBackend`].
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    resolution: UVec2,
    /// Running mean of all samples
    accum: Option<Vec<Vec3>>,
    /// Temporally blended output of the denoiser
    history: Option<Vec<Vec3>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_accumulation(&self) -> bool {
        self.accum.is_some()
    }

    pub fn has_history(&self) -> bool {
        self.history.is_some()
    }

    /// Accumulated linear color, if allocated.
    pub fn accumulation(&self) -> Option<&[Vec3]> {
        self.accum.as_deref()
    }
}

impl ComputeBackend for HeadlessBackend {
    fn init(&mut self, scene: &SceneDescriptor) -> Result<()> {
        self.resolution = scene.camera.resolution();
        self.accum = Some(vec![Vec3::ZERO; scene.pixel_count()]);
        Ok(())
    }

    fn free(&mut self) {
        self.accum = None;
    }

    fn denoiser_init(&mut self, scene: &SceneDescriptor) -> Result<()> {
        self.history = Some(vec![Vec3::ZERO; scene.pixel_count()]);
        Ok(())
    }

    fn denoiser_free(&mut self) {
        self.history = None;
    }

    fn dispatch(&mut self, output: &mut [Rgba8], params: &DispatchParams<'_>) -> Result<()> {
        let index = params.sample_index;
        if params.resolution != self.resolution {
            return Err(Error::dispatch(index, "resolution differs from initialized buffers"));
        }
        let accum = self
            .accum
            .as_mut()
            .ok_or_else(|| Error::dispatch(index, "accumulation state not allocated"))?;
        if output.len() != accum.len() {
            return Err(Error::dispatch(index, "output surface size mismatch"));
        }

        let width = self.resolution.x as usize;
        let res = self.resolution;
        let frame = *params.camera;
        let pixel_length = CameraFrame::pixel_length(params.fov_y, res);
        let scale = params.tracer.light_intensity / REFERENCE_INTENSITY;
        let n = index as f32;

        accum.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            for (x, acc) in row.iter_mut().enumerate() {
                let (jx, jy) = jitter(index, x as u32, y as u32);
                let dir = frame.ray_direction(pixel_length, res, x as f32 + jx, y as f32 + jy);
                let color = sky(dir) * scale;
                *acc = (*acc * n + color) / (n + 1.0);
            }
        });

        let denoise = params.denoise;
        if let Some(history) = self.history.as_mut() {
            if denoise.enabled {
                let blend = denoise.temporal && index > 0;
                let alpha = denoise.color_alpha;
                history.par_iter_mut().zip(accum.par_iter()).for_each(|(h, a)| {
                    *h = if blend { h.lerp(*a, alpha) } else { *a };
                });
            }
        }

        let accum: &[Vec3] = accum;
        let history = self.history.as_deref();
        let debug = params.debug;
        output.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                let view = if x < width / 2 { debug.left_view } else { debug.right_view };
                let i = y * width + x;
                let color = match view {
                    DebugView::Final => match history {
                        Some(h) if denoise.enabled => h[i],
                        _ => accum[i],
                    },
                    DebugView::Accumulated => accum[i],
                    DebugView::History => history.map_or(Vec3::ZERO, |h| h[i]),
                    DebugView::RayDirection => {
                        let dir = frame.ray_direction(pixel_length, res, x as f32 + 0.5, y as f32 + 0.5);
                        dir * 0.5 + 0.5
                    }
                };
                *px = to_rgba8(color);
            }
        });

        Ok(())
    }
}

fn sky(dir: Vec3) -> Vec3 {
    if dir.y < 0.0 {
        GROUND
    } else {
        SKY_HORIZON.lerp(SKY_ZENITH, dir.y)
    }
}

/// Sub-pixel offset in [0, 1) per sample and pixel.
fn jitter(sample: u64, x: u32, y: u32) -> (f32, f32) {
    let folded = (sample ^ (sample >> 32)) as u32;
    let seed = hash(folded ^ hash(x ^ hash(y)));
    let a = hash(seed);
    let b = hash(a);
    (unit(a), unit(b))
}

fn hash(mut v: u32) -> u32 {
    v = (v ^ 61) ^ (v >> 16);
    v = v.wrapping_mul(9);
    v ^= v >> 4;
    v = v.wrapping_mul(0x27d4_eb2d);
    v ^ (v >> 15)
}

fn unit(v: u32) -> f32 {
    (v >> 8) as f32 / (1u32 << 24) as f32
}

fn to_rgba8(c: Vec3) -> Rgba8 {
    let g = c.clamp(Vec3::ZERO, Vec3::ONE).powf(1.0 / 2.2) * 255.0;
    [g.x.round() as u8, g.y.round() as u8, g.z.round() as u8, 255]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::camera::OrbitCamera;
    use crate::viewer::settings::Settings;

    fn scene() -> SceneDescriptor {
        let mut scene = SceneDescriptor::default();
        scene.camera.resolution = [16, 8];
        scene
    }

    fn dispatch(backend: &mut HeadlessBackend, settings: &Settings, index: u64, out: &mut [Rgba8]) -> Result<()> {
        let cam = OrbitCamera::from_scene(&scene().camera);
        let params = DispatchParams {
            sample_index: index,
            camera: cam.frame(),
            fov_y: cam.fov_y(),
            resolution: cam.resolution(),
            max_depth: settings.tracer.trace_depth,
            tracer: &settings.tracer,
            denoise: &settings.denoise,
            debug: &settings.debug,
        };
        backend.dispatch(out, &params)
    }

    #[test]
    fn test_lifecycle() {
        let mut b = HeadlessBackend::new();
        b.init(&scene()).unwrap();
        b.denoiser_init(&scene()).unwrap();
        assert!(b.has_accumulation() && b.has_history());
        b.free();
        b.denoiser_free();
        // Idempotent teardown
        b.free();
        b.denoiser_free();
        assert!(!b.has_accumulation() && !b.has_history());
    }

    #[test]
    fn test_dispatch_without_init_fails() {
        let mut b = HeadlessBackend::new();
        let mut out = vec![[0u8; 4]; 128];
        assert!(dispatch(&mut b, &Settings::default(), 0, &mut out).is_err());
    }

    #[test]
    fn test_sample_zero_restarts_mean() {
        let settings = Settings::default();
        let mut b = HeadlessBackend::new();
        b.init(&scene()).unwrap();
        let mut out = vec![[0u8; 4]; 128];

        dispatch(&mut b, &settings, 0, &mut out).unwrap();
        let first = b.accumulation().unwrap().to_vec();
        for i in 1..8 {
            dispatch(&mut b, &settings, i, &mut out).unwrap();
        }
        dispatch(&mut b, &settings, 0, &mut out).unwrap();
        assert_eq!(b.accumulation().unwrap(), first.as_slice());
        assert!(out.iter().all(|p| p[3] == 255));
    }

    #[test]
    fn test_history_follows_denoise_setting() {
        let mut settings = Settings::default();
        settings.denoise.enabled = true;
        settings.debug.right_view = DebugView::History;
        let mut b = HeadlessBackend::new();
        b.init(&scene()).unwrap();
        b.denoiser_init(&scene()).unwrap();
        let mut out = vec![[0u8; 4]; 128];

        dispatch(&mut b, &settings, 0, &mut out).unwrap();
        // Non-temporal history mirrors the accumulation
        assert_eq!(b.history.as_deref(), b.accumulation());
        assert_ne!(out[15], [0, 0, 0, 255]);
    }

    #[test]
    fn test_wrong_output_size() {
        let mut b = HeadlessBackend::new();
        b.init(&scene()).unwrap();
        let mut out = vec![[0u8; 4]; 3];
        assert!(matches!(
            dispatch(&mut b, &Settings::default(), 0, &mut out),
            Err(Error::Dispatch { .. })
        ));
    }

    #[test]
    fn test_jitter_in_unit_square() {
        for s in 0..64u32 {
            let (a, b) = jitter(u64::from(s), s * 3, s * 7);
            assert!((0.0..1.0).contains(&a));
            assert!((0.0..1.0).contains(&b));
        }
        // Indices past u32 range still land in the unit square
        let (a, b) = jitter(u64::from(u32::MAX) + 5, 1, 2);
        assert!((0.0..1.0).contains(&a) && (0.0..1.0).contains(&b));
    }
}
