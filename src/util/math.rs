//! Math type re-exports and small helpers shared by the camera code.

pub use glam::{DVec2, UVec2, Vec2, Vec3};

/// Project a vector onto the ground (XZ) plane and renormalize.
///
/// Returns zero when the vector is (nearly) vertical, so callers moving along
/// it simply do not move.
#[inline]
pub fn flatten_to_ground(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z).normalize_or_zero()
}

/// Keep only the vertical component of a vector and renormalize.
#[inline]
pub fn vertical_only(v: Vec3) -> Vec3 {
    Vec3::new(0.0, v.y, 0.0).normalize_or_zero()
}

/// Component-wise approximate equality.
#[inline]
pub fn approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    (a - b).abs().max_element() <= eps
}
