//! Capabilities the octree needs from the outside world while drawing and picking.
//!
//! The octree never rasterizes, maps colors, or does projection math itself. Callers implement these traits on top of
//! their renderer and camera.

use crate::ShortCode;

use glam::DVec3;

/// Where a cube lies relative to the view frustum.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Containment {
    Outside,
    Partial,
    Inside,
}

/// Receives decoded points and cube outlines.
///
/// Points arrive in batches: `begin_points`, then a sequence of optional `set_color` and `vertex` calls, then `end_points`.
pub trait PointRenderer {
    fn begin_points(&mut self) {}

    fn end_points(&mut self) {}

    fn set_color(&mut self, rgb: [f32; 3]);

    fn vertex(&mut self, position: DVec3);

    /// Draws one filled face of a cube outline. Ignored by renderers that only show points.
    fn quad(&mut self, _rgb: [f32; 3], _corners: [DVec3; 4]) {}
}

/// Maps a raw point (its quantized codes, attributes included) to a draw color.
pub trait ColorManager: Send + Sync {
    fn color(&self, point: &[ShortCode]) -> [f32; 3];
}

/// View frustum tests.
pub trait FrustumCuller {
    fn classify_cube(&self, center: DVec3, half_size: f64) -> Containment;

    #[inline]
    fn is_cube_visible(&self, center: DVec3, half_size: f64) -> bool {
        self.classify_cube(center, half_size) != Containment::Outside
    }

    /// True if the cube projects onto at most a single pixel.
    fn is_single_pixel(&self, center: DVec3, half_size: f64) -> bool;
}

/// Tests against a pick ray cast through the cursor.
pub trait RayPicker {
    fn hits_box(&self, center: DVec3, half_size: f64) -> bool;

    /// Distance from the ray origin to `point`, measured along the ray.
    fn ray_distance(&self, point: DVec3) -> f64;

    /// Distance in pixels between the projection of `point` and the cursor.
    fn screen_distance(&self, point: DVec3) -> f64;
}

/// A culler that accepts everything. Useful for drawing without a camera.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCulling;

impl FrustumCuller for NoCulling {
    #[inline]
    fn classify_cube(&self, _center: DVec3, _half_size: f64) -> Containment {
        Containment::Inside
    }

    #[inline]
    fn is_single_pixel(&self, _center: DVec3, _half_size: f64) -> bool {
        false
    }
}
