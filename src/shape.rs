use crate::Octant;

use glam::DVec3;
use ndshape::{ConstPow2Shape3u32, ConstShape};

/// The 2x2x2 shape of a node's children. Bit 0 of an [`Octant`] selects +X, bit 1 selects +Y, bit 2 selects +Z.
pub type OctantShape = ConstPow2Shape3u32<1, 1, 1>;

/// Number of octants in a node.
pub const OCTANTS: Octant = 8;

/// Returns the `[x, y, z]` offset of `octant`, each component 0 or 1.
#[inline]
pub fn octant_offset(octant: Octant) -> [u32; 3] {
    OctantShape::delinearize(octant as u32)
}

/// Returns the per-axis sign (-1 or +1) of `octant`'s corner relative to the parent center.
#[inline]
pub fn octant_signs(octant: Octant) -> DVec3 {
    let [x, y, z] = octant_offset(octant);
    DVec3::new(sign(x), sign(y), sign(z))
}

/// Returns the octant of a cube centered at `center` that contains `point`.
///
/// Points on a dividing plane go to the `+` side.
#[inline]
pub fn octant_of(center: DVec3, point: DVec3) -> Octant {
    let bit = |p: f64, c: f64| u32::from(p >= c);
    OctantShape::linearize([
        bit(point.x, center.x),
        bit(point.y, center.y),
        bit(point.z, center.z),
    ]) as Octant
}

/// Computes the center of child `octant` of a cube with half-size `size` centered at `parent_center`.
///
/// The child's half-size is `size / 2`.
#[inline]
pub fn child_center(parent_center: DVec3, size: f64, octant: Octant) -> DVec3 {
    parent_center + octant_signs(octant) * (size / 2.0)
}

/// An axis-aligned cube given by its center and half-size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cube {
    pub center: DVec3,
    pub half_size: f64,
}

impl Cube {
    #[inline]
    pub fn new(center: DVec3, half_size: f64) -> Self {
        Self { center, half_size }
    }

    #[inline]
    pub fn child(&self, octant: Octant) -> Self {
        Self {
            center: child_center(self.center, self.half_size, octant),
            half_size: self.half_size / 2.0,
        }
    }

    #[inline]
    pub fn min(&self) -> DVec3 {
        self.center - DVec3::splat(self.half_size)
    }

    #[inline]
    pub fn max(&self) -> DVec3 {
        self.center + DVec3::splat(self.half_size)
    }

    /// The six faces of the cube outline, each with its own color.
    pub fn faces(&self) -> [([f32; 3], [DVec3; 4]); 6] {
        let c = self.center;
        let s = self.half_size;
        let v = |x: f64, y: f64, z: f64| DVec3::new(c.x + x * s, c.y + y * s, c.z + z * s);
        [
            // top
            (
                [0.0, 1.0, 0.0],
                [v(1., 1., -1.), v(-1., 1., -1.), v(-1., 1., 1.), v(1., 1., 1.)],
            ),
            // bottom
            (
                [1.0, 0.5, 0.0],
                [v(1., -1., 1.), v(-1., -1., 1.), v(-1., -1., -1.), v(1., -1., -1.)],
            ),
            // front
            (
                [1.0, 0.0, 0.0],
                [v(1., 1., 1.), v(-1., 1., 1.), v(-1., -1., 1.), v(1., -1., 1.)],
            ),
            // back
            (
                [1.0, 1.0, 0.0],
                [v(1., -1., -1.), v(-1., -1., -1.), v(-1., 1., -1.), v(1., 1., -1.)],
            ),
            // left
            (
                [0.0, 0.0, 1.0],
                [v(-1., 1., 1.), v(-1., 1., -1.), v(-1., -1., -1.), v(-1., -1., 1.)],
            ),
            // right
            (
                [1.0, 0.0, 1.0],
                [v(1., 1., -1.), v(1., 1., 1.), v(1., -1., 1.), v(1., -1., -1.)],
            ),
        ]
    }
}

#[inline]
fn sign(bit: u32) -> f64 {
    if bit == 0 {
        -1.0
    } else {
        1.0
    }
}
