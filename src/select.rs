use crate::view::RayPicker;
use crate::{decode_point, Child, Cube, OctreeNode, ShortCode, PICK_TOLERANCE_PIXELS};

use glam::DVec3;

/// A point found by a pick ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickedPoint<'a> {
    /// Decoded real-world position.
    pub position: DVec3,
    /// The stored codes, attributes included.
    pub codes: &'a [ShortCode],
}

/// Collects every point of every leaf whose cube is hit by the ray.
pub(crate) fn select_points<'t, P>(
    node: &'t OctreeNode,
    cube: Cube,
    precision: f64,
    picker: &P,
    out: &mut Vec<PickedPoint<'t>>,
) where
    P: RayPicker + ?Sized,
{
    if !picker.hits_box(cube.center, cube.half_size) {
        return;
    }

    node.visit_children(|octant, child| {
        let child_cube = cube.child(octant);
        match child {
            Child::Leaf(block) => {
                if picker.hits_box(child_cube.center, child_cube.half_size) {
                    out.extend(block.iter().map(|codes| PickedPoint {
                        position: decode_point(codes, precision, child_cube.center),
                        codes,
                    }));
                }
            }
            Child::Node(inner) => select_points(inner, child_cube, precision, picker, out),
        }
    });
}

/// Running result of a nearest point search.
pub(crate) struct Nearest<'t> {
    pub best: Option<PickedPoint<'t>>,
    pub distance: f64,
}

impl Default for Nearest<'_> {
    fn default() -> Self {
        Self {
            best: None,
            distance: f64::MAX,
        }
    }
}

/// Finds the point closest to the ray origin among those within [`PICK_TOLERANCE_PIXELS`] of the cursor.
pub(crate) fn select_nearest<'t, P>(
    node: &'t OctreeNode,
    cube: Cube,
    precision: f64,
    picker: &P,
    nearest: &mut Nearest<'t>,
) where
    P: RayPicker + ?Sized,
{
    if !picker.hits_box(cube.center, cube.half_size) {
        return;
    }

    node.visit_children(|octant, child| {
        let child_cube = cube.child(octant);
        match child {
            Child::Leaf(block) => {
                if !picker.hits_box(child_cube.center, child_cube.half_size) {
                    return;
                }
                for codes in block.iter() {
                    let position = decode_point(codes, precision, child_cube.center);
                    let distance = picker.ray_distance(position);
                    if distance < nearest.distance
                        && picker.screen_distance(position) < PICK_TOLERANCE_PIXELS
                    {
                        nearest.best = Some(PickedPoint { position, codes });
                        nearest.distance = distance;
                    }
                }
            }
            Child::Node(inner) => select_nearest(inner, child_cube, precision, picker, nearest),
        }
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_util::*;

    #[test]
    fn missed_root_selects_nothing() {
        let tree = mixed_tree();
        let picker = AxisRay::new(DVec3::new(100.0, 100.0, -50.0), DVec3::Z);

        let mut out = Vec::new();
        select_points(
            tree.root(),
            Cube::new(tree.center(), tree.size()),
            tree.precision(),
            &picker,
            &mut out,
        );
        assert!(out.is_empty());

        let mut nearest = Nearest::default();
        select_nearest(
            tree.root(),
            Cube::new(tree.center(), tree.size()),
            tree.precision(),
            &picker,
            &mut nearest,
        );
        assert_eq!(nearest.best, None);
        assert_eq!(nearest.distance, f64::MAX);
    }
}
