use crate::view::{ColorManager, Containment, FrustumCuller, PointRenderer};
use crate::{decode_point, stride_sample, Child, Cube, OctreeNode, PointBlock, SINGLE_PIXEL_MIN_POINTS};

use glam::DVec3;

/// Streams decoded points of a tree into a [`PointRenderer`].
///
/// Every method is a depth-first walk over the children of one node; the cube passed in is that node's cube.
pub(crate) struct Painter<'a, R: ?Sized> {
    pub renderer: &'a mut R,
    pub colors: Option<&'a dyn ColorManager>,
    pub precision: f64,
}

impl<'a, R> Painter<'a, R>
where
    R: PointRenderer + ?Sized,
{
    /// Draws every point below `node` without culling or budget.
    pub fn all(&mut self, node: &OctreeNode, cube: Cube) {
        node.visit_children(|octant, child| match child {
            Child::Leaf(block) => self.leaf_all(block, cube.child(octant).center),
            Child::Node(inner) => self.all(inner, cube.child(octant)),
        });
    }

    /// Like [`Self::all`], skipping everything outside the frustum.
    pub fn all_culled<C>(&mut self, node: &OctreeNode, cube: Cube, culler: &C)
    where
        C: FrustumCuller + ?Sized,
    {
        match culler.classify_cube(cube.center, cube.half_size) {
            Containment::Outside => {
                tracing::trace!(?cube, "culled subtree");
                return;
            }
            // Everything below is visible, stop testing.
            Containment::Inside => return self.all(node, cube),
            Containment::Partial => {}
        }

        node.visit_children(|octant, child| {
            let child_cube = cube.child(octant);
            match child {
                Child::Leaf(block) => {
                    if culler.is_cube_visible(child_cube.center, child_cube.half_size) {
                        self.leaf_all(block, child_cube.center);
                    }
                }
                Child::Node(inner) => self.all_culled(inner, child_cube, culler),
            }
        });
    }

    /// Draws at most about `target_points` points below `node`, splitting the budget evenly between children.
    pub fn lod(&mut self, target_points: i64, node: &OctreeNode, cube: Cube) {
        let Some(budget) = split_budget(target_points, node) else {
            return;
        };

        node.visit_children(|octant, child| {
            let child_cube = cube.child(octant);
            match child {
                Child::Leaf(block) => self.leaf_budgeted(block, child_cube.center, budget),
                Child::Node(inner) => self.lod(budget, inner, child_cube),
            }
        });
    }

    /// Budgeted drawing with frustum culling and the single pixel shortcut.
    pub fn lod_culled<C>(&mut self, target_points: i64, node: &OctreeNode, cube: Cube, culler: &C)
    where
        C: FrustumCuller + ?Sized,
    {
        if target_points <= 0 {
            return;
        }
        match culler.classify_cube(cube.center, cube.half_size) {
            Containment::Outside => {
                tracing::trace!(?cube, "culled subtree");
                return;
            }
            Containment::Inside => return self.lod(target_points, node, cube),
            Containment::Partial => {}
        }
        let Some(budget) = split_budget(target_points, node) else {
            return;
        };

        node.visit_children(|octant, child| {
            let child_cube = cube.child(octant);
            match child {
                Child::Leaf(block) => {
                    if !culler.is_cube_visible(child_cube.center, child_cube.half_size) {
                        return;
                    }
                    if block.len() > SINGLE_PIXEL_MIN_POINTS
                        && culler.is_single_pixel(child_cube.center, child_cube.half_size)
                    {
                        self.leaf_first(block, child_cube.center);
                    } else {
                        self.leaf_budgeted(block, child_cube.center, budget);
                    }
                }
                Child::Node(inner) => self.lod_culled(budget, inner, child_cube, culler),
            }
        });
    }

    /// Draws cube outlines for leaves and for children of nodes whose half-size is below `min_size`.
    pub fn cubes(&mut self, node: &OctreeNode, cube: Cube, min_size: f64) {
        node.visit_children(|octant, child| {
            let child_cube = cube.child(octant);
            match child {
                Child::Node(inner) if cube.half_size >= min_size => {
                    self.cubes(inner, child_cube, min_size)
                }
                _ => self.outline(child_cube),
            }
        });
    }

    /// [`Self::cubes`] with frustum culling.
    pub fn cubes_culled<C>(&mut self, node: &OctreeNode, cube: Cube, min_size: f64, culler: &C)
    where
        C: FrustumCuller + ?Sized,
    {
        match culler.classify_cube(cube.center, cube.half_size) {
            Containment::Outside => return,
            Containment::Inside => return self.cubes(node, cube, min_size),
            Containment::Partial => {}
        }

        node.visit_children(|octant, child| {
            let child_cube = cube.child(octant);
            match child {
                Child::Node(inner) if cube.half_size >= min_size => {
                    self.cubes_culled(inner, child_cube, min_size, culler)
                }
                _ => {
                    if culler.is_cube_visible(child_cube.center, child_cube.half_size) {
                        self.outline(child_cube);
                    }
                }
            }
        });
    }

    fn leaf_all(&mut self, block: &PointBlock, center: DVec3) {
        self.renderer.begin_points();
        for point in block.iter() {
            self.point(point, center);
        }
        self.renderer.end_points();
    }

    fn leaf_first(&mut self, block: &PointBlock, center: DVec3) {
        self.renderer.begin_points();
        self.point(block.point(0), center);
        self.renderer.end_points();
    }

    fn leaf_budgeted(&mut self, block: &PointBlock, center: DVec3, budget: i64) {
        let budget = usize::try_from(budget).unwrap_or(0);
        if block.len() <= budget {
            return self.leaf_all(block, center);
        }
        self.renderer.begin_points();
        for i in stride_sample(block.len(), budget, block.dim()) {
            self.point(block.point(i), center);
        }
        self.renderer.end_points();
    }

    #[inline]
    fn point(&mut self, point: &[i16], center: DVec3) {
        if let Some(colors) = self.colors {
            self.renderer.set_color(colors.color(point));
        }
        self.renderer
            .vertex(decode_point(point, self.precision, center));
    }

    fn outline(&mut self, cube: Cube) {
        for (rgb, corners) in cube.faces() {
            self.renderer.quad(rgb, corners);
        }
    }
}

/// Divides `target_points` between the children of `node`, or returns `None` when nothing is left to draw.
#[inline]
fn split_budget(target_points: i64, node: &OctreeNode) -> Option<i64> {
    if target_points <= 0 {
        return None;
    }
    let children = i64::from(node.num_children());
    if children == 0 {
        return Some(target_points);
    }
    let per_child = target_points / children;
    (per_child > 0).then_some(per_child)
}
