use crate::draw::Painter;
use crate::select::{self, Nearest, PickedPoint};
use crate::stats::{self, TeardownStats, TreeStats};
use crate::view::{ColorManager, FrustumCuller, PointRenderer, RayPicker};
use crate::{decode_point, Child, Cube, Error, OctreeNode, Result};

use glam::DVec3;
use smallvec::SmallVec;
use std::fmt;
use std::mem;
use std::sync::Arc;

/// Per-dimension bounds: x, y, z and any attributes.
pub type Bounds = SmallVec<[f64; 4]>;

/// A compact octree over a quantized point cloud.
///
/// The root cube is centered at [`center`](Self::center) with half-size [`size`](Self::size). A leaf stores its points as
/// offsets from its own cube center in units of [`precision`](Self::precision). The tree is immutable once built; every query
/// takes `&self`, so any number of threads may read it at once.
pub struct Octree {
    mins: Bounds,
    maxs: Bounds,
    center: DVec3,
    size: f64,
    precision: f64,
    point_dim: usize,
    root: OctreeNode,
    color_manager: Option<Arc<dyn ColorManager>>,
}

impl Octree {
    /// Wraps an already assembled `root`. Bounds are computed from the stored points.
    pub fn try_from_parts(
        root: OctreeNode,
        center: DVec3,
        size: f64,
        precision: f64,
        point_dim: usize,
    ) -> Result<Self> {
        if point_dim < 3 {
            return Err(Error::InvalidPointDim(point_dim));
        }

        let mut mins = Bounds::from_elem(f64::INFINITY, point_dim);
        let mut maxs = Bounds::from_elem(f64::NEG_INFINITY, point_dim);
        let mut mismatch = None;
        {
            let mut stack = SmallVec::<[(&OctreeNode, Cube); 32]>::new();
            stack.push((&root, Cube::new(center, size)));
            while let Some((node, cube)) = stack.pop() {
                node.visit_children(|octant, child| {
                    let child_cube = cube.child(octant);
                    match child {
                        Child::Leaf(block) => {
                            if block.dim() != point_dim && !block.is_empty() {
                                mismatch = mismatch.or(Some(block.dim()));
                                return;
                            }
                            for point in block.iter() {
                                let p = decode_point(point, precision, child_cube.center);
                                let values = p
                                    .to_array()
                                    .into_iter()
                                    .chain(point[3..].iter().map(|&a| f64::from(a)));
                                for (i, v) in values.enumerate() {
                                    mins[i] = mins[i].min(v);
                                    maxs[i] = maxs[i].max(v);
                                }
                            }
                        }
                        Child::Node(inner) => stack.push((inner, child_cube)),
                    }
                });
            }
        }
        if let Some(found) = mismatch {
            return Err(Error::DimensionMismatch {
                expected: point_dim,
                found,
            });
        }
        if mins.iter().any(|m| m.is_infinite()) {
            // No points at all.
            let fallback = |i: usize| if i < 3 { center[i] } else { 0.0 };
            mins = (0..point_dim).map(fallback).collect();
            maxs = mins.clone();
        }

        Ok(Self::from_raw(
            root, mins, maxs, center, size, precision, point_dim,
        ))
    }

    pub(crate) fn from_raw(
        root: OctreeNode,
        mins: Bounds,
        maxs: Bounds,
        center: DVec3,
        size: f64,
        precision: f64,
        point_dim: usize,
    ) -> Self {
        Self {
            mins,
            maxs,
            center,
            size,
            precision,
            point_dim,
            root,
            color_manager: None,
        }
    }

    /// Center of the root cube.
    #[inline]
    pub fn center(&self) -> DVec3 {
        self.center
    }

    /// Half-size of the root cube.
    #[inline]
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Real-world distance of one code step.
    #[inline]
    pub fn precision(&self) -> f64 {
        self.precision
    }

    #[inline]
    pub fn point_dim(&self) -> usize {
        self.point_dim
    }

    /// Smallest value of every dimension over the input points.
    #[inline]
    pub fn mins(&self) -> &[f64] {
        &self.mins
    }

    /// Largest value of every dimension over the input points.
    #[inline]
    pub fn maxs(&self) -> &[f64] {
        &self.maxs
    }

    #[inline]
    pub fn root(&self) -> &OctreeNode {
        &self.root
    }

    #[inline]
    fn root_cube(&self) -> Cube {
        Cube::new(self.center, self.size)
    }

    /// Sets (or with `None`, clears) the color lookup used by every draw call.
    pub fn set_color_manager(&mut self, color_manager: Option<Arc<dyn ColorManager>>) {
        self.color_manager = color_manager;
    }

    pub fn color_manager(&self) -> Option<&Arc<dyn ColorManager>> {
        self.color_manager.as_ref()
    }

    /// Decodes every stored point, in tree order.
    pub fn all_points(&self) -> Vec<DVec3> {
        let mut out = Vec::new();
        stats::all_points(&self.root, self.root_cube(), self.precision, &mut out);
        out
    }

    /// One center per leaf, in tree order.
    pub fn leaf_centers(&self) -> Vec<DVec3> {
        let mut out = Vec::new();
        stats::leaf_centers(&self.root, self.root_cube(), &mut out);
        out
    }

    /// Number of internal nodes, root included.
    pub fn count_nodes(&self) -> u64 {
        1 + stats::count_nodes(&self.root)
    }

    /// Size metric over all leaves: `point_dim * points + 1` per leaf. Zero for an empty tree.
    pub fn count_leaves(&self) -> u64 {
        stats::count_leaves(&self.root)
    }

    /// An upper bound for useful budgets passed to [`Self::draw_culled`] or [`Self::draw_lod`].
    pub fn max_target_points(&self) -> u64 {
        stats::max_target_points(&self.root)
    }

    /// Node, leaf and point totals.
    pub fn stats(&self) -> TreeStats {
        stats::tree_stats(&self.root)
    }

    /// Draws every point.
    #[tracing::instrument(skip_all, name = "octree::draw_all")]
    pub fn draw_all<R>(&self, renderer: &mut R)
    where
        R: PointRenderer + ?Sized,
    {
        self.painter(renderer).all(&self.root, self.root_cube());
    }

    /// Draws every point inside the view frustum.
    #[tracing::instrument(skip_all, name = "octree::draw_all_culled")]
    pub fn draw_all_culled<C, R>(&self, culler: &C, renderer: &mut R)
    where
        C: FrustumCuller + ?Sized,
        R: PointRenderer + ?Sized,
    {
        self.painter(renderer)
            .all_culled(&self.root, self.root_cube(), culler);
    }

    /// Draws roughly `target_points` points, thinning out leaves that exceed their share. No culling.
    #[tracing::instrument(skip_all, name = "octree::draw_lod", fields(target_points = target_points))]
    pub fn draw_lod<R>(&self, target_points: i64, renderer: &mut R)
    where
        R: PointRenderer + ?Sized,
    {
        self.painter(renderer)
            .lod(target_points, &self.root, self.root_cube());
    }

    /// Draws roughly `target_points` points inside the view frustum.
    ///
    /// Leaves with more than [`SINGLE_PIXEL_MIN_POINTS`](crate::SINGLE_PIXEL_MIN_POINTS) points that cover a single pixel
    /// contribute one point.
    #[tracing::instrument(skip_all, name = "octree::draw_culled", fields(target_points = target_points))]
    pub fn draw_culled<C, R>(&self, target_points: i64, culler: &C, renderer: &mut R)
    where
        C: FrustumCuller + ?Sized,
        R: PointRenderer + ?Sized,
    {
        self.painter(renderer)
            .lod_culled(target_points, &self.root, self.root_cube(), culler);
    }

    /// Draws colored cube outlines for visible leaves, refining no further once a node's half-size drops below `min_size`.
    #[tracing::instrument(skip_all, name = "octree::draw_cubes")]
    pub fn draw_cubes<C, R>(&self, min_size: f64, culler: &C, renderer: &mut R)
    where
        C: FrustumCuller + ?Sized,
        R: PointRenderer + ?Sized,
    {
        self.painter(renderer)
            .cubes_culled(&self.root, self.root_cube(), min_size, culler);
    }

    /// Every point in every leaf the pick ray passes through.
    #[tracing::instrument(skip_all, name = "octree::select_points")]
    pub fn select_points<P>(&self, picker: &P) -> Vec<PickedPoint<'_>>
    where
        P: RayPicker + ?Sized,
    {
        let mut out = Vec::new();
        select::select_points(&self.root, self.root_cube(), self.precision, picker, &mut out);
        out
    }

    /// The point nearest to the ray origin among those within
    /// [`PICK_TOLERANCE_PIXELS`](crate::PICK_TOLERANCE_PIXELS) of the cursor.
    #[tracing::instrument(skip_all, name = "octree::select_nearest")]
    pub fn select_nearest<P>(&self, picker: &P) -> Option<PickedPoint<'_>>
    where
        P: RayPicker + ?Sized,
    {
        let mut nearest = Nearest::default();
        select::select_nearest(
            &self.root,
            self.root_cube(),
            self.precision,
            picker,
            &mut nearest,
        );
        nearest.best
    }

    /// Frees the whole tree, leaves first, and reports what was freed.
    pub fn teardown(mut self) -> TeardownStats {
        self.take_and_teardown()
    }

    /// Gives up the root node, leaving the handle empty.
    pub fn into_root(mut self) -> OctreeNode {
        mem::take(&mut self.root)
    }

    fn take_and_teardown(&mut self) -> TeardownStats {
        let mut freed = TeardownStats::default();
        stats::teardown(mem::take(&mut self.root), &mut freed);
        tracing::debug!(
            point_blocks = freed.point_blocks,
            child_arrays = freed.child_arrays,
            "tore down octree"
        );
        freed
    }

    fn painter<'a, R>(&'a self, renderer: &'a mut R) -> Painter<'a, R>
    where
        R: PointRenderer + ?Sized,
    {
        Painter {
            renderer,
            colors: self.color_manager.as_deref(),
            precision: self.precision,
        }
    }
}

impl Drop for Octree {
    fn drop(&mut self) {
        if !self.root.is_empty() {
            self.take_and_teardown();
        }
    }
}

impl fmt::Debug for Octree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Octree")
            .field("mins", &self.mins)
            .field("maxs", &self.maxs)
            .field("center", &self.center)
            .field("size", &self.size)
            .field("precision", &self.precision)
            .field("point_dim", &self.point_dim)
            .field("has_color_manager", &self.color_manager.is_some())
            .finish_non_exhaustive()
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
