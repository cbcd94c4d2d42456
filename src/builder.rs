use crate::tree::Bounds;
use crate::{
    encode_value, octant_of, Child, Cube, Error, Octant, Octree, OctreeConfig, OctreeNode, PointBlock, Result, CODE_BITS,
    OCTANTS,
};

use glam::DVec3;
use smallvec::SmallVec;

/// Builds an [`Octree`] from a flat buffer of points.
///
/// The root cube encloses every point with a margin of one unit. It is split until a child's half-size is at most the leaf
/// size, which is the root half-size halved until it no longer exceeds [`OctreeConfig::voxel_size`]. Leaf coordinates are
/// stored relative to the leaf center with a precision of `leaf_size / 2^15`, so every offset fits in a [`ShortCode`].
///
/// [`ShortCode`]: crate::ShortCode
#[derive(Clone, Debug, Default)]
pub struct OctreeBuilder {
    config: OctreeConfig,
}

impl OctreeBuilder {
    pub fn new(config: OctreeConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Builds a tree out of `points`, laid out as `[x, y, z, attributes..]` repeated `point_dim` values at a time.
    #[tracing::instrument(skip_all, name = "octree::build", fields(values = points.len()))]
    pub fn build(&self, points: &[f64]) -> Result<Octree> {
        let OctreeConfig {
            voxel_size,
            point_dim: dim,
        } = self.config;

        if dim < 3 {
            return Err(Error::InvalidPointDim(dim));
        }
        if !(voxel_size.is_finite() && voxel_size > 0.0) {
            return Err(Error::InvalidVoxelSize(voxel_size));
        }
        if points.is_empty() {
            return Err(Error::EmptyInput);
        }
        if points.len() % dim != 0 {
            return Err(Error::RaggedInput {
                len: points.len(),
                dim,
            });
        }
        if let Some(index) = points.iter().position(|v| !v.is_finite()) {
            return Err(Error::NonFiniteCoordinate { index });
        }

        let count = points.len() / dim;
        let mut mins = Bounds::from_elem(f64::INFINITY, dim);
        let mut maxs = Bounds::from_elem(f64::NEG_INFINITY, dim);
        for point in points.chunks_exact(dim) {
            for (i, &v) in point.iter().enumerate() {
                mins[i] = mins[i].min(v);
                maxs[i] = maxs[i].max(v);
            }
        }

        let lo = DVec3::new(mins[0], mins[1], mins[2]);
        let hi = DVec3::new(maxs[0], maxs[1], maxs[2]);
        let half_extent = (hi - lo) * 0.5;
        let size = half_extent.max_element() + 1.0;
        if !size.is_finite() {
            return Err(Error::NonFiniteExtent);
        }
        let center = lo + half_extent;
        let mut leaf_size = size;
        while leaf_size > voxel_size {
            leaf_size *= 0.5;
        }
        let precision = leaf_size / f64::from(1u32 << (CODE_BITS - 1));

        let mut indices = Vec::new();
        indices.try_reserve_exact(count)?;
        indices.extend(0..count);

        let subdivide = Subdivide {
            points,
            dim,
            leaf_size,
            precision,
        };
        let mut counts = BuildCounts::default();
        let root = subdivide.node(Cube::new(center, size), indices, 0, &mut counts)?;

        tracing::debug!(
            points = count,
            nodes = counts.nodes,
            leaves = counts.leaves,
            depth = counts.max_depth,
            size,
            leaf_size,
            precision,
            "built octree"
        );

        Ok(Octree::from_raw(
            root, mins, maxs, center, size, precision, dim,
        ))
    }
}

#[derive(Default)]
struct BuildCounts {
    nodes: u64,
    leaves: u64,
    max_depth: u32,
}

struct Subdivide<'a> {
    points: &'a [f64],
    dim: usize,
    leaf_size: f64,
    precision: f64,
}

impl Subdivide<'_> {
    #[inline]
    fn point(&self, i: usize) -> &[f64] {
        &self.points[i * self.dim..(i + 1) * self.dim]
    }

    #[inline]
    fn position(&self, i: usize) -> DVec3 {
        let p = self.point(i);
        DVec3::new(p[0], p[1], p[2])
    }

    fn node(
        &self,
        cube: Cube,
        indices: Vec<usize>,
        depth: u32,
        counts: &mut BuildCounts,
    ) -> Result<OctreeNode> {
        let mut buckets: [Vec<usize>; OCTANTS as usize] = Default::default();
        for i in indices {
            let bucket = &mut buckets[octant_of(cube.center, self.position(i)) as usize];
            bucket.try_reserve(1)?;
            bucket.push(i);
        }
        counts.nodes += 1;

        let mut children = SmallVec::<[(Octant, Child); 8]>::new();
        for (octant, bucket) in (0..OCTANTS).zip(buckets) {
            if bucket.is_empty() {
                continue;
            }
            let child_cube = cube.child(octant);
            let child = if child_cube.half_size <= self.leaf_size {
                counts.leaves += 1;
                counts.max_depth = counts.max_depth.max(depth + 1);
                Child::Leaf(self.leaf(child_cube.center, &bucket)?)
            } else {
                Child::Node(self.node(child_cube, bucket, depth + 1, counts)?)
            };
            children.push((octant, child));
        }
        OctreeNode::try_from_children(children)
    }

    fn leaf(&self, center: DVec3, indices: &[usize]) -> Result<PointBlock> {
        let mut codes = PointBlock::try_code_buffer(self.dim, indices.len())?;
        for &i in indices {
            let offset = (self.position(i) - center) / self.precision;
            codes.extend(offset.to_array().map(encode_value));
            codes.extend(self.point(i)[3..].iter().map(|&a| encode_value(a)));
        }
        PointBlock::try_from_codes(self.dim, codes)
    }
}
