use crate::Octant;

use std::collections::TryReserveError;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building or assembling an [`Octree`](crate::Octree).
///
/// Queries on a finished tree never fail.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A point block or child array could not be allocated.
    #[error("failed to allocate octree storage")]
    Alloc(#[from] TryReserveError),

    /// The builder was given no points.
    #[error("cannot build an octree without points")]
    EmptyInput,

    /// Points need at least x, y and z.
    #[error("point dimension must be at least 3, got {0}")]
    InvalidPointDim(usize),

    /// The flat coordinate buffer does not hold a whole number of points.
    #[error("{len} coordinates do not divide into points of dimension {dim}")]
    RaggedInput { len: usize, dim: usize },

    /// A coordinate was NaN or infinite.
    #[error("coordinate {index} is not finite")]
    NonFiniteCoordinate { index: usize },

    /// The points are spread too far apart for their bounding cube to have a finite size.
    #[error("point extent along some axis is not representable as a finite number")]
    NonFiniteExtent,

    #[error("voxel size must be finite and positive, got {0}")]
    InvalidVoxelSize(f64),

    #[error("octant {0} is out of range")]
    OctantOutOfRange(Octant),

    #[error("octant {0} was given more than once")]
    DuplicateOctant(Octant),

    /// A point block's dimension does not match the tree's.
    #[error("expected points of dimension {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}
