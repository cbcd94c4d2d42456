/// Number of bits in a [`ShortCode`](crate::ShortCode).
pub const CODE_BITS: u32 = 16;

/// Leaves with more points than this are collapsed to a single point when they cover at most one pixel.
pub const SINGLE_PIXEL_MIN_POINTS: usize = 10;

/// Maximum screen distance, in pixels, between the cursor and a point picked by
/// [`Octree::select_nearest`](crate::Octree::select_nearest).
pub const PICK_TOLERANCE_PIXELS: f64 = 5.0;

/// Parameters for [`OctreeBuilder`](crate::OctreeBuilder).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeConfig {
    /// Upper bound on the half-size of a leaf cube. The real leaf size is the root half-size halved until it fits.
    pub voxel_size: f64,
    /// Values per point: x, y, z and any extra attributes.
    pub point_dim: usize,
}

impl OctreeConfig {
    /// Leaves no larger than one unit, points with only x, y and z.
    pub const DEFAULT: Self = Self {
        voxel_size: 1.0,
        point_dim: 3,
    };

    /// Replaces [`Self::voxel_size`]. Must be finite and positive for the build to succeed.
    pub fn with_voxel_size(mut self, voxel_size: f64) -> Self {
        self.voxel_size = voxel_size;
        self
    }

    /// Replaces [`Self::point_dim`]. Must be at least 3.
    pub fn with_point_dim(mut self, point_dim: usize) -> Self {
        self.point_dim = point_dim;
        self
    }
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
