use crate::{Error, Result, ShortCode};

use glam::DVec3;
use std::slice::ChunksExact;

/// The quantized points of one leaf.
///
/// Points are stored back to back, `dim` codes each. The first three codes of a point are its x, y and z offsets from the
/// leaf center in units of the tree's precision; any remaining codes are attributes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PointBlock {
    dim: usize,
    codes: Box<[ShortCode]>,
}

impl PointBlock {
    /// Wraps `codes` as a block of `dim`-dimensional points.
    pub fn try_from_codes(dim: usize, codes: Vec<ShortCode>) -> Result<Self> {
        if dim < 3 {
            return Err(Error::InvalidPointDim(dim));
        }
        if codes.len() % dim != 0 {
            return Err(Error::RaggedInput {
                len: codes.len(),
                dim,
            });
        }
        Ok(Self {
            dim,
            codes: codes.into_boxed_slice(),
        })
    }

    /// Allocates room for `count` points, reporting allocation failure instead of aborting.
    pub(crate) fn try_code_buffer(dim: usize, count: usize) -> Result<Vec<ShortCode>> {
        let mut codes = Vec::new();
        codes.try_reserve_exact(dim * count)?;
        Ok(codes)
    }

    /// The number of points (not codes).
    #[inline]
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.codes.len() / self.dim
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The codes of point `i`.
    ///
    /// # Panics
    ///
    /// If `i >= self.len()`.
    #[inline]
    pub fn point(&self, i: usize) -> &[ShortCode] {
        &self.codes[i * self.dim..(i + 1) * self.dim]
    }

    #[inline]
    pub fn iter(&self) -> ChunksExact<'_, ShortCode> {
        self.codes.chunks_exact(self.dim.max(1))
    }

    #[inline]
    pub fn codes(&self) -> &[ShortCode] {
        &self.codes
    }

    /// Decodes point `i` of a leaf centered at `leaf_center`.
    #[inline]
    pub fn decode(&self, i: usize, precision: f64, leaf_center: DVec3) -> DVec3 {
        decode_point(self.point(i), precision, leaf_center)
    }
}

/// Turns the first three codes of `point` into a real-world position: `code * precision + leaf_center`.
#[inline]
pub fn decode_point(point: &[ShortCode], precision: f64, leaf_center: DVec3) -> DVec3 {
    DVec3::new(
        f64::from(point[0]),
        f64::from(point[1]),
        f64::from(point[2]),
    ) * precision
        + leaf_center
}

/// Quantizes `value` to the nearest code, saturating at the ends of the code range.
#[inline]
pub fn encode_value(value: f64) -> ShortCode {
    // Float to int `as` casts saturate.
    value.round() as ShortCode
}

/// Picks `budget` evenly spaced point indices out of a block of `len` points with dimension `dim`.
///
/// The walk happens over flat code indices: iteration `k` lands on `floor(k * each)` with `each = dim * (len / budget)`,
/// rounded down to the start of a point. When `len <= budget` every point is yielded once.
pub fn stride_sample(len: usize, budget: usize, dim: usize) -> StrideSample {
    let each = if budget == 0 {
        0.0
    } else {
        dim as f64 * (len as f64 / budget as f64)
    };
    StrideSample {
        next: 0,
        count: budget.min(len),
        each,
        dim: dim.max(1),
        len,
        all: len <= budget,
    }
}

/// Iterator returned by [`stride_sample`].
#[derive(Clone, Debug)]
pub struct StrideSample {
    next: usize,
    count: usize,
    each: f64,
    dim: usize,
    len: usize,
    all: bool,
}

impl Iterator for StrideSample {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.next >= self.count {
            return None;
        }
        let k = self.next;
        self.next += 1;
        if self.all {
            return Some(k);
        }
        let flat = (k as f64 * self.each) as usize;
        let aligned = flat - flat % self.dim;
        // Float error must never carry us past the block.
        Some((aligned / self.dim).min(self.len - 1))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.count - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for StrideSample {}
