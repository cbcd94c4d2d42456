//! Recording collaborators and fixture trees shared by the unit tests.

use crate::view::{ColorManager, Containment, FrustumCuller, PointRenderer, RayPicker};
use crate::{Child, Octree, OctreeNode, PointBlock, ShortCode};

use glam::DVec3;
use std::cell::Cell;

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Begin,
    End,
    Color([f32; 3]),
    Vertex(DVec3),
}

/// A renderer that remembers everything it was asked to draw.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub events: Vec<Event>,
    pub vertices: Vec<DVec3>,
    pub quads: Vec<([f32; 3], [DVec3; 4])>,
    open: bool,
}

impl RecordingRenderer {
    pub fn batches(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::Begin).count()
    }
}

impl PointRenderer for RecordingRenderer {
    fn begin_points(&mut self) {
        assert!(!self.open, "nested point batch");
        self.open = true;
        self.events.push(Event::Begin);
    }

    fn end_points(&mut self) {
        assert!(self.open, "end without begin");
        self.open = false;
        self.events.push(Event::End);
    }

    fn set_color(&mut self, rgb: [f32; 3]) {
        self.events.push(Event::Color(rgb));
    }

    fn vertex(&mut self, position: DVec3) {
        assert!(self.open, "vertex outside of a point batch");
        self.events.push(Event::Vertex(position));
        self.vertices.push(position);
    }

    fn quad(&mut self, rgb: [f32; 3], corners: [DVec3; 4]) {
        self.quads.push((rgb, corners));
    }
}

/// Colors a point by its raw x code.
pub struct CodeColors;

impl ColorManager for CodeColors {
    fn color(&self, point: &[ShortCode]) -> [f32; 3] {
        [f32::from(point[0]), 0.0, 0.0]
    }
}

/// A culler driven by a closure, counting how often it classifies.
pub struct FnCuller<F> {
    classify: F,
    single_pixel: bool,
    calls: Cell<usize>,
}

impl<F> FnCuller<F>
where
    F: Fn(DVec3, f64) -> Containment,
{
    pub fn new(classify: F) -> Self {
        Self {
            classify,
            single_pixel: false,
            calls: Cell::new(0),
        }
    }

    pub fn with_single_pixel(mut self, single_pixel: bool) -> Self {
        self.single_pixel = single_pixel;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<F> FrustumCuller for FnCuller<F>
where
    F: Fn(DVec3, f64) -> Containment,
{
    fn classify_cube(&self, center: DVec3, half_size: f64) -> Containment {
        self.calls.set(self.calls.get() + 1);
        (self.classify)(center, half_size)
    }

    fn is_single_pixel(&self, _center: DVec3, _half_size: f64) -> bool {
        self.single_pixel
    }
}

/// A pick ray with a simple orthographic "screen": one world unit is `pixels_per_unit` pixels away from the ray.
pub struct AxisRay {
    pub origin: DVec3,
    pub dir: DVec3,
    pub pixels_per_unit: f64,
}

impl AxisRay {
    pub fn new(origin: DVec3, dir: DVec3) -> Self {
        Self {
            origin,
            dir: dir.normalize(),
            pixels_per_unit: 1.0,
        }
    }
}

impl RayPicker for AxisRay {
    fn hits_box(&self, center: DVec3, half_size: f64) -> bool {
        let min = center - DVec3::splat(half_size);
        let max = center + DVec3::splat(half_size);
        let mut t0 = 0.0f64;
        let mut t1 = f64::INFINITY;
        for axis in 0..3 {
            let o = self.origin[axis];
            let d = self.dir[axis];
            if d == 0.0 {
                if o < min[axis] || o > max[axis] {
                    return false;
                }
                continue;
            }
            let a = (min[axis] - o) / d;
            let b = (max[axis] - o) / d;
            t0 = t0.max(a.min(b));
            t1 = t1.min(a.max(b));
            if t0 > t1 {
                return false;
            }
        }
        true
    }

    fn ray_distance(&self, point: DVec3) -> f64 {
        (point - self.origin).dot(self.dir)
    }

    fn screen_distance(&self, point: DVec3) -> f64 {
        let v = point - self.origin;
        (v - self.dir * v.dot(self.dir)).length() * self.pixels_per_unit
    }
}

/// A block of `count` deterministic points, each coordinate within ±900 codes.
pub fn block(count: usize, seed: usize) -> PointBlock {
    let mut codes = Vec::new();
    for j in 0..count {
        for (k, step) in [37, 53, 71].into_iter().enumerate() {
            codes.push(((j * step + seed * (11 + k)) % 1800) as ShortCode - 900);
        }
    }
    PointBlock::try_from_codes(3, codes).unwrap()
}

/// One leaf of four points in octant 0, whose center is the origin. Precision is 0.01.
pub fn single_leaf_tree() -> Octree {
    let codes = vec![10, 20, 30, -40, 50, -60, 70, -80, 90, -100, 110, -120];
    let leaf = PointBlock::try_from_codes(3, codes).unwrap();
    let root = OctreeNode::try_from_children([(0, Child::Leaf(leaf))]).unwrap();
    Octree::try_from_parts(root, DVec3::ONE, 2.0, 0.01, 3).unwrap()
}

/// Three internal nodes and five leaves holding 3, 5, 1, 12 and 7 points.
///
/// ```text
/// root (center 0, half-size 8)
/// ├── 0: leaf, 3 points
/// ├── 3: node A
/// │   ├── 1: leaf, 5 points
/// │   └── 6: node B
/// │       ├── 0: leaf, 1 point
/// │       └── 7: leaf, 12 points
/// └── 7: leaf, 7 points
/// ```
pub fn mixed_tree() -> Octree {
    let b = OctreeNode::try_from_children([
        (0, Child::Leaf(block(1, 3))),
        (7, Child::Leaf(block(12, 4))),
    ])
    .unwrap();
    let a = OctreeNode::try_from_children([(1, Child::Leaf(block(5, 2))), (6, Child::Node(b))])
        .unwrap();
    let root = OctreeNode::try_from_children([
        (7, Child::Leaf(block(7, 5))),
        (0, Child::Leaf(block(3, 1))),
        (3, Child::Node(a)),
    ])
    .unwrap();
    Octree::try_from_parts(root, DVec3::ZERO, 8.0, 0.001, 3).unwrap()
}
