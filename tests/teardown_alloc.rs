//! Checks that tearing down or dropping a tree gives back every byte it allocated.

use compact_octree::{Child, Octree, OctreeNode, PointBlock, TeardownStats};
use compact_octree::glam::DVec3;

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

struct CountingAlloc;

thread_local! {
    static LIVE_BYTES: Cell<isize> = const { Cell::new(0) };
}

fn track(delta: isize) {
    // Ignore allocations made while the thread is shutting down.
    let _ = LIVE_BYTES.try_with(|live| live.set(live.get() + delta));
}

fn live_bytes() -> isize {
    LIVE_BYTES.with(Cell::get)
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            track(layout.size() as isize);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        track(-(layout.size() as isize));
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            track(new_size as isize - layout.size() as isize);
        }
        new_ptr
    }
}

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

fn leaf(count: i16) -> Child {
    let codes = (0..count * 3).map(|c| c * 7 - 100).collect();
    Child::Leaf(PointBlock::try_from_codes(3, codes).unwrap())
}

/// Three internal nodes and five leaves.
fn mixed_tree() -> Octree {
    let b = OctreeNode::try_from_children([(0, leaf(1)), (7, leaf(12))]).unwrap();
    let a = OctreeNode::try_from_children([(1, leaf(5)), (6, Child::Node(b))]).unwrap();
    let root =
        OctreeNode::try_from_children([(0, leaf(3)), (3, Child::Node(a)), (7, leaf(7))]).unwrap();
    Octree::try_from_parts(root, DVec3::ZERO, 8.0, 0.001, 3).unwrap()
}

#[test]
fn teardown_returns_every_allocation() {
    let before = live_bytes();

    let tree = mixed_tree();
    assert!(live_bytes() > before);
    let freed = tree.teardown();

    assert_eq!(
        freed,
        TeardownStats {
            point_blocks: 5,
            child_arrays: 3,
        }
    );
    assert_eq!(live_bytes(), before);
}

#[test]
fn drop_returns_every_allocation() {
    let before = live_bytes();
    {
        let tree = mixed_tree();
        assert_eq!(tree.all_points().len(), 28);
    }
    assert_eq!(live_bytes(), before);
}

#[test]
fn built_tree_returns_every_allocation() {
    let values: Vec<f64> = (0..600).map(|i| ((i * 37) % 101) as f64 * 0.25).collect();
    let before = live_bytes();
    {
        let tree = compact_octree::OctreeBuilder::new(
            compact_octree::OctreeConfig::DEFAULT.with_voxel_size(0.5),
        )
        .build(&values)
        .unwrap();
        let stats = tree.stats();
        let freed = tree.teardown();
        assert_eq!(freed.point_blocks, stats.leaves);
        assert_eq!(freed.child_arrays, stats.nodes);
    }
    assert_eq!(live_bytes(), before);
}

#[test]
fn empty_tree_frees_nothing() {
    let tree = Octree::try_from_parts(OctreeNode::empty(), DVec3::ZERO, 1.0, 0.1, 3).unwrap();
    assert_eq!(tree.teardown(), TeardownStats::default());
}
