use crate::{decode_point, Child, Cube, OctreeNode};

use glam::DVec3;
use smallvec::SmallVec;

/// Counts gathered in one walk over a tree.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TreeStats {
    /// Internal nodes, root included.
    pub nodes: u64,
    /// Leaf slots.
    pub leaves: u64,
    /// Stored points.
    pub points: u64,
    /// Deepest leaf, where children of the root are at depth 1.
    pub max_depth: u32,
}

/// What a teardown freed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TeardownStats {
    /// Leaf blocks that held at least one point. Empty leaves own no storage and are not counted.
    pub point_blocks: u64,
    /// Child arrays of internal nodes that had at least one child.
    pub child_arrays: u64,
}

/// Appends every decoded point below `node` to `out`.
pub(crate) fn all_points(node: &OctreeNode, cube: Cube, precision: f64, out: &mut Vec<DVec3>) {
    node.visit_children(|octant, child| {
        let child_cube = cube.child(octant);
        match child {
            Child::Leaf(block) => {
                out.extend(
                    block
                        .iter()
                        .map(|point| decode_point(point, precision, child_cube.center)),
                );
            }
            Child::Node(inner) => all_points(inner, child_cube, precision, out),
        }
    });
}

/// Appends the center of every leaf below `node` to `out`.
pub(crate) fn leaf_centers(node: &OctreeNode, cube: Cube, out: &mut Vec<DVec3>) {
    node.visit_children(|octant, child| {
        let child_cube = cube.child(octant);
        match child {
            Child::Leaf(_) => out.push(child_cube.center),
            Child::Node(inner) => leaf_centers(inner, child_cube, out),
        }
    });
}

/// Internal descendants of `node`, not counting `node` itself.
pub(crate) fn count_nodes(node: &OctreeNode) -> u64 {
    let mut result = 0;
    node.visit_children(|_, child| {
        if let Child::Node(inner) = child {
            result += count_nodes(inner) + 1;
        }
    });
    result
}

/// Sum of `point_dim * len + 1` over all leaves: the number of codes plus one length slot per leaf.
pub(crate) fn count_leaves(node: &OctreeNode) -> u64 {
    let mut result = 0;
    node.visit_children(|_, child| match child {
        Child::Leaf(block) => result += block.codes().len() as u64 + 1,
        Child::Node(inner) => result += count_leaves(inner),
    });
    result
}

/// The largest child cost times the number of children, where a leaf costs its point count.
pub(crate) fn max_target_points(node: &OctreeNode) -> u64 {
    let mut max = 0u64;
    node.visit_children(|_, child| {
        let cost = match child {
            Child::Leaf(block) => block.len() as u64,
            Child::Node(inner) => max_target_points(inner),
        };
        max = max.max(cost);
    });
    max * u64::from(node.num_children())
}

pub(crate) fn tree_stats(root: &OctreeNode) -> TreeStats {
    let mut stats = TreeStats {
        nodes: 1,
        ..Default::default()
    };
    let mut stack = SmallVec::<[(&OctreeNode, u32); 32]>::new();
    stack.push((root, 0));
    while let Some((node, depth)) = stack.pop() {
        node.visit_children(|_, child| match child {
            Child::Leaf(block) => {
                stats.leaves += 1;
                stats.points += block.len() as u64;
                stats.max_depth = stats.max_depth.max(depth + 1);
            }
            Child::Node(inner) => {
                stats.nodes += 1;
                stack.push((inner, depth + 1));
            }
        });
    }
    stats
}

/// Frees everything below `node` and then `node`'s own child array, children before parents.
pub(crate) fn teardown(node: OctreeNode, stats: &mut TeardownStats) {
    let slots = node.into_slots();
    let had_children = !slots.is_empty();
    for child in slots {
        match child {
            Child::Leaf(block) => {
                if !block.is_empty() {
                    stats.point_blocks += 1;
                }
            }
            Child::Node(inner) => teardown(inner, stats),
        }
    }
    if had_children {
        stats.child_arrays += 1;
    }
}
