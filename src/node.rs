use crate::{Error, Octant, PointBlock, Result, OCTANTS};

/// One occupied child slot of an [`OctreeNode`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Child {
    Leaf(PointBlock),
    Node(OctreeNode),
}

/// An internal node of the compact octree.
///
/// Bit `i` of `valid` is set iff octant `i` exists, and bit `i` of `leaf` is set iff that child is a [`Child::Leaf`]. Only
/// existing children are stored, in increasing octant order, so the k-th set bit of `valid` is the k-th slot.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OctreeNode {
    valid: u8,
    leaf: u8,
    children: Box<[Child]>,
}

impl OctreeNode {
    /// A node without children.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assembles a node from `(octant, child)` pairs given in any order.
    pub fn try_from_children(children: impl IntoIterator<Item = (Octant, Child)>) -> Result<Self> {
        let children = children.into_iter();
        let mut slots = Vec::new();
        slots.try_reserve_exact(children.size_hint().0.min(OCTANTS as usize))?;

        let mut valid = 0u8;
        let mut leaf = 0u8;
        for (octant, child) in children {
            if octant >= OCTANTS {
                return Err(Error::OctantOutOfRange(octant));
            }
            let bit = 1 << octant;
            if valid & bit != 0 {
                return Err(Error::DuplicateOctant(octant));
            }
            valid |= bit;
            if let Child::Leaf(_) = child {
                leaf |= bit;
            }
            slots.try_reserve(1)?;
            slots.push((octant, child));
        }
        slots.sort_unstable_by_key(|(octant, _)| *octant);

        let mut ordered = Vec::new();
        ordered.try_reserve_exact(slots.len())?;
        ordered.extend(slots.into_iter().map(|(_, child)| child));

        Ok(Self {
            valid,
            leaf,
            children: ordered.into_boxed_slice(),
        })
    }

    /// Mask of existing octants.
    #[inline]
    pub fn valid_mask(&self) -> u8 {
        self.valid
    }

    /// Mask of existing octants that are leaves. Always a subset of [`Self::valid_mask`].
    #[inline]
    pub fn leaf_mask(&self) -> u8 {
        self.leaf
    }

    #[inline]
    pub fn has_child(&self, octant: Octant) -> bool {
        octant < OCTANTS && self.valid & (1 << octant) != 0
    }

    #[inline]
    pub fn is_leaf(&self, octant: Octant) -> bool {
        octant < OCTANTS && self.leaf & (1 << octant) != 0
    }

    /// The number of existing children.
    #[inline]
    pub fn num_children(&self) -> u32 {
        self.valid.count_ones()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.valid == 0
    }

    /// The occupied slots, in increasing octant order.
    #[inline]
    pub fn child_slots(&self) -> &[Child] {
        &self.children
    }

    /// Returns the child in `octant`, if it exists.
    #[inline]
    pub fn child(&self, octant: Octant) -> Option<&Child> {
        if !self.has_child(octant) {
            return None;
        }
        let below = self.valid & ((1u8 << octant) - 1);
        self.children.get(below.count_ones() as usize)
    }

    /// Visits every existing child with its octant, in increasing octant order.
    ///
    /// Walks all eight octants and advances a separate slot cursor only for the ones present in the valid mask.
    #[inline]
    pub fn visit_children<'a>(&'a self, mut visitor: impl FnMut(Octant, &'a Child)) {
        let mut slots = self.children.iter();
        for octant in 0..OCTANTS {
            if self.has_child(octant) {
                if let Some(child) = slots.next() {
                    visitor(octant, child);
                }
            }
        }
    }

    /// Iterator form of [`Self::visit_children`].
    pub fn children(&self) -> Children<'_> {
        Children {
            node: self,
            octant: 0,
            cursor: 0,
        }
    }

    pub(crate) fn into_slots(self) -> Vec<Child> {
        self.children.into_vec()
    }
}

/// Iterator over `(octant, child)` pairs of an [`OctreeNode`].
#[derive(Clone, Debug)]
pub struct Children<'a> {
    node: &'a OctreeNode,
    octant: Octant,
    cursor: usize,
}

impl<'a> Iterator for Children<'a> {
    type Item = (Octant, &'a Child);

    fn next(&mut self) -> Option<Self::Item> {
        while self.octant < OCTANTS {
            let octant = self.octant;
            self.octant += 1;
            if self.node.has_child(octant) {
                let child = self.node.children.get(self.cursor)?;
                self.cursor += 1;
                return Some((octant, child));
            }
        }
        None
    }
}
