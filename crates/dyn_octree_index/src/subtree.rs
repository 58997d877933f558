use crate::{cache::SubtreeCaches, NodeKey, SubtreeId};

use dyn_octree_core::prelude::*;

/// One cell of the octree. Either a leaf holding resident nodes, or a branch with exactly 8
/// children and no residents of its own.
#[derive(Debug)]
pub(crate) struct Subtree {
    pub octant: Octant,
    pub depth: u8,
    pub parent: Option<SubtreeId>,
    pub children: Option<[SubtreeId; 8]>,
    pub residents: Vec<NodeKey>,
    /// Number of residents in this subtree, including all descendants.
    pub occupancy: usize,
    pub caches: SubtreeCaches,
}

impl Subtree {
    pub fn new(octant: Octant, depth: u8, parent: Option<SubtreeId>) -> Self {
        Self {
            octant,
            depth,
            parent,
            children: None,
            residents: Vec::new(),
            occupancy: 0,
            caches: SubtreeCaches::default(),
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The child that owns `p`. Must only be called on a branch.
    #[inline]
    pub fn child_containing(&self, p: Point3f) -> SubtreeId {
        let children = self
            .children
            .as_ref()
            .expect("child_containing called on a leaf");

        children[self.octant.child_index_containing(p) as usize]
    }
}
