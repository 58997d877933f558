use dyn_octree_core::prelude::*;

/// A handle to a node stored in an `OctreeIndex`.
///
/// Handles stay valid while the node moves between subtrees during subdivision and merging. Once
/// the node is removed, the handle is dead forever, even if its storage slot gets reused.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeKey {
    pub(crate) slot: usize,
    pub(crate) stamp: u64,
}

/// Identifies a subtree within one `OctreeIndex`. Only meaningful until the next mutation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SubtreeId(pub(crate) usize);

/// A positioned data point resident in some leaf of an `OctreeIndex`.
#[derive(Clone, Debug)]
pub struct OctreeNode<T> {
    pub(crate) position: Point3f,
    pub(crate) data: T,
    pub(crate) enabled: bool,
    pub(crate) key: NodeKey,
    // Non-owning; only used to find which caches to invalidate when `enabled` changes.
    pub(crate) owner: SubtreeId,
}

impl<T> OctreeNode<T> {
    #[inline]
    pub fn position(&self) -> Point3f {
        self.position
    }

    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Disabled nodes are skipped by sphere casts and by enabled-filtered nearest searches.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// The leaf subtree currently holding this node. Changes whenever the tree restructures.
    #[inline]
    pub(crate) fn owner(&self) -> SubtreeId {
        self.owner
    }
}
