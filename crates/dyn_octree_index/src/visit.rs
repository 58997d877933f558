use crate::{subtree::Subtree, OctreeIndex, OctreeNode, SubtreeId};

use dyn_octree_core::prelude::*;

impl<T> OctreeIndex<T> {
    /// Visit every subtree of the index in pre-order, starting at the root. Children are visited
    /// in child index order.
    pub fn visit_subtrees(&self, visitor: &mut impl OctreeVisitor<T>) -> VisitStatus {
        self._visit(self.root, visitor)
    }

    fn _visit(&self, id: SubtreeId, visitor: &mut impl OctreeVisitor<T>) -> VisitStatus {
        let view = SubtreeView { index: self, id };
        let status = visitor.visit_subtree(&view);
        if status != VisitStatus::Continue {
            return status;
        }

        if let Some(children) = view.subtree().children {
            for child in children.iter() {
                if self._visit(*child, visitor) == VisitStatus::ExitEarly {
                    return VisitStatus::ExitEarly;
                }
            }
        }

        // Continue with the rest of the tree.
        VisitStatus::Continue
    }

    /// Summarizes the current shape of the tree.
    pub fn stats(&self) -> OctreeStats {
        let mut stats = OctreeStats {
            nodes: self.len(),
            subtrees: 0,
            leaves: 0,
            max_depth_reached: 0,
        };
        self.visit_subtrees(&mut |view: &SubtreeView<'_, T>| {
            stats.subtrees += 1;
            if view.is_leaf() {
                stats.leaves += 1;
            }
            stats.max_depth_reached = stats.max_depth_reached.max(view.depth());

            VisitStatus::Continue
        });

        stats
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OctreeStats {
    pub nodes: usize,
    pub subtrees: usize,
    pub leaves: usize,
    pub max_depth_reached: u8,
}

/// Read-only access to one subtree during `OctreeIndex::visit_subtrees`.
pub struct SubtreeView<'a, T> {
    index: &'a OctreeIndex<T>,
    id: SubtreeId,
}

impl<'a, T> SubtreeView<'a, T> {
    fn subtree(&self) -> &'a Subtree {
        &self.index.subtrees[self.id.0]
    }

    pub fn id(&self) -> SubtreeId {
        self.id
    }

    pub fn octant(&self) -> Octant {
        self.subtree().octant
    }

    /// The root is at depth 0.
    pub fn depth(&self) -> u8 {
        self.subtree().depth
    }

    pub fn parent(&self) -> Option<SubtreeId> {
        self.subtree().parent
    }

    pub fn is_leaf(&self) -> bool {
        self.subtree().is_leaf()
    }

    /// The number of nodes in this subtree and all of its descendants.
    pub fn occupancy(&self) -> usize {
        self.subtree().occupancy
    }

    /// The nodes held directly by this subtree. Always empty for branches.
    pub fn residents(&self) -> impl Iterator<Item = &'a OctreeNode<T>> + 'a {
        let index = self.index;

        self.subtree()
            .residents
            .iter()
            .map(move |key| &index.nodes[key.slot])
    }

    /// Returns `true` iff any query results are currently memoized in this subtree.
    pub fn has_cached_results(&self) -> bool {
        !self.subtree().caches.is_empty()
    }
}

pub trait OctreeVisitor<T> {
    /// Visit a subtree. Returning `Stop` skips its descendants.
    fn visit_subtree(&mut self, subtree: &SubtreeView<'_, T>) -> VisitStatus;
}

impl<T, F> OctreeVisitor<T> for F
where
    F: FnMut(&SubtreeView<'_, T>) -> VisitStatus,
{
    fn visit_subtree(&mut self, subtree: &SubtreeView<'_, T>) -> VisitStatus {
        (self)(subtree)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VisitStatus {
    /// Continue traversing this branch.
    Continue,
    /// Stop traversing this branch.
    Stop,
    /// Stop traversing the entire tree. No further subtrees will be visited.
    ExitEarly,
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
