//! The `OctreeIndex` type is a dynamic set of positioned data points organized hierarchically.
//!
//! The index starts as a single leaf covering the root box. Leaves hold up to `max_occupancy`
//! resident nodes. Inserting into a full leaf splits it into 8 children (all at once, never one
//! at a time) and pushes the residents down. Removing nodes until a branch holds `min_occupancy`
//! or fewer collapses the whole branch back into a leaf. Leaves at `max_depth` never split, so they
//! may hold any number of residents.
//!
//! # Storage
//!
//! Subtrees and nodes live in two `Slab` arenas owned by the index. Subtrees refer to their parent
//! and children by `SubtreeId`, and each node refers back to the leaf that owns it. These links are
//! plain indices, so there is no reference cycle; the back-links are only followed to invalidate
//! query caches.
//!
//! # Example
//!
//! ```
//! use dyn_octree_core::prelude::*;
//! use dyn_octree_index::prelude::*;
//!
//! let mut index = OctreeIndex::new(Point3f::ZERO, Point3f::fill(5.0), 3, 1, 3);
//!
//! index.insert(PointN([1.0, 1.0, 1.0]), "a").unwrap();
//! index.insert(PointN([2.0, 2.0, 2.0]), "b").unwrap();
//! index.insert(PointN([4.0, 4.0, 4.0]), "c").unwrap();
//!
//! let mut found: Vec<_> = index
//!     .sphere_cast(PointN([1.0, 1.0, 1.0]), 2.0)
//!     .into_iter()
//!     .map(|node| *node.data())
//!     .collect();
//! found.sort();
//! assert_eq!(found, vec!["a", "b"]);
//!
//! assert!(index.insert(PointN([6.0, 0.0, 0.0]), "d").is_err());
//! ```

use crate::{
    subtree::Subtree, ConfigError, NodeKey, OctreeConfig, OctreeError, OctreeNode, SubtreeId,
};

use dyn_octree_core::prelude::*;

use slab::Slab;
use tracing::{debug, trace};

/// A dynamic point octree with per-subtree query caches. See the [module docs](self).
///
/// The index is single-threaded: query caches are filled through shared references using
/// interior mutability, so the type is `Send` (when `T` is) but never `Sync`.
#[derive(Debug)]
pub struct OctreeIndex<T> {
    pub(crate) config: OctreeConfig,
    pub(crate) root: SubtreeId,
    pub(crate) subtrees: Slab<Subtree>,
    pub(crate) nodes: Slab<OctreeNode<T>>,
    next_stamp: u64,
}

impl<T> OctreeIndex<T> {
    /// Make an empty index covering the box `origin +/- half_extent`.
    ///
    /// # Panics
    ///
    /// If the parameters are invalid, as described by `OctreeConfig::validate`.
    pub fn new(
        origin: Point3f,
        half_extent: Point3f,
        max_depth: u8,
        min_occupancy: usize,
        max_occupancy: usize,
    ) -> Self {
        Self::with_config(OctreeConfig::new(
            origin,
            half_extent,
            max_depth,
            min_occupancy,
            max_occupancy,
        ))
    }

    /// Same as `new`, but returns the reason instead of panicking when the parameters are invalid.
    pub fn try_new(
        origin: Point3f,
        half_extent: Point3f,
        max_depth: u8,
        min_occupancy: usize,
        max_occupancy: usize,
    ) -> Result<Self, ConfigError> {
        Self::try_with_config(OctreeConfig::new(
            origin,
            half_extent,
            max_depth,
            min_occupancy,
            max_occupancy,
        ))
    }

    /// Same as `new`, but taking the parameters bundled in an `OctreeConfig`.
    ///
    /// # Panics
    ///
    /// If the `config` is invalid.
    pub fn with_config(config: OctreeConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(index) => index,
            Err(e) => panic!("invalid octree config {:?}: {}", config, e),
        }
    }

    /// Make an empty index, or report why `config` is unusable.
    pub fn try_with_config(config: OctreeConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut subtrees = Slab::new();
        let root = SubtreeId(subtrees.insert(Subtree::new(config.root_octant(), 0, None)));

        Ok(Self {
            config,
            root,
            subtrees,
            nodes: Slab::new(),
            next_stamp: 0,
        })
    }

    #[inline]
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// The closed box of positions accepted by `insert`.
    #[inline]
    pub fn bounds(&self) -> Extent3f {
        self.config.bounds()
    }

    #[inline]
    pub fn contains_point(&self, p: Point3f) -> bool {
        self.bounds().contains(p)
    }

    /// The number of nodes in the index.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node for `key`, if it is still in the index.
    #[inline]
    pub fn get(&self, key: NodeKey) -> Option<&OctreeNode<T>> {
        self.nodes.get(key.slot).filter(|node| node.key == key)
    }

    /// Mutable access to the payload of the node for `key`. Positions and enabled flags can't be
    /// changed through this, so caches stay valid.
    #[inline]
    pub fn get_mut_data(&mut self, key: NodeKey) -> Option<&mut T> {
        self.nodes
            .get_mut(key.slot)
            .filter(|node| node.key == key)
            .map(|node| &mut node.data)
    }

    /// Iterate over every node, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &OctreeNode<T>> {
        self.nodes.iter().map(|(_, node)| node)
    }

    pub fn positions(&self) -> impl Iterator<Item = Point3f> + '_ {
        self.iter().map(|node| node.position)
    }

    /// Inserts `data` at `position`, returning a handle to the new node.
    ///
    /// Any number of nodes may share a position. The bounds check happens once here; the
    /// descent below assumes containment.
    pub fn insert(&mut self, position: Point3f, data: T) -> Result<NodeKey, OctreeError> {
        self.check_bounds(position)?;

        let leaf = self.find_leaf_for_insert(position);

        let key = NodeKey {
            slot: self.nodes.vacant_key(),
            stamp: self.take_stamp(),
        };
        let slot = self.nodes.insert(OctreeNode {
            position,
            data,
            enabled: true,
            key,
            owner: leaf,
        });
        debug_assert_eq!(slot, key.slot);

        let leaf_subtree = &mut self.subtrees[leaf.0];
        leaf_subtree.residents.push(key);
        assert!(
            leaf_subtree.residents.len() <= self.config.max_occupancy
                || leaf_subtree.depth == self.config.max_depth,
            "leaf at depth {} overflowed",
            leaf_subtree.depth
        );

        self.walk_to_root(leaf, |subtree| subtree.occupancy += 1);

        trace!(?position, ?key, "inserted node");

        Ok(key)
    }

    /// Removes the first node found at exactly `position`, returning its data. `Ok(None)` means
    /// no node is there.
    pub fn remove(&mut self, position: Point3f) -> Result<Option<T>, OctreeError> {
        self.check_bounds(position)?;

        let leaf = self.leaf_containing(position);
        let found = self.subtrees[leaf.0]
            .residents
            .iter()
            .copied()
            .find(|key| self.nodes[key.slot].position == position);

        Ok(found.map(|key| self.remove_resident(leaf, key)))
    }

    /// Removes the node for `key`, returning its data, or `None` if the handle is dead.
    pub fn remove_node(&mut self, key: NodeKey) -> Option<T> {
        let owner = self.get(key)?.owner();

        Some(self.remove_resident(owner, key))
    }

    /// Enables or disables the node for `key`. Returns `true` iff the flag changed, in which case
    /// every cache from the node's leaf up to the root is invalidated.
    pub fn set_enabled(&mut self, key: NodeKey, enabled: bool) -> Result<bool, OctreeError> {
        let node = self
            .nodes
            .get_mut(key.slot)
            .filter(|node| node.key == key)
            .ok_or(OctreeError::StaleHandle(key))?;

        if node.enabled == enabled {
            return Ok(false);
        }
        node.enabled = enabled;
        let owner = node.owner;

        self.walk_to_root(owner, |_| ());

        Ok(true)
    }

    /// Drops every cached query result.
    pub fn clear_caches(&mut self) {
        for (_, subtree) in self.subtrees.iter_mut() {
            subtree.caches.clear();
        }
    }

    fn check_bounds(&self, position: Point3f) -> Result<(), OctreeError> {
        if self.contains_point(position) {
            Ok(())
        } else {
            Err(OctreeError::OutOfBounds {
                position,
                bounds: self.bounds(),
            })
        }
    }

    fn take_stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;

        stamp
    }

    /// Descend to the leaf whose cell contains `position`. The position must be in bounds.
    pub(crate) fn leaf_containing(&self, position: Point3f) -> SubtreeId {
        let mut id = self.root;
        loop {
            let subtree = &self.subtrees[id.0];
            if subtree.is_leaf() {
                return id;
            }
            id = subtree.child_containing(position);
        }
    }

    /// Like `leaf_containing`, but splits any full leaf on the way so the returned leaf has room.
    fn find_leaf_for_insert(&mut self, position: Point3f) -> SubtreeId {
        let mut id = self.root;
        loop {
            let subtree = &self.subtrees[id.0];
            if !subtree.is_leaf() {
                id = subtree.child_containing(position);
            } else if subtree.residents.len() < self.config.max_occupancy
                || subtree.depth >= self.config.max_depth
            {
                return id;
            } else {
                self.subdivide(id);
            }
        }
    }

    /// Splits the leaf `id` into 8 children and pushes its residents down into them.
    fn subdivide(&mut self, id: SubtreeId) {
        let (octant, depth) = {
            let subtree = &self.subtrees[id.0];
            assert!(subtree.is_leaf(), "only leaves can be subdivided");
            assert!(
                subtree.depth < self.config.max_depth,
                "cannot subdivide at max depth {}",
                self.config.max_depth
            );

            (subtree.octant, subtree.depth)
        };

        let mut children = [id; 8];
        for (child, child_octant) in children.iter_mut().zip(octant.children().iter()) {
            *child = SubtreeId(
                self.subtrees
                    .insert(Subtree::new(*child_octant, depth + 1, Some(id))),
            );
        }

        let residents = std::mem::take(&mut self.subtrees[id.0].residents);
        let num_residents = residents.len();
        for key in residents {
            let node = &mut self.nodes[key.slot];
            let child = children[octant.child_index_containing(node.position) as usize];
            node.owner = child;

            let child_subtree = &mut self.subtrees[child.0];
            child_subtree.residents.push(key);
            child_subtree.occupancy += 1;
        }

        let subtree = &mut self.subtrees[id.0];
        subtree.children = Some(children);
        subtree.caches.clear();

        debug!(depth, ?octant, num_residents, "subdivided subtree");
    }

    /// Removes `key` from the leaf that owns it, then fixes up occupancy and merges on the way
    /// back to the root.
    fn remove_resident(&mut self, leaf: SubtreeId, key: NodeKey) -> T {
        let residents = &mut self.subtrees[leaf.0].residents;
        let i = residents
            .iter()
            .position(|k| *k == key)
            .expect("node is not resident in its owner");
        residents.remove(i);

        let node = self.nodes.remove(key.slot);

        let min_occupancy = self.config.min_occupancy;
        let mut id = leaf;
        loop {
            let subtree = &mut self.subtrees[id.0];
            subtree.occupancy -= 1;
            subtree.caches.clear();
            let parent = subtree.parent;

            if !subtree.is_leaf() && subtree.occupancy <= min_occupancy {
                self.merge(id);
            }

            match parent {
                Some(p) => id = p,
                None => break,
            }
        }

        trace!(position = ?node.position, ?key, "removed node");

        node.data
    }

    /// Collapses all descendants of the branch `id` into its resident list.
    fn merge(&mut self, id: SubtreeId) {
        let children = self.subtrees[id.0]
            .children
            .take()
            .expect("only branches can be merged");

        let mut absorbed = Vec::with_capacity(self.subtrees[id.0].occupancy);
        for child in children.iter() {
            self.drain_subtree(*child, &mut absorbed);
        }
        for key in absorbed.iter() {
            self.nodes[key.slot].owner = id;
        }

        let subtree = &mut self.subtrees[id.0];
        assert_eq!(
            absorbed.len(),
            subtree.occupancy,
            "occupancy out of sync with residents"
        );
        subtree.residents = absorbed;
        subtree.caches.clear();

        debug!(
            depth = subtree.depth,
            occupancy = subtree.occupancy,
            "merged subtree"
        );
    }

    /// Deletes the subtree `id` and its descendants, moving all of their residents into `out`.
    fn drain_subtree(&mut self, id: SubtreeId, out: &mut Vec<NodeKey>) {
        let subtree = self.subtrees.remove(id.0);
        out.extend(subtree.residents);
        if let Some(children) = subtree.children {
            for child in children.iter() {
                self.drain_subtree(*child, out);
            }
        }
    }

    /// Applies `f` to `id` and each of its ancestors, invalidating their caches on the way.
    fn walk_to_root(&mut self, id: SubtreeId, mut f: impl FnMut(&mut Subtree)) {
        let mut next = Some(id);
        while let Some(id) = next {
            let subtree = &mut self.subtrees[id.0];
            f(subtree);
            subtree.caches.clear();
            next = subtree.parent;
        }
        trace!(?id, "invalidated caches to root");
    }

    /// Builds an index from already validated parts. Used by record decoding.
    pub(crate) fn from_parts(
        config: OctreeConfig,
        root: SubtreeId,
        subtrees: Slab<Subtree>,
        nodes: Slab<OctreeNode<T>>,
        next_stamp: u64,
    ) -> Self {
        Self {
            config,
            root,
            subtrees,
            nodes,
            next_stamp,
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::collections::HashMap;
    use utilities::{data_sets::random_points_in_box, test::test_print};

    fn scenario_index() -> OctreeIndex<u32> {
        OctreeIndex::new(Point3f::ZERO, Point3f::fill(5.0), 3, 1, 3)
    }

    #[test]
    fn insert_outside_bounds_leaves_tree_unchanged() {
        let mut index = scenario_index();
        index.insert(PointN([1.0, 1.0, 1.0]), 0).unwrap();

        let result = index.insert(PointN([5.5, 0.0, 0.0]), 1);

        assert_eq!(
            result,
            Err(OctreeError::OutOfBounds {
                position: PointN([5.5, 0.0, 0.0]),
                bounds: index.bounds(),
            })
        );
        assert_eq!(index.len(), 1);
        assert_eq!(index.subtrees.len(), 1);
        assert!(index.insert(PointN([f32::NAN, 0.0, 0.0]), 2).is_err());
        assert!(matches!(
            index.remove(PointN([0.0, -7.0, 0.0])),
            Err(OctreeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert_eq!(
            OctreeIndex::<()>::try_new(Point3f::ZERO, Point3f::fill(1.0), 3, 3, 3).err(),
            Some(ConfigError::OccupancyThresholds {
                min_occupancy: 3,
                max_occupancy: 3,
            })
        );
        assert!(OctreeIndex::<()>::try_new(Point3f::ZERO, Point3f::fill(1.0), 3, 0, 3).is_ok());
    }

    #[test]
    #[should_panic]
    fn new_panics_on_degenerate_box() {
        let _ = OctreeIndex::<()>::new(Point3f::ZERO, PointN([1.0, 0.0, 1.0]), 3, 0, 3);
    }

    #[test]
    fn corners_of_root_are_in_bounds() {
        let mut index = scenario_index();

        assert!(index.insert(Point3f::fill(5.0), 0).is_ok());
        assert!(index.insert(Point3f::fill(-5.0), 1).is_ok());
    }

    #[test]
    fn overflowing_a_leaf_subdivides_exactly_once() {
        let mut index = scenario_index();
        let points = [
            PointN([1.0, 1.0, 1.0]),
            PointN([-1.0, 1.0, 1.0]),
            PointN([1.0, -1.0, 1.0]),
        ];
        for (i, p) in points.iter().enumerate() {
            index.insert(*p, i as u32).unwrap();
        }
        assert_eq!(index.subtrees.len(), 1);

        index.insert(PointN([1.0, 1.0, -1.0]), 3).unwrap();

        assert_eq!(index.subtrees.len(), 9);
        let root = &index.subtrees[index.root.0];
        assert!(root.residents.is_empty());
        assert_eq!(root.occupancy, 4);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(index.query(*p).map(|n| *n.data()), Some(i as u32));
        }
        assert_eq!(
            index.query(PointN([1.0, 1.0, -1.0])).map(|n| *n.data()),
            Some(3)
        );
        index.assert_invariants();
    }

    #[test]
    fn leaves_at_max_depth_may_overflow() {
        let mut index = OctreeIndex::new(Point3f::ZERO, Point3f::fill(1.0), 2, 0, 2);
        for i in 0..10 {
            index.insert(PointN([0.5, 0.5, 0.5]), i).unwrap();
        }

        index.assert_invariants();
        let leaf = index.leaf_containing(PointN([0.5, 0.5, 0.5]));
        assert_eq!(index.subtrees[leaf.0].depth, 2);
        assert_eq!(index.subtrees[leaf.0].residents.len(), 10);
    }

    #[test]
    fn subdivide_then_merge_restores_a_leaf() {
        let mut index = scenario_index();
        let points = [
            PointN([1.0, 1.0, 1.0]),
            PointN([-1.0, 1.0, 1.0]),
            PointN([1.0, -1.0, 1.0]),
            PointN([1.0, 1.0, -1.0]),
        ];
        for (i, p) in points.iter().enumerate() {
            index.insert(*p, i as u32).unwrap();
        }
        assert!(!index.subtrees[index.root.0].is_leaf());

        assert_eq!(index.remove(points[0]), Ok(Some(0)));
        assert!(!index.subtrees[index.root.0].is_leaf());
        assert_eq!(index.remove(points[1]), Ok(Some(1)));
        assert!(!index.subtrees[index.root.0].is_leaf());
        assert_eq!(index.remove(points[2]), Ok(Some(2)));

        let root = &index.subtrees[index.root.0];
        assert!(root.is_leaf());
        assert_eq!(index.subtrees.len(), 1);
        assert_eq!(root.residents.len(), 1);
        assert_eq!(index.nodes[root.residents[0].slot].position, points[3]);
        assert_eq!(index.query(points[3]).map(|n| *n.data()), Some(3));
        index.assert_invariants();
    }

    #[test]
    fn remove_missing_point_is_not_an_error() {
        let mut index = scenario_index();
        index.insert(PointN([1.0, 1.0, 1.0]), 0).unwrap();

        assert_eq!(index.remove(PointN([1.0, 1.0, 1.5])), Ok(None));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn handles_survive_restructuring_but_not_removal() {
        let mut index = scenario_index();
        let first = index.insert(PointN([1.0, 1.0, 1.0]), 10).unwrap();
        for i in 0..20 {
            let p = PointN([-4.0 + i as f32 * 0.3, -2.0, 3.0]);
            index.insert(p, i).unwrap();
        }

        assert_eq!(index.get(first).map(|n| *n.data()), Some(10));
        *index.get_mut_data(first).unwrap() = 11;
        assert_eq!(index.remove_node(first), Some(11));
        assert!(index.get(first).is_none());
        assert_eq!(index.remove_node(first), None);

        // The freed slot gets reused, but the old handle must not see the new node.
        let second = index.insert(PointN([1.0, 1.0, 1.0]), 12).unwrap();
        assert_eq!(second.slot, first.slot);
        assert!(index.get(first).is_none());
        assert_eq!(
            index.set_enabled(first, false),
            Err(OctreeError::StaleHandle(first))
        );
        index.assert_invariants();
    }

    #[test]
    fn set_enabled_reports_changes_only() {
        let mut index = scenario_index();
        let key = index.insert(PointN([1.0, 1.0, 1.0]), 0).unwrap();

        assert_eq!(index.set_enabled(key, true), Ok(false));
        assert_eq!(index.set_enabled(key, false), Ok(true));
        assert!(!index.get(key).unwrap().is_enabled());
        assert_eq!(index.set_enabled(key, false), Ok(false));
    }

    #[test]
    fn random_inserts_and_removals_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(0x0c7_7ee);
        let mut index = OctreeIndex::new(PointN([10.0, -3.0, 0.0]), Point3f::fill(8.0), 5, 2, 6);
        let points = random_points_in_box(&mut rng, index.bounds(), 500);

        let mut expected = HashMap::new();
        for (i, p) in points.iter().enumerate() {
            index.insert(*p, i).unwrap();
            expected.insert(i, *p);
        }
        index.assert_invariants();
        assert_eq!(index.len(), points.len());
        test_print(&format!("after inserts: {:?}\n", index.stats()));

        for (i, p) in points.iter().enumerate() {
            if rng.gen_bool(0.8) {
                assert_eq!(index.remove(*p), Ok(Some(i)));
                expected.remove(&i);
            }
        }
        index.assert_invariants();
        assert_eq!(index.len(), expected.len());

        for (i, p) in expected.iter() {
            assert_eq!(index.query(*p).map(|n| *n.data()), Some(*i));
        }
    }

    impl<T> OctreeIndex<T> {
        /// Checks every structural invariant, panicking on the first violation.
        pub(crate) fn assert_invariants(&self) {
            let counted = self.check_subtree(self.root, None, 0);
            assert_eq!(counted, self.nodes.len());
            assert_eq!(self.count_reachable_subtrees(self.root), self.subtrees.len());
        }

        fn check_subtree(&self, id: SubtreeId, parent: Option<SubtreeId>, depth: u8) -> usize {
            let subtree = &self.subtrees[id.0];
            assert_eq!(subtree.parent, parent);
            assert_eq!(subtree.depth, depth);
            assert!(depth <= self.config.max_depth);

            let counted = match subtree.children {
                Some(children) => {
                    assert!(subtree.residents.is_empty());
                    assert!(subtree.occupancy > self.config.min_occupancy);
                    let octant_children = subtree.octant.children();
                    children
                        .iter()
                        .zip(octant_children.iter())
                        .map(|(child, octant)| {
                            assert_eq!(self.subtrees[child.0].octant, *octant);
                            self.check_subtree(*child, Some(id), depth + 1)
                        })
                        .sum()
                }
                None => {
                    if depth < self.config.max_depth {
                        assert!(subtree.residents.len() <= self.config.max_occupancy);
                    }
                    for key in subtree.residents.iter() {
                        let node = &self.nodes[key.slot];
                        assert_eq!(node.key, *key);
                        assert_eq!(node.owner, id);
                        assert_eq!(self.leaf_containing(node.position), id);
                        assert!(subtree.octant.contains(node.position));
                    }
                    subtree.residents.len()
                }
            };
            assert_eq!(counted, subtree.occupancy);

            counted
        }

        fn count_reachable_subtrees(&self, id: SubtreeId) -> usize {
            1 + self.subtrees[id.0]
                .children
                .map(|children| {
                    children
                        .iter()
                        .map(|c| self.count_reachable_subtrees(*c))
                        .sum()
                })
                .unwrap_or(0)
        }
    }
}
