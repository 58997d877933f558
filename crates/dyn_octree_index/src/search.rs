//! Point lookups, sphere casts and nearest-neighbor searches over an `OctreeIndex`.
//!
//! All searches take `&self`. Point lookups memoize their result in the cache of every subtree on
//! the path to the leaf. A sphere cast memoizes its result once, in the deepest subtree that
//! encloses every cell the sphere touches. Caches are dropped by any mutation below them, so a
//! cached answer is always the answer a fresh search would give.
//!
//! The nearest-neighbor searches are deliberately local. `find_nearest_node` only looks at the
//! single leaf whose cell contains the search position, so a closer node just across a cell
//! boundary is missed. Use `find_nearest_global` when the true nearest node is needed.

use crate::{
    cache::{PointKey, SphereKey},
    NodeKey, OctreeIndex, OctreeNode, SubtreeId,
};

use dyn_octree_core::prelude::*;

use float_ord::FloatOrd;
use tracing::trace;

impl<T> OctreeIndex<T> {
    /// Returns the first node found at exactly `position`, or `None` if there is none (including
    /// when `position` is out of bounds).
    pub fn query(&self, position: Point3f) -> Option<&OctreeNode<T>> {
        if !self.contains_point(position) {
            return None;
        }

        self.query_subtree(self.root, position, &PointKey::from(position))
            .and_then(|key| self.get(key))
    }

    /// Returns `true` iff some node sits at exactly `position`.
    #[inline]
    pub fn node_exists_at(&self, position: Point3f) -> bool {
        self.query(position).is_some()
    }

    fn query_subtree(&self, id: SubtreeId, position: Point3f, key: &PointKey) -> Option<NodeKey> {
        let subtree = &self.subtrees[id.0];

        if let Some(cached) = subtree.caches.point(key) {
            if self.get(cached).map_or(false, |node| node.position == position) {
                trace!(?position, depth = subtree.depth, "point cache hit");
                return Some(cached);
            }
        }

        let found = if subtree.is_leaf() {
            subtree
                .residents
                .iter()
                .copied()
                .find(|k| self.nodes[k.slot].position == position)
        } else {
            self.query_subtree(subtree.child_containing(position), position, key)
        };

        if let Some(found) = found {
            subtree.caches.insert_point(*key, found);
        }

        found
    }

    /// Returns every enabled node within `radius` of `center` (boundary inclusive), each exactly
    /// once and in no particular order.
    ///
    /// A negative or NaN `radius`, or a non-finite `center`, finds nothing.
    pub fn sphere_cast(&self, center: Point3f, radius: f32) -> Vec<&OctreeNode<T>> {
        if !(radius >= 0.0) || !center.is_finite() {
            return Vec::new();
        }

        let sphere = Sphere3::new(center, radius);
        let key = SphereKey::from(sphere);
        let anchor = self.sphere_anchor(&sphere);
        let anchor_subtree = &self.subtrees[anchor.0];

        if let Some(cached) = anchor_subtree.caches.sphere(&key) {
            // A result holding a node that has since been disabled must be recomputed.
            let still_valid = cached
                .iter()
                .all(|k| self.get(*k).map_or(false, |node| node.enabled));
            if still_valid {
                trace!(?sphere, depth = anchor_subtree.depth, "sphere cache hit");
                return cached.into_iter().map(|k| &self.nodes[k.slot]).collect();
            }
        }

        let mut found = Vec::new();
        self.sphere_cast_subtree(anchor, &sphere, &mut found);
        anchor_subtree.caches.insert_sphere(key, found.clone());

        found.into_iter().map(|k| &self.nodes[k.slot]).collect()
    }

    /// The deepest subtree whose cell is the only one at its depth that `sphere` touches. Every
    /// node a cast could find lives below it, so that is where the cast result is cached.
    fn sphere_anchor(&self, sphere: &Sphere3) -> SubtreeId {
        let mut id = self.root;
        while let Some(children) = self.subtrees[id.0].children {
            let mut touched = children
                .iter()
                .filter(|c| sphere.intersects_extent(&self.subtrees[c.0].octant.extent()));
            match (touched.next(), touched.next()) {
                (Some(only), None) => id = *only,
                _ => break,
            }
        }

        id
    }

    fn sphere_cast_subtree(&self, id: SubtreeId, sphere: &Sphere3, found: &mut Vec<NodeKey>) {
        let subtree = &self.subtrees[id.0];

        if !sphere.intersects_extent(&subtree.octant.extent()) {
            return;
        }

        match subtree.children {
            Some(children) => {
                for child in children.iter() {
                    self.sphere_cast_subtree(*child, sphere, found);
                }
            }
            None => {
                found.extend(subtree.residents.iter().copied().filter(|k| {
                    let node = &self.nodes[k.slot];

                    node.enabled && sphere.contains(node.position)
                }));
            }
        }
    }

    /// Returns the resident nearest to `position` among those in the leaf whose cell contains
    /// `position`. Other cells are never examined, so this is `None` whenever that leaf is empty.
    pub fn find_nearest_node(&self, position: Point3f) -> Option<&OctreeNode<T>> {
        if !self.contains_point(position) {
            return None;
        }

        let leaf = self.leaf_containing(position);

        self.nearest_of(
            self.subtrees[leaf.0].residents.iter().copied(),
            position,
            |_| true,
        )
    }

    /// Like `find_nearest_node`, but only considers nodes whose enabled flag equals
    /// `want_enabled`. If the containing leaf has no such node, every subtree under the leaf's
    /// parent is searched as well.
    pub fn find_nearest_enabled_node(
        &self,
        position: Point3f,
        want_enabled: bool,
    ) -> Option<&OctreeNode<T>> {
        if !self.contains_point(position) {
            return None;
        }

        let wanted = |node: &OctreeNode<T>| node.enabled == want_enabled;

        let leaf = self.leaf_containing(position);
        let leaf_subtree = &self.subtrees[leaf.0];
        if let Some(node) = self.nearest_of(leaf_subtree.residents.iter().copied(), position, wanted)
        {
            return Some(node);
        }

        let parent = leaf_subtree.parent?;
        let mut swept = Vec::new();
        self.collect_residents(parent, &mut swept);
        trace!(?position, num_swept = swept.len(), "swept sibling subtrees");

        self.nearest_of(swept.into_iter(), position, wanted)
    }

    /// Returns the enabled node nearest to `position` anywhere in the index, as long as it lies
    /// within `max_radius`.
    ///
    /// This sphere casts with `initial_radius`, doubling the radius until something is found or
    /// `max_radius` has been searched. A small `initial_radius` is cheap when nodes are dense.
    pub fn find_nearest_global(
        &self,
        position: Point3f,
        initial_radius: f32,
        max_radius: f32,
    ) -> Option<&OctreeNode<T>> {
        if !(max_radius >= 0.0) {
            return None;
        }

        let mut radius = if initial_radius > 0.0 {
            initial_radius
        } else {
            max_radius
        };
        loop {
            let radius_this_pass = radius.min(max_radius);
            let nearest = self
                .sphere_cast(position, radius_this_pass)
                .into_iter()
                .min_by_key(|node| FloatOrd(node.position.l2_distance_squared(&position)));
            if nearest.is_some() {
                return nearest;
            }
            if radius_this_pass >= max_radius {
                return None;
            }
            radius *= 2.0;
        }
    }

    /// Appends the residents of `id` and all of its descendants to `out`.
    pub(crate) fn collect_residents(&self, id: SubtreeId, out: &mut Vec<NodeKey>) {
        let subtree = &self.subtrees[id.0];
        out.extend(subtree.residents.iter().copied());
        if let Some(children) = subtree.children {
            for child in children.iter() {
                self.collect_residents(*child, out);
            }
        }
    }

    fn nearest_of(
        &self,
        keys: impl Iterator<Item = NodeKey>,
        position: Point3f,
        filter: impl Fn(&OctreeNode<T>) -> bool,
    ) -> Option<&OctreeNode<T>> {
        keys.map(|key| &self.nodes[key.slot])
            .filter(|node| filter(node))
            .min_by_key(|node| FloatOrd(node.position.l2_distance_squared(&position)))
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
