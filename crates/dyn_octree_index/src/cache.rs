//! Per-subtree memoization of query results.
//!
//! Every subtree keeps two caches. The point cache maps an exact position to the node found there
//! by `OctreeIndex::query`. The sphere cache maps an exact `(center, radius)` pair to the enabled
//! nodes that a sphere cast found within that subtree. Both are keyed by the bit patterns of the
//! floats, so a cache hit requires the exact same query values; a query that differs by one ULP
//! is simply a miss.
//!
//! Each cache holds at most `CACHE_CAPACITY` entries and evicts the least recently used entry
//! when a new one would exceed that.
//!
//! Caches are filled through a shared reference, since the queries themselves are logically
//! read-only. They are emptied through a mutable reference whenever the subtree or any of its
//! descendants change.

use crate::{NodeKey, SmallKeyBuildHasher};

use indexmap::IndexMap;
use dyn_octree_core::prelude::*;

use std::cell::RefCell;
use std::hash::Hash;

/// The hashable identity of an exact `Point3f`. Signed zeros are folded together so that two
/// positions have the same key iff they compare `==` (for non-NaN positions).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PointKey([u32; 3]);

impl From<Point3f> for PointKey {
    #[inline]
    fn from(p: Point3f) -> Self {
        Self(p.normalize_zero_sign().to_bits())
    }
}

/// The hashable identity of an exact sphere cast query.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SphereKey {
    center: PointKey,
    radius: u32,
}

impl From<Sphere3> for SphereKey {
    #[inline]
    fn from(sphere: Sphere3) -> Self {
        let radius = if sphere.radius == 0.0 {
            0.0
        } else {
            sphere.radius
        };

        Self {
            center: PointKey::from(sphere.center),
            radius: radius.to_bits(),
        }
    }
}

/// The most entries that either cache of a single subtree will hold.
pub const CACHE_CAPACITY: usize = 64;

/// A map of at most `CACHE_CAPACITY` entries, ordered from least to most recently used.
#[derive(Debug)]
struct LruMap<K, V> {
    entries: IndexMap<K, V, SmallKeyBuildHasher>,
}

impl<K, V> Default for LruMap<K, V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::default(),
        }
    }
}

impl<K, V> LruMap<K, V>
where
    K: Copy + Eq + Hash,
    V: Clone,
{
    fn get(&mut self, key: &K) -> Option<V> {
        let value = self.entries.shift_remove(key)?;
        self.entries.insert(*key, value.clone());

        Some(value)
    }

    fn insert(&mut self, key: K, value: V) {
        self.entries.shift_remove(&key);
        if self.entries.len() >= CACHE_CAPACITY {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, value);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Debug, Default)]
pub(crate) struct SubtreeCaches {
    points: RefCell<LruMap<PointKey, NodeKey>>,
    spheres: RefCell<LruMap<SphereKey, Vec<NodeKey>>>,
}

impl SubtreeCaches {
    #[inline]
    pub fn point(&self, key: &PointKey) -> Option<NodeKey> {
        self.points.borrow_mut().get(key)
    }

    #[inline]
    pub fn insert_point(&self, key: PointKey, node: NodeKey) {
        self.points.borrow_mut().insert(key, node);
    }

    #[inline]
    pub fn sphere(&self, key: &SphereKey) -> Option<Vec<NodeKey>> {
        self.spheres.borrow_mut().get(key)
    }

    #[inline]
    pub fn insert_sphere(&self, key: SphereKey, nodes: Vec<NodeKey>) {
        self.spheres.borrow_mut().insert(key, nodes);
    }

    #[inline]
    pub fn len(&self) -> (usize, usize) {
        (self.points.borrow().len(), self.spheres.borrow().len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == (0, 0)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.points.get_mut().clear();
        self.spheres.get_mut().clear();
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

    #[test]
    fn signed_zeros_share_a_key() {
        assert_eq!(
            PointKey::from(PointN([-0.0, 1.0, 2.0])),
            PointKey::from(PointN([0.0, 1.0, 2.0]))
        );
        assert_ne!(
            PointKey::from(PointN([1.0, 1.0, 2.0])),
            PointKey::from(PointN([1.0 + f32::EPSILON, 1.0, 2.0]))
        );
        assert_eq!(
            SphereKey::from(Sphere3::new(Point3f::ZERO, -0.0)),
            SphereKey::from(Sphere3::new(Point3f::ZERO, 0.0))
        );
    }

    #[test]
    fn clear_empties_both_caches() {
        let mut caches = SubtreeCaches::default();
        let node = NodeKey { slot: 3, stamp: 7 };
        let sphere = SphereKey::from(Sphere3::new(Point3f::ZERO, 1.0));

        caches.insert_point(PointKey::from(Point3f::ZERO), node);
        caches.insert_sphere(sphere, vec![node]);
        assert_eq!(caches.point(&PointKey::from(Point3f::ZERO)), Some(node));
        assert_eq!(caches.sphere(&sphere), Some(vec![node]));

        caches.clear();
        assert!(caches.is_empty());
    }

    #[test]
    fn caches_evict_least_recently_used_entries() {
        let caches = SubtreeCaches::default();
        let key = |i: usize| PointKey::from(PointN([i as f32, 0.0, 0.0]));
        let node = |i: usize| NodeKey {
            slot: i,
            stamp: 0,
        };

        for i in 0..CACHE_CAPACITY {
            caches.insert_point(key(i), node(i));
        }
        // Touch the oldest entry so that the second oldest is evicted first.
        assert_eq!(caches.point(&key(0)), Some(node(0)));

        for i in CACHE_CAPACITY..CACHE_CAPACITY + 10 {
            caches.insert_point(key(i), node(i));
            let sphere = SphereKey::from(Sphere3::new(Point3f::ZERO, i as f32));
            caches.insert_sphere(sphere, vec![node(i)]);
        }

        assert_eq!(caches.len(), (CACHE_CAPACITY, 10));
        assert_eq!(caches.point(&key(0)), Some(node(0)));
        for i in 1..11 {
            assert_eq!(caches.point(&key(i)), None);
        }
        assert_eq!(caches.point(&key(11)), Some(node(11)));
        assert_eq!(
            caches.point(&key(CACHE_CAPACITY + 9)),
            Some(node(CACHE_CAPACITY + 9))
        );
    }

    #[test]
    fn reinserting_a_key_does_not_evict() {
        let caches = SubtreeCaches::default();
        let sphere = SphereKey::from(Sphere3::new(Point3f::ZERO, 1.0));
        for i in 0..CACHE_CAPACITY * 2 {
            caches.insert_sphere(
                sphere,
                vec![NodeKey {
                    slot: i,
                    stamp: 1,
                }],
            );
        }

        assert_eq!(caches.len(), (0, 1));
        assert_eq!(
            caches.sphere(&sphere),
            Some(vec![NodeKey {
                slot: CACHE_CAPACITY * 2 - 1,
                stamp: 1
            }])
        );
    }
}
