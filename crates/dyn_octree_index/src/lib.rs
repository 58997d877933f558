//! A dynamic, bounded octree over positioned data points.
//!
//! The main type is `OctreeIndex`, which supports:
//!   - insertion and removal by position, with adaptive subdivision of full leaves and merging of
//!     sparse branches
//!   - exact point lookup (`query`) and enumeration of enabled nodes within a sphere
//!     (`sphere_cast`), both memoized in per-subtree caches that are invalidated by mutation
//!   - leaf-local nearest neighbor searches, plus an expanding sphere search for the true nearest
//!     enabled node
//!   - per-node enabled flags, toggled through stable `NodeKey` handles
//!   - pre-order traversal of the subtree structure with an `OctreeVisitor`
//!   - persistence through a validated structural record (`OctreeRecord`), encoded with `bincode`

mod cache;
mod search;
mod subtree;

pub mod config;
pub mod error;
pub mod index;
pub mod node;
pub mod record;
pub mod visit;

pub use cache::CACHE_CAPACITY;
pub use config::{ConfigError, OctreeConfig, MAX_DEPTH};
pub use error::{DecodeError, EncodeError, OctreeError};
pub use index::OctreeIndex;
pub use node::{NodeKey, OctreeNode, SubtreeId};
pub use record::{OctreeRecord, ResidentRecord};
pub use visit::{OctreeStats, OctreeVisitor, SubtreeView, VisitStatus};

// Hash types to use for small keys like `PointKey`.
pub type SmallKeyHashMap<K, V> = ahash::AHashMap<K, V>;
pub type SmallKeyBuildHasher = ahash::RandomState;

pub mod prelude {
    pub use super::{
        NodeKey, OctreeConfig, OctreeError, OctreeIndex, OctreeNode, OctreeStats, OctreeVisitor,
        SubtreeView, VisitStatus,
    };
}
