//! A dynamic octree for indexing positioned data points in 3D space.
//!
//! This library is organized into a couple of crates:
//! - **core**: real-valued point, box, sphere and octant types
//! - **index**: the `OctreeIndex` itself, with its handles, visitors and persistent records
//!
//! Start with the docs for [`OctreeIndex`](dyn_octree_index::OctreeIndex).
//!
//! ```
//! use dyn_octree::prelude::*;
//!
//! let mut index = OctreeIndex::new(Point3f::ZERO, Point3f::fill(100.0), 8, 2, 8);
//! let key = index.insert(PointN([1.0, 2.0, 3.0]), "lamp").unwrap();
//!
//! assert_eq!(index.query(PointN([1.0, 2.0, 3.0])).map(|n| *n.data()), Some("lamp"));
//!
//! index.set_enabled(key, false).unwrap();
//! assert!(index.sphere_cast(PointN([1.0, 2.0, 3.0]), 1.0).is_empty());
//! assert!(index.find_nearest_enabled_node(PointN([1.0, 2.0, 3.0]), false).is_some());
//! ```

pub use dyn_octree_core as core;
pub use dyn_octree_index as index;

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::index::prelude::*;
}
