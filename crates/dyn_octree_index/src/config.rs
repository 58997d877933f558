use dyn_octree_core::prelude::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The deepest level any `OctreeIndex` may subdivide to. Each level halves the cell size, so this
/// is already far below the precision of an `f32` for any reasonable root size.
pub const MAX_DEPTH: u8 = 32;

/// The parameters of an `OctreeIndex`, fixed for the entire life of the index.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct OctreeConfig {
    /// The center of the root cell.
    pub origin: Point3f,
    /// The half size of the root cell on each axis.
    pub half_extent: Point3f,
    /// Subtrees at this depth never subdivide, regardless of occupancy.
    pub max_depth: u8,
    /// A branch whose total occupancy drops to this value or below is merged back into a leaf.
    pub min_occupancy: usize,
    /// A leaf holding this many residents subdivides before accepting another.
    pub max_occupancy: usize,
}

impl OctreeConfig {
    pub fn new(
        origin: Point3f,
        half_extent: Point3f,
        max_depth: u8,
        min_occupancy: usize,
        max_occupancy: usize,
    ) -> Self {
        Self {
            origin,
            half_extent,
            max_depth,
            min_occupancy,
            max_occupancy,
        }
    }

    /// Checks that the parameters describe a usable octree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.origin.is_finite() {
            return Err(ConfigError::NonFiniteOrigin(self.origin));
        }
        let half_extent_ok = self.half_extent.is_finite() && self.half_extent.min_component() > 0.0;
        if !half_extent_ok {
            return Err(ConfigError::BadHalfExtent(self.half_extent));
        }
        if self.max_occupancy == 0 {
            return Err(ConfigError::ZeroMaxOccupancy);
        }
        if self.min_occupancy >= self.max_occupancy {
            return Err(ConfigError::OccupancyThresholds {
                min_occupancy: self.min_occupancy,
                max_occupancy: self.max_occupancy,
            });
        }
        if self.max_depth > MAX_DEPTH {
            return Err(ConfigError::DepthTooLarge(self.max_depth));
        }

        Ok(())
    }

    /// The cell covered by the root subtree.
    #[inline]
    pub fn root_octant(&self) -> Octant {
        Octant::new(self.origin, self.half_extent)
    }

    /// The closed box of all positions the index accepts.
    #[inline]
    pub fn bounds(&self) -> Extent3f {
        self.root_octant().extent()
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("origin {0:?} has a non-finite component")]
    NonFiniteOrigin(Point3f),
    #[error("half extent {0:?} must be finite and strictly positive on every axis")]
    BadHalfExtent(Point3f),
    #[error("max occupancy must be at least 1")]
    ZeroMaxOccupancy,
    #[error("min occupancy {min_occupancy} must be less than max occupancy {max_occupancy}")]
    OccupancyThresholds {
        min_occupancy: usize,
        max_occupancy: usize,
    },
    #[error("max depth {0} exceeds the limit of {}", MAX_DEPTH)]
    DepthTooLarge(u8),
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
