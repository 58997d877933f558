use crate::{ConfigError, NodeKey};

use dyn_octree_core::prelude::*;

use thiserror::Error;

/// Failures of mutating operations. Lookups never fail; they just find nothing.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum OctreeError {
    #[error("position {position:?} lies outside of the octree bounds {bounds:?}")]
    OutOfBounds { position: Point3f, bounds: Extent3f },
    #[error("{0:?} does not refer to a node in this octree")]
    StaleHandle(NodeKey),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to serialize octree record: {0}")]
    Bincode(#[from] bincode::Error),
}

/// A persisted octree record was malformed. The partially decoded structure is always discarded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to deserialize octree record: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("record has invalid parameters: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("root record claims depth {0}")]
    NotRoot(u8),
    #[error("subtree at depth {depth} has geometry or policy inconsistent with its parent")]
    Inconsistent { depth: u8 },
    #[error("subtree at depth {depth} has {count} children; expected 0 or 8")]
    ChildCount { depth: u8, count: usize },
    #[error("branch at depth {depth} holds residents")]
    ResidentsInBranch { depth: u8 },
    #[error("subtree at depth {depth} exceeds max depth {max_depth}")]
    TooDeep { depth: u8, max_depth: u8 },
    #[error("leaf at depth {depth} holds {count} residents, over the maximum")]
    Overfull { depth: u8, count: usize },
    #[error("branch at depth {depth} holds only {occupancy} residents and should have been merged")]
    Underfull { depth: u8, occupancy: usize },
    #[error("resident at {0:?} is not stored in the leaf that contains it")]
    MisplacedResident(Point3f),
    #[error("encoded subtree list ended before every declared child was read")]
    MissingSubtrees,
    #[error("{0} encoded subtrees follow the last subtree of the tree")]
    TrailingSubtrees(usize),
}
