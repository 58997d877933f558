//! Persistence of an `OctreeIndex` as a recursive structural record.
//!
//! Every subtree is written out with its full geometry and policy, its residents (for leaves) and
//! its 8 children (for branches). Reading a record back checks every structural invariant of the
//! octree, so a corrupted or hand-edited record is rejected as a whole; no partially built index
//! is ever returned.
//!
//! The encoded bytes hold the subtrees as a flat pre-order list, each entry carrying its number of
//! children, rather than as nested records. Deserialization therefore never recurses, and the
//! list is folded back into an `OctreeRecord` only as deep as `MAX_DEPTH` allows.
//!
//! Query caches are never persisted, and handles to nodes of the encoded index are not valid for
//! the decoded one.

use crate::{
    subtree::Subtree, DecodeError, EncodeError, NodeKey, OctreeConfig, OctreeIndex, OctreeNode,
    SubtreeId, MAX_DEPTH,
};

use dyn_octree_core::prelude::*;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use slab::Slab;
use tracing::warn;

/// The persisted form of one subtree and all of its descendants.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OctreeRecord<T> {
    pub origin: Point3f,
    pub half_extent: Point3f,
    pub depth: u8,
    pub max_depth: u8,
    pub min_occupancy: usize,
    pub max_occupancy: usize,
    /// Empty for branches.
    pub residents: Vec<ResidentRecord<T>>,
    /// Either empty (a leaf) or exactly 8 subtrees in child index order.
    pub children: Vec<OctreeRecord<T>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ResidentRecord<T> {
    pub position: Point3f,
    pub data: T,
    pub enabled: bool,
}

impl<T> OctreeRecord<T> {
    /// Transforms the data of every resident, keeping the structure.
    pub fn map_data<U>(self, f: impl Fn(T) -> U) -> OctreeRecord<U> {
        self.map_data_with(&f)
    }

    fn map_data_with<U>(self, f: &impl Fn(T) -> U) -> OctreeRecord<U> {
        OctreeRecord {
            origin: self.origin,
            half_extent: self.half_extent,
            depth: self.depth,
            max_depth: self.max_depth,
            min_occupancy: self.min_occupancy,
            max_occupancy: self.max_occupancy,
            residents: self
                .residents
                .into_iter()
                .map(|r| ResidentRecord {
                    position: r.position,
                    data: f(r.data),
                    enabled: r.enabled,
                })
                .collect(),
            children: self
                .children
                .into_iter()
                .map(|c| c.map_data_with(f))
                .collect(),
        }
    }
}

/// One entry of the encoded pre-order subtree list. Its `num_children` children follow it, each
/// with all of their own descendants.
#[derive(Debug, Deserialize, Serialize)]
struct EncodedSubtree<T> {
    origin: Point3f,
    half_extent: Point3f,
    depth: u8,
    max_depth: u8,
    min_occupancy: usize,
    max_occupancy: usize,
    residents: Vec<ResidentRecord<T>>,
    num_children: u8,
}

/// Folds a pre-order list back into a nested record, refusing to nest deeper than `MAX_DEPTH`.
fn unflatten<T>(encoded: Vec<EncodedSubtree<T>>) -> Result<OctreeRecord<T>, DecodeError> {
    let mut remaining = encoded.into_iter();
    let record = take_record(&mut remaining, 0)?;
    match remaining.len() {
        0 => Ok(record),
        trailing => Err(DecodeError::TrailingSubtrees(trailing)),
    }
}

fn take_record<T>(
    remaining: &mut std::vec::IntoIter<EncodedSubtree<T>>,
    level: u8,
) -> Result<OctreeRecord<T>, DecodeError> {
    if level > MAX_DEPTH {
        return Err(DecodeError::TooDeep {
            depth: level,
            max_depth: MAX_DEPTH,
        });
    }
    let encoded = remaining.next().ok_or(DecodeError::MissingSubtrees)?;

    let mut children = Vec::with_capacity(encoded.num_children as usize);
    for _ in 0..encoded.num_children {
        children.push(take_record(remaining, level + 1)?);
    }

    Ok(OctreeRecord {
        origin: encoded.origin,
        half_extent: encoded.half_extent,
        depth: encoded.depth,
        max_depth: encoded.max_depth,
        min_occupancy: encoded.min_occupancy,
        max_occupancy: encoded.max_occupancy,
        residents: encoded.residents,
        children,
    })
}

impl<T> OctreeIndex<T> {
    /// Captures the whole tree, borrowing the node data.
    pub fn to_record(&self) -> OctreeRecord<&T> {
        self.subtree_record(self.root)
    }

    fn subtree_record(&self, id: SubtreeId) -> OctreeRecord<&T> {
        let subtree = &self.subtrees[id.0];

        OctreeRecord {
            origin: subtree.octant.center(),
            half_extent: subtree.octant.half_extent(),
            depth: subtree.depth,
            max_depth: self.config.max_depth,
            min_occupancy: self.config.min_occupancy,
            max_occupancy: self.config.max_occupancy,
            residents: self.resident_records(id),
            children: subtree
                .children
                .map(|children| children.iter().map(|c| self.subtree_record(*c)).collect())
                .unwrap_or_default(),
        }
    }

    fn resident_records(&self, id: SubtreeId) -> Vec<ResidentRecord<&T>> {
        self.subtrees[id.0]
            .residents
            .iter()
            .map(|key| {
                let node = &self.nodes[key.slot];

                ResidentRecord {
                    position: node.position,
                    data: &node.data,
                    enabled: node.enabled,
                }
            })
            .collect()
    }

    /// Rebuilds an index from a record, checking every structural invariant along the way.
    pub fn from_record(record: OctreeRecord<T>) -> Result<Self, DecodeError> {
        let config = OctreeConfig::new(
            record.origin,
            record.half_extent,
            record.max_depth,
            record.min_occupancy,
            record.max_occupancy,
        );
        config.validate()?;
        if record.depth != 0 {
            return Err(DecodeError::NotRoot(record.depth));
        }

        let mut builder = IndexBuilder {
            config,
            subtrees: Slab::new(),
            nodes: Slab::new(),
            next_stamp: 0,
        };
        let root = builder.build_subtree(record, config.root_octant(), 0, None)?;

        let index = OctreeIndex::from_parts(
            config,
            root,
            builder.subtrees,
            builder.nodes,
            builder.next_stamp,
        );
        for node in index.iter() {
            if !index.contains_point(node.position)
                || index.leaf_containing(node.position) != node.owner()
            {
                return Err(DecodeError::MisplacedResident(node.position));
            }
        }

        Ok(index)
    }

    /// Serializes the whole tree with `bincode`.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError>
    where
        T: Serialize,
    {
        Ok(bincode::serialize(&self.encoded_subtrees())?)
    }

    /// All subtrees in pre-order, borrowing the node data.
    fn encoded_subtrees(&self) -> Vec<EncodedSubtree<&T>> {
        let mut encoded = Vec::with_capacity(self.subtrees.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let subtree = &self.subtrees[id.0];
            encoded.push(EncodedSubtree {
                origin: subtree.octant.center(),
                half_extent: subtree.octant.half_extent(),
                depth: subtree.depth,
                max_depth: self.config.max_depth,
                min_occupancy: self.config.min_occupancy,
                max_occupancy: self.config.max_occupancy,
                residents: self.resident_records(id),
                num_children: if subtree.is_leaf() { 0 } else { 8 },
            });
            if let Some(children) = subtree.children {
                stack.extend(children.iter().rev());
            }
        }

        encoded
    }

    /// Reads back the output of `encode`. Any malformed input is rejected as a whole.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError>
    where
        T: DeserializeOwned,
    {
        let result = bincode::deserialize(bytes)
            .map_err(DecodeError::from)
            .and_then(unflatten)
            .and_then(Self::from_record);
        if let Err(e) = &result {
            warn!(error = %e, num_bytes = bytes.len(), "failed to decode octree");
        }

        result
    }

    /// Same as `decode`, but a malformed input is discarded in favor of an empty index with the
    /// `fallback` parameters.
    ///
    /// # Panics
    ///
    /// If decoding fails and `fallback` is invalid.
    pub fn decode_or_empty(bytes: &[u8], fallback: OctreeConfig) -> Self
    where
        T: DeserializeOwned,
    {
        Self::decode(bytes).unwrap_or_else(|_| Self::with_config(fallback))
    }
}

struct IndexBuilder<T> {
    config: OctreeConfig,
    subtrees: Slab<Subtree>,
    nodes: Slab<OctreeNode<T>>,
    next_stamp: u64,
}

impl<T> IndexBuilder<T> {
    fn build_subtree(
        &mut self,
        record: OctreeRecord<T>,
        octant: Octant,
        depth: u8,
        parent: Option<SubtreeId>,
    ) -> Result<SubtreeId, DecodeError> {
        if depth > self.config.max_depth {
            return Err(DecodeError::TooDeep {
                depth,
                max_depth: self.config.max_depth,
            });
        }
        let consistent = record.depth == depth
            && record.origin == octant.center()
            && record.half_extent == octant.half_extent()
            && record.max_depth == self.config.max_depth
            && record.min_occupancy == self.config.min_occupancy
            && record.max_occupancy == self.config.max_occupancy;
        if !consistent {
            return Err(DecodeError::Inconsistent {
                depth: record.depth,
            });
        }

        let id = SubtreeId(self.subtrees.insert(Subtree::new(octant, depth, parent)));

        match record.children.len() {
            0 => {
                let count = record.residents.len();
                if depth < self.config.max_depth && count > self.config.max_occupancy {
                    return Err(DecodeError::Overfull { depth, count });
                }

                let mut residents = Vec::with_capacity(count);
                for resident in record.residents {
                    let key = NodeKey {
                        slot: self.nodes.vacant_key(),
                        stamp: self.next_stamp,
                    };
                    self.next_stamp += 1;
                    self.nodes.insert(OctreeNode {
                        position: resident.position,
                        data: resident.data,
                        enabled: resident.enabled,
                        key,
                        owner: id,
                    });
                    residents.push(key);
                }

                let subtree = &mut self.subtrees[id.0];
                subtree.residents = residents;
                subtree.occupancy = count;
            }
            8 => {
                if !record.residents.is_empty() {
                    return Err(DecodeError::ResidentsInBranch { depth });
                }

                let mut children = [id; 8];
                let mut occupancy = 0;
                for (i, child_record) in record.children.into_iter().enumerate() {
                    let child = self.build_subtree(
                        child_record,
                        octant.child(i as u8),
                        depth + 1,
                        Some(id),
                    )?;
                    occupancy += self.subtrees[child.0].occupancy;
                    children[i] = child;
                }
                if occupancy <= self.config.min_occupancy {
                    return Err(DecodeError::Underfull { depth, occupancy });
                }

                let subtree = &mut self.subtrees[id.0];
                subtree.children = Some(children);
                subtree.occupancy = occupancy;
            }
            count => return Err(DecodeError::ChildCount { depth, count }),
        }

        Ok(id)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
