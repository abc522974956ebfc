//! Node identity
//!
//! Nodes are numbered densely from `0` to `N - 1`. The ring topology and the
//! convergence heuristic both rely on that density, so a [`NodeId`] is a thin
//! wrapper over the index rather than an opaque key.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Identifier of a node in the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a node id from a dense index
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Generate the ids `0..count`
    pub fn range(count: usize) -> Vec<Self> {
        (0..count as u32).map(Self).collect()
    }

    /// Get the dense index of this node
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Check whether this id belongs to a network of `count` nodes
    pub fn is_within(&self, count: usize) -> bool {
        self.index() < count
    }
}

impl From<u32> for NodeId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
