//! Node events
//!
//! A node records what it did as [`NodeEvent`]s. Harnesses drain them after
//! each step to build a network-wide log; the node itself never reads them.

use serde::{Deserialize, Serialize};

use crate::identity::NodeId;

/// Events emitted by a routing node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeEvent {
    /// A table snapshot was sent to a neighbour
    Advertised {
        from: NodeId,
        to: NodeId,
        entries: usize,
    },

    /// A merge installed a new table
    TableChanged {
        node: NodeId,
        learned_from: NodeId,
        entries: usize,
    },

    /// The node judged its table complete and left the advertisement phase
    Stabilized { node: NodeId, entries: usize },

    /// A routed message was handed to the next hop
    Forwarded {
        at: NodeId,
        next_hop: NodeId,
        origin: NodeId,
        destination: NodeId,
    },

    /// A routed message reached its destination
    Delivered {
        at: NodeId,
        origin: NodeId,
        payload: Vec<u8>,
    },

    /// A routed message was discarded at this hop
    Dropped {
        at: NodeId,
        origin: NodeId,
        destination: NodeId,
        reason: DropReason,
    },
}

impl NodeEvent {
    /// The node that emitted this event
    pub fn node(&self) -> NodeId {
        match self {
            Self::Advertised { from, .. } => *from,
            Self::TableChanged { node, .. } => *node,
            Self::Stabilized { node, .. } => *node,
            Self::Forwarded { at, .. } => *at,
            Self::Delivered { at, .. } => *at,
            Self::Dropped { at, .. } => *at,
        }
    }
}

/// Reasons a routed message might be dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropReason {
    /// No table entry for the destination
    NoRoute,
    /// The medium refused the forwarded copy
    SendFailed,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRoute => write!(f, "No route available"),
            Self::SendFailed => write!(f, "Send failed"),
        }
    }
}
