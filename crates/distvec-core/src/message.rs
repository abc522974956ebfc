//! Messages exchanged between nodes
//!
//! Every message carries wire-level hop addressing (`sender`, `recipient`).
//! Routed messages additionally carry the application-level endpoints
//! (`origin`, `destination`), which stay fixed while the hop addressing is
//! rewritten at every forwarding step.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::identity::NodeId;
use crate::table::RoutingTable;

/// A routing-table snapshot sent to a neighbour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advertisement {
    pub sender: NodeId,
    pub recipient: NodeId,
    /// Owned copy of the sender's table at send time
    pub table: RoutingTable,
}

impl Advertisement {
    /// Create an advertisement carrying `table`
    pub fn new(sender: NodeId, recipient: NodeId, table: RoutingTable) -> Self {
        Self {
            sender,
            recipient,
            table,
        }
    }
}

impl Display for Advertisement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Advertisement: {} -> {} : {}",
            self.sender, self.recipient, self.table
        )
    }
}

/// An application payload travelling hop-by-hop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedMessage {
    /// Hop that sent this copy
    pub sender: NodeId,
    /// Hop this copy is addressed to
    pub recipient: NodeId,
    /// Node that originated the payload
    pub origin: NodeId,
    /// Node the payload is meant for
    pub destination: NodeId,
    /// Opaque application payload
    pub payload: Vec<u8>,
}

impl RoutedMessage {
    pub fn new(
        sender: NodeId,
        recipient: NodeId,
        origin: NodeId,
        destination: NodeId,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            sender,
            recipient,
            origin,
            destination,
            payload,
        }
    }

    /// Build the next-hop copy of this message
    ///
    /// Only the hop addressing changes; origin, destination and payload are kept.
    pub fn forwarded(&self, via: NodeId, next_hop: NodeId) -> Self {
        Self {
            sender: via,
            recipient: next_hop,
            origin: self.origin,
            destination: self.destination,
            payload: self.payload.clone(),
        }
    }

    /// Payload rendered for logs
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

impl Display for RoutedMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RoutedMessage: {} -> {} ({} => {}) : {}",
            self.sender,
            self.recipient,
            self.origin,
            self.destination,
            self.payload_lossy()
        )
    }
}

/// Everything a node can receive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    Advertisement(Advertisement),
    Routed(RoutedMessage),
}

impl Message {
    /// Hop that sent the message
    pub fn sender(&self) -> NodeId {
        match self {
            Self::Advertisement(adv) => adv.sender,
            Self::Routed(msg) => msg.sender,
        }
    }

    /// Hop the message is addressed to
    pub fn recipient(&self) -> NodeId {
        match self {
            Self::Advertisement(adv) => adv.recipient,
            Self::Routed(msg) => msg.recipient,
        }
    }

    /// Short name of the message kind (for logging)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Advertisement(_) => "advertisement",
            Self::Routed(_) => "routed",
        }
    }
}

impl From<Advertisement> for Message {
    fn from(adv: Advertisement) -> Self {
        Self::Advertisement(adv)
    }
}

impl From<RoutedMessage> for Message {
    fn from(msg: RoutedMessage) -> Self {
        Self::Routed(msg)
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Advertisement(adv) => adv.fmt(f),
            Self::Routed(msg) => msg.fmt(f),
        }
    }
}
