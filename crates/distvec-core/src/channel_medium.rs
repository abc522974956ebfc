//! Channel-backed medium
//!
//! Provides an in-memory [`Medium`] over unbounded tokio channels, for
//! running nodes concurrently without real networking. Every message is
//! encoded with postcard on send and decoded on receive, so what arrives is
//! always a fresh copy of what was sent.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use distvec_core::{ChannelNetwork, Medium, NodeId};
//!
//! let network = ChannelNetwork::new();
//! let mut a = network.endpoint(NodeId(0));
//! let mut b = network.endpoint(NodeId(1));
//!
//! a.send(message_for_b)?;
//! let received = b.receive();
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::warn;

use crate::error::MediumError;
use crate::identity::NodeId;
use crate::medium::Medium;
use crate::message::Message;

/// Encoded message on the channel
type Frame = Vec<u8>;

/// One node's endpoint of a [`ChannelNetwork`]
///
/// Owns the receiving half of its inbox; senders for every registered node
/// are shared through the network registry.
pub struct ChannelMedium {
    /// Our identity
    local_id: NodeId,
    /// Incoming frames
    inbox: mpsc::UnboundedReceiver<Frame>,
    /// Inbox senders of all registered nodes
    registry: Arc<DashMap<NodeId, mpsc::UnboundedSender<Frame>>>,
}

impl ChannelMedium {
    /// Get our local identity
    pub fn local_id(&self) -> NodeId {
        self.local_id
    }
}

impl Medium for ChannelMedium {
    fn send(&mut self, message: Message) -> Result<(), MediumError> {
        let recipient = message.recipient();
        let frame =
            postcard::to_allocvec(&message).map_err(|e| MediumError::Encode(e.to_string()))?;

        let sender = self
            .registry
            .get(&recipient)
            .ok_or(MediumError::UnknownRecipient(recipient))?;

        sender
            .send(frame)
            .map_err(|_| MediumError::Closed(recipient))
    }

    fn receive(&mut self) -> Option<Message> {
        loop {
            let frame = self.inbox.try_recv().ok()?;
            match postcard::from_bytes::<Message>(&frame) {
                Ok(message) => return Some(message),
                Err(e) => {
                    warn!(node = %self.local_id, error = %e, "Discarding undecodable frame");
                }
            }
        }
    }
}

impl std::fmt::Debug for ChannelMedium {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelMedium")
            .field("local_id", &self.local_id)
            .field("registered", &self.registry.len())
            .finish()
    }
}

/// Registry of channel endpoints
///
/// Cloning the network shares the registry, so endpoints created from any
/// clone can reach each other.
#[derive(Clone, Default)]
pub struct ChannelNetwork {
    registry: Arc<DashMap<NodeId, mpsc::UnboundedSender<Frame>>>,
}

impl ChannelNetwork {
    /// Create an empty network
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` and return its endpoint
    ///
    /// Registering the same id again replaces the previous inbox; messages
    /// still queued for the old endpoint stay with it.
    pub fn endpoint(&self, id: NodeId) -> ChannelMedium {
        let (tx, rx) = mpsc::unbounded_channel();
        self.registry.insert(id, tx);
        ChannelMedium {
            local_id: id,
            inbox: rx,
            registry: Arc::clone(&self.registry),
        }
    }

    /// Register `0..count` and return their endpoints in id order
    pub fn endpoints(&self, count: usize) -> Vec<ChannelMedium> {
        NodeId::range(count)
            .into_iter()
            .map(|id| self.endpoint(id))
            .collect()
    }

    /// Number of registered nodes
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if no node is registered
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
