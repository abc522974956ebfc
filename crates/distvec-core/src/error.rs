//! Error types for distvec

use thiserror::Error;

use crate::identity::NodeId;

/// Errors raised by a medium when accepting a message
///
/// None of these are fatal to a node: the sending node logs the failure and
/// carries on, since `send` is fire-and-forget from the protocol's point of view.
#[derive(Debug, Error)]
pub enum MediumError {
    #[error("Unknown recipient: {0}")]
    UnknownRecipient(NodeId),

    #[error("Inbox of {0} is closed")]
    Closed(NodeId),

    #[error("Message encoding failed: {0}")]
    Encode(String),
}
