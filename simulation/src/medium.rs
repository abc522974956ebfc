//! Synchronous round-based medium
//!
//! Messages sent during round `r` become receivable at the start of round
//! `r + 1`. Within a round each node drains its own inbox in FIFO order.
//! The simulation owns the [`RoundMedium`] and lends each node a
//! [`RoundEndpoint`] for the duration of its turn.

use std::collections::VecDeque;

use distvec_core::{Medium, MediumError, Message, NodeId};
use tracing::trace;

/// Round-based message store for a fixed set of nodes
#[derive(Debug)]
pub struct RoundMedium {
    /// Messages receivable this round, per recipient
    inboxes: Vec<VecDeque<Message>>,
    /// Messages sent this round
    staged: Vec<Message>,
    /// Completed rounds
    round: u64,
    /// Messages accepted so far
    accepted: u64,
}

impl RoundMedium {
    /// Create a medium for nodes `0..node_count`
    pub fn new(node_count: usize) -> Self {
        Self {
            inboxes: vec![VecDeque::new(); node_count],
            staged: Vec::new(),
            round: 0,
            accepted: 0,
        }
    }

    /// Lend `id` its endpoint for one turn
    pub fn endpoint(&mut self, id: NodeId) -> RoundEndpoint<'_> {
        RoundEndpoint {
            id,
            medium: self,
            yielded: false,
        }
    }

    /// Close the current round: staged messages become receivable
    pub fn advance(&mut self) {
        self.round += 1;
        let staged = self.staged.len();
        for message in self.staged.drain(..) {
            self.inboxes[message.recipient().index()].push_back(message);
        }
        trace!(round = self.round, delivered = staged, "Round advanced");
    }

    /// Stage a message on behalf of the harness
    pub fn stage(&mut self, message: Message) -> Result<(), MediumError> {
        let recipient = message.recipient();
        if !recipient.is_within(self.inboxes.len()) {
            return Err(MediumError::UnknownRecipient(recipient));
        }
        self.staged.push(message);
        self.accepted += 1;
        Ok(())
    }

    /// Completed rounds
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Messages accepted since creation
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Messages receivable by `id` this round
    pub fn pending(&self, id: NodeId) -> usize {
        self.inboxes.get(id.index()).map_or(0, VecDeque::len)
    }

    /// Messages staged or waiting in any inbox
    pub fn in_flight(&self) -> usize {
        self.staged.len() + self.inboxes.iter().map(VecDeque::len).sum::<usize>()
    }

    /// Check if nothing is staged or waiting
    pub fn is_quiet(&self) -> bool {
        self.in_flight() == 0
    }
}

/// One node's view of the [`RoundMedium`] during its turn
pub struct RoundEndpoint<'a> {
    id: NodeId,
    medium: &'a mut RoundMedium,
    yielded: bool,
}

impl RoundEndpoint<'_> {
    /// Check if the node called `advance_round` during this turn
    pub fn has_yielded(&self) -> bool {
        self.yielded
    }
}

impl Medium for RoundEndpoint<'_> {
    fn send(&mut self, message: Message) -> Result<(), MediumError> {
        self.medium.stage(message)
    }

    fn receive(&mut self) -> Option<Message> {
        self.medium.inboxes.get_mut(self.id.index())?.pop_front()
    }

    fn advance_round(&mut self) {
        self.yielded = true;
    }
}
