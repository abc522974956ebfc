//! Medium abstraction for message passing
//!
//! The [`Medium`] trait is the only channel between nodes. A node holds
//! exclusive access to its own endpoint of the medium and uses it to:
//!
//! - enqueue messages for other nodes (`send`, never blocks)
//! - poll for the next pending message (`receive`, never blocks)
//! - tell the harness it is done for the current round (`advance_round`)
//!
//! ## Implementations
//!
//! - [`ChannelMedium`](crate::ChannelMedium): tokio channels, asynchronous delivery
//! - `RoundEndpoint` (in distvec-simulation): synchronous, round-based delivery

use crate::error::MediumError;
use crate::message::Message;

/// One node's endpoint of the message-delivery substrate
///
/// Ordering guarantees belong to the implementation. Callers may only assume
/// that messages are received in the order the endpoint hands them out.
pub trait Medium {
    /// Enqueue a message for `message.recipient()`
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient is unknown or cannot accept messages.
    fn send(&mut self, message: Message) -> Result<(), MediumError>;

    /// Take the next pending message, or `None` if nothing is pending
    fn receive(&mut self) -> Option<Message>;

    /// Signal that this node is done for the current round
    ///
    /// Only meaningful under synchronous scheduling. Must be safe to call on
    /// every poll miss. Default implementation does nothing.
    fn advance_round(&mut self) {}
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::identity::NodeId;
    use crate::message::RoutedMessage;

    /// Loopback medium: everything sent becomes receivable immediately
    #[derive(Default)]
    struct Loopback {
        queue: VecDeque<Message>,
        rounds: usize,
    }

    impl Medium for Loopback {
        fn send(&mut self, message: Message) -> Result<(), MediumError> {
            self.queue.push_back(message);
            Ok(())
        }

        fn receive(&mut self) -> Option<Message> {
            self.queue.pop_front()
        }

        fn advance_round(&mut self) {
            self.rounds += 1;
        }
    }

    fn exercise(medium: &mut dyn Medium) -> Option<Message> {
        let msg = RoutedMessage::new(NodeId(0), NodeId(0), NodeId(0), NodeId(0), b"ping".to_vec());
        medium.send(msg.into()).ok()?;
        medium.advance_round();
        medium.receive()
    }

    #[test]
    fn test_medium_is_object_safe() {
        let mut loopback = Loopback::default();
        let received = exercise(&mut loopback);

        assert!(matches!(received, Some(Message::Routed(_))));
        assert_eq!(loopback.rounds, 1);
        assert!(loopback.receive().is_none());
    }
}
