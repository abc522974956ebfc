//! # Distvec Core
//!
//! Core types, traits, and errors for the distvec distance-vector routing stack.
//!
//! This crate provides the data model shared by the routing node and the
//! harnesses that drive it. Nodes never share memory: everything they know
//! about each other arrives as a [`Message`] through a [`Medium`].
//!
//! ## Key Traits
//!
//! - [`Medium`]: Non-blocking send/receive plus the round-advance primitive
//! - [`Device`]: What a scheduling harness needs from a node
//!
//! ## Key Types
//!
//! - [`NodeId`]: Dense node identifier in `[0, N)`
//! - [`RoutingTable`]: Destination -> (next hop, distance), always holding a self entry
//! - [`Message`]: Either an [`Advertisement`] or a [`RoutedMessage`]
//! - [`ChannelMedium`]: In-memory medium over tokio channels with postcard framing

pub mod channel_medium;
pub mod error;
pub mod event;
pub mod identity;
pub mod medium;
pub mod message;
pub mod table;
pub mod traits;

// Re-export main types
pub use channel_medium::*;
pub use error::*;
pub use event::*;
pub use identity::*;
pub use medium::*;
pub use message::*;
pub use table::*;
pub use traits::*;
