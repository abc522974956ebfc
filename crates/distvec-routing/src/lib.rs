//! # Distvec Routing
//!
//! Distance-vector (RIP-style) routing node for distvec.
//!
//! Each node starts out knowing only itself and its two ring neighbours,
//! and learns the rest of the network from table advertisements. Once its
//! table is complete it can forward application payloads hop-by-hop.
//!
//! ## Core Components
//!
//! - [`RoutingNode`]: Owns one routing table and runs the protocol
//! - [`ConvergenceCheck`]: Decides when a table is complete
//! - [`ring_neighbors`]: The immediate-neighbour rule
//!
//! ## Routing Algorithm
//!
//! 1. **BOOTSTRAP**: `(self, 0)`, `(left, 1)`, `(right, 1)`; advertise to both neighbours
//! 2. **MERGE**: relax every advertised route by one hop through the sender;
//!    on change, install the table and advertise it again (triggered update)
//! 3. **FORWARD**: deliver if we are the destination, hand to the next hop if
//!    the destination is known, drop with a diagnostic otherwise
//! 4. **CONVERGE**: stop the advertisement phase once the table is complete
//!
//! ## Example
//!
//! ```rust,ignore
//! use distvec_core::{ChannelNetwork, NodeId};
//! use distvec_routing::RoutingNode;
//!
//! let network = ChannelNetwork::new();
//! let mut medium = network.endpoint(NodeId(0));
//! let mut node = RoutingNode::new(NodeId(0), 5);
//!
//! node.run(&mut medium).await;
//! println!("{}", node.report());
//! ```

pub mod convergence;
pub mod node;

// Re-export main types
pub use convergence::ConvergenceCheck;
pub use node::{Delivery, NodeState, NodeStats, RoutingNode, ring_neighbors};

// Re-export core types for convenience
pub use distvec_core::{MergeOutcome, NodeId, Route, RoutingTable, StepOutcome};
