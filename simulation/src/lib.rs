//! # distvec Simulation
//!
//! A ring network simulation library driving distance-vector routing nodes.
//!
//! ## Overview
//!
//! Nodes `0..N` sit on a ring and start out knowing only their two
//! neighbours. They exchange routing tables until every node knows a
//! shortest route to every other node, then forward payloads hop-by-hop.
//!
//! - **Synchronous rounds**: messages cross one link per round, deterministic
//! - **Asynchronous tasks**: one tokio task per node over channel endpoints
//! - **Event log**: every advertisement, table change, forward, delivery and drop
//! - **Route traces**: follow a single payload across the ring
//!
//! ## Architecture
//!
//! - **Types** (`types.rs`): Event log entries, statistics, route traces
//! - **Topology** (`topology.rs`): Ring construction and ring distances
//! - **Medium** (`medium.rs`): Round-based message store
//! - **Simulation** (`simulation.rs`): Discrete-round simulation engine
//! - **Async** (`async_sim.rs`): Concurrent runs on the tokio runtime
//! - **Scenarios** (`scenarios.rs`): Pre-built runs
//!
//! ## Example: Scenario B
//!
//! ```rust,ignore
//! use distvec_simulation::*;
//!
//! let mut sim = Simulation::new(Ring::new(5), SimConfig::default())?;
//! sim.run()?;
//!
//! // #0 reaches #3 through #4
//! let trace = sim.route(NodeId(0), NodeId(3), b"X".to_vec())?;
//! assert_eq!(trace.path, vec![NodeId(0), NodeId(4), NodeId(3)]);
//! ```

pub mod async_sim;
pub mod error;
pub mod medium;
pub mod scenarios;
pub mod simulation;
pub mod topology;
pub mod types;

#[cfg(test)]
mod integration_scenarios;

// Re-export main types
pub use types::{RoundEvent, RouteOutcome, RouteTrace, SimStats};

pub use topology::Ring;

pub use medium::{RoundEndpoint, RoundMedium};

pub use simulation::{SimConfig, Simulation};

pub use async_sim::{AsyncConfig, AsyncSimulation};

pub use error::SimulationError;

// Re-export routing types for integration
pub use distvec_core::{DropReason, Message, NodeEvent, NodeId};
pub use distvec_routing::{ConvergenceCheck, RoutingNode};
