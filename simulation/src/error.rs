//! Simulation error types

use distvec_core::NodeId;
use thiserror::Error;

/// Errors raised by the simulation harness
///
/// Routing nodes themselves never fail; these cover misuse of the harness
/// and runs that do not finish.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid node count: {0}")]
    InvalidNodeCount(usize),

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("No convergence within {0} rounds")]
    RoundLimit(u64),

    #[error("Asynchronous run timed out")]
    Timeout,

    #[error("Node task failed: {0}")]
    TaskFailed(String),
}
