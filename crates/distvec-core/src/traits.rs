//! Harness-facing traits
//!
//! A scheduling harness drives nodes through the [`Device`] trait: it hands
//! each node its medium endpoint, steps it, and asks for a report once the
//! node has finished.

use crate::identity::NodeId;
use crate::medium::Medium;

/// What a single step of a node's loop achieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The node did work (bootstrapped or handled a message)
    Progressed,
    /// Nothing was pending; the node yielded to the scheduler
    Idle,
    /// The node has finished its advertisement phase
    Stable,
}

impl StepOutcome {
    /// Check if the node yielded or finished, i.e. the scheduler should move on
    pub fn should_yield(&self) -> bool {
        !matches!(self, Self::Progressed)
    }
}

/// A node driven by an external scheduler
pub trait Device {
    /// This node's id
    fn id(&self) -> NodeId;

    /// Number of nodes in the network
    fn total_nodes(&self) -> usize;

    /// Run one transition of the node's loop against `medium`
    fn step(&mut self, medium: &mut dyn Medium) -> StepOutcome;

    /// Check if the node has reached its terminal state
    fn is_finished(&self) -> bool;

    /// Human-readable summary of the node's final state
    fn report(&self) -> String;
}
