//! Types for the ring simulation
//!
//! Network-wide bookkeeping built on top of the per-node [`NodeEvent`]s:
//! a round-stamped event log, aggregate statistics, and traces of routed
//! payloads reconstructed from the log.

use distvec_core::{DropReason, NodeEvent, NodeId};

/// A node event stamped with the round it happened in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundEvent {
    pub round: u64,
    pub event: NodeEvent,
}

/// Simulation statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Rounds run so far
    pub rounds: u64,
    pub advertisements_sent: u64,
    pub tables_changed: u64,
    pub messages_originated: u64,
    pub messages_forwarded: u64,
    pub messages_delivered: u64,
    pub messages_dropped: u64,
    pub send_failures: u64,
    /// Nodes that reached the stable state
    pub stabilized: u64,
    /// First round at which every node was stable
    pub convergence_round: Option<u64>,
}

impl SimStats {
    /// Fold one node event into the counters
    pub fn record(&mut self, event: &NodeEvent) {
        match event {
            NodeEvent::Advertised { .. } => self.advertisements_sent += 1,
            NodeEvent::TableChanged { .. } => self.tables_changed += 1,
            NodeEvent::Stabilized { .. } => self.stabilized += 1,
            NodeEvent::Forwarded { .. } => self.messages_forwarded += 1,
            NodeEvent::Delivered { .. } => self.messages_delivered += 1,
            NodeEvent::Dropped { reason, .. } => {
                self.messages_dropped += 1;
                if *reason == DropReason::SendFailed {
                    self.send_failures += 1;
                }
            }
        }
    }

    /// Average advertisements per node, for reporting
    pub fn advertisements_per_node(&self, node_count: usize) -> f64 {
        if node_count == 0 {
            0.0
        } else {
            self.advertisements_sent as f64 / node_count as f64
        }
    }
}

/// Where a routed payload ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Reached its destination
    Delivered,
    /// Discarded at `at`
    Dropped { at: NodeId, reason: DropReason },
    /// Still travelling when the trace was taken
    InFlight,
}

/// The hop-by-hop path a single payload took
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTrace {
    pub origin: NodeId,
    pub destination: NodeId,
    /// Every node that handled the payload, starting at the origin
    pub path: Vec<NodeId>,
    pub outcome: RouteOutcome,
}

impl RouteTrace {
    /// Rebuild a trace from events logged after the payload was injected
    ///
    /// Only events concerning `origin -> destination` are considered, so
    /// the trace is exact as long as one such payload is in flight.
    pub fn from_events<'a>(
        origin: NodeId,
        destination: NodeId,
        events: impl IntoIterator<Item = &'a RoundEvent>,
    ) -> Self {
        let mut path = vec![origin];
        let mut outcome = RouteOutcome::InFlight;

        for logged in events {
            match &logged.event {
                NodeEvent::Forwarded {
                    next_hop,
                    origin: o,
                    destination: d,
                    ..
                } if *o == origin && *d == destination => path.push(*next_hop),
                NodeEvent::Delivered { at, origin: o, .. } if *o == origin && *at == destination => {
                    outcome = RouteOutcome::Delivered;
                    break;
                }
                NodeEvent::Dropped {
                    at,
                    origin: o,
                    destination: d,
                    reason,
                } if *o == origin && *d == destination => {
                    outcome = RouteOutcome::Dropped { at: *at, reason: *reason };
                    break;
                }
                _ => {}
            }
        }

        Self {
            origin,
            destination,
            path,
            outcome,
        }
    }

    /// Number of links crossed
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn is_delivered(&self) -> bool {
        self.outcome == RouteOutcome::Delivered
    }
}

impl std::fmt::Display for RouteTrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path: Vec<String> = self.path.iter().map(|n| n.to_string()).collect();
        write!(f, "{} => {}: {}", self.origin, self.destination, path.join(" -> "))?;
        match self.outcome {
            RouteOutcome::Delivered => write!(f, " (delivered, {} hops)", self.hops()),
            RouteOutcome::Dropped { at, reason } => write!(f, " (dropped at {}: {})", at, reason),
            RouteOutcome::InFlight => write!(f, " (in flight)"),
        }
    }
}
