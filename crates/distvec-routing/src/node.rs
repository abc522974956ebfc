//! Distance-vector routing node
//!
//! The [`RoutingNode`] owns one routing table and runs the RIP-style
//! protocol against its endpoint of a [`Medium`]:
//!
//! 1. **ADVERTISING**: seed the table with self and both ring neighbours, advertise it
//! 2. **CONVERGING**: merge advertisements (re-advertising on change) and
//!    deliver or forward routed messages
//! 3. **STABLE**: the table is complete; the advertisement phase is over
//!
//! The loop is exposed as [`RoutingNode::step`], one transition per call, so
//! a harness can interleave nodes however it schedules them.

use std::collections::BTreeSet;

use distvec_core::{
    Advertisement, Device, DropReason, Medium, MergeOutcome, Message, NodeEvent, NodeId,
    RoutedMessage, Route, RoutingTable, StepOutcome,
};
use tracing::{debug, info, trace, warn};

use crate::convergence::ConvergenceCheck;

/// Position of a node in its run loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// Initial: the bootstrap advertisement has not been sent yet
    Advertising,
    /// Processing advertisements and routed messages
    Converging,
    /// Table judged complete
    Stable,
}

/// A payload that reached this node as its destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub origin: NodeId,
    /// Last hop the payload came from
    pub via: NodeId,
    pub payload: Vec<u8>,
}

/// Per-node counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStats {
    pub advertisements_sent: u64,
    pub advertisements_received: u64,
    pub tables_changed: u64,
    pub messages_forwarded: u64,
    pub messages_delivered: u64,
    pub messages_dropped: u64,
    pub send_failures: u64,
}

/// The two ring-adjacent nodes of `id`, deduplicated and never `id` itself
///
/// A ring of one node has no neighbours and a ring of two has one.
pub fn ring_neighbors(id: NodeId, total_nodes: usize) -> Vec<NodeId> {
    if total_nodes == 0 {
        return Vec::new();
    }
    let n = total_nodes as u32;
    let left = NodeId((id.0 + n - 1) % n);
    let right = NodeId((id.0 + 1) % n);

    [left, right]
        .into_iter()
        .filter(|neighbor| *neighbor != id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distance-vector routing node
#[derive(Debug, Clone)]
pub struct RoutingNode {
    id: NodeId,
    total_nodes: usize,
    neighbors: Vec<NodeId>,
    table: RoutingTable,
    state: NodeState,
    convergence: ConvergenceCheck,
    delivered: Vec<Delivery>,
    events: Vec<NodeEvent>,
    stats: NodeStats,
}

impl RoutingNode {
    /// Create a node on a ring of `total_nodes`
    pub fn new(id: NodeId, total_nodes: usize) -> Self {
        Self {
            id,
            total_nodes,
            neighbors: ring_neighbors(id, total_nodes),
            table: RoutingTable::new(id),
            state: NodeState::Advertising,
            convergence: ConvergenceCheck::default(),
            delivered: Vec::new(),
            events: Vec::new(),
            stats: NodeStats::default(),
        }
    }

    /// Use a different convergence policy
    pub fn with_convergence(mut self, convergence: ConvergenceCheck) -> Self {
        self.convergence = convergence;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn total_nodes(&self) -> usize {
        self.total_nodes
    }

    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }

    /// The live routing table
    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is_stable(&self) -> bool {
        self.state == NodeState::Stable
    }

    pub fn convergence(&self) -> ConvergenceCheck {
        self.convergence
    }

    /// Payloads delivered here, in arrival order
    pub fn delivered(&self) -> &[Delivery] {
        &self.delivered
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<NodeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Seed the table with both neighbours and advertise it
    pub fn initialize<M: Medium + ?Sized>(&mut self, medium: &mut M) {
        for &neighbor in &self.neighbors {
            self.table.insert(neighbor, Route::new(neighbor, 1));
        }
        // The self entry (self, 0) is installed by RoutingTable::new and cannot be replaced
        debug!(node = %self.id, table = %self.table, "Bootstrapped routing table");

        self.advertise(medium);
        self.state = NodeState::Converging;
    }

    /// Merge an advertised table into a copy of ours
    ///
    /// Each advertised destination is relaxed by one hop through `from`:
    /// unknown destinations are added, shorter routes replace longer ones,
    /// everything else is left alone. Our own entry is never touched.
    pub fn merge_table(&self, from: NodeId, incoming: &RoutingTable) -> MergeOutcome {
        let mut merged = self.table.clone();
        let mut changed = false;

        for (dest, route) in incoming.iter() {
            if dest == self.id {
                continue;
            }
            let candidate = route.distance.saturating_add(1);
            let improves = merged
                .distance(dest)
                .is_none_or(|current| candidate < current);

            if improves {
                merged.insert(dest, Route::new(from, candidate));
                changed = true;
            }
        }

        if changed {
            MergeOutcome::Changed(merged)
        } else {
            MergeOutcome::NoChange
        }
    }

    /// Merge a neighbour's advertisement, re-advertising if our table changed
    pub fn on_advertisement<M: Medium + ?Sized>(&mut self, adv: Advertisement, medium: &mut M) {
        debug!("Node {}: Got new table from {}", self.id, adv.sender);
        self.stats.advertisements_received += 1;

        match self.merge_table(adv.sender, &adv.table) {
            MergeOutcome::Changed(table) => {
                self.table = table;
                self.stats.tables_changed += 1;
                self.events.push(NodeEvent::TableChanged {
                    node: self.id,
                    learned_from: adv.sender,
                    entries: self.table.len(),
                });
                trace!(node = %self.id, table = %self.table, "Installed merged table");
                self.advertise(medium);
            }
            MergeOutcome::NoChange => {
                trace!(node = %self.id, from = %adv.sender, "Advertisement changed nothing");
            }
        }
    }

    /// Deliver a routed message here, forward it, or drop it
    pub fn on_routed_message<M: Medium + ?Sized>(&mut self, msg: RoutedMessage, medium: &mut M) {
        debug!(
            "Node {}: Routing from {} to {} via {}: [{}]",
            self.id,
            msg.origin,
            msg.destination,
            self.id,
            msg.payload_lossy()
        );

        if msg.destination == self.id {
            info!(
                "Node {}: delivered message from {} to {}: {}",
                self.id,
                msg.origin,
                msg.destination,
                msg.payload_lossy()
            );
            self.stats.messages_delivered += 1;
            self.events.push(NodeEvent::Delivered {
                at: self.id,
                origin: msg.origin,
                payload: msg.payload.clone(),
            });
            self.delivered.push(Delivery {
                origin: msg.origin,
                via: msg.sender,
                payload: msg.payload,
            });
            return;
        }

        let Some(next_hop) = self.table.next_hop(msg.destination) else {
            warn!(
                "Node {}: DROP unknown route {} to {} via {}, message [{}]",
                self.id,
                msg.origin,
                msg.destination,
                self.id,
                msg.payload_lossy()
            );
            self.record_drop(&msg, DropReason::NoRoute);
            return;
        };

        let forwarded = msg.forwarded(self.id, next_hop);
        match medium.send(forwarded.into()) {
            Ok(()) => {
                self.stats.messages_forwarded += 1;
                self.events.push(NodeEvent::Forwarded {
                    at: self.id,
                    next_hop,
                    origin: msg.origin,
                    destination: msg.destination,
                });
            }
            Err(e) => {
                warn!(node = %self.id, next_hop = %next_hop, error = %e, "Forwarding failed");
                self.stats.send_failures += 1;
                self.record_drop(&msg, DropReason::SendFailed);
            }
        }
    }

    /// Inject an application payload originating at this node
    pub fn originate<M: Medium + ?Sized>(
        &mut self,
        destination: NodeId,
        payload: Vec<u8>,
        medium: &mut M,
    ) {
        let msg = RoutedMessage::new(self.id, self.id, self.id, destination, payload);
        self.on_routed_message(msg, medium);
    }

    /// Check whether the table is complete under the configured policy
    pub fn is_table_complete(&self) -> bool {
        self.convergence.is_complete(&self.table, self.total_nodes)
    }

    /// Run one transition of the loop
    pub fn step<M: Medium + ?Sized>(&mut self, medium: &mut M) -> StepOutcome {
        match self.state {
            NodeState::Advertising => {
                self.initialize(medium);
                StepOutcome::Progressed
            }
            NodeState::Converging => {
                let outcome = match medium.receive() {
                    Some(message) => {
                        self.handle(message, medium);
                        StepOutcome::Progressed
                    }
                    None => {
                        medium.advance_round();
                        StepOutcome::Idle
                    }
                };

                if self.is_table_complete() {
                    self.stabilize();
                    StepOutcome::Stable
                } else {
                    outcome
                }
            }
            NodeState::Stable => StepOutcome::Stable,
        }
    }

    /// Step until stable, yielding to the tokio scheduler on every poll miss
    pub async fn run<M: Medium + ?Sized>(&mut self, medium: &mut M) {
        loop {
            match self.step(medium) {
                StepOutcome::Progressed => {}
                StepOutcome::Idle => tokio::task::yield_now().await,
                StepOutcome::Stable => break,
            }
        }
    }

    /// Handle every message currently pending, whatever the state
    ///
    /// Used after convergence to keep forwarding application traffic.
    /// Returns the number of messages handled.
    pub fn serve<M: Medium + ?Sized>(&mut self, medium: &mut M) -> usize {
        let mut handled = 0;
        while let Some(message) = medium.receive() {
            self.handle(message, medium);
            handled += 1;
        }
        handled
    }

    /// Human-readable summary of the routing table
    pub fn report(&self) -> String {
        format!("Node {} has routing table: {}", self.id, self.table)
    }

    fn handle<M: Medium + ?Sized>(&mut self, message: Message, medium: &mut M) {
        match message {
            Message::Advertisement(adv) => self.on_advertisement(adv, medium),
            Message::Routed(msg) => self.on_routed_message(msg, medium),
        }
    }

    fn advertise<M: Medium + ?Sized>(&mut self, medium: &mut M) {
        for &neighbor in &self.neighbors {
            let adv = Advertisement::new(self.id, neighbor, self.table.clone());
            match medium.send(adv.into()) {
                Ok(()) => {
                    self.stats.advertisements_sent += 1;
                    self.events.push(NodeEvent::Advertised {
                        from: self.id,
                        to: neighbor,
                        entries: self.table.len(),
                    });
                }
                Err(e) => {
                    warn!(node = %self.id, neighbor = %neighbor, error = %e, "Advertisement not sent");
                    self.stats.send_failures += 1;
                }
            }
        }
    }

    fn stabilize(&mut self) {
        self.state = NodeState::Stable;
        self.events.push(NodeEvent::Stabilized {
            node: self.id,
            entries: self.table.len(),
        });
        info!(node = %self.id, entries = self.table.len(), "Routing table complete");
    }

    fn record_drop(&mut self, msg: &RoutedMessage, reason: DropReason) {
        self.stats.messages_dropped += 1;
        self.events.push(NodeEvent::Dropped {
            at: self.id,
            origin: msg.origin,
            destination: msg.destination,
            reason,
        });
    }
}

impl Device for RoutingNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn total_nodes(&self) -> usize {
        self.total_nodes
    }

    fn step(&mut self, medium: &mut dyn Medium) -> StepOutcome {
        RoutingNode::step(self, medium)
    }

    fn is_finished(&self) -> bool {
        self.is_stable()
    }

    fn report(&self) -> String {
        RoutingNode::report(self)
    }
}
