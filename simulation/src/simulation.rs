//! Simulation engine for distvec rings
//!
//! Implements deterministic round-based simulation with:
//! - One routing node per ring position, each stepped until it yields
//! - A synchronous medium where messages cross one link per round
//! - Optional shuffled scheduling to check order independence
//! - A delivery phase for application payloads once tables are stable

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, trace};

use distvec_core::{Message, NodeEvent, NodeId};
use distvec_routing::{ConvergenceCheck, RoutingNode};

use crate::error::SimulationError;
use crate::medium::RoundMedium;
use crate::topology::Ring;
use crate::types::{RoundEvent, RouteTrace, SimStats};

/// Configuration for the simulation
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Maximum rounds before a run is abandoned
    pub max_rounds: u64,
    /// Completeness policy handed to every node
    pub convergence: ConvergenceCheck,
    /// Randomize the order nodes are scheduled in each round
    pub shuffle: bool,
    /// Seed for the scheduling order (None = from the OS)
    pub seed: Option<u64>,
    /// Enable detailed tracing of every node event
    pub trace_routing: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_rounds: 1000,
            convergence: ConvergenceCheck::default(),
            shuffle: false,
            seed: None,
            trace_routing: true,
        }
    }
}

/// The simulation state
#[derive(Debug)]
pub struct Simulation {
    /// The ring being simulated
    pub ring: Ring,
    /// Current simulation round
    pub round: u64,
    /// Configuration
    pub config: SimConfig,
    /// Global event log (all events)
    pub event_log: Vec<RoundEvent>,
    /// Statistics
    pub stats: SimStats,
    nodes: Vec<RoutingNode>,
    medium: RoundMedium,
    rng: StdRng,
}

impl Simulation {
    /// Create a new simulation with one node per ring position
    pub fn new(ring: Ring, config: SimConfig) -> Result<Self, SimulationError> {
        let size = ring.size();
        if size == 0 || u32::try_from(size).is_err() {
            return Err(SimulationError::InvalidNodeCount(size));
        }

        let nodes = ring
            .nodes()
            .into_iter()
            .map(|id| RoutingNode::new(id, size).with_convergence(config.convergence))
            .collect();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            ring,
            round: 0,
            config,
            event_log: Vec::new(),
            stats: SimStats::default(),
            nodes,
            medium: RoundMedium::new(size),
            rng,
        })
    }

    /// Run a single round
    ///
    /// Every node that is not yet stable steps until it yields, then the
    /// medium makes this round's messages receivable.
    pub fn step(&mut self) {
        self.round += 1;
        trace!("=== Round {} ===", self.round);

        for id in self.schedule() {
            let events = {
                let node = &mut self.nodes[id.index()];
                if node.is_stable() {
                    continue;
                }
                let mut endpoint = self.medium.endpoint(id);
                while !node.step(&mut endpoint).should_yield() {}
                node.drain_events()
            };
            self.emit_events(events);
        }

        self.medium.advance();
        self.stats.rounds = self.round;
        if self.stats.convergence_round.is_none() && self.is_converged() {
            self.stats.convergence_round = Some(self.round);
        }
    }

    /// Run rounds until every node is stable
    ///
    /// Returns the round at which the ring converged.
    pub fn run(&mut self) -> Result<u64, SimulationError> {
        info!(nodes = self.ring.size(), "Starting simulation");

        while !self.is_converged() {
            if self.round >= self.config.max_rounds {
                return Err(SimulationError::RoundLimit(self.config.max_rounds));
            }
            self.step();
        }

        info!("Simulation converged at round {}", self.round);
        debug!("Stats: {:?}", self.stats);
        Ok(self.round)
    }

    /// Run for a specific number of rounds
    pub fn run_rounds(&mut self, rounds: u64) {
        for _ in 0..rounds {
            self.step();
        }
    }

    /// Check if every node has reached the stable state
    pub fn is_converged(&self) -> bool {
        self.nodes.iter().all(RoutingNode::is_stable)
    }

    /// Inject an application payload at `origin`
    ///
    /// The origin resolves its first hop immediately; the payload then
    /// travels one link per round during [`Simulation::deliver_pending`].
    /// Destinations are not validated: an unknown destination is dropped by
    /// the origin like any other unroutable message.
    pub fn send_routed(
        &mut self,
        origin: NodeId,
        destination: NodeId,
        payload: Vec<u8>,
    ) -> Result<(), SimulationError> {
        if !self.ring.contains(origin) {
            return Err(SimulationError::UnknownNode(origin));
        }

        let events = {
            let node = &mut self.nodes[origin.index()];
            let mut endpoint = self.medium.endpoint(origin);
            node.originate(destination, payload, &mut endpoint);
            node.drain_events()
        };
        self.stats.messages_originated += 1;
        self.emit_events(events);
        Ok(())
    }

    /// Place a raw message on the medium, bypassing the sender's node
    pub fn inject(&mut self, message: Message) -> Result<(), SimulationError> {
        let recipient = message.recipient();
        self.medium
            .stage(message)
            .map_err(|_| SimulationError::UnknownNode(recipient))
    }

    /// Keep every node serving its inbox until nothing is in flight
    ///
    /// Intended for use after [`Simulation::run`]. Returns the number of
    /// rounds the delivery phase took.
    pub fn deliver_pending(&mut self) -> Result<u64, SimulationError> {
        let start = self.round;

        while !self.medium.is_quiet() {
            if self.round - start >= self.config.max_rounds {
                return Err(SimulationError::RoundLimit(self.config.max_rounds));
            }
            self.round += 1;
            self.medium.advance();
            trace!("=== Delivery round {} ===", self.round);

            for id in self.schedule() {
                let events = {
                    let node = &mut self.nodes[id.index()];
                    let mut endpoint = self.medium.endpoint(id);
                    node.serve(&mut endpoint);
                    node.drain_events()
                };
                self.emit_events(events);
            }
            self.stats.rounds = self.round;
        }

        Ok(self.round - start)
    }

    /// Send one payload and follow it to delivery or drop
    pub fn route(
        &mut self,
        origin: NodeId,
        destination: NodeId,
        payload: Vec<u8>,
    ) -> Result<RouteTrace, SimulationError> {
        let mark = self.event_log.len();
        self.send_routed(origin, destination, payload)?;
        self.deliver_pending()?;

        let trace = RouteTrace::from_events(origin, destination, &self.event_log[mark..]);
        debug!("Route {}", trace);
        Ok(trace)
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> Result<&RoutingNode, SimulationError> {
        self.nodes
            .get(id.index())
            .ok_or(SimulationError::UnknownNode(id))
    }

    /// All nodes in id order
    pub fn nodes(&self) -> &[RoutingNode] {
        &self.nodes
    }

    /// Per-node routing table reports in id order
    pub fn reports(&self) -> Vec<String> {
        self.nodes.iter().map(RoutingNode::report).collect()
    }

    /// Get a summary of the current state
    pub fn state_summary(&self) -> String {
        let stable = self.nodes.iter().filter(|n| n.is_stable()).count();
        format!(
            "Round {}: {}/{} stable, {} in flight, {} advertisements sent",
            self.round,
            stable,
            self.nodes.len(),
            self.medium.in_flight(),
            self.stats.advertisements_sent
        )
    }

    fn schedule(&mut self) -> Vec<NodeId> {
        let mut order = self.ring.nodes();
        if self.config.shuffle {
            order.shuffle(&mut self.rng);
        }
        order
    }

    fn emit_events(&mut self, events: Vec<NodeEvent>) {
        for event in events {
            if self.config.trace_routing {
                trace!(node = %event.node(), round = self.round, "Event: {:?}", event);
            }
            self.stats.record(&event);
            self.event_log.push(RoundEvent {
                round: self.round,
                event,
            });
        }
    }
}
