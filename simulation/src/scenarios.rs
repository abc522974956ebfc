//! Pre-defined simulation scenarios for distvec
//!
//! Includes the three reference rings (A, B, C) and a few larger runs

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use distvec_core::{Advertisement, MergeOutcome, NodeEvent, NodeId};
use distvec_routing::RoutingNode;

use crate::async_sim::{AsyncConfig, AsyncSimulation};
use crate::error::SimulationError;
use crate::simulation::{SimConfig, Simulation};
use crate::topology::Ring;
use crate::types::RouteTrace;

/// Converge a ring of `nodes` and print every table
pub fn run_convergence_scenario(nodes: usize, config: SimConfig) -> Result<Simulation, SimulationError> {
    info!("=== Running Convergence Scenario ({} nodes) ===", nodes);

    let ring = Ring::new(nodes);
    println!("{}", ring.visualize());

    let mut sim = Simulation::new(ring, config)?;
    let round = sim.run()?;

    println!("\n--- Converged at round {} ---", round);
    for report in sim.reports() {
        println!("  {}", report);
    }
    let diameter = sim.nodes().iter().map(|n| n.table().diameter()).max().unwrap_or(0);
    println!("  Longest route: {} hops", diameter);
    print_stats(&sim);

    Ok(sim)
}

/// Converge a ring of `nodes` with one tokio task per node
pub async fn run_async_convergence_scenario(
    nodes: usize,
    config: AsyncConfig,
) -> Result<Vec<RoutingNode>, SimulationError> {
    info!("=== Running Asynchronous Convergence Scenario ({} nodes) ===", nodes);

    let sim = AsyncSimulation::new(Ring::new(nodes), config)?;
    let nodes = sim.run().await?;

    println!("\n--- All node tasks finished ---");
    for node in &nodes {
        println!("  {}", node.report());
    }
    let advertisements: u64 = nodes.iter().map(|n| n.stats().advertisements_sent).sum();
    println!("  Advertisements sent: {}", advertisements);

    Ok(nodes)
}

/// Scenario A: a 4-ring
///
/// ```text
/// #0 - #1
///  |    |
/// #3 - #2
/// ```
///
/// Node 0 ends up with `{1: (1, 1), 2: (1 or 3, 2), 3: (3, 1)}`.
pub fn run_scenario_a() -> Result<Simulation, SimulationError> {
    info!("=== Running Scenario A ===");

    let sim = run_convergence_scenario(4, SimConfig::default())?;

    println!("\n--- Node #0 ---");
    println!("  {}", sim.node(NodeId(0))?.report());
    println!("  Two equal-cost routes to #2 exist; either next hop is valid");

    Ok(sim)
}

/// Scenario B: node 0 of a 5-ring sends "X" to node 3
///
/// ```text
/// #0 -> #4 -> #3
/// ```
///
/// The payload crosses two links and arrives unchanged.
pub fn run_scenario_b() -> Result<(Simulation, RouteTrace), SimulationError> {
    info!("=== Running Scenario B ===");

    let mut sim = Simulation::new(Ring::new(5), SimConfig::default())?;
    sim.run()?;
    println!("  {}", sim.state_summary());

    println!("\n--- #0 sends \"X\" to #3 ---");
    let trace = sim.route(NodeId(0), NodeId(3), b"X".to_vec())?;
    println!("  {}", trace);

    for delivery in sim.node(NodeId(3))?.delivered() {
        println!(
            "  #3 delivery log: from {} via {}: {}",
            delivery.origin,
            delivery.via,
            String::from_utf8_lossy(&delivery.payload)
        );
    }

    Ok((sim, trace))
}

/// Scenario C: a converged node is offered a copy of its own table
///
/// Every advertised route is one hop longer through the sender than what
/// node 0 already holds, so the merge reports no change and node 0 sends
/// no advertisement in response.
pub fn run_scenario_c() -> Result<(Simulation, MergeOutcome), SimulationError> {
    info!("=== Running Scenario C ===");

    let mut sim = Simulation::new(Ring::new(4), SimConfig::default())?;
    sim.run()?;
    sim.deliver_pending()?;

    let receiver = sim.node(NodeId(0))?;
    let offered = receiver.table().clone();
    let outcome = receiver.merge_table(NodeId(1), &offered);
    println!("\n--- #0 merges its own table: changed = {} ---", outcome.is_changed());

    let mark = sim.event_log.len();
    sim.inject(Advertisement::new(NodeId(1), NodeId(0), offered).into())?;
    sim.deliver_pending()?;

    let readvertised = sim.event_log[mark..]
        .iter()
        .filter(|logged| matches!(logged.event, NodeEvent::Advertised { .. }))
        .count();
    println!("  Advertisements sent in response: {}", readvertised);

    Ok((sim, outcome))
}

/// Send one payload across a converged ring and report its path
pub fn run_route_scenario(
    nodes: usize,
    from: NodeId,
    to: NodeId,
    payload: &str,
) -> Result<RouteTrace, SimulationError> {
    info!("=== Running Route Scenario ===");

    let mut sim = Simulation::new(Ring::new(nodes), SimConfig::default())?;
    sim.run()?;
    println!("  {}", sim.state_summary());

    let trace = sim.route(from, to, payload.as_bytes().to_vec())?;
    println!("\n--- Route ---");
    println!("  {}", trace);
    if trace.is_delivered() {
        println!("  Ring distance: {}", sim.ring.distance(from, to));
    }

    Ok(trace)
}

/// Route `messages` random payloads across a converged ring
pub fn run_traffic_scenario(
    nodes: usize,
    messages: usize,
    seed: Option<u64>,
) -> Result<Simulation, SimulationError> {
    info!("=== Running Traffic Scenario ({} nodes, {} messages) ===", nodes, messages);

    let mut sim = Simulation::new(Ring::new(nodes), SimConfig {
        trace_routing: false,
        ..Default::default()
    })?;
    sim.run()?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut total_hops = 0;
    let mut shortest = 0;

    for i in 0..messages {
        let from = NodeId(rng.random_range(0..nodes as u32));
        let to = NodeId(rng.random_range(0..nodes as u32));
        let trace = sim.route(from, to, format!("message {}", i).into_bytes())?;

        total_hops += trace.hops();
        if sim.ring.is_shortest_path(&trace.path) {
            shortest += 1;
        }
    }

    println!("\n=== Traffic Results ===");
    println!("  Messages routed: {}", messages);
    println!("  Messages delivered: {}", sim.stats.messages_delivered);
    println!("  Messages dropped: {}", sim.stats.messages_dropped);
    println!("  Shortest paths: {}/{}", shortest, messages);
    if messages > 0 {
        println!("  Average hops: {:.2}", total_hops as f64 / messages as f64);
    }
    print_stats(&sim);

    Ok(sim)
}

fn print_stats(sim: &Simulation) {
    println!("\n=== Final Statistics ===");
    println!("  Rounds: {}", sim.stats.rounds);
    println!("  Advertisements sent: {}", sim.stats.advertisements_sent);
    println!(
        "  Advertisements per node: {:.1}",
        sim.stats.advertisements_per_node(sim.ring.size())
    );
    println!("  Table changes: {}", sim.stats.tables_changed);
    println!("  Messages forwarded: {}", sim.stats.messages_forwarded);
    println!("  Messages delivered: {}", sim.stats.messages_delivered);
}
