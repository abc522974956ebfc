//! Integration scenarios testing the full distvec stack
//!
//! These scenarios test the integration of:
//! - distvec-core types (NodeId, RoutingTable, messages, events)
//! - distvec-routing (RoutingNode, ConvergenceCheck)
//! - the round-based and asynchronous harnesses in this crate

use distvec_core::{DropReason, MergeOutcome, NodeEvent, NodeId, Route};
use distvec_routing::ConvergenceCheck;

use crate::async_sim::{AsyncConfig, AsyncSimulation};
use crate::scenarios;
use crate::simulation::{SimConfig, Simulation};
use crate::topology::Ring;
use crate::types::RouteOutcome;

fn quiet() -> SimConfig {
    SimConfig {
        trace_routing: false,
        ..Default::default()
    }
}

fn converged(size: usize) -> Simulation {
    let mut sim = Simulation::new(Ring::new(size), quiet()).unwrap();
    sim.run().unwrap();
    sim
}

/// Every table holds N - 1 other nodes at their exact ring distance
fn assert_exact_tables(sim: &Simulation) {
    let ring = sim.ring;
    for node in sim.nodes() {
        let table = node.table();
        assert_eq!(table.known_peers(), ring.size() - 1, "node {}", node.id());

        for (dest, route) in table {
            assert_eq!(route.distance, ring.distance(node.id(), dest), "{} -> {}", node.id(), dest);
            if dest != node.id() {
                assert!(ring.are_connected(node.id(), route.next_hop));
                assert_eq!(ring.distance(route.next_hop, dest), route.distance - 1);
            }
        }
    }
}

/// Scenario A: node 0 of a 4-ring
#[test]
fn test_scenario_a_four_ring_table() {
    let sim = scenarios::run_scenario_a().unwrap();
    let table = sim.node(NodeId(0)).unwrap().table();

    assert_eq!(table.len(), 4);
    assert_eq!(table.get(NodeId(0)), Some(&Route::new(NodeId(0), 0)));
    assert_eq!(table.get(NodeId(1)), Some(&Route::new(NodeId(1), 1)));
    assert_eq!(table.get(NodeId(3)), Some(&Route::new(NodeId(3), 1)));

    // Two equal-cost paths lead to #2; either is fine
    let to_two = table.get(NodeId(2)).unwrap();
    assert_eq!(to_two.distance, 2);
    assert!(to_two.next_hop == NodeId(1) || to_two.next_hop == NodeId(3));
}

/// Scenario A: the chosen next hop towards #2 actually gets there
#[test]
fn test_scenario_a_next_hop_is_consistent() {
    let mut sim = converged(4);
    let next_hop = sim.node(NodeId(0)).unwrap().table().next_hop(NodeId(2)).unwrap();

    let trace = sim.route(NodeId(0), NodeId(2), b"two".to_vec()).unwrap();
    assert_eq!(trace.path, vec![NodeId(0), next_hop, NodeId(2)]);
}

/// Scenario B: #0 sends "X" to #3 on a 5-ring via #4
#[test]
fn test_scenario_b_routed_message() {
    let (sim, trace) = scenarios::run_scenario_b().unwrap();

    assert_eq!(trace.path, vec![NodeId(0), NodeId(4), NodeId(3)]);
    assert_eq!(trace.hops(), 2);
    assert_eq!(trace.outcome, RouteOutcome::Delivered);

    let deliveries = sim.node(NodeId(3)).unwrap().delivered();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].origin, NodeId(0));
    assert_eq!(deliveries[0].via, NodeId(4));
    assert_eq!(deliveries[0].payload, b"X".to_vec());

    // Nobody else saw the payload as its destination
    for node in sim.nodes().iter().filter(|n| n.id() != NodeId(3)) {
        assert!(node.delivered().is_empty());
    }
}

/// Scenario C: merging a table identical to our own changes nothing
#[test]
fn test_scenario_c_identical_table() {
    let (sim, outcome) = scenarios::run_scenario_c().unwrap();

    assert_eq!(outcome, MergeOutcome::NoChange);

    let responses = sim
        .event_log
        .iter()
        .rev()
        .take_while(|logged| logged.round > sim.stats.convergence_round.unwrap_or(0))
        .filter(|logged| matches!(logged.event, NodeEvent::Advertised { .. }))
        .count();
    assert_eq!(responses, 0);
    assert_eq!(sim.node(NodeId(0)).unwrap().stats().tables_changed, 1);
}

/// Scenario C at a node that has only bootstrapped
#[test]
fn test_scenario_c_before_convergence() {
    let mut sim = Simulation::new(Ring::new(6), quiet()).unwrap();
    sim.step();

    let node = sim.node(NodeId(2)).unwrap();
    let own = node.table().clone();
    assert_eq!(node.merge_table(NodeId(3), &own), MergeOutcome::NoChange);
}

#[test]
fn test_rings_converge_to_ring_distances() {
    for size in 1..=16 {
        let sim = converged(size);
        assert_exact_tables(&sim);
    }
}

/// Every node keeps (self, 0) through the whole run
#[test]
fn test_self_entry_invariant() {
    let mut sim = Simulation::new(Ring::new(9), quiet()).unwrap();

    while !sim.is_converged() {
        sim.step();
        for node in sim.nodes() {
            assert_eq!(node.table().get(node.id()), Some(&Route::new(node.id(), 0)));
        }
    }
}

/// Distances only ever go down between successive rounds
#[test]
fn test_distances_never_increase() {
    let mut sim = Simulation::new(Ring::new(10), quiet()).unwrap();
    let mut previous: Vec<_> = sim.nodes().iter().map(|n| n.table().clone()).collect();

    while !sim.is_converged() {
        sim.step();
        for (node, before) in sim.nodes().iter().zip(&previous) {
            for (dest, route) in before {
                let now = node.table().distance(dest).unwrap();
                assert!(now <= route.distance, "{} -> {} grew", node.id(), dest);
            }
        }
        previous = sim.nodes().iter().map(|n| n.table().clone()).collect();
    }
}

/// Every delivered payload follows a shortest ring path
#[test]
fn test_delivery_follows_shortest_path() {
    let mut sim = converged(7);

    for from in sim.ring.nodes() {
        for to in sim.ring.nodes() {
            let trace = sim.route(from, to, vec![from.0 as u8, to.0 as u8]).unwrap();
            assert!(trace.is_delivered(), "{}", trace);
            assert!(sim.ring.is_shortest_path(&trace.path), "{}", trace);
        }
    }

    assert_eq!(sim.stats.messages_delivered, 49);
    assert_eq!(sim.stats.messages_dropped, 0);
}

/// A destination outside the ring is dropped at the origin with a diagnostic
#[test]
fn test_unknown_destination_is_dropped() {
    let mut sim = converged(5);

    let trace = sim.route(NodeId(1), NodeId(99), b"lost".to_vec()).unwrap();

    assert_eq!(
        trace.outcome,
        RouteOutcome::Dropped {
            at: NodeId(1),
            reason: DropReason::NoRoute
        }
    );
    assert_eq!(sim.stats.messages_dropped, 1);
    assert!(sim.nodes().iter().all(|n| n.delivered().is_empty()));

    // The ring keeps working afterwards
    assert!(sim.route(NodeId(1), NodeId(3), b"ok".to_vec()).unwrap().is_delivered());
}

/// A payload sent before tables are complete may be dropped but never misdelivered
#[test]
fn test_early_traffic_is_dropped_not_misdelivered() {
    let mut sim = Simulation::new(Ring::new(8), quiet()).unwrap();
    sim.step();

    sim.send_routed(NodeId(0), NodeId(4), b"early".to_vec()).unwrap();
    sim.run().unwrap();
    sim.deliver_pending().unwrap();

    assert_eq!(sim.stats.messages_dropped, 1);
    assert!(sim.nodes().iter().all(|n| n.delivered().is_empty()));
}

/// Scheduling order does not change the converged distances
#[test]
fn test_order_independence() {
    let baseline = converged(9);

    for seed in 0..5 {
        let mut sim = Simulation::new(Ring::new(9), SimConfig {
            shuffle: true,
            seed: Some(seed),
            ..quiet()
        })
        .unwrap();
        sim.run().unwrap();

        assert_exact_tables(&sim);
        for (a, b) in sim.nodes().iter().zip(baseline.nodes()) {
            for (dest, route) in a.table() {
                assert_eq!(Some(route.distance), b.table().distance(dest));
            }
        }
    }
}

/// The first-entry policy can stop a node that still misses a peer
#[test]
fn test_first_entry_policy_is_weaker() {
    let mut sim = Simulation::new(Ring::new(8), SimConfig {
        convergence: ConvergenceCheck::FirstEntry,
        max_rounds: 50,
        ..quiet()
    })
    .unwrap();

    // By round 3 #0 knows everything within three hops: seven entries, #4 missing
    sim.run_rounds(3);

    let node = sim.node(NodeId(0)).unwrap();
    assert!(node.is_stable());
    assert_eq!(node.table().len(), 7);
    assert!(!node.table().contains(NodeId(4)));
    assert!(!ConvergenceCheck::AllEntries.is_complete(node.table(), 8));
}

#[test]
fn test_traffic_scenario() {
    let sim = scenarios::run_traffic_scenario(6, 25, Some(7)).unwrap();

    assert_eq!(sim.stats.messages_originated, 25);
    assert_eq!(sim.stats.messages_delivered, 25);
    assert_eq!(sim.stats.messages_dropped, 0);
}

#[test]
fn test_route_scenario_reports_drop() {
    let trace = scenarios::run_route_scenario(4, NodeId(0), NodeId(4), "nowhere").unwrap();
    assert!(matches!(trace.outcome, RouteOutcome::Dropped { .. }));
}

#[tokio::test]
async fn test_async_matches_synchronous() {
    let ring = Ring::new(9);
    let sync = converged(9);

    let nodes = AsyncSimulation::new(ring, AsyncConfig::default())
        .unwrap()
        .run()
        .await
        .unwrap();

    for (a, b) in nodes.iter().zip(sync.nodes()) {
        assert_eq!(a.id(), b.id());
        for (dest, route) in a.table() {
            assert_eq!(Some(route.distance), b.table().distance(dest));
        }
        assert_eq!(a.table().len(), b.table().len());
    }
}

#[tokio::test]
async fn test_async_scenario_reports() {
    let nodes = scenarios::run_async_convergence_scenario(5, AsyncConfig::default())
        .await
        .unwrap();

    assert_eq!(nodes.len(), 5);
    assert!(nodes[0].report().starts_with("Node #0 has routing table: {#0: (#0, 0)"));
}
