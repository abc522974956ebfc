//! Asynchronous ring simulation
//!
//! Every node runs as its own tokio task over a [`ChannelMedium`] endpoint,
//! so interleaving is left to the runtime. Nodes yield on every poll miss
//! and the whole run is bounded by a wall-clock timeout.

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use distvec_core::{ChannelMedium, ChannelNetwork};
use distvec_routing::{ConvergenceCheck, RoutingNode};

use crate::error::SimulationError;
use crate::topology::Ring;

/// Configuration for an asynchronous run
#[derive(Debug, Clone)]
pub struct AsyncConfig {
    /// Abort the run if the ring has not converged by then
    pub timeout: Duration,
    /// Completeness policy handed to every node
    pub convergence: ConvergenceCheck,
}

impl Default for AsyncConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            convergence: ConvergenceCheck::default(),
        }
    }
}

/// A ring of nodes running concurrently on the tokio runtime
#[derive(Debug, Clone)]
pub struct AsyncSimulation {
    pub ring: Ring,
    pub config: AsyncConfig,
}

impl AsyncSimulation {
    pub fn new(ring: Ring, config: AsyncConfig) -> Result<Self, SimulationError> {
        let size = ring.size();
        if size == 0 || u32::try_from(size).is_err() {
            return Err(SimulationError::InvalidNodeCount(size));
        }
        Ok(Self { ring, config })
    }

    /// Spawn one task per node and wait until every node is stable
    ///
    /// Returns the final nodes in id order.
    pub async fn run(&self) -> Result<Vec<RoutingNode>, SimulationError> {
        let size = self.ring.size();
        let network = ChannelNetwork::new();
        // Register every endpoint before any node starts sending
        let media = network.endpoints(size);

        info!(nodes = size, "Spawning node tasks");
        let start = Instant::now();

        let handles: Vec<JoinHandle<(RoutingNode, ChannelMedium)>> = self
            .ring
            .nodes()
            .into_iter()
            .zip(media)
            .map(|(id, mut medium)| {
                let mut node = RoutingNode::new(id, size).with_convergence(self.config.convergence);
                tokio::spawn(async move {
                    node.run(&mut medium).await;
                    debug!(node = %node.id(), "Task finished");
                    // Hand the endpoint back so neighbours can still reach this inbox
                    (node, medium)
                })
            })
            .collect();
        let aborts: Vec<_> = handles.iter().map(JoinHandle::abort_handle).collect();

        let joined = tokio::time::timeout(self.config.timeout, async {
            let mut finished = Vec::with_capacity(handles.len());
            for handle in handles {
                finished.push(handle.await);
            }
            finished
        })
        .await;

        let Ok(joined) = joined else {
            warn!(timeout = ?self.config.timeout, "Ring did not converge in time");
            for abort in aborts {
                abort.abort();
            }
            return Err(SimulationError::Timeout);
        };

        let mut nodes = Vec::with_capacity(size);
        for result in joined {
            let (node, _medium) = result.map_err(|e| SimulationError::TaskFailed(e.to_string()))?;
            nodes.push(node);
        }

        info!("Asynchronous ring of {} converged in {:?}", size, start.elapsed());
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distvec_core::NodeId;

    #[tokio::test]
    async fn test_async_ring_converges() {
        let ring = Ring::new(6);
        let sim = AsyncSimulation::new(ring, AsyncConfig::default()).unwrap();

        let nodes = sim.run().await.unwrap();

        assert_eq!(nodes.len(), 6);
        for node in &nodes {
            assert!(node.is_stable());
            for (dest, route) in node.table() {
                assert_eq!(route.distance, ring.distance(node.id(), dest));
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_async_ring_multi_thread() {
        let ring = Ring::new(11);
        let nodes = AsyncSimulation::new(ring, AsyncConfig::default())
            .unwrap()
            .run()
            .await
            .unwrap();

        assert!(nodes.iter().all(|n| n.table().known_peers() == 10));
        assert_eq!(nodes[0].table().distance(NodeId(5)), Some(5));
    }

    #[test]
    fn test_single_node_from_blocking_context() {
        let sim = AsyncSimulation::new(Ring::new(1), AsyncConfig::default()).unwrap();

        let nodes = tokio_test::block_on(sim.run()).unwrap();

        assert_eq!(nodes[0].report(), "Node #0 has routing table: {#0: (#0, 0)}");
    }

    #[test]
    fn test_invalid_node_count() {
        assert!(matches!(
            AsyncSimulation::new(Ring::new(0), AsyncConfig::default()),
            Err(SimulationError::InvalidNodeCount(0))
        ));
    }
}
