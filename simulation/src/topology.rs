//! Ring topology
//!
//! Nodes `0..N` arranged in a cycle, each connected only to its predecessor
//! and successor:
//!
//! ```text
//! #0 - #1 - #2 - ... - #N-1 - #0
//! ```

use distvec_core::NodeId;
use distvec_routing::ring_neighbors;

/// A ring of `size` nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ring {
    size: usize,
}

impl Ring {
    /// Create a ring with the given number of nodes
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Number of nodes
    pub fn size(&self) -> usize {
        self.size
    }

    /// All node ids in order
    pub fn nodes(&self) -> Vec<NodeId> {
        NodeId::range(self.size)
    }

    /// Check if a node belongs to the ring
    pub fn contains(&self, id: NodeId) -> bool {
        id.is_within(self.size)
    }

    /// Predecessor of `id`
    ///
    /// An empty ring has no other nodes, so `id` is returned unchanged.
    pub fn left(&self, id: NodeId) -> NodeId {
        match self.modulus() {
            Some(n) => NodeId((id.0 % n).checked_sub(1).unwrap_or(n - 1)),
            None => id,
        }
    }

    /// Successor of `id`
    pub fn right(&self, id: NodeId) -> NodeId {
        match self.modulus() {
            Some(n) => NodeId((id.0 % n + 1) % n),
            None => id,
        }
    }

    fn modulus(&self) -> Option<u32> {
        u32::try_from(self.size).ok().filter(|n| *n > 0)
    }

    /// Distinct direct neighbours of `id`
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        ring_neighbors(id, self.size)
    }

    /// Check if two nodes are directly connected
    pub fn are_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Hop count of the shortest path between two nodes
    ///
    /// Ids outside the ring are wrapped modulo its size.
    pub fn distance(&self, a: NodeId, b: NodeId) -> u32 {
        if self.size == 0 {
            return 0;
        }
        let d = (a.index() % self.size).abs_diff(b.index() % self.size);
        d.min(self.size - d) as u32
    }

    /// Check that `path` walks neighbour to neighbour along a shortest route
    pub fn is_shortest_path(&self, path: &[NodeId]) -> bool {
        let (Some(first), Some(last)) = (path.first(), path.last()) else {
            return false;
        };
        if !path.iter().all(|id| self.contains(*id)) {
            return false;
        }
        let adjacent = path.windows(2).all(|w| self.are_connected(w[0], w[1]));
        adjacent && path.len() - 1 == self.distance(*first, *last) as usize
    }

    /// Number of distinct links
    pub fn edge_count(&self) -> usize {
        match self.size {
            0 | 1 => 0,
            2 => 1,
            n => n,
        }
    }

    /// Print a simple ASCII visualization of the ring
    pub fn visualize(&self) -> String {
        let mut output = String::new();
        output.push_str("Ring Topology:\n");
        output.push_str(&format!("  Nodes: {}\n", self.size));
        output.push_str(&format!("  Edges: {}\n\n", self.edge_count()));

        for id in self.nodes() {
            let neighbor_str: Vec<String> = self.neighbors(id).iter().map(|n| n.to_string()).collect();
            output.push_str(&format!("  {} -> [{}]\n", id, neighbor_str.join(", ")));
        }
        output
    }
}
