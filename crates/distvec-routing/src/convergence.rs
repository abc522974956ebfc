//! Convergence detection
//!
//! A node leaves its advertisement phase once its table looks complete: it
//! knows every other node and no route is longer than half the ring.
//!
//! Two policies exist. [`ConvergenceCheck::AllEntries`] requires exactly
//! `N - 1` known peers and bounds every entry. [`ConvergenceCheck::FirstEntry`]
//! keeps the older, looser rule (at least `N - 1` entries counting the self
//! entry, and only the route to the left neighbour bounded) so the two can be
//! compared; it can stop a node while one peer is still unknown.
//!
//! The left neighbour `(i - 1) mod N` is the first entry a node ever learns,
//! so under `FirstEntry` a long detour to any other peer goes unnoticed.

use distvec_core::{NodeId, RoutingTable};

/// Policy deciding when a routing table is complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConvergenceCheck {
    /// Every other node known, every distance within `N / 2`
    #[default]
    AllEntries,
    /// At least `N - 1` entries, left neighbour within `N / 2`
    FirstEntry,
}

impl ConvergenceCheck {
    /// Check whether `table` is complete for a network of `total_nodes`
    pub fn is_complete(&self, table: &RoutingTable, total_nodes: usize) -> bool {
        let others = total_nodes.saturating_sub(1);
        match self {
            Self::AllEntries => {
                table.known_peers() == others
                    && table
                        .iter()
                        .all(|(_, route)| within_bound(route.distance, total_nodes))
            }
            Self::FirstEntry => {
                if table.len() < others {
                    return false;
                }
                table
                    .get(left_of(table.owner(), total_nodes))
                    .is_none_or(|route| within_bound(route.distance, total_nodes))
            }
        }
    }
}

fn left_of(owner: NodeId, total_nodes: usize) -> NodeId {
    match u32::try_from(total_nodes) {
        Ok(n) if n > 0 => NodeId((owner.0 % n).checked_sub(1).unwrap_or(n - 1)),
        _ => owner,
    }
}

/// `distance <= total_nodes / 2` without integer truncation
fn within_bound(distance: u32, total_nodes: usize) -> bool {
    2 * distance as usize <= total_nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use distvec_core::{NodeId, Route};

    fn table(owner: u32, entries: &[(u32, u32, u32)]) -> RoutingTable {
        let mut table = RoutingTable::new(NodeId(owner));
        for &(dest, next_hop, distance) in entries {
            table.insert(NodeId(dest), Route::new(NodeId(next_hop), distance));
        }
        table
    }

    #[test]
    fn test_bound_uses_exact_half() {
        // N = 5: distance 2 is fine, 3 is not
        assert!(within_bound(2, 5));
        assert!(!within_bound(3, 5));
        // N = 4: distance 2 is exactly half
        assert!(within_bound(2, 4));
    }

    #[test]
    fn test_all_entries_complete_ring() {
        let t = table(0, &[(1, 1, 1), (2, 1, 2), (3, 3, 1)]);
        assert!(ConvergenceCheck::AllEntries.is_complete(&t, 4));
    }

    #[test]
    fn test_all_entries_requires_every_peer() {
        let t = table(0, &[(1, 1, 1), (3, 3, 1)]);
        assert!(!ConvergenceCheck::AllEntries.is_complete(&t, 4));
    }

    #[test]
    fn test_all_entries_rejects_long_route() {
        // Route to #1 the long way round a 5-ring
        let t = table(0, &[(1, 4, 4), (2, 1, 2), (3, 4, 2), (4, 4, 1)]);
        assert!(!ConvergenceCheck::AllEntries.is_complete(&t, 5));
    }

    #[test]
    fn test_first_entry_accepts_missing_peer() {
        // 6-ring, #3 unknown: four peers plus self is N - 1 entries
        let t = table(0, &[(1, 1, 1), (2, 1, 2), (4, 5, 2), (5, 5, 1)]);

        assert!(ConvergenceCheck::FirstEntry.is_complete(&t, 6));
        assert!(!ConvergenceCheck::AllEntries.is_complete(&t, 6));
    }

    #[test]
    fn test_first_entry_ignores_later_entries() {
        let t = table(0, &[(1, 4, 4), (2, 1, 2), (3, 4, 2), (4, 4, 1)]);
        assert!(ConvergenceCheck::FirstEntry.is_complete(&t, 5));
    }

    #[test]
    fn test_first_entry_bounds_left_neighbour_not_lowest_id() {
        // 6-ring, node 2 learned #0 the long way round via #3
        let t = table(2, &[(0, 3, 4), (1, 1, 1), (3, 3, 1), (4, 3, 2)]);

        assert!(ConvergenceCheck::FirstEntry.is_complete(&t, 6));
        assert!(!ConvergenceCheck::AllEntries.is_complete(&t, 6));
    }

    #[test]
    fn test_first_entry_rejects_long_left_route() {
        // 5-ring, #4 is the left neighbour of #0 but only known via #1
        let t = table(0, &[(1, 1, 1), (2, 1, 2), (3, 1, 3), (4, 1, 4)]);
        assert!(!ConvergenceCheck::FirstEntry.is_complete(&t, 5));
    }

    #[test]
    fn test_left_of_wraps() {
        assert_eq!(left_of(NodeId(0), 6), NodeId(5));
        assert_eq!(left_of(NodeId(2), 6), NodeId(1));
        assert_eq!(left_of(NodeId(0), 1), NodeId(0));
        assert_eq!(left_of(NodeId(3), 0), NodeId(3));
    }

    #[test]
    fn test_single_node_is_complete() {
        let t = table(0, &[]);
        assert!(ConvergenceCheck::AllEntries.is_complete(&t, 1));
        assert!(ConvergenceCheck::FirstEntry.is_complete(&t, 1));
    }
}
