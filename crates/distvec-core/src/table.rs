//! Routing table and merge outcome
//!
//! A [`RoutingTable`] maps every known destination to the neighbour a message
//! should be handed to and the number of hops it will take. The table is
//! owned by exactly one node and always contains that node's self entry
//! `(owner, 0)`; [`RoutingTable::insert`] refuses to touch it.
//!
//! Tables are plain owned values. Sending one in an advertisement clones it,
//! so a recipient never observes changes the sender makes afterwards.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::identity::NodeId;

/// Next hop and distance toward one destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    /// Neighbour to hand the message to
    pub next_hop: NodeId,
    /// Hop count to the destination
    pub distance: u32,
}

impl Route {
    /// Create new route
    pub fn new(next_hop: NodeId, distance: u32) -> Self {
        Self { next_hop, distance }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.next_hop, self.distance)
    }
}

/// Distance-vector routing table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    /// Node this table belongs to
    owner: NodeId,
    /// Routes indexed by destination
    routes: BTreeMap<NodeId, Route>,
}

impl RoutingTable {
    /// Create a table holding only the self entry `(owner, 0)`
    pub fn new(owner: NodeId) -> Self {
        let mut routes = BTreeMap::new();
        routes.insert(owner, Route::new(owner, 0));
        Self { owner, routes }
    }

    /// The node this table belongs to
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Insert or replace the route to a destination
    ///
    /// Returns `false` without modifying the table when `dest` is the owner.
    pub fn insert(&mut self, dest: NodeId, route: Route) -> bool {
        if dest == self.owner {
            return false;
        }
        self.routes.insert(dest, route);
        true
    }

    /// Get the route to a destination
    pub fn get(&self, dest: NodeId) -> Option<&Route> {
        self.routes.get(&dest)
    }

    /// Get the next hop toward a destination
    pub fn next_hop(&self, dest: NodeId) -> Option<NodeId> {
        self.get(dest).map(|route| route.next_hop)
    }

    /// Get the distance to a destination
    pub fn distance(&self, dest: NodeId) -> Option<u32> {
        self.get(dest).map(|route| route.distance)
    }

    /// Check whether a destination is known
    pub fn contains(&self, dest: NodeId) -> bool {
        self.routes.contains_key(&dest)
    }

    /// Number of entries, including the self entry
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// A table always holds its self entry, so this is never true
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of destinations other than the owner
    pub fn known_peers(&self) -> usize {
        self.routes.len() - 1
    }

    /// Iterate over `(destination, route)` in destination order
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.routes.iter())
    }

    /// All known destinations, owner included
    pub fn destinations(&self) -> Vec<NodeId> {
        self.routes.keys().copied().collect()
    }

    /// The largest distance in the table
    pub fn diameter(&self) -> u32 {
        self.routes
            .values()
            .map(|route| route.distance)
            .max()
            .unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a RoutingTable {
    type Item = (NodeId, &'a Route);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(destination, route)` pairs of a [`RoutingTable`]
#[derive(Debug, Clone)]
pub struct Iter<'a>(btree_map::Iter<'a, NodeId, Route>);

impl<'a> Iterator for Iter<'a> {
    type Item = (NodeId, &'a Route);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(dest, route)| (*dest, route))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl Display for RoutingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (dest, route)) in self.routes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", dest, route)?;
        }
        write!(f, "}}")
    }
}

/// Result of merging an advertised table into a local one
///
/// `NoChange` is a control-flow signal, not an empty table: it tells the
/// caller there is nothing to install and nothing to re-advertise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// At least one route was added or improved
    Changed(RoutingTable),
    /// Every advertised route was already known at an equal or better distance
    NoChange,
}

impl MergeOutcome {
    /// Check if the merge changed anything
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    /// Get the merged table, if any
    pub fn into_table(self) -> Option<RoutingTable> {
        match self {
            Self::Changed(table) => Some(table),
            Self::NoChange => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> NodeId {
        NodeId(n)
    }

    #[test]
    fn test_new_table_has_self_entry() {
        let table = RoutingTable::new(id(2));

        assert_eq!(table.len(), 1);
        assert_eq!(table.known_peers(), 0);
        assert_eq!(table.get(id(2)), Some(&Route::new(id(2), 0)));
        assert!(!table.is_empty());
    }

    #[test]
    fn test_self_entry_cannot_be_overwritten() {
        let mut table = RoutingTable::new(id(0));

        assert!(!table.insert(id(0), Route::new(id(1), 3)));
        assert_eq!(table.get(id(0)), Some(&Route::new(id(0), 0)));
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = RoutingTable::new(id(0));
        assert!(table.insert(id(2), Route::new(id(1), 2)));

        assert_eq!(table.next_hop(id(2)), Some(id(1)));
        assert_eq!(table.distance(id(2)), Some(2));
        assert!(table.next_hop(id(3)).is_none());
        assert_eq!(table.diameter(), 2);
    }

    #[test]
    fn test_borrowed_table_iterates_by_value_ids() {
        let mut table = RoutingTable::new(id(1));
        table.insert(id(0), Route::new(id(0), 1));
        table.insert(id(2), Route::new(id(2), 1));

        let mut seen = Vec::new();
        for (dest, route) in &table {
            if dest == table.owner() {
                assert_eq!(route.distance, 0);
            }
            seen.push(dest);
        }

        assert_eq!(seen, vec![id(0), id(1), id(2)]);
        assert_eq!(table.iter().len(), 3);
        assert!((&table).into_iter().eq(table.iter()));
    }

    #[test]
    fn test_clone_is_a_snapshot() {
        let mut live = RoutingTable::new(id(0));
        live.insert(id(1), Route::new(id(1), 1));

        let snapshot = live.clone();
        live.insert(id(2), Route::new(id(1), 2));

        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.contains(id(2)));
    }

    #[test]
    fn test_display() {
        let mut table = RoutingTable::new(id(0));
        table.insert(id(1), Route::new(id(1), 1));

        assert_eq!(table.to_string(), "{#0: (#0, 0), #1: (#1, 1)}");
    }

    #[test]
    fn test_merge_outcome() {
        let table = RoutingTable::new(id(0));

        assert!(MergeOutcome::Changed(table.clone()).is_changed());
        assert!(!MergeOutcome::NoChange.is_changed());
        assert_eq!(MergeOutcome::Changed(table.clone()).into_table(), Some(table));
        assert_eq!(MergeOutcome::NoChange.into_table(), None);
    }

    #[test]
    fn test_table_serialization() {
        let mut table = RoutingTable::new(id(3));
        table.insert(id(4), Route::new(id(4), 1));

        let serialized = postcard::to_allocvec(&table).unwrap();
        let deserialized: RoutingTable = postcard::from_bytes(&serialized).unwrap();

        assert_eq!(deserialized, table);
    }
}
