//! Branch port algebra for variable-arity owners.
//!
//! A splitter fans one inlet out to N outlet branches, a mixer gathers N
//! inlet branches into one outlet, and a zone port list is a bare run of
//! branch ports. In every case branch `i` lives on port `first_port + i`, and
//! occupied branches always form the prefix `0..N`.

use hf_core::Handle;

use crate::error::{GraphError, GraphResult};
use crate::port::{Connection, Endpoint, Port};
use crate::registry::ConnectionRegistry;

/// Which way flow crosses the branch ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchSide {
    /// Branch ports are edge targets (mixer inlets).
    Inlet,
    /// Branch ports are edge sources (splitter outlets).
    Outlet,
}

/// Where an owner's branch ports start and which way they face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchLayout {
    pub side: BranchSide,
    /// Port of branch 0. Every port at or above it is a branch port.
    pub first_port: Port,
}

impl BranchLayout {
    pub fn new(side: BranchSide, first_port: Port) -> Self {
        Self { side, first_port }
    }

    /// Port number for branch `index`.
    pub fn port(&self, index: usize) -> Port {
        self.first_port.offset(index)
    }

    /// Branch index of `port`, if it is a branch port.
    pub fn index_of(&self, port: Port) -> Option<usize> {
        port.get()
            .checked_sub(self.first_port.get())
            .map(|i| i as usize)
    }
}

/// Outcome of removing one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchCompaction {
    /// Edge of the removed branch.
    pub removed: Connection,
    /// Surviving edges that moved down one slot, as (before, after).
    pub moved: Vec<(Connection, Connection)>,
}

impl ConnectionRegistry {
    /// Number of occupied branches, counting up from branch 0.
    pub fn branch_count(&self, object: Handle, layout: BranchLayout) -> usize {
        (0..)
            .take_while(|&i| self.is_connected(object, layout.port(i)))
            .count()
    }

    /// Ports of the occupied branches, in branch order.
    pub fn branch_ports(&self, object: Handle, layout: BranchLayout) -> Vec<Port> {
        (0..self.branch_count(object, layout))
            .map(|i| layout.port(i))
            .collect()
    }

    /// First branch port with nothing connected; the port a new branch goes on.
    pub fn next_branch_port(&self, object: Handle, layout: BranchLayout) -> Port {
        layout.port(self.branch_count(object, layout))
    }

    /// Object connected on branch `index`.
    pub fn branch_object(&self, object: Handle, layout: BranchLayout, index: usize) -> Option<Handle> {
        self.connected_object(object, layout.port(index))
    }

    /// Objects connected on every branch, in branch order.
    pub fn branch_objects(&self, object: Handle, layout: BranchLayout) -> Vec<Handle> {
        self.branch_ports(object, layout)
            .into_iter()
            .filter_map(|port| self.connected_object(object, port))
            .collect()
    }

    /// Branch index whose port connects directly to `other`.
    pub fn branch_index_for(
        &self,
        object: Handle,
        layout: BranchLayout,
        other: Handle,
    ) -> Option<usize> {
        self.branch_objects(object, layout)
            .iter()
            .position(|&h| h == other)
    }

    /// Disconnect branch `index` and shift every later branch down one slot so
    /// indices stay contiguous.
    ///
    /// Out-of-range indices are rejected before anything is disconnected.
    pub fn remove_port_for_branch(
        &mut self,
        object: Handle,
        layout: BranchLayout,
        index: usize,
    ) -> GraphResult<BranchCompaction> {
        let count = self.branch_count(object, layout);
        if index >= count {
            return Err(GraphError::BranchOutOfRange {
                object,
                index,
                count,
            });
        }

        let removed = self
            .disconnect(object, layout.port(index))
            .ok_or(GraphError::NotConnected {
                endpoint: Endpoint::new(object, layout.port(index)),
            })?;

        // Each move lands in the slot the previous step just vacated
        let mut moved = Vec::with_capacity(count - index - 1);
        for i in index + 1..count {
            let from = Endpoint::new(object, layout.port(i));
            let to = Endpoint::new(object, layout.port(i - 1));
            let before = self
                .connection_at(from)
                .ok_or(GraphError::NotConnected { endpoint: from })?;
            let after = self.move_endpoint(from, to)?;
            moved.push((before, after));
        }

        tracing::trace!(%object, index, shifted = moved.len(), "remove branch port");
        Ok(BranchCompaction { removed, moved })
    }

    /// Check that no branch port past the occupied prefix is connected.
    pub fn check_branch_contiguity(&self, object: Handle, layout: BranchLayout) -> GraphResult<()> {
        let count = self.branch_count(object, layout);
        let stray = self
            .connections_of(object)
            .into_iter()
            .map(|c| if c.source.object == object { c.source.port } else { c.target.port })
            .filter_map(|port| layout.index_of(port))
            .find(|&i| i >= count);
        match stray {
            Some(i) => Err(GraphError::Inconsistent {
                what: format!(
                    "object {} has branch {} connected past a gap at {}",
                    object, i, count
                ),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPLITTER: BranchLayout = BranchLayout {
        side: BranchSide::Outlet,
        first_port: Port::new(2),
    };

    fn splitter_with(branches: usize) -> (ConnectionRegistry, Handle, Vec<Handle>) {
        let mut registry = ConnectionRegistry::new();
        let splitter = Handle::fresh();
        let nodes: Vec<Handle> = (0..branches).map(|_| Handle::fresh()).collect();
        for &node in &nodes {
            let port = registry.next_branch_port(splitter, SPLITTER);
            registry
                .connect(Endpoint::new(splitter, port), Endpoint::new(node, Port::new(1)))
                .unwrap();
        }
        (registry, splitter, nodes)
    }

    #[test]
    fn next_port_grows_monotonically() {
        let (registry, splitter, nodes) = splitter_with(3);
        assert_eq!(registry.branch_count(splitter, SPLITTER), 3);
        assert_eq!(registry.next_branch_port(splitter, SPLITTER), Port::new(5));
        assert_eq!(registry.branch_objects(splitter, SPLITTER), nodes);
        assert_eq!(registry.branch_index_for(splitter, SPLITTER, nodes[2]), Some(2));
        assert_eq!(registry.branch_index_for(splitter, SPLITTER, Handle::fresh()), None);
    }

    #[test]
    fn remove_first_branch_shifts_the_rest() {
        let (mut registry, splitter, nodes) = splitter_with(3);
        let compaction = registry.remove_port_for_branch(splitter, SPLITTER, 0).unwrap();

        assert_eq!(compaction.removed.target.object, nodes[0]);
        assert_eq!(compaction.moved.len(), 2);
        assert_eq!(registry.branch_objects(splitter, SPLITTER), vec![nodes[1], nodes[2]]);
        assert_eq!(registry.next_branch_port(splitter, SPLITTER), Port::new(4));
        registry.check_branch_contiguity(splitter, SPLITTER).unwrap();
        registry.check_invariants().unwrap();
    }

    #[test]
    fn remove_last_branch_moves_nothing() {
        let (mut registry, splitter, nodes) = splitter_with(2);
        let compaction = registry.remove_port_for_branch(splitter, SPLITTER, 1).unwrap();
        assert!(compaction.moved.is_empty());
        assert_eq!(registry.branch_objects(splitter, SPLITTER), vec![nodes[0]]);
    }

    #[test]
    fn out_of_range_branch_is_rejected() {
        let (mut registry, splitter, _) = splitter_with(2);
        let before = registry.clone();
        assert_eq!(
            registry.remove_port_for_branch(splitter, SPLITTER, 2),
            Err(GraphError::BranchOutOfRange {
                object: splitter,
                index: 2,
                count: 2
            })
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn gap_is_reported() {
        let (mut registry, splitter, _) = splitter_with(1);
        let stray = Handle::fresh();
        registry
            .connect(
                Endpoint::new(splitter, SPLITTER.port(3)),
                Endpoint::new(stray, Port::new(1)),
            )
            .unwrap();
        assert!(registry.check_branch_contiguity(splitter, SPLITTER).is_err());
    }

    #[test]
    fn index_of_ignores_fixed_ports() {
        assert_eq!(SPLITTER.index_of(Port::new(1)), None);
        assert_eq!(SPLITTER.index_of(Port::new(2)), Some(0));
        assert_eq!(SPLITTER.index_of(Port::new(6)), Some(4));
    }
}
