//! The connection registry.

use std::collections::BTreeMap;

use hf_core::Handle;

use crate::error::{GraphError, GraphResult};
use crate::port::{Connection, Endpoint, Port};

/// Directed edges between (object, port) endpoints.
///
/// The registry is a partial bijection: an endpoint takes part in at most one
/// edge, as source or as target, and never both. `connect`, `disconnect` and
/// `move_endpoint` are the only mutators; each either applies completely or
/// returns an error without touching either map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionRegistry {
    /// source -> target
    forward: BTreeMap<Endpoint, Endpoint>,
    /// target -> source
    backward: BTreeMap<Endpoint, Endpoint>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Install the edge `source -> target`.
    pub fn connect(&mut self, source: Endpoint, target: Endpoint) -> GraphResult<Connection> {
        if source.object == target.object {
            return Err(GraphError::SelfLoop {
                object: source.object,
            });
        }
        if self.is_occupied(source) {
            return Err(GraphError::SourceOccupied { endpoint: source });
        }
        if self.is_occupied(target) {
            return Err(GraphError::TargetOccupied { endpoint: target });
        }
        self.forward.insert(source, target);
        self.backward.insert(target, source);
        tracing::trace!(%source, %target, "connect");
        Ok(Connection { source, target })
    }

    /// Remove the edge touching `object`/`port`, in either direction.
    ///
    /// Idempotent: returns the removed edge, or `None` when there was none.
    pub fn disconnect(&mut self, object: Handle, port: Port) -> Option<Connection> {
        let endpoint = Endpoint::new(object, port);
        let connection = self.connection_at(endpoint)?;
        self.forward.remove(&connection.source);
        self.backward.remove(&connection.target);
        tracing::trace!(%connection, "disconnect");
        Some(connection)
    }

    /// Remove every edge touching `object`.
    pub fn disconnect_object(&mut self, object: Handle) -> Vec<Connection> {
        let connections = self.connections_of(object);
        for connection in &connections {
            self.forward.remove(&connection.source);
            self.backward.remove(&connection.target);
        }
        connections
    }

    /// Re-point the edge at `from` so that it uses `to` instead.
    ///
    /// Used by branch compaction; the far end of the edge is unchanged.
    pub fn move_endpoint(&mut self, from: Endpoint, to: Endpoint) -> GraphResult<Connection> {
        let old = self
            .connection_at(from)
            .ok_or(GraphError::NotConnected { endpoint: from })?;
        if self.is_occupied(to) {
            return Err(if old.source == from {
                GraphError::SourceOccupied { endpoint: to }
            } else {
                GraphError::TargetOccupied { endpoint: to }
            });
        }
        let new = if old.source == from {
            Connection {
                source: to,
                target: old.target,
            }
        } else {
            Connection {
                source: old.source,
                target: to,
            }
        };
        if new.source.object == new.target.object {
            return Err(GraphError::SelfLoop {
                object: new.source.object,
            });
        }
        self.forward.remove(&old.source);
        self.backward.remove(&old.target);
        self.forward.insert(new.source, new.target);
        self.backward.insert(new.target, new.source);
        tracing::trace!(%old, %new, "move endpoint");
        Ok(new)
    }

    /// Edge touching `endpoint`, in either direction.
    pub fn connection_at(&self, endpoint: Endpoint) -> Option<Connection> {
        if let Some(&target) = self.forward.get(&endpoint) {
            return Some(Connection {
                source: endpoint,
                target,
            });
        }
        self.backward.get(&endpoint).map(|&source| Connection {
            source,
            target: endpoint,
        })
    }

    pub fn is_occupied(&self, endpoint: Endpoint) -> bool {
        self.forward.contains_key(&endpoint) || self.backward.contains_key(&endpoint)
    }

    pub fn is_connected(&self, object: Handle, port: Port) -> bool {
        self.is_occupied(Endpoint::new(object, port))
    }

    /// Object on the other end of `object`/`port`.
    pub fn connected_object(&self, object: Handle, port: Port) -> Option<Handle> {
        self.peer(Endpoint::new(object, port)).map(|e| e.object)
    }

    /// Port on the other end of `object`/`port`.
    pub fn connected_port(&self, object: Handle, port: Port) -> Option<Port> {
        self.peer(Endpoint::new(object, port)).map(|e| e.port)
    }

    /// Endpoint on the other end of the edge touching `endpoint`.
    pub fn peer(&self, endpoint: Endpoint) -> Option<Endpoint> {
        self.forward
            .get(&endpoint)
            .or_else(|| self.backward.get(&endpoint))
            .copied()
    }

    /// Source feeding `target`.
    pub fn upstream(&self, target: Endpoint) -> Option<Endpoint> {
        self.backward.get(&target).copied()
    }

    /// Target fed by `source`.
    pub fn downstream(&self, source: Endpoint) -> Option<Endpoint> {
        self.forward.get(&source).copied()
    }

    /// All edges, ordered by source endpoint.
    pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
        self.forward
            .iter()
            .map(|(&source, &target)| Connection { source, target })
    }

    /// Edges touching `object`, outgoing first, each group ordered by port.
    pub fn connections_of(&self, object: Handle) -> Vec<Connection> {
        let lo = Endpoint::new(object, Port::new(0));
        let hi = Endpoint::new(object, Port::new(u32::MAX));
        let outgoing = self
            .forward
            .range(lo..=hi)
            .map(|(&source, &target)| Connection { source, target });
        let incoming = self
            .backward
            .range(lo..=hi)
            .map(|(&target, &source)| Connection { source, target });
        outgoing.chain(incoming).collect()
    }

    /// Verify the bijection: both maps mirror each other, no endpoint is used
    /// twice and no edge is a self-loop.
    pub fn check_invariants(&self) -> GraphResult<()> {
        if self.forward.len() != self.backward.len() {
            return Err(GraphError::Inconsistent {
                what: format!(
                    "{} forward entries but {} backward entries",
                    self.forward.len(),
                    self.backward.len()
                ),
            });
        }
        for (source, target) in &self.forward {
            if self.backward.get(target) != Some(source) {
                return Err(GraphError::Inconsistent {
                    what: format!("edge {} -> {} has no mirror", source, target),
                });
            }
            if self.backward.contains_key(source) {
                return Err(GraphError::Inconsistent {
                    what: format!("endpoint {} is both a source and a target", source),
                });
            }
            if source.object == target.object {
                return Err(GraphError::SelfLoop {
                    object: source.object,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(object: Handle, port: u32) -> Endpoint {
        Endpoint::new(object, Port::new(port))
    }

    #[test]
    fn connect_and_lookup_both_directions() {
        let mut registry = ConnectionRegistry::new();
        let fan = Handle::fresh();
        let node = Handle::fresh();

        let conn = registry.connect(ep(fan, 2), ep(node, 1)).unwrap();
        assert_eq!(conn.source, ep(fan, 2));
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.connected_object(fan, Port::new(2)), Some(node));
        assert_eq!(registry.connected_object(node, Port::new(1)), Some(fan));
        assert_eq!(registry.connected_port(node, Port::new(1)), Some(Port::new(2)));
        assert_eq!(registry.downstream(ep(fan, 2)), Some(ep(node, 1)));
        assert_eq!(registry.upstream(ep(node, 1)), Some(ep(fan, 2)));
        assert_eq!(registry.upstream(ep(fan, 2)), None);
        registry.check_invariants().unwrap();
    }

    #[test]
    fn occupied_endpoints_are_rejected_without_mutation() {
        let mut registry = ConnectionRegistry::new();
        let a = Handle::fresh();
        let b = Handle::fresh();
        let c = Handle::fresh();
        registry.connect(ep(a, 2), ep(b, 1)).unwrap();
        let before = registry.clone();

        assert_eq!(
            registry.connect(ep(a, 2), ep(c, 1)),
            Err(GraphError::SourceOccupied { endpoint: ep(a, 2) })
        );
        assert_eq!(
            registry.connect(ep(c, 2), ep(b, 1)),
            Err(GraphError::TargetOccupied { endpoint: ep(b, 1) })
        );
        // A port used as a target cannot also become a source
        assert_eq!(
            registry.connect(ep(b, 1), ep(c, 1)),
            Err(GraphError::SourceOccupied { endpoint: ep(b, 1) })
        );
        assert_eq!(
            registry.connect(ep(c, 2), ep(c, 1)),
            Err(GraphError::SelfLoop { object: c })
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut registry = ConnectionRegistry::new();
        let a = Handle::fresh();
        let b = Handle::fresh();
        registry.connect(ep(a, 2), ep(b, 1)).unwrap();

        let removed = registry.disconnect(b, Port::new(1));
        assert_eq!(
            removed,
            Some(Connection {
                source: ep(a, 2),
                target: ep(b, 1)
            })
        );
        assert!(registry.is_empty());
        assert_eq!(registry.disconnect(b, Port::new(1)), None);
        assert_eq!(registry.disconnect(a, Port::new(2)), None);
        registry.check_invariants().unwrap();
    }

    #[test]
    fn disconnect_object_removes_every_edge() {
        let mut registry = ConnectionRegistry::new();
        let up = Handle::fresh();
        let fan = Handle::fresh();
        let down = Handle::fresh();
        registry.connect(ep(up, 2), ep(fan, 1)).unwrap();
        registry.connect(ep(fan, 2), ep(down, 1)).unwrap();

        assert_eq!(registry.connections_of(fan).len(), 2);
        let removed = registry.disconnect_object(fan);
        assert_eq!(removed.len(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn move_endpoint_keeps_far_side() {
        let mut registry = ConnectionRegistry::new();
        let splitter = Handle::fresh();
        let node = Handle::fresh();
        registry.connect(ep(splitter, 3), ep(node, 1)).unwrap();

        let moved = registry.move_endpoint(ep(splitter, 3), ep(splitter, 2)).unwrap();
        assert_eq!(moved.source, ep(splitter, 2));
        assert_eq!(moved.target, ep(node, 1));
        assert!(!registry.is_connected(splitter, Port::new(3)));
        assert_eq!(registry.connected_object(node, Port::new(1)), Some(splitter));
        registry.check_invariants().unwrap();

        assert_eq!(
            registry.move_endpoint(ep(splitter, 7), ep(splitter, 8)),
            Err(GraphError::NotConnected {
                endpoint: ep(splitter, 7)
            })
        );
    }

    #[test]
    fn connections_of_is_scoped_to_object() {
        let mut registry = ConnectionRegistry::new();
        let a = Handle::fresh();
        let b = Handle::fresh();
        let c = Handle::fresh();
        registry.connect(ep(a, 2), ep(b, 1)).unwrap();
        registry.connect(ep(b, 2), ep(c, 1)).unwrap();

        assert_eq!(registry.connections_of(a).len(), 1);
        assert_eq!(registry.connections_of(b).len(), 2);
        assert_eq!(registry.connections().count(), 2);
    }
}
