//! Node: the neutral splice point.

use hf_graph::{Port, PortOwner};

/// Passthrough vertex with one inbound and one outbound slot.
///
/// Exposing only these two ports is what keeps a node at one upstream and one
/// downstream connection; the registry itself does not know about nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
}

impl Node {
    pub const INLET: Port = Port::new(1);
    pub const OUTLET: Port = Port::new(2);
    pub const FIELDS: usize = 3;

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl PortOwner for Node {
    fn inlet_port(&self) -> Option<Port> {
        Some(Self::INLET)
    }

    fn outlet_port(&self) -> Option<Port> {
        Some(Self::OUTLET)
    }
}
