//! Port, endpoint and connection value types, and the `PortOwner` capability.

use core::fmt;

use hf_core::Handle;

use crate::branch::BranchLayout;

/// Integer label of one connection slot on an object.
///
/// A port number is also the index of the record field that stores the
/// pointer for that connection.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Port(u32);

impl Port {
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Field index backing this port.
    pub fn field(self) -> usize {
        self.0 as usize
    }

    /// Port `offset` slots after this one.
    pub fn offset(self, offset: usize) -> Self {
        let offset = u32::try_from(offset).expect("port offset fits in u32");
        Self(self.0 + offset)
    }
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Port({})", self.0)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One side of a connection: an object and one of its ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub object: Handle,
    pub port: Port,
}

impl Endpoint {
    pub fn new(object: Handle, port: Port) -> Self {
        Self { object, port }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object, self.port)
    }
}

/// A directed edge: flow leaves `source` and enters `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Connection {
    pub source: Endpoint,
    pub target: Endpoint,
}

impl Connection {
    /// Check if this connection involves a specific object.
    pub fn involves(&self, object: Handle) -> bool {
        self.source.object == object || self.target.object == object
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Capability implemented by everything that takes part in the graph.
///
/// Straight components expose one inlet and one outlet. Variable-arity owners
/// (splitters, mixers, port lists) describe their branch ports through
/// [`PortOwner::branch_layout`] and leave the variable side as `None`.
pub trait PortOwner {
    /// Fixed inlet port, if any.
    fn inlet_port(&self) -> Option<Port>;

    /// Fixed outlet port, if any.
    fn outlet_port(&self) -> Option<Port>;

    /// Branch ports, for owners with a variable number of connections.
    fn branch_layout(&self) -> Option<BranchLayout> {
        None
    }

    /// Outlet that flow continues through after entering by `inlet`.
    ///
    /// Components with several independent port pairs (water coils) override
    /// this; the default pairs the fixed inlet with the fixed outlet.
    fn paired_outlet(&self, inlet: Port) -> Option<Port> {
        if Some(inlet) == self.inlet_port() {
            self.outlet_port()
        } else {
            None
        }
    }

    /// Inverse of [`PortOwner::paired_outlet`].
    fn paired_inlet(&self, outlet: Port) -> Option<Port> {
        if Some(outlet) == self.outlet_port() {
            self.inlet_port()
        } else {
            None
        }
    }
}
