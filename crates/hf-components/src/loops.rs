//! Air and plant loops.

use hf_graph::{Port, PortOwner};

use crate::kind::LoopSide;

/// The loop's own ports, grouped by role.
///
/// Inlet ports of a side are edge sources on the loop object (the loop feeds
/// the side's inlet node); outlet ports are edge targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopPorts {
    pub supply_inlet: Port,
    pub supply_outlets: Vec<Port>,
    pub demand_inlets: Vec<Port>,
    pub demand_outlet: Port,
}

impl LoopPorts {
    /// Side of the loop a loop port belongs to.
    pub fn side_of(&self, port: Port) -> Option<LoopSide> {
        if port == self.supply_inlet || self.supply_outlets.contains(&port) {
            Some(LoopSide::Supply)
        } else if port == self.demand_outlet || self.demand_inlets.contains(&port) {
            Some(LoopSide::Demand)
        } else {
            None
        }
    }

    pub fn all(&self) -> Vec<Port> {
        let mut ports = vec![self.supply_inlet];
        ports.extend(&self.supply_outlets);
        ports.extend(&self.demand_inlets);
        ports.push(self.demand_outlet);
        ports
    }
}

/// Air distribution loop.
///
/// A dual-duct loop has two supply outlet nodes and two demand inlet nodes,
/// each demand inlet feeding its own zone splitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirLoop {
    pub name: String,
    pub dual_duct: bool,
}

impl AirLoop {
    pub const SUPPLY_INLET: Port = Port::new(1);
    pub const SUPPLY_OUTLET_A: Port = Port::new(2);
    pub const DEMAND_INLET_A: Port = Port::new(3);
    pub const DEMAND_OUTLET: Port = Port::new(4);
    pub const SUPPLY_OUTLET_B: Port = Port::new(5);
    pub const DEMAND_INLET_B: Port = Port::new(6);
    pub const FIELDS: usize = 7;

    pub fn new(name: impl Into<String>, dual_duct: bool) -> Self {
        Self {
            name: name.into(),
            dual_duct,
        }
    }

    pub fn ports(&self) -> LoopPorts {
        let (supply_outlets, demand_inlets) = if self.dual_duct {
            (
                vec![Self::SUPPLY_OUTLET_A, Self::SUPPLY_OUTLET_B],
                vec![Self::DEMAND_INLET_A, Self::DEMAND_INLET_B],
            )
        } else {
            (vec![Self::SUPPLY_OUTLET_A], vec![Self::DEMAND_INLET_A])
        };
        LoopPorts {
            supply_inlet: Self::SUPPLY_INLET,
            supply_outlets,
            demand_inlets,
            demand_outlet: Self::DEMAND_OUTLET,
        }
    }
}

/// Water loop: one supply side, one demand side, each with a branch set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantLoop {
    pub name: String,
}

impl PlantLoop {
    pub const SUPPLY_INLET: Port = Port::new(1);
    pub const SUPPLY_OUTLET: Port = Port::new(2);
    pub const DEMAND_INLET: Port = Port::new(3);
    pub const DEMAND_OUTLET: Port = Port::new(4);
    pub const FIELDS: usize = 5;

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn ports(&self) -> LoopPorts {
        LoopPorts {
            supply_inlet: Self::SUPPLY_INLET,
            supply_outlets: vec![Self::SUPPLY_OUTLET],
            demand_inlets: vec![Self::DEMAND_INLET],
            demand_outlet: Self::DEMAND_OUTLET,
        }
    }
}

// Loops terminate walks: nothing passes through a loop object.
impl PortOwner for AirLoop {
    fn inlet_port(&self) -> Option<Port> {
        None
    }

    fn outlet_port(&self) -> Option<Port> {
        None
    }

    fn paired_outlet(&self, _inlet: Port) -> Option<Port> {
        None
    }

    fn paired_inlet(&self, _outlet: Port) -> Option<Port> {
        None
    }
}

impl PortOwner for PlantLoop {
    fn inlet_port(&self) -> Option<Port> {
        None
    }

    fn outlet_port(&self) -> Option<Port> {
        None
    }

    fn paired_outlet(&self, _inlet: Port) -> Option<Port> {
        None
    }

    fn paired_inlet(&self, _outlet: Port) -> Option<Port> {
        None
    }
}
