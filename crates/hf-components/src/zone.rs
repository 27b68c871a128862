//! Thermal zones and their port lists.

use hf_core::Handle;
use hf_graph::{BranchLayout, BranchSide, Port, PortOwner};

/// What a port list is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortListRole {
    /// Supply air entering a zone.
    ZoneInlet,
    /// Air leaving a zone other than through its return, e.g. to PIU secondary inlets.
    ZoneExhaust,
    /// Air drawn from a return plenum by induction terminals.
    PlenumInducedAir,
}

/// Variable-width run of ports attached to a zone or return plenum.
///
/// Field 1 points back at the owner; branch ports start at 2. Which object
/// owns a port list is tracked by the model's owner index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortList {
    pub name: String,
    pub role: PortListRole,
}

impl PortList {
    pub const OWNER_FIELD: usize = 1;
    pub const FIRST_PORT: Port = Port::new(2);
    pub const FIELDS: usize = 2;

    pub fn new(name: impl Into<String>, role: PortListRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    pub fn layout(&self) -> BranchLayout {
        let side = match self.role {
            PortListRole::ZoneInlet => BranchSide::Inlet,
            PortListRole::ZoneExhaust | PortListRole::PlenumInducedAir => BranchSide::Outlet,
        };
        BranchLayout::new(side, Self::FIRST_PORT)
    }
}

impl PortOwner for PortList {
    fn inlet_port(&self) -> Option<Port> {
        None
    }

    fn outlet_port(&self) -> Option<Port> {
        None
    }

    fn branch_layout(&self) -> Option<BranchLayout> {
        Some(self.layout())
    }
}

/// A conditioned space, or a plenum when `is_plenum` is set.
///
/// Supply air reaches the zone through its inlet port list; air returns
/// through the fixed return air port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThermalZone {
    pub name: String,
    pub is_plenum: bool,
    pub inlet_port_list: Option<Handle>,
    pub exhaust_port_list: Option<Handle>,
    /// Zone equipment served through this zone, in attachment order.
    pub equipment: Vec<Handle>,
}

impl ThermalZone {
    pub const INLET_PORT_LIST_FIELD: usize = 1;
    pub const EXHAUST_PORT_LIST_FIELD: usize = 2;
    pub const RETURN_AIR: Port = Port::new(3);
    pub const FIELDS: usize = 4;

    pub fn new(name: impl Into<String>, is_plenum: bool) -> Self {
        Self {
            name: name.into(),
            is_plenum,
            inlet_port_list: None,
            exhaust_port_list: None,
            equipment: Vec::new(),
        }
    }
}

impl PortOwner for ThermalZone {
    fn inlet_port(&self) -> Option<Port> {
        None
    }

    fn outlet_port(&self) -> Option<Port> {
        Some(Self::RETURN_AIR)
    }
}
