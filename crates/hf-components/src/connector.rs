//! Splitters, mixers and plenums: owners with variable branch ports.

use hf_core::Handle;
use hf_graph::{BranchLayout, BranchSide, Port, PortOwner};

/// Where a splitter or mixer sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorKind {
    /// Air loop demand side, fanning out to zones.
    Zone,
    /// Plant loops and dual-duct supply sides.
    Connector,
}

/// One inlet, N outlet branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splitter {
    pub name: String,
    pub kind: ConnectorKind,
}

impl Splitter {
    pub const INLET: Port = Port::new(1);
    pub const FIRST_OUTLET: Port = Port::new(2);
    pub const FIELDS: usize = 2;
    pub const LAYOUT: BranchLayout = BranchLayout {
        side: BranchSide::Outlet,
        first_port: Self::FIRST_OUTLET,
    };

    pub fn new(name: impl Into<String>, kind: ConnectorKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl PortOwner for Splitter {
    fn inlet_port(&self) -> Option<Port> {
        Some(Self::INLET)
    }

    fn outlet_port(&self) -> Option<Port> {
        None
    }

    fn branch_layout(&self) -> Option<BranchLayout> {
        Some(Self::LAYOUT)
    }
}

/// N inlet branches, one outlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mixer {
    pub name: String,
    pub kind: ConnectorKind,
}

impl Mixer {
    pub const OUTLET: Port = Port::new(1);
    pub const FIRST_INLET: Port = Port::new(2);
    pub const FIELDS: usize = 2;
    pub const LAYOUT: BranchLayout = BranchLayout {
        side: BranchSide::Inlet,
        first_port: Self::FIRST_INLET,
    };

    pub fn new(name: impl Into<String>, kind: ConnectorKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl PortOwner for Mixer {
    fn inlet_port(&self) -> Option<Port> {
        None
    }

    fn outlet_port(&self) -> Option<Port> {
        Some(Self::OUTLET)
    }

    fn branch_layout(&self) -> Option<BranchLayout> {
        Some(Self::LAYOUT)
    }
}

/// Splitter-like plenum between a zone splitter and the zones it feeds.
///
/// Field 1 points at the plenum zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyPlenum {
    pub name: String,
    pub plenum_zone: Handle,
}

impl SupplyPlenum {
    pub const ZONE_FIELD: usize = 1;
    pub const INLET: Port = Port::new(2);
    pub const FIRST_OUTLET: Port = Port::new(3);
    pub const FIELDS: usize = 3;
    pub const LAYOUT: BranchLayout = BranchLayout {
        side: BranchSide::Outlet,
        first_port: Self::FIRST_OUTLET,
    };

    pub fn new(name: impl Into<String>, plenum_zone: Handle) -> Self {
        Self {
            name: name.into(),
            plenum_zone,
        }
    }
}

impl PortOwner for SupplyPlenum {
    fn inlet_port(&self) -> Option<Port> {
        Some(Self::INLET)
    }

    fn outlet_port(&self) -> Option<Port> {
        None
    }

    fn branch_layout(&self) -> Option<BranchLayout> {
        Some(Self::LAYOUT)
    }
}

/// Mixer-like plenum between zones and the zone mixer.
///
/// Field 1 points at the plenum zone, field 2 at the induced-air port list
/// once one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnPlenum {
    pub name: String,
    pub plenum_zone: Handle,
    pub induced_air: Option<Handle>,
}

impl ReturnPlenum {
    pub const ZONE_FIELD: usize = 1;
    pub const INDUCED_AIR_FIELD: usize = 2;
    pub const OUTLET: Port = Port::new(3);
    pub const FIRST_INLET: Port = Port::new(4);
    pub const FIELDS: usize = 4;
    pub const LAYOUT: BranchLayout = BranchLayout {
        side: BranchSide::Inlet,
        first_port: Self::FIRST_INLET,
    };

    pub fn new(name: impl Into<String>, plenum_zone: Handle) -> Self {
        Self {
            name: name.into(),
            plenum_zone,
            induced_air: None,
        }
    }
}

impl PortOwner for ReturnPlenum {
    fn inlet_port(&self) -> Option<Port> {
        None
    }

    fn outlet_port(&self) -> Option<Port> {
        Some(Self::OUTLET)
    }

    fn branch_layout(&self) -> Option<BranchLayout> {
        Some(Self::LAYOUT)
    }
}
