//! `Component`: one enum over every object kind.

use hf_graph::{BranchLayout, Port, PortOwner};

use crate::connector::{ConnectorKind, Mixer, ReturnPlenum, Splitter, SupplyPlenum};
use crate::equipment::{Equipment, WaterCoil};
use crate::kind::ObjectKind;
use crate::loops::{AirLoop, LoopPorts, PlantLoop};
use crate::node::Node;
use crate::terminal::AirTerminal;
use crate::zone::{PortList, ThermalZone};

/// Any object that can live in a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Node(Node),
    Equipment(Equipment),
    WaterCoil(WaterCoil),
    Terminal(AirTerminal),
    Splitter(Splitter),
    Mixer(Mixer),
    SupplyPlenum(SupplyPlenum),
    ReturnPlenum(ReturnPlenum),
    PortList(PortList),
    Zone(ThermalZone),
    AirLoop(AirLoop),
    PlantLoop(PlantLoop),
}

impl Component {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Component::Node(_) => ObjectKind::Node,
            Component::Equipment(e) => ObjectKind::Equipment(e.kind),
            Component::WaterCoil(c) => ObjectKind::WaterCoil(c.kind),
            Component::Terminal(t) => ObjectKind::Terminal(t.kind),
            Component::Splitter(s) => match s.kind {
                ConnectorKind::Zone => ObjectKind::ZoneSplitter,
                ConnectorKind::Connector => ObjectKind::ConnectorSplitter,
            },
            Component::Mixer(m) => match m.kind {
                ConnectorKind::Zone => ObjectKind::ZoneMixer,
                ConnectorKind::Connector => ObjectKind::ConnectorMixer,
            },
            Component::SupplyPlenum(_) => ObjectKind::SupplyPlenum,
            Component::ReturnPlenum(_) => ObjectKind::ReturnPlenum,
            Component::PortList(_) => ObjectKind::PortList,
            Component::Zone(_) => ObjectKind::ThermalZone,
            Component::AirLoop(_) => ObjectKind::AirLoop,
            Component::PlantLoop(_) => ObjectKind::PlantLoop,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Component::Node(c) => &c.name,
            Component::Equipment(c) => &c.name,
            Component::WaterCoil(c) => &c.name,
            Component::Terminal(c) => &c.name,
            Component::Splitter(c) => &c.name,
            Component::Mixer(c) => &c.name,
            Component::SupplyPlenum(c) => &c.name,
            Component::ReturnPlenum(c) => &c.name,
            Component::PortList(c) => &c.name,
            Component::Zone(c) => &c.name,
            Component::AirLoop(c) => &c.name,
            Component::PlantLoop(c) => &c.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Component::Node(c) => c.name = name,
            Component::Equipment(c) => c.name = name,
            Component::WaterCoil(c) => c.name = name,
            Component::Terminal(c) => c.name = name,
            Component::Splitter(c) => c.name = name,
            Component::Mixer(c) => c.name = name,
            Component::SupplyPlenum(c) => c.name = name,
            Component::ReturnPlenum(c) => c.name = name,
            Component::PortList(c) => c.name = name,
            Component::Zone(c) => c.name = name,
            Component::AirLoop(c) => c.name = name,
            Component::PlantLoop(c) => c.name = name,
        }
    }

    /// Capability view used by connections and walks.
    pub fn port_owner(&self) -> &dyn PortOwner {
        match self {
            Component::Node(c) => c,
            Component::Equipment(c) => c,
            Component::WaterCoil(c) => c,
            Component::Terminal(c) => c,
            Component::Splitter(c) => c,
            Component::Mixer(c) => c,
            Component::SupplyPlenum(c) => c,
            Component::ReturnPlenum(c) => c,
            Component::PortList(c) => c,
            Component::Zone(c) => c,
            Component::AirLoop(c) => c,
            Component::PlantLoop(c) => c,
        }
    }

    /// Initial width of the backing record.
    pub fn field_count(&self) -> usize {
        match self {
            Component::Node(_) => Node::FIELDS,
            Component::Equipment(_) => Equipment::FIELDS,
            Component::WaterCoil(_) => WaterCoil::FIELDS,
            Component::Terminal(_) => AirTerminal::FIELDS,
            Component::Splitter(_) => Splitter::FIELDS,
            Component::Mixer(_) => Mixer::FIELDS,
            Component::SupplyPlenum(_) => SupplyPlenum::FIELDS,
            Component::ReturnPlenum(_) => ReturnPlenum::FIELDS,
            Component::PortList(_) => PortList::FIELDS,
            Component::Zone(_) => ThermalZone::FIELDS,
            Component::AirLoop(_) => AirLoop::FIELDS,
            Component::PlantLoop(_) => PlantLoop::FIELDS,
        }
    }

    /// Every fixed (non-branch) port this object can be connected on.
    pub fn fixed_ports(&self) -> Vec<Port> {
        match self {
            Component::WaterCoil(_) => vec![
                WaterCoil::AIR_INLET,
                WaterCoil::AIR_OUTLET,
                WaterCoil::WATER_INLET,
                WaterCoil::WATER_OUTLET,
            ],
            Component::Terminal(t) => {
                let mut ports = vec![AirTerminal::INLET, AirTerminal::OUTLET];
                ports.extend(t.secondary_inlet_port());
                ports
            }
            Component::AirLoop(l) => l.ports().all(),
            Component::PlantLoop(l) => l.ports().all(),
            other => {
                let owner = other.port_owner();
                owner.inlet_port().into_iter().chain(owner.outlet_port()).collect()
            }
        }
    }

    pub fn branch_layout(&self) -> Option<BranchLayout> {
        self.port_owner().branch_layout()
    }

    /// Loop ports, for loop objects.
    pub fn loop_ports(&self) -> Option<LoopPorts> {
        match self {
            Component::AirLoop(l) => Some(l.ports()),
            Component::PlantLoop(l) => Some(l.ports()),
            _ => None,
        }
    }

    pub fn as_zone(&self) -> Option<&ThermalZone> {
        match self {
            Component::Zone(z) => Some(z),
            _ => None,
        }
    }

    pub fn as_zone_mut(&mut self) -> Option<&mut ThermalZone> {
        match self {
            Component::Zone(z) => Some(z),
            _ => None,
        }
    }

    pub fn as_terminal(&self) -> Option<&AirTerminal> {
        match self {
            Component::Terminal(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_port_list(&self) -> Option<&PortList> {
        match self {
            Component::PortList(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_air_loop(&self) -> Option<&AirLoop> {
        match self {
            Component::AirLoop(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_supply_plenum(&self) -> Option<&SupplyPlenum> {
        match self {
            Component::SupplyPlenum(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_return_plenum(&self) -> Option<&ReturnPlenum> {
        match self {
            Component::ReturnPlenum(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_return_plenum_mut(&mut self) -> Option<&mut ReturnPlenum> {
        match self {
            Component::ReturnPlenum(p) => Some(p),
            _ => None,
        }
    }
}
