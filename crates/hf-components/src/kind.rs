//! Object kinds and placement rules.

use core::fmt;

use crate::equipment::{StraightKind, WaterCoilKind};
use crate::terminal::TerminalKind;

/// Kind of loop a component sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    Air,
    Plant,
}

/// Half of a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopSide {
    Supply,
    Demand,
}

impl fmt::Display for LoopSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopSide::Supply => write!(f, "supply"),
            LoopSide::Demand => write!(f, "demand"),
        }
    }
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopKind::Air => write!(f, "air loop"),
            LoopKind::Plant => write!(f, "plant loop"),
        }
    }
}

/// Flat kind tag for every object in a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Node,
    Equipment(StraightKind),
    WaterCoil(WaterCoilKind),
    Terminal(TerminalKind),
    ZoneSplitter,
    ZoneMixer,
    ConnectorSplitter,
    ConnectorMixer,
    SupplyPlenum,
    ReturnPlenum,
    PortList,
    ThermalZone,
    AirLoop,
    PlantLoop,
}

impl ObjectKind {
    /// Record kind used in the field store.
    pub fn schema_name(self) -> &'static str {
        match self {
            ObjectKind::Node => "Node",
            ObjectKind::Equipment(kind) => kind.schema_name(),
            ObjectKind::WaterCoil(kind) => kind.schema_name(),
            ObjectKind::Terminal(kind) => kind.schema_name(),
            ObjectKind::ZoneSplitter => "AirLoopHVAC:ZoneSplitter",
            ObjectKind::ZoneMixer => "AirLoopHVAC:ZoneMixer",
            ObjectKind::ConnectorSplitter => "Connector:Splitter",
            ObjectKind::ConnectorMixer => "Connector:Mixer",
            ObjectKind::SupplyPlenum => "AirLoopHVAC:SupplyPlenum",
            ObjectKind::ReturnPlenum => "AirLoopHVAC:ReturnPlenum",
            ObjectKind::PortList => "PortList",
            ObjectKind::ThermalZone => "ThermalZone",
            ObjectKind::AirLoop => "AirLoopHVAC",
            ObjectKind::PlantLoop => "PlantLoop",
        }
    }

    /// Prefix for generated object names.
    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Node => "Node",
            ObjectKind::Equipment(kind) => kind.label(),
            ObjectKind::WaterCoil(kind) => kind.label(),
            ObjectKind::Terminal(kind) => kind.label(),
            ObjectKind::ZoneSplitter => "Zone Splitter",
            ObjectKind::ZoneMixer => "Zone Mixer",
            ObjectKind::ConnectorSplitter => "Splitter",
            ObjectKind::ConnectorMixer => "Mixer",
            ObjectKind::SupplyPlenum => "Supply Plenum",
            ObjectKind::ReturnPlenum => "Return Plenum",
            ObjectKind::PortList => "Port List",
            ObjectKind::ThermalZone => "Thermal Zone",
            ObjectKind::AirLoop => "Air Loop",
            ObjectKind::PlantLoop => "Plant Loop",
        }
    }

    pub fn is_node(self) -> bool {
        self == ObjectKind::Node
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ObjectKind::Terminal(_))
    }

    pub fn is_loop(self) -> bool {
        matches!(self, ObjectKind::AirLoop | ObjectKind::PlantLoop)
    }

    pub fn is_splitter(self) -> bool {
        matches!(self, ObjectKind::ZoneSplitter | ObjectKind::ConnectorSplitter)
    }

    pub fn is_mixer(self) -> bool {
        matches!(self, ObjectKind::ZoneMixer | ObjectKind::ConnectorMixer)
    }

    pub fn is_plenum(self) -> bool {
        matches!(self, ObjectKind::SupplyPlenum | ObjectKind::ReturnPlenum)
    }

    /// Whether this kind can be spliced onto a node of the given loop side.
    ///
    /// Water coils are checked per port pair: the air side goes on air-loop
    /// supply sides, the water side on plant demand sides.
    pub fn allows(self, loop_kind: LoopKind, side: LoopSide) -> bool {
        use LoopKind::{Air, Plant};
        use LoopSide::{Demand, Supply};
        match self {
            ObjectKind::Equipment(kind) => match kind {
                StraightKind::FanConstantVolume
                | StraightKind::FanVariableVolume
                | StraightKind::CoilHeatingElectric => (loop_kind, side) == (Air, Supply),
                StraightKind::PumpConstantSpeed
                | StraightKind::PumpVariableSpeed
                | StraightKind::PipeAdiabatic => loop_kind == Plant,
                StraightKind::BoilerHotWater => (loop_kind, side) == (Plant, Supply),
            },
            ObjectKind::WaterCoil(_) => matches!((loop_kind, side), (Air, Supply) | (Plant, Demand)),
            ObjectKind::Terminal(_) => (loop_kind, side) == (Air, Demand),
            _ => false,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.schema_name())
    }
}
