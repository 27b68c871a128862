//! Air terminals.

use hf_graph::{Port, PortOwner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalKind {
    ConstantVolumeNoReheat,
    VavReheat,
    SeriesPiuReheat,
    ParallelPiuReheat,
    FourPipeInduction,
}

impl TerminalKind {
    pub fn schema_name(self) -> &'static str {
        match self {
            TerminalKind::ConstantVolumeNoReheat => "AirTerminal:SingleDuct:ConstantVolume:NoReheat",
            TerminalKind::VavReheat => "AirTerminal:SingleDuct:VAV:Reheat",
            TerminalKind::SeriesPiuReheat => "AirTerminal:SingleDuct:SeriesPIU:Reheat",
            TerminalKind::ParallelPiuReheat => "AirTerminal:SingleDuct:ParallelPIU:Reheat",
            TerminalKind::FourPipeInduction => "AirTerminal:SingleDuct:ConstantVolume:FourPipeInduction",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TerminalKind::ConstantVolumeNoReheat => "Air Terminal CV No Reheat",
            TerminalKind::VavReheat => "Air Terminal VAV Reheat",
            TerminalKind::SeriesPiuReheat => "Air Terminal Series PIU",
            TerminalKind::ParallelPiuReheat => "Air Terminal Parallel PIU",
            TerminalKind::FourPipeInduction => "Air Terminal Four Pipe Induction",
        }
    }

    /// Terminals that draw secondary air from the zone or its return plenum.
    pub fn has_secondary_inlet(self) -> bool {
        matches!(
            self,
            TerminalKind::SeriesPiuReheat
                | TerminalKind::ParallelPiuReheat
                | TerminalKind::FourPipeInduction
        )
    }
}

/// Single-duct air terminal between a zone splitter branch and a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirTerminal {
    pub name: String,
    pub kind: TerminalKind,
}

impl AirTerminal {
    pub const INLET: Port = Port::new(1);
    pub const OUTLET: Port = Port::new(2);
    pub const SECONDARY_INLET: Port = Port::new(3);
    pub const FIELDS: usize = 4;

    pub fn new(name: impl Into<String>, kind: TerminalKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Induced-air inlet, for terminals that have one.
    pub fn secondary_inlet_port(&self) -> Option<Port> {
        self.kind
            .has_secondary_inlet()
            .then_some(Self::SECONDARY_INLET)
    }
}

impl PortOwner for AirTerminal {
    fn inlet_port(&self) -> Option<Port> {
        Some(Self::INLET)
    }

    fn outlet_port(&self) -> Option<Port> {
        Some(Self::OUTLET)
    }
}
