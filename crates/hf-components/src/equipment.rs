//! Straight equipment and water coils.

use hf_graph::{Port, PortOwner};

/// Two-port equipment kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StraightKind {
    FanConstantVolume,
    FanVariableVolume,
    CoilHeatingElectric,
    PumpConstantSpeed,
    PumpVariableSpeed,
    BoilerHotWater,
    PipeAdiabatic,
}

impl StraightKind {
    pub fn schema_name(self) -> &'static str {
        match self {
            StraightKind::FanConstantVolume => "Fan:ConstantVolume",
            StraightKind::FanVariableVolume => "Fan:VariableVolume",
            StraightKind::CoilHeatingElectric => "Coil:Heating:Electric",
            StraightKind::PumpConstantSpeed => "Pump:ConstantSpeed",
            StraightKind::PumpVariableSpeed => "Pump:VariableSpeed",
            StraightKind::BoilerHotWater => "Boiler:HotWater",
            StraightKind::PipeAdiabatic => "Pipe:Adiabatic",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StraightKind::FanConstantVolume => "Fan Constant Volume",
            StraightKind::FanVariableVolume => "Fan Variable Volume",
            StraightKind::CoilHeatingElectric => "Coil Heating Electric",
            StraightKind::PumpConstantSpeed => "Pump Constant Speed",
            StraightKind::PumpVariableSpeed => "Pump Variable Speed",
            StraightKind::BoilerHotWater => "Boiler Hot Water",
            StraightKind::PipeAdiabatic => "Pipe Adiabatic",
        }
    }

    pub fn is_fan(self) -> bool {
        matches!(
            self,
            StraightKind::FanConstantVolume | StraightKind::FanVariableVolume
        )
    }
}

/// Fan, coil, pump, boiler or pipe: one inlet, one outlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equipment {
    pub name: String,
    pub kind: StraightKind,
}

impl Equipment {
    pub const INLET: Port = Port::new(1);
    pub const OUTLET: Port = Port::new(2);
    pub const FIELDS: usize = 3;

    pub fn new(name: impl Into<String>, kind: StraightKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl PortOwner for Equipment {
    fn inlet_port(&self) -> Option<Port> {
        Some(Self::INLET)
    }

    fn outlet_port(&self) -> Option<Port> {
        Some(Self::OUTLET)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaterCoilKind {
    Heating,
    Cooling,
}

impl WaterCoilKind {
    pub fn schema_name(self) -> &'static str {
        match self {
            WaterCoilKind::Heating => "Coil:Heating:Water",
            WaterCoilKind::Cooling => "Coil:Cooling:Water",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WaterCoilKind::Heating => "Coil Heating Water",
            WaterCoilKind::Cooling => "Coil Cooling Water",
        }
    }
}

/// Coil with an air stream on one port pair and a water stream on another.
///
/// The air pair is the primary pair; the water pair is wired into a plant
/// loop's demand side independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaterCoil {
    pub name: String,
    pub kind: WaterCoilKind,
}

impl WaterCoil {
    pub const AIR_INLET: Port = Port::new(1);
    pub const AIR_OUTLET: Port = Port::new(2);
    pub const WATER_INLET: Port = Port::new(3);
    pub const WATER_OUTLET: Port = Port::new(4);
    pub const FIELDS: usize = 5;

    pub fn new(name: impl Into<String>, kind: WaterCoilKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl PortOwner for WaterCoil {
    fn inlet_port(&self) -> Option<Port> {
        Some(Self::AIR_INLET)
    }

    fn outlet_port(&self) -> Option<Port> {
        Some(Self::AIR_OUTLET)
    }

    fn paired_outlet(&self, inlet: Port) -> Option<Port> {
        match inlet {
            Self::AIR_INLET => Some(Self::AIR_OUTLET),
            Self::WATER_INLET => Some(Self::WATER_OUTLET),
            _ => None,
        }
    }

    fn paired_inlet(&self, outlet: Port) -> Option<Port> {
        match outlet {
            Self::AIR_OUTLET => Some(Self::AIR_INLET),
            Self::WATER_OUTLET => Some(Self::WATER_INLET),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_coil_keeps_streams_apart() {
        let coil = WaterCoil::new("CHW coil", WaterCoilKind::Cooling);
        assert_eq!(coil.paired_outlet(WaterCoil::AIR_INLET), Some(WaterCoil::AIR_OUTLET));
        assert_eq!(
            coil.paired_outlet(WaterCoil::WATER_INLET),
            Some(WaterCoil::WATER_OUTLET)
        );
        assert_eq!(coil.paired_inlet(WaterCoil::WATER_OUTLET), Some(WaterCoil::WATER_INLET));
        assert_eq!(coil.paired_outlet(WaterCoil::AIR_OUTLET), None);
    }

    #[test]
    fn fans_are_recognised() {
        assert!(StraightKind::FanConstantVolume.is_fan());
        assert!(!StraightKind::PumpConstantSpeed.is_fan());
    }
}
