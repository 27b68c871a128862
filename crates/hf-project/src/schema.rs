//! System recipe schema definitions.

use hf_components::{ObjectKind, StraightKind, TerminalKind, WaterCoilKind};
use serde::{Deserialize, Serialize};

/// Newest recipe version this crate reads and writes.
pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub zones: Vec<ZoneDef>,
    #[serde(default)]
    pub air_loops: Vec<AirLoopDef>,
    #[serde(default)]
    pub plant_loops: Vec<PlantLoopDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneDef {
    pub id: String,
    pub name: String,
    /// Plenum zones only ever back a supply or return plenum.
    #[serde(default, skip_serializing_if = "is_false")]
    pub plenum: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirLoopDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dual_duct: bool,
    /// Equipment in flow order, ahead of the supply outlet.
    #[serde(default)]
    pub supply: Vec<EquipmentDef>,
    #[serde(default)]
    pub branches: Vec<BranchDef>,
}

/// One zone branch on an air loop's demand side.
///
/// A branch names a zone, a terminal, or both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<TerminalDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_plenum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_plenum: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantLoopDef {
    pub id: String,
    pub name: String,
    /// Each entry gets its own supply branch.
    #[serde(default)]
    pub supply: Vec<EquipmentDef>,
    /// Ids of water coils defined on air loops.
    #[serde(default)]
    pub demand: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquipmentDef {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: EquipmentKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum EquipmentKind {
    FanConstantVolume,
    FanVariableVolume,
    CoilHeatingElectric,
    CoilHeatingWater,
    CoilCoolingWater,
    PumpConstantSpeed,
    PumpVariableSpeed,
    BoilerHotWater,
    PipeAdiabatic,
}

impl EquipmentKind {
    pub fn object_kind(self) -> ObjectKind {
        match self {
            EquipmentKind::FanConstantVolume => ObjectKind::Equipment(StraightKind::FanConstantVolume),
            EquipmentKind::FanVariableVolume => ObjectKind::Equipment(StraightKind::FanVariableVolume),
            EquipmentKind::CoilHeatingElectric => {
                ObjectKind::Equipment(StraightKind::CoilHeatingElectric)
            }
            EquipmentKind::CoilHeatingWater => ObjectKind::WaterCoil(WaterCoilKind::Heating),
            EquipmentKind::CoilCoolingWater => ObjectKind::WaterCoil(WaterCoilKind::Cooling),
            EquipmentKind::PumpConstantSpeed => ObjectKind::Equipment(StraightKind::PumpConstantSpeed),
            EquipmentKind::PumpVariableSpeed => ObjectKind::Equipment(StraightKind::PumpVariableSpeed),
            EquipmentKind::BoilerHotWater => ObjectKind::Equipment(StraightKind::BoilerHotWater),
            EquipmentKind::PipeAdiabatic => ObjectKind::Equipment(StraightKind::PipeAdiabatic),
        }
    }

    pub fn is_water_coil(self) -> bool {
        matches!(self, EquipmentKind::CoilHeatingWater | EquipmentKind::CoilCoolingWater)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerminalDef {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: TerminalKindDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum TerminalKindDef {
    ConstantVolumeNoReheat,
    VavReheat,
    SeriesPiuReheat,
    ParallelPiuReheat,
    FourPipeInduction,
}

impl From<TerminalKindDef> for TerminalKind {
    fn from(kind: TerminalKindDef) -> Self {
        match kind {
            TerminalKindDef::ConstantVolumeNoReheat => TerminalKind::ConstantVolumeNoReheat,
            TerminalKindDef::VavReheat => TerminalKind::VavReheat,
            TerminalKindDef::SeriesPiuReheat => TerminalKind::SeriesPiuReheat,
            TerminalKindDef::ParallelPiuReheat => TerminalKind::ParallelPiuReheat,
            TerminalKindDef::FourPipeInduction => TerminalKind::FourPipeInduction,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
