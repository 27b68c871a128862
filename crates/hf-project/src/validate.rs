//! Recipe validation logic.

use crate::schema::{AirLoopDef, EquipmentDef, LATEST_VERSION, PlantLoopDef, Project};
use hf_components::{LoopKind, LoopSide};
use std::collections::{HashMap, HashSet};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    // Zones, loops, equipment and terminals share one id namespace
    let mut ids = HashSet::new();
    let mut claim = |id: &String, context: &str| {
        if ids.insert(id.clone()) {
            Ok(())
        } else {
            Err(ValidationError::DuplicateId {
                id: id.clone(),
                context: context.to_string(),
            })
        }
    };

    let mut plenum_zones = HashMap::new();
    for zone in &project.zones {
        claim(&zone.id, "zones")?;
        plenum_zones.insert(&zone.id, zone.plenum);
    }

    let mut water_coils = HashSet::new();
    let mut served = HashSet::new();
    for air_loop in &project.air_loops {
        claim(&air_loop.id, "air_loops")?;
        for equipment in &air_loop.supply {
            claim(&equipment.id, &format!("air loop '{}' supply", air_loop.name))?;
            check_placement(equipment, LoopKind::Air, LoopSide::Supply, &air_loop.name)?;
            if equipment.kind.is_water_coil() {
                water_coils.insert(&equipment.id);
            }
        }
        for branch in &air_loop.branches {
            if let Some(terminal) = &branch.terminal {
                claim(&terminal.id, &format!("air loop '{}' branches", air_loop.name))?;
            }
        }
        validate_branches(air_loop, &plenum_zones, &mut served)?;
    }

    let mut plant_served = HashSet::new();
    for plant_loop in &project.plant_loops {
        claim(&plant_loop.id, "plant_loops")?;
        for equipment in &plant_loop.supply {
            claim(&equipment.id, &format!("plant loop '{}' supply", plant_loop.name))?;
            check_placement(equipment, LoopKind::Plant, LoopSide::Supply, &plant_loop.name)?;
        }
        validate_demand(plant_loop, &water_coils, &mut plant_served)?;
    }

    Ok(())
}

fn check_placement(
    equipment: &EquipmentDef,
    loop_kind: LoopKind,
    side: LoopSide,
    loop_name: &str,
) -> Result<(), ValidationError> {
    let kind = equipment.kind.object_kind();
    if kind.allows(loop_kind, side) {
        return Ok(());
    }
    Err(ValidationError::InvalidValue {
        field: format!("{} '{}' {} equipment", loop_kind, loop_name, side),
        value: equipment.id.clone(),
        reason: format!("{} cannot be placed there", kind),
    })
}

fn validate_branches<'a>(
    air_loop: &'a AirLoopDef,
    plenum_zones: &HashMap<&String, bool>,
    served: &mut HashSet<&'a String>,
) -> Result<(), ValidationError> {
    if air_loop.dual_duct && !air_loop.branches.is_empty() {
        return Err(ValidationError::Unsupported {
            feature: format!("Zone branches on dual-duct air loop '{}'", air_loop.name),
            reason: "each deck has its own zone splitter, so a branch has no single home"
                .to_string(),
        });
    }

    for (index, branch) in air_loop.branches.iter().enumerate() {
        let context = format!("air loop '{}' branch {}", air_loop.name, index);
        let Some(zone) = &branch.zone else {
            if branch.terminal.is_none() {
                return Err(ValidationError::InvalidValue {
                    field: context,
                    value: "{}".to_string(),
                    reason: "a branch needs a zone or a terminal".to_string(),
                });
            }
            if branch.supply_plenum.is_some() || branch.return_plenum.is_some() {
                return Err(ValidationError::InvalidValue {
                    field: context,
                    value: "plenum".to_string(),
                    reason: "plenums need a zone on the branch".to_string(),
                });
            }
            continue;
        };

        match plenum_zones.get(zone) {
            None => {
                return Err(ValidationError::MissingReference {
                    id: zone.clone(),
                    context,
                });
            }
            Some(true) => {
                return Err(ValidationError::InvalidValue {
                    field: format!("{} zone", context),
                    value: zone.clone(),
                    reason: "plenum zones cannot be served by a branch".to_string(),
                });
            }
            Some(false) => {}
        }
        if !served.insert(zone) {
            return Err(ValidationError::DuplicateId {
                id: zone.clone(),
                context: "zones served by air loops".to_string(),
            });
        }

        for plenum in [&branch.supply_plenum, &branch.return_plenum].into_iter().flatten() {
            match plenum_zones.get(plenum) {
                None => {
                    return Err(ValidationError::MissingReference {
                        id: plenum.clone(),
                        context: format!("{} plenum", context),
                    });
                }
                Some(false) => {
                    return Err(ValidationError::InvalidValue {
                        field: format!("{} plenum", context),
                        value: plenum.clone(),
                        reason: "zone is not a plenum".to_string(),
                    });
                }
                Some(true) => {}
            }
        }
    }

    Ok(())
}

fn validate_demand<'a>(
    plant_loop: &'a PlantLoopDef,
    water_coils: &HashSet<&String>,
    plant_served: &mut HashSet<&'a String>,
) -> Result<(), ValidationError> {
    for coil in &plant_loop.demand {
        if !water_coils.contains(coil) {
            return Err(ValidationError::MissingReference {
                id: coil.clone(),
                context: format!("plant loop '{}' demand (water coils)", plant_loop.name),
            });
        }
        if !plant_served.insert(coil) {
            return Err(ValidationError::DuplicateId {
                id: coil.clone(),
                context: "plant loop demand".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BranchDef, EquipmentKind, ZoneDef};

    fn project() -> Project {
        Project {
            version: LATEST_VERSION,
            name: "Test".to_string(),
            zones: vec![
                ZoneDef {
                    id: "z1".to_string(),
                    name: "Zone 1".to_string(),
                    plenum: false,
                },
                ZoneDef {
                    id: "attic".to_string(),
                    name: "Attic".to_string(),
                    plenum: true,
                },
            ],
            air_loops: vec![AirLoopDef {
                id: "ahu".to_string(),
                name: "AHU".to_string(),
                dual_duct: false,
                supply: vec![EquipmentDef {
                    id: "cc".to_string(),
                    name: "Cooling coil".to_string(),
                    kind: EquipmentKind::CoilCoolingWater,
                }],
                branches: vec![BranchDef {
                    zone: Some("z1".to_string()),
                    terminal: None,
                    supply_plenum: None,
                    return_plenum: Some("attic".to_string()),
                }],
            }],
            plant_loops: vec![PlantLoopDef {
                id: "chw".to_string(),
                name: "Chilled water".to_string(),
                supply: vec![],
                demand: vec!["cc".to_string()],
            }],
        }
    }

    #[test]
    fn accepts_consistent_recipe() {
        validate_project(&project()).unwrap();
    }

    #[test]
    fn rejects_unknown_version() {
        let mut p = project();
        p.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn ids_are_global() {
        let mut p = project();
        p.plant_loops[0].id = "z1".to_string();
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::DuplicateId { id, .. }) if id == "z1"
        ));
    }

    #[test]
    fn plenums_must_be_plenum_zones() {
        let mut p = project();
        p.air_loops[0].branches[0].return_plenum = Some("z1".to_string());
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::InvalidValue { .. })
        ));

        let mut p = project();
        p.air_loops[0].branches[0].zone = Some("attic".to_string());
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn demand_must_name_a_water_coil() {
        let mut p = project();
        p.plant_loops[0].demand.push("z1".to_string());
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn boiler_stays_off_air_loops() {
        let mut p = project();
        p.air_loops[0].supply.push(EquipmentDef {
            id: "b".to_string(),
            name: "Boiler".to_string(),
            kind: EquipmentKind::BoilerHotWater,
        });
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
