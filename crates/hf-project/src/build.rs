//! Replays a recipe into a [`Model`].

use std::collections::HashMap;

use hf_components::{ObjectKind, Splitter};
use hf_core::Handle;
use hf_model::{Model, TopologyError};
use tracing::debug;

use crate::schema::{AirLoopDef, EquipmentDef, PlantLoopDef, Project};
use crate::validate::{ValidationError, validate_project};
use crate::{ProjectError, ProjectResult};

/// A model built from a recipe, with recipe ids mapped to handles.
#[derive(Debug)]
pub struct BuiltModel {
    pub model: Model,
    pub handles: HashMap<String, Handle>,
}

impl BuiltModel {
    pub fn handle(&self, id: &str) -> Option<Handle> {
        self.handles.get(id).copied()
    }
}

/// Validate `project` and build it through the public editing operations.
///
/// Zones come first, then air loops with their supply equipment and zone
/// branches, then plant loops picking up the water coils.
pub fn build_model(project: &Project) -> ProjectResult<BuiltModel> {
    validate_project(project)?;

    let mut built = BuiltModel {
        model: Model::new(),
        handles: HashMap::new(),
    };

    for zone in &project.zones {
        let handle = if zone.plenum {
            built.model.add_plenum_zone()
        } else {
            built.model.add_thermal_zone()
        };
        built.model.set_name(handle, zone.name.as_str())?;
        built.handles.insert(zone.id.clone(), handle);
    }

    for air_loop in &project.air_loops {
        build_air_loop(&mut built, air_loop)?;
    }
    for plant_loop in &project.plant_loops {
        build_plant_loop(&mut built, plant_loop)?;
    }

    built.model.check_invariants()?;
    debug!(
        project = %project.name,
        objects = built.model.len(),
        "built model from recipe"
    );
    Ok(built)
}

fn build_air_loop(built: &mut BuiltModel, def: &AirLoopDef) -> ProjectResult<()> {
    let air_loop = built.model.add_air_loop(def.name.as_str(), def.dual_duct);
    built.handles.insert(def.id.clone(), air_loop);

    for equipment in &def.supply {
        let component = add_equipment(built, equipment)?;
        let node = supply_tail(&built.model, air_loop)?;
        built.model.add_to_node(component, node)?;
    }

    for branch in &def.branches {
        let terminal = match &branch.terminal {
            Some(terminal) => {
                let handle = built.model.add_terminal(terminal.kind.into());
                built.model.set_name(handle, terminal.name.as_str())?;
                built.handles.insert(terminal.id.clone(), handle);
                Some(handle)
            }
            None => None,
        };

        let Some(zone_id) = &branch.zone else {
            if let Some(terminal) = terminal {
                built.model.add_branch_for_component(air_loop, terminal)?;
            }
            continue;
        };
        let zone = lookup(built, zone_id, "branch zone")?;
        built.model.add_branch_for_zone(air_loop, zone, terminal)?;

        if let Some(plenum) = &branch.supply_plenum {
            let plenum = lookup(built, plenum, "supply plenum")?;
            built.model.set_supply_plenum(zone, plenum)?;
        }
        if let Some(plenum) = &branch.return_plenum {
            let plenum = lookup(built, plenum, "return plenum")?;
            built.model.set_return_plenum(zone, plenum)?;
        }
    }
    Ok(())
}

fn build_plant_loop(built: &mut BuiltModel, def: &PlantLoopDef) -> ProjectResult<()> {
    let plant_loop = built.model.add_plant_loop(def.name.as_str());
    built.handles.insert(def.id.clone(), plant_loop);

    for equipment in &def.supply {
        let component = add_equipment(built, equipment)?;
        built
            .model
            .add_supply_branch_for_component(plant_loop, component)?;
    }
    for coil in &def.demand {
        let coil = lookup(built, coil, "plant demand")?;
        built
            .model
            .add_demand_branch_for_component(plant_loop, coil)?;
    }
    Ok(())
}

fn add_equipment(built: &mut BuiltModel, def: &EquipmentDef) -> ProjectResult<Handle> {
    let handle = match def.kind.object_kind() {
        ObjectKind::Equipment(kind) => built.model.add_equipment(kind),
        ObjectKind::WaterCoil(kind) => built.model.add_water_coil(kind),
        other => {
            return Err(ValidationError::InvalidValue {
                field: format!("equipment '{}' type", def.id),
                value: other.to_string(),
                reason: "not a straight component".to_string(),
            }
            .into());
        }
    };
    built.model.set_name(handle, def.name.as_str())?;
    built.handles.insert(def.id.clone(), handle);
    Ok(handle)
}

/// Node that new supply equipment goes onto so recipe order is kept.
///
/// Single duct: the supply outlet node. Dual duct: whatever feeds the deck
/// splitter, so the equipment stays ahead of both decks.
fn supply_tail(model: &Model, air_loop: Handle) -> ProjectResult<Handle> {
    let tail = if model.is_dual_duct(air_loop) {
        model
            .supply_components(air_loop, Some(ObjectKind::ConnectorSplitter))
            .first()
            .and_then(|&splitter| model.connected_object(splitter, Splitter::INLET))
    } else {
        model.supply_outlet_nodes(air_loop).first().copied()
    };
    tail.ok_or_else(|| {
        ProjectError::Build(TopologyError::Inconsistent {
            what: format!("air loop {} has no supply outlet", air_loop),
        })
    })
}

fn lookup(built: &BuiltModel, id: &str, context: &str) -> ProjectResult<Handle> {
    built.handle(id).ok_or_else(|| {
        ValidationError::MissingReference {
            id: id.to_string(),
            context: context.to_string(),
        }
        .into()
    })
}
