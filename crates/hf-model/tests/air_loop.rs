//! Air loop scenarios: skeletons, terminals, zone branches, induced air.

use hf_components::{AirTerminal, ObjectKind, StraightKind, TerminalKind, WaterCoil, WaterCoilKind};
use hf_core::Handle;
use hf_model::{Model, TopologyError};

/// Air loop plus the handle of its only placeholder node.
fn air_loop(model: &mut Model) -> (Handle, Handle) {
    let air_loop = model.add_air_loop("AHU", false);
    let splitter = model.zone_splitters(air_loop)[0];
    let placeholder = model.last_outlet_object(splitter).unwrap();
    (air_loop, placeholder)
}

#[test]
fn fresh_loop_has_five_demand_components() {
    let mut model = Model::new();
    let (air_loop, placeholder) = air_loop(&mut model);

    let demand = model.demand_components(air_loop, None);
    assert_eq!(demand.len(), 5);
    let kinds: Vec<ObjectKind> = demand.iter().map(|&h| model.kind_of(h).unwrap()).collect();
    assert_eq!(
        kinds,
        vec![
            ObjectKind::Node,
            ObjectKind::ZoneSplitter,
            ObjectKind::Node,
            ObjectKind::ZoneMixer,
            ObjectKind::Node,
        ]
    );
    assert_eq!(demand[2], placeholder);
    assert_eq!(model.loop_of(placeholder).map(|(l, _)| l), Some(air_loop));
}

#[test]
fn terminal_on_placeholder_adds_two_and_removes_cleanly() {
    let mut model = Model::new();
    let (air_loop, placeholder) = air_loop(&mut model);
    let splitter = model.zone_splitters(air_loop)[0];
    let next_port = model.next_outlet_port(splitter);

    let terminal = model.add_terminal(TerminalKind::ConstantVolumeNoReheat);
    model.add_to_node(terminal, placeholder).unwrap();
    let demand = model.demand_components(air_loop, None);
    assert_eq!(demand.len(), 7);
    assert_eq!(demand[3], terminal);
    assert_eq!(model.air_loop_of(terminal), Some(air_loop));
    model.check_invariants().unwrap();

    model.remove(terminal).unwrap();
    assert_eq!(model.demand_components(air_loop, None).len(), 5);
    assert_eq!(model.branch_count(splitter), 1);
    assert_eq!(model.next_outlet_port(splitter), next_port);
    assert!(!model.contains(terminal));
    model.check_invariants().unwrap();
}

#[test]
fn terminals_are_rejected_off_the_demand_side() {
    let mut model = Model::new();
    let (air_loop, _) = air_loop(&mut model);
    let supply_outlet = model.supply_outlet_nodes(air_loop)[0];
    let terminal = model.add_terminal(TerminalKind::VavReheat);
    let before = model.registry().clone();

    assert!(matches!(
        model.add_to_node(terminal, supply_outlet),
        Err(TopologyError::Placement { .. })
    ));
    assert_eq!(model.registry(), &before);
}

#[test]
fn supply_equipment_round_trip() {
    let mut model = Model::new();
    let (air_loop, _) = air_loop(&mut model);
    let inlet = model.supply_inlet_node(air_loop).unwrap();
    let outlet = model.supply_outlet_nodes(air_loop)[0];
    let before: Vec<_> = model.registry().connections_of(inlet);

    let fan = model.add_equipment(StraightKind::FanVariableVolume);
    model.add_to_node(fan, outlet).unwrap();
    let coil = model.add_equipment(StraightKind::CoilHeatingElectric);
    model.add_to_node(coil, inlet).unwrap();
    let supply = model.supply_components(air_loop, None);
    assert_eq!(supply.len(), 6);
    assert_eq!(supply.first(), Some(&inlet));
    assert_eq!(supply.last(), Some(&outlet));
    assert_eq!(model.supply_fan(air_loop), Some(fan));
    model.check_invariants().unwrap();

    model.remove(coil).unwrap();
    model.remove(fan).unwrap();
    assert_eq!(model.supply_components(air_loop, None), vec![inlet, outlet]);
    assert_eq!(model.registry().connections_of(inlet), before);
    model.check_invariants().unwrap();
}

#[test]
fn fans_do_not_go_on_the_demand_side() {
    let mut model = Model::new();
    let (_, placeholder) = air_loop(&mut model);
    let fan = model.add_equipment(StraightKind::FanConstantVolume);
    assert!(matches!(
        model.add_to_node(fan, placeholder),
        Err(TopologyError::Placement { .. })
    ));
}

#[test]
fn zone_branch_counts() {
    let mut model = Model::new();
    let (air_loop, _) = air_loop(&mut model);

    let bare = model.add_thermal_zone();
    model.add_branch_for_zone(air_loop, bare, None).unwrap();
    assert_eq!(model.demand_components(air_loop, None).len(), 7);
    model.remove_branch_for_zone(air_loop, bare).unwrap();

    let first = model.add_thermal_zone();
    let terminal = model.add_terminal(TerminalKind::ConstantVolumeNoReheat);
    model.add_branch_for_zone(air_loop, first, Some(terminal)).unwrap();
    assert_eq!(model.demand_components(air_loop, None).len(), 9);
    assert_eq!(model.terminal_zone(terminal), Some(first));
    assert_eq!(model.zone_equipment(first), vec![terminal]);

    // The second branch gets a copy of the first branch's terminal
    let second = model.add_thermal_zone();
    model.add_branch_for_zone(air_loop, second, None).unwrap();
    assert_eq!(model.demand_components(air_loop, None).len(), 14);
    assert_eq!(model.thermal_zones(air_loop), vec![first, second]);
    let cloned = model.zone_equipment(second);
    assert_eq!(cloned.len(), 1);
    assert_ne!(cloned[0], terminal);
    assert_eq!(
        model.kind_of(cloned[0]).unwrap(),
        ObjectKind::Terminal(TerminalKind::ConstantVolumeNoReheat)
    );
    model.check_invariants().unwrap();
}

#[test]
fn zone_cannot_join_two_loops() {
    let mut model = Model::new();
    let (first, _) = air_loop(&mut model);
    let second = model.add_air_loop("AHU 2", false);
    let zone = model.add_thermal_zone();
    model.add_branch_for_zone(first, zone, None).unwrap();

    let objects = model.len();
    assert_eq!(
        model.add_branch_for_zone(second, zone, None),
        Err(TopologyError::ZoneAlreadyServed {
            zone,
            air_loop: first
        })
    );
    assert_eq!(model.len(), objects);
    assert_eq!(
        model.remove_branch_for_zone(second, zone),
        Err(TopologyError::ZoneNotOnLoop {
            zone,
            air_loop: second
        })
    );
}

#[test]
fn plenum_zones_cannot_take_a_branch() {
    let mut model = Model::new();
    let (air_loop, _) = air_loop(&mut model);
    let plenum = model.add_plenum_zone();
    assert_eq!(
        model.add_branch_for_zone(air_loop, plenum, None),
        Err(TopologyError::PlenumZone { zone: plenum })
    );
}

#[test]
fn removing_a_branch_with_return_plenum_keeps_mixer_contiguous() {
    let mut model = Model::new();
    let (air_loop, _) = air_loop(&mut model);
    let plenum_zone = model.add_plenum_zone();
    let zones: Vec<Handle> = (0..3).map(|_| model.add_thermal_zone()).collect();
    for &zone in &zones {
        let terminal = model.add_terminal(TerminalKind::VavReheat);
        model.add_branch_for_zone(air_loop, zone, Some(terminal)).unwrap();
    }
    let mixer = model.zone_mixer(air_loop).unwrap();
    assert_eq!(model.branch_count(mixer), 3);

    model.set_return_plenum(zones[1], plenum_zone).unwrap();
    let plenum = model.return_plenum(zones[1]).unwrap();
    assert_eq!(model.branch_count(mixer), 3);
    model.check_invariants().unwrap();

    model.remove_branch_for_zone(air_loop, zones[1]).unwrap();
    assert!(!model.contains(plenum));
    assert_eq!(model.branch_count(mixer), 2);
    assert_eq!(model.thermal_zones(air_loop), vec![zones[0], zones[2]]);
    assert!(model.inlet_objects(mixer).iter().all(|&h| model.contains(h)));
    model.check_invariants().unwrap();
}

#[test]
fn dual_duct_loop_shape() {
    let mut model = Model::new();
    let air_loop = model.add_air_loop("DD", true);
    assert!(model.is_dual_duct(air_loop));
    assert_eq!(model.zone_splitters(air_loop).len(), 2);
    assert_eq!(model.demand_inlet_nodes(air_loop).len(), 2);
    assert_eq!(model.supply_outlet_nodes(air_loop).len(), 2);
    assert_eq!(model.supply_components(air_loop, None).len(), 4);
    assert_eq!(
        model
            .supply_components(air_loop, Some(ObjectKind::ConnectorSplitter))
            .len(),
        1
    );
    model.check_invariants().unwrap();
}

fn assert_induced_air_from_exhaust(model: &Model, terminal: Handle, zone: Handle) {
    let exhaust = model.exhaust_port_list(zone).unwrap();
    let induced = model.induced_air_inlet_node(terminal);
    assert!(induced.is_some());
    assert_eq!(induced, model.port_list_last_object(exhaust));
    assert_eq!(
        model.connected_object(induced.unwrap(), hf_components::Node::OUTLET),
        Some(terminal)
    );
}

#[test]
fn induced_air_with_terminal_added_first() {
    let mut model = Model::new();
    let (_, placeholder) = air_loop(&mut model);
    let terminal = model.add_terminal(TerminalKind::SeriesPiuReheat);
    let zone = model.add_thermal_zone();
    assert!(model.exhaust_port_list(zone).is_none());

    model.add_to_node(terminal, placeholder).unwrap();
    // No zone yet, so nothing to draw induced air from
    assert_eq!(model.induced_air_inlet_node(terminal), None);
    let outlet_node = model
        .connected_object(terminal, AirTerminal::OUTLET)
        .unwrap();
    model.add_to_node(zone, outlet_node).unwrap();

    assert_induced_air_from_exhaust(&model, terminal, zone);
    model.check_invariants().unwrap();
}

#[test]
fn induced_air_with_zone_added_first() {
    let mut model = Model::new();
    let (air_loop, _) = air_loop(&mut model);
    let terminal = model.add_terminal(TerminalKind::SeriesPiuReheat);
    let zone = model.add_thermal_zone();

    model.add_branch_for_zone(air_loop, zone, None).unwrap();
    assert!(model.exhaust_port_list(zone).is_none());
    let inlet_node = model.zone_inlet_nodes(zone)[0];
    model.add_to_node(terminal, inlet_node).unwrap();

    assert_induced_air_from_exhaust(&model, terminal, zone);
    assert_eq!(model.terminal_zone(terminal), Some(zone));
    model.check_invariants().unwrap();
}

#[test]
fn removing_an_induction_terminal_frees_the_exhaust_port() {
    let mut model = Model::new();
    let (air_loop, _) = air_loop(&mut model);
    let terminal = model.add_terminal(TerminalKind::ParallelPiuReheat);
    let zone = model.add_thermal_zone();
    model.add_branch_for_zone(air_loop, zone, Some(terminal)).unwrap();
    let exhaust = model.exhaust_port_list(zone).unwrap();
    let induced = model.induced_air_inlet_node(terminal).unwrap();
    assert_eq!(model.port_list_objects(exhaust), vec![induced]);

    model.remove(terminal).unwrap();
    assert!(model.port_list_objects(exhaust).is_empty());
    assert!(!model.contains(induced));
    assert!(model.zone_equipment(zone).is_empty());
    assert_eq!(model.thermal_zones(air_loop), vec![zone]);
    model.check_invariants().unwrap();
}

#[test]
fn removing_a_zone_takes_its_branch_and_port_lists() {
    let mut model = Model::new();
    let (air_loop, _) = air_loop(&mut model);
    let zone = model.add_thermal_zone();
    let terminal = model.add_terminal(TerminalKind::FourPipeInduction);
    model.add_branch_for_zone(air_loop, zone, Some(terminal)).unwrap();
    let inlet_list = model.inlet_port_list(zone).unwrap();
    let exhaust_list = model.exhaust_port_list(zone).unwrap();

    model.remove(zone).unwrap();
    assert!(!model.contains(zone));
    assert!(!model.contains(inlet_list));
    assert!(!model.contains(exhaust_list));
    assert!(!model.contains(terminal));
    assert_eq!(model.demand_components(air_loop, None).len(), 5);
    model.check_invariants().unwrap();
}

#[test]
fn removing_an_air_loop_restitches_its_water_coils() {
    let mut model = Model::new();
    let (air_loop, _) = air_loop(&mut model);
    let plant = model.add_plant_loop("HW");
    let coil = model.add_water_coil(WaterCoilKind::Heating);
    let outlet = model.supply_outlet_nodes(air_loop)[0];
    model.add_to_node(coil, outlet).unwrap();
    model.add_demand_branch_for_component(plant, coil).unwrap();
    assert_eq!(model.air_loop_of(coil), Some(air_loop));
    assert_eq!(model.plant_loop_of(coil), Some(plant));
    assert!(model.registry().is_connected(coil, WaterCoil::WATER_OUTLET));

    let zone = model.add_thermal_zone();
    model.add_branch_for_zone(air_loop, zone, None).unwrap();

    model.remove(air_loop).unwrap();
    assert!(!model.contains(air_loop));
    assert!(!model.contains(coil));
    assert!(model.contains(zone));
    assert_eq!(model.demand_components(plant, None).len(), 5);
    assert!(model.is_demand_branch_empty(plant));
    assert!(model.is_branch_graph_acyclic());
    model.check_invariants().unwrap();
}
