//! Supply and return plenums shared between zone branches.

use hf_components::{ObjectKind, TerminalKind};
use hf_core::Handle;
use hf_model::{Model, TopologyError};

struct Office {
    model: Model,
    air_loop: Handle,
    zones: Vec<Handle>,
    terminals: Vec<Handle>,
    ceiling: Handle,
}

fn office(terminal: TerminalKind) -> Office {
    let mut model = Model::new();
    let air_loop = model.add_air_loop("AHU", false);
    let ceiling = model.add_plenum_zone();
    let mut zones = Vec::new();
    let mut terminals = Vec::new();
    for _ in 0..2 {
        let zone = model.add_thermal_zone();
        let t = model.add_terminal(terminal);
        model.add_branch_for_zone(air_loop, zone, Some(t)).unwrap();
        zones.push(zone);
        terminals.push(t);
    }
    Office {
        model,
        air_loop,
        zones,
        terminals,
        ceiling,
    }
}

#[test]
fn supply_plenum_is_shared() {
    let Office {
        mut model,
        air_loop,
        zones,
        ceiling,
        ..
    } = office(TerminalKind::VavReheat);
    let splitter = model.zone_splitters(air_loop)[0];

    model.set_supply_plenum(zones[0], ceiling).unwrap();
    model.set_supply_plenum(zones[1], ceiling).unwrap();
    let plenum = model.supply_plenum(zones[0]).unwrap();
    assert_eq!(model.supply_plenum(zones[1]), Some(plenum));
    assert_eq!(model.plenum_zone_of(plenum), Some(ceiling));
    assert_eq!(model.branch_count(splitter), 1);
    assert_eq!(model.branch_count(plenum), 2);
    assert_eq!(model.zones_served_by_plenum(plenum), zones);
    assert_eq!(model.thermal_zones(air_loop), zones);
    model.check_invariants().unwrap();

    // Setting the same plenum again changes nothing
    let before = model.registry().clone();
    model.set_supply_plenum(zones[1], ceiling).unwrap();
    assert_eq!(model.registry(), &before);

    model.remove_supply_plenum(zones[0]).unwrap();
    assert_eq!(model.supply_plenum(zones[0]), None);
    assert_eq!(model.branch_count(splitter), 2);
    assert_eq!(model.branch_count(plenum), 1);
    model.check_invariants().unwrap();

    model.remove_supply_plenum(zones[1]).unwrap();
    assert!(!model.contains(plenum));
    assert_eq!(model.branch_count(splitter), 2);
    assert!(model.objects_of_kind(ObjectKind::SupplyPlenum).is_empty());
    model.check_invariants().unwrap();
}

#[test]
fn return_plenum_takes_induced_air() {
    let Office {
        mut model,
        air_loop,
        zones,
        terminals,
        ceiling,
    } = office(TerminalKind::SeriesPiuReheat);
    let mixer = model.zone_mixer(air_loop).unwrap();

    model.set_return_plenum(zones[0], ceiling).unwrap();
    model.set_return_plenum(zones[1], ceiling).unwrap();
    let plenum = model.return_plenum(zones[0]).unwrap();
    assert_eq!(model.return_plenum(zones[1]), Some(plenum));
    assert_eq!(model.branch_count(mixer), 1);

    let induced = model.induced_air_port_list(plenum).unwrap();
    assert_eq!(model.port_list_owner(induced), Some(plenum));
    let feeds = model.port_list_objects(induced);
    assert_eq!(feeds.len(), 2);
    for &terminal in &terminals {
        let node = model.induced_air_inlet_node(terminal).unwrap();
        assert!(feeds.contains(&node));
    }
    for &zone in &zones {
        let exhaust = model.exhaust_port_list(zone).unwrap();
        assert!(model.port_list_objects(exhaust).is_empty());
    }
    model.check_invariants().unwrap();

    model.remove_return_plenum(zones[0]).unwrap();
    let exhaust = model.exhaust_port_list(zones[0]).unwrap();
    assert_eq!(
        model.induced_air_inlet_node(terminals[0]),
        model.port_list_last_object(exhaust)
    );
    assert_eq!(model.port_list_objects(induced).len(), 1);
    assert_eq!(model.branch_count(mixer), 2);
    model.check_invariants().unwrap();
}

#[test]
fn removing_a_plenum_restores_every_branch() {
    let Office {
        mut model,
        air_loop,
        zones,
        terminals,
        ceiling,
    } = office(TerminalKind::ParallelPiuReheat);
    let mixer = model.zone_mixer(air_loop).unwrap();
    for &zone in &zones {
        model.set_return_plenum(zone, ceiling).unwrap();
    }
    let plenum = model.return_plenum(zones[0]).unwrap();

    model.remove(plenum).unwrap();
    assert!(!model.contains(plenum));
    assert_eq!(model.branch_count(mixer), 2);
    for (&zone, &terminal) in zones.iter().zip(&terminals) {
        assert_eq!(model.return_plenum(zone), None);
        let exhaust = model.exhaust_port_list(zone).unwrap();
        assert_eq!(
            model.induced_air_inlet_node(terminal),
            model.port_list_last_object(exhaust)
        );
    }
    model.check_invariants().unwrap();
}

#[test]
fn plenum_zones_are_checked() {
    let Office {
        mut model,
        zones,
        ceiling,
        ..
    } = office(TerminalKind::VavReheat);
    let before = model.registry().clone();

    assert_eq!(
        model.set_supply_plenum(zones[0], zones[1]),
        Err(TopologyError::NotPlenum { zone: zones[1] })
    );
    assert_eq!(
        model.set_return_plenum(ceiling, ceiling),
        Err(TopologyError::PlenumZone { zone: ceiling })
    );
    let loose = model.add_thermal_zone();
    assert!(matches!(
        model.set_return_plenum(loose, ceiling),
        Err(TopologyError::Precondition { .. })
    ));
    assert_eq!(model.registry(), &before);

    model.set_return_plenum(zones[0], ceiling).unwrap();
    assert_eq!(
        model.remove(ceiling),
        Err(TopologyError::InUse { handle: ceiling })
    );
}

#[test]
fn no_terminal_is_cloned_past_a_plenum() {
    let Office {
        mut model,
        air_loop,
        zones,
        ceiling,
        ..
    } = office(TerminalKind::VavReheat);
    model.set_supply_plenum(zones[0], ceiling).unwrap();
    model.set_supply_plenum(zones[1], ceiling).unwrap();

    let third = model.add_thermal_zone();
    model.add_branch_for_zone(air_loop, third, None).unwrap();
    assert!(model.zone_equipment(third).is_empty());
    assert_eq!(model.supply_plenum(third), None);
    model.check_invariants().unwrap();
}

#[test]
fn supply_plenum_on_a_node() {
    let mut model = Model::new();
    let air_loop = model.add_air_loop("AHU", false);
    let ceiling = model.add_plenum_zone();
    let zone = model.add_thermal_zone();
    model.add_branch_for_zone(air_loop, zone, None).unwrap();
    let node = model.zone_inlet_nodes(zone)[0];

    let plenum = model.add_supply_plenum(ceiling).unwrap();
    model.add_to_node(plenum, node).unwrap();
    assert_eq!(model.supply_plenum(zone), Some(plenum));
    assert_eq!(model.zones_served_by_plenum(plenum), vec![zone]);
    model.check_invariants().unwrap();

    // Already attached
    assert!(matches!(
        model.add_to_node(plenum, node),
        Err(TopologyError::AlreadyConnected { .. })
    ));
}
