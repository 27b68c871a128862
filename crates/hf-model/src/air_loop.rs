//! Air loops: skeletons, side queries and zone branches.
//!
//! The side queries work on plant loops too; plant-only editing lives in
//! `plant_loop`.

use std::collections::HashSet;

use hf_components::{
    AirLoop, Component, ConnectorKind, LoopKind, LoopPorts, Mixer, Node, ObjectKind, Splitter,
    ThermalZone,
};
use hf_core::Handle;
use hf_graph::Endpoint;
use tracing::debug;

use crate::error::{TopologyError, TopologyResult};
use crate::model::{Model, validated};

impl Model {
    /// New air loop with an empty supply side and one placeholder branch.
    ///
    /// Supply: `inlet node -> outlet node`, or for dual duct
    /// `inlet node -> splitter -> outlet nodes A and B`. Demand: each inlet
    /// node feeds its own zone splitter, all splitters share one zone mixer.
    pub fn add_air_loop(&mut self, name: impl Into<String>, dual_duct: bool) -> Handle {
        let air = AirLoop::new(name, dual_duct);
        let ports = air.ports();
        let air_loop = self.insert(Component::AirLoop(air));
        let loop_name = self.name(air_loop).unwrap_or_default().to_owned();
        let suffixes: &[&str] = if dual_duct { &[" A", " B"] } else { &[""] };

        let supply_inlet = self.insert_named_node(format!("{loop_name} Supply Inlet Node"));
        self.link(
            Endpoint::new(air_loop, ports.supply_inlet),
            Endpoint::new(supply_inlet, Node::INLET),
        );
        if dual_duct {
            let splitter = self.insert(Component::Splitter(Splitter::new(
                format!("{loop_name} Supply Splitter"),
                ConnectorKind::Connector,
            )));
            self.link(
                Endpoint::new(supply_inlet, Node::OUTLET),
                Endpoint::new(splitter, Splitter::INLET),
            );
            for (port, suffix) in ports.supply_outlets.iter().zip(suffixes) {
                let outlet =
                    self.insert_named_node(format!("{loop_name} Supply Outlet Node{suffix}"));
                self.append_outlet_branch(splitter, Endpoint::new(outlet, Node::INLET));
                self.link(
                    Endpoint::new(outlet, Node::OUTLET),
                    Endpoint::new(air_loop, *port),
                );
            }
        } else {
            let outlet = self.insert_named_node(format!("{loop_name} Supply Outlet Node"));
            self.link(
                Endpoint::new(supply_inlet, Node::OUTLET),
                Endpoint::new(outlet, Node::INLET),
            );
            self.link(
                Endpoint::new(outlet, Node::OUTLET),
                Endpoint::new(air_loop, ports.supply_outlets[0]),
            );
        }

        let mixer = self.insert(Component::Mixer(Mixer::new(
            format!("{loop_name} Zone Mixer"),
            ConnectorKind::Zone,
        )));
        let demand_outlet = self.insert_named_node(format!("{loop_name} Demand Outlet Node"));
        self.link(
            Endpoint::new(mixer, Mixer::OUTLET),
            Endpoint::new(demand_outlet, Node::INLET),
        );
        self.link(
            Endpoint::new(demand_outlet, Node::OUTLET),
            Endpoint::new(air_loop, ports.demand_outlet),
        );
        for (port, suffix) in ports.demand_inlets.iter().zip(suffixes) {
            let inlet = self.insert_named_node(format!("{loop_name} Demand Inlet Node{suffix}"));
            self.link(
                Endpoint::new(air_loop, *port),
                Endpoint::new(inlet, Node::INLET),
            );
            let splitter = self.insert(Component::Splitter(Splitter::new(
                format!("{loop_name} Zone Splitter{suffix}"),
                ConnectorKind::Zone,
            )));
            self.link(
                Endpoint::new(inlet, Node::OUTLET),
                Endpoint::new(splitter, Splitter::INLET),
            );
            self.branch_node(splitter, mixer);
        }

        debug!(%air_loop, name = %loop_name, dual_duct, "add air loop");
        air_loop
    }

    pub fn air_loops(&self) -> Vec<Handle> {
        self.objects_of_kind(ObjectKind::AirLoop)
    }

    pub fn is_dual_duct(&self, air_loop: Handle) -> bool {
        self.objects
            .get(&air_loop)
            .and_then(Component::as_air_loop)
            .is_some_and(|l| l.dual_duct)
    }

    fn ports_of_loop(&self, loop_handle: Handle) -> Option<LoopPorts> {
        self.objects.get(&loop_handle)?.loop_ports()
    }

    pub fn supply_inlet_node(&self, loop_handle: Handle) -> Option<Handle> {
        let ports = self.ports_of_loop(loop_handle)?;
        self.connected_object(loop_handle, ports.supply_inlet)
    }

    /// One node for single-duct air and plant loops, two for dual duct.
    pub fn supply_outlet_nodes(&self, loop_handle: Handle) -> Vec<Handle> {
        let Some(ports) = self.ports_of_loop(loop_handle) else {
            return Vec::new();
        };
        ports
            .supply_outlets
            .iter()
            .filter_map(|&port| self.connected_object(loop_handle, port))
            .collect()
    }

    pub fn demand_inlet_nodes(&self, loop_handle: Handle) -> Vec<Handle> {
        let Some(ports) = self.ports_of_loop(loop_handle) else {
            return Vec::new();
        };
        ports
            .demand_inlets
            .iter()
            .filter_map(|&port| self.connected_object(loop_handle, port))
            .collect()
    }

    pub fn demand_outlet_node(&self, loop_handle: Handle) -> Option<Handle> {
        let ports = self.ports_of_loop(loop_handle)?;
        self.connected_object(loop_handle, ports.demand_outlet)
    }

    /// Supply side objects from the inlet node to the outlet node(s), in flow order.
    pub fn supply_components(&self, loop_handle: Handle, kind: Option<ObjectKind>) -> Vec<Handle> {
        let Some(inlet) = self.supply_inlet_node(loop_handle) else {
            return Vec::new();
        };
        self.walk_union(&[inlet], &self.supply_outlet_nodes(loop_handle), kind)
    }

    /// Demand side objects from the inlet node(s) to the outlet node, in flow order.
    pub fn demand_components(&self, loop_handle: Handle, kind: Option<ObjectKind>) -> Vec<Handle> {
        let Some(outlet) = self.demand_outlet_node(loop_handle) else {
            return Vec::new();
        };
        self.walk_union(&self.demand_inlet_nodes(loop_handle), &[outlet], kind)
    }

    fn walk_union(&self, starts: &[Handle], ends: &[Handle], kind: Option<ObjectKind>) -> Vec<Handle> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for &start in starts {
            for &end in ends {
                for object in self.components_between(start, end, kind) {
                    if seen.insert(object) {
                        found.push(object);
                    }
                }
            }
        }
        found
    }

    /// Zone splitter behind each demand inlet node.
    pub fn zone_splitters(&self, air_loop: Handle) -> Vec<Handle> {
        self.demand_inlet_nodes(air_loop)
            .into_iter()
            .filter_map(|node| self.outlet_object(node))
            .filter(|&s| self.is_kind(s, ObjectKind::ZoneSplitter))
            .collect()
    }

    pub fn zone_mixer(&self, air_loop: Handle) -> Option<Handle> {
        self.demand_outlet_node(air_loop)
            .and_then(|node| self.inlet_object(node))
            .filter(|&m| self.is_kind(m, ObjectKind::ZoneMixer))
    }

    /// Zones on the demand side, in branch order.
    pub fn thermal_zones(&self, air_loop: Handle) -> Vec<Handle> {
        self.demand_components(air_loop, Some(ObjectKind::ThermalZone))
    }

    pub fn supply_fan(&self, air_loop: Handle) -> Option<Handle> {
        self.supply_components(air_loop, None)
            .into_iter()
            .find(|&h| matches!(self.kind_of(h), Ok(ObjectKind::Equipment(kind)) if kind.is_fan()))
    }

    /// Zone splitter whose branches lead to `zone`.
    pub(crate) fn zone_splitter_for(&self, zone: Handle) -> Handle {
        let splitter = self.air_loop_of(zone).and_then(|air_loop| {
            self.zone_splitters(air_loop)
                .into_iter()
                .find(|&s| self.branch_leading_to(s, zone).is_some())
        });
        match splitter {
            Some(splitter) => splitter,
            None => panic!("zone {zone} is not fed by a zone splitter"),
        }
    }

    fn single_duct_pair(&self, air_loop: Handle) -> TopologyResult<(Handle, Handle)> {
        self.expect_kind(air_loop, "air loop", |k| k == ObjectKind::AirLoop)?;
        if self.is_dual_duct(air_loop) {
            return Err(TopologyError::Unsupported {
                what: "zone branches on dual-duct air loops",
            });
        }
        let splitter = self.zone_splitters(air_loop).first().copied();
        match (splitter, self.zone_mixer(air_loop)) {
            (Some(splitter), Some(mixer)) => Ok((splitter, mixer)),
            _ => Err(TopologyError::Inconsistent {
                what: format!("air loop {air_loop} has no zone splitter and mixer"),
            }),
        }
    }

    /// Add a demand branch serving `zone`, optionally through `terminal`.
    ///
    /// Without a terminal, the terminal on the last branch is cloned when
    /// that branch has one and no plenums.
    pub fn add_branch_for_zone(
        &mut self,
        air_loop: Handle,
        zone: Handle,
        terminal: Option<Handle>,
    ) -> TopologyResult<()> {
        let result = self.try_add_branch_for_zone(air_loop, zone, terminal);
        match &result {
            Ok(()) => debug!(%air_loop, %zone, "add zone branch"),
            Err(err) => debug!(%air_loop, %zone, %err, "add zone branch rejected"),
        }
        result
    }

    fn try_add_branch_for_zone(
        &mut self,
        air_loop: Handle,
        zone: Handle,
        terminal: Option<Handle>,
    ) -> TopologyResult<()> {
        let (splitter, mixer) = self.single_duct_pair(air_loop)?;
        let z = self.expect_zone(zone)?;
        if z.is_plenum {
            return Err(TopologyError::PlenumZone { zone });
        }
        if let Some(served_by) = self.air_loop_of(zone) {
            return Err(TopologyError::ZoneAlreadyServed {
                zone,
                air_loop: served_by,
            });
        }
        let has_inlets = z
            .inlet_port_list
            .is_some_and(|list| !self.port_list_objects(list).is_empty());
        if has_inlets || self.registry.is_connected(zone, ThermalZone::RETURN_AIR) {
            return Err(TopologyError::AlreadyConnected { handle: zone });
        }
        if let Some(terminal) = terminal {
            self.expect_unattached_terminal(terminal)?;
        }

        let terminal = match terminal {
            Some(terminal) => Some(terminal),
            None => self
                .terminal_to_clone(splitter, mixer)
                .map(|t| validated(self.clone_component(t), "terminal clone")),
        };
        let node = self.branch_node(splitter, mixer);
        let plan = validated(self.plan_zone(zone, node), "zone branch");
        self.apply_zone(zone, node, plan);
        if let Some(terminal) = terminal {
            let plan = validated(self.plan_terminal(terminal, node), "zone branch terminal");
            self.apply_terminal(terminal, node, plan);
        }
        Ok(())
    }

    /// Add a demand branch holding only `terminal`.
    pub fn add_branch_for_component(&mut self, air_loop: Handle, terminal: Handle) -> TopologyResult<()> {
        let (splitter, mixer) = self.single_duct_pair(air_loop)?;
        self.expect_unattached_terminal(terminal)?;
        let node = self.branch_node(splitter, mixer);
        let plan = validated(self.plan_terminal(terminal, node), "terminal branch");
        self.apply_terminal(terminal, node, plan);
        debug!(%air_loop, %terminal, "add terminal branch");
        Ok(())
    }

    fn expect_unattached_terminal(&self, terminal: Handle) -> TopologyResult<()> {
        self.expect_kind(terminal, "air terminal", ObjectKind::is_terminal)?;
        let connected = self
            .component(terminal)?
            .fixed_ports()
            .into_iter()
            .any(|port| self.registry.is_connected(terminal, port));
        if connected {
            return Err(TopologyError::AlreadyConnected { handle: terminal });
        }
        Ok(())
    }

    /// Terminal on the last branch, unless that branch goes through a plenum.
    fn terminal_to_clone(&self, splitter: Handle, mixer: Handle) -> Option<Handle> {
        let first = self.last_outlet_object(splitter)?;
        let branch = self.components_between(first, mixer, None);
        let through_plenum = branch
            .iter()
            .any(|&h| self.kind_of(h).is_ok_and(ObjectKind::is_plenum));
        if through_plenum {
            return None;
        }
        branch
            .into_iter()
            .find(|&h| self.kind_of(h).is_ok_and(ObjectKind::is_terminal))
    }

    /// Remove the branch serving `zone`: its plenums, terminal and nodes.
    ///
    /// The zone itself stays in the model, unconnected.
    pub fn remove_branch_for_zone(&mut self, air_loop: Handle, zone: Handle) -> TopologyResult<()> {
        self.expect_kind(air_loop, "air loop", |k| k == ObjectKind::AirLoop)?;
        self.expect_zone(zone)?;
        if self.air_loop_of(zone) != Some(air_loop) {
            return Err(TopologyError::ZoneNotOnLoop { zone, air_loop });
        }
        self.detach_zone_branch(air_loop, zone);
        debug!(%air_loop, %zone, "remove zone branch");
        Ok(())
    }

    pub(crate) fn detach_zone_branch(&mut self, air_loop: Handle, zone: Handle) {
        self.detach_supply_plenum(zone);
        self.detach_return_plenum(zone);

        let splitter = self.zone_splitter_for(zone);
        let Some(mixer) = self.zone_mixer(air_loop) else {
            panic!("air loop {air_loop} has no zone mixer");
        };
        let (Some(s_index), Some(m_index)) = (
            self.branch_leading_to(splitter, zone),
            self.branch_leading_from(mixer, zone),
        ) else {
            panic!("zone {zone} has no branch on air loop {air_loop}");
        };
        let first = self.outlet_object_for_branch(splitter, s_index);
        let last = self.inlet_object_for_branch(mixer, m_index);
        let mut doomed = Vec::new();
        if let (Some(first), Some(last)) = (first, last) {
            doomed.extend(self.components_between(first, zone, None));
            doomed.extend(self.components_between(zone, last, None));
        }
        doomed.retain(|&h| h != zone);
        doomed.dedup();

        validated(self.compact_branch(splitter, s_index), "zone splitter branch");
        validated(self.compact_branch(mixer, m_index), "zone mixer branch");
        for &object in &doomed {
            if self.kind_of(object).is_ok_and(ObjectKind::is_terminal) {
                self.detach_terminal_extras(object);
            }
        }
        if let Some(list) = self.inlet_port_list(zone) {
            let fed_by_branch: Vec<usize> = self
                .port_list_objects(list)
                .iter()
                .enumerate()
                .filter(|(_, h)| doomed.contains(h))
                .map(|(i, _)| i)
                .collect();
            for index in fed_by_branch.into_iter().rev() {
                validated(self.compact_branch(list, index), "zone inlet branch");
            }
        }
        self.unlink(zone, ThermalZone::RETURN_AIR);
        for object in doomed {
            self.delete_object(object);
        }

        if self.branch_count(splitter) == 0 {
            self.branch_node(splitter, mixer);
        }
    }

    /// Tear down a loop and everything on it.
    ///
    /// Zones are detached and kept. Water coils on a plant loop only lose
    /// their water connections; anything else spliced on the loop is removed.
    pub(crate) fn remove_loop(&mut self, loop_handle: Handle) {
        let loop_kind = self.loop_kind(loop_handle);
        if loop_kind == Some(LoopKind::Air) {
            for zone in self.thermal_zones(loop_handle) {
                self.detach_zone_branch(loop_handle, zone);
            }
        }

        let mut spliced = self.supply_components(loop_handle, None);
        spliced.extend(self.demand_components(loop_handle, None));
        for object in spliced {
            // Earlier removals may already have taken it
            let Ok(kind) = self.kind_of(object) else {
                continue;
            };
            match kind {
                ObjectKind::WaterCoil(_) if loop_kind == Some(LoopKind::Plant) => {
                    if let Some((inlet, outlet)) = self.port_pair(object, LoopKind::Plant) {
                        self.unsplice(object, inlet, outlet);
                    }
                }
                ObjectKind::Equipment(_) | ObjectKind::WaterCoil(_) | ObjectKind::Terminal(_) => {
                    self.remove_spliced(object);
                }
                _ => {}
            }
        }

        let mut rest = self.supply_components(loop_handle, None);
        rest.extend(self.demand_components(loop_handle, None));
        for object in rest {
            self.delete_object(object);
        }
        self.delete_object(loop_handle);
        debug!(loop_handle = %loop_handle, "remove loop");
    }
}
