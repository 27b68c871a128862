//! Zones, their port lists, and the terminals that serve them.

use hf_components::{
    AirTerminal, Component, LoopKind, LoopSide, Node, ObjectKind, PortList, PortListRole,
    ThermalZone,
};
use hf_core::Handle;
use hf_graph::Endpoint;
use tracing::debug;

use crate::error::{TopologyError, TopologyResult};
use crate::model::Model;

/// Where a zone joins its branch, worked out before anything is rewired.
pub(crate) struct ZonePlan {
    /// Mixer inlet the target node feeds today.
    mixer: Endpoint,
    /// Terminal directly upstream of the target node.
    terminal: Option<Handle>,
}

impl Model {
    pub fn inlet_port_list(&self, zone: Handle) -> Option<Handle> {
        self.zone_ref(zone)?.inlet_port_list
    }

    pub fn exhaust_port_list(&self, zone: Handle) -> Option<Handle> {
        self.zone_ref(zone)?.exhaust_port_list
    }

    pub fn induced_air_port_list(&self, return_plenum: Handle) -> Option<Handle> {
        self.objects
            .get(&return_plenum)?
            .as_return_plenum()?
            .induced_air
    }

    /// The zone's inlet port list, created on first use.
    pub fn get_or_create_inlet_port_list(&mut self, zone: Handle) -> TopologyResult<Handle> {
        self.expect_zone(zone)?;
        Ok(self.ensure_port_list(zone, PortListRole::ZoneInlet))
    }

    /// The zone's exhaust port list, created on first use.
    pub fn get_or_create_exhaust_port_list(&mut self, zone: Handle) -> TopologyResult<Handle> {
        self.expect_zone(zone)?;
        Ok(self.ensure_port_list(zone, PortListRole::ZoneExhaust))
    }

    /// A return plenum's induced-air port list, created on first use.
    pub fn get_or_create_induced_air_port_list(
        &mut self,
        return_plenum: Handle,
    ) -> TopologyResult<Handle> {
        self.expect_kind(return_plenum, "return plenum", |k| {
            k == ObjectKind::ReturnPlenum
        })?;
        Ok(self.ensure_port_list(return_plenum, PortListRole::PlenumInducedAir))
    }

    /// Objects connected on a port list, in port order.
    pub fn port_list_objects(&self, port_list: Handle) -> Vec<Handle> {
        match self.objects.get(&port_list).and_then(Component::as_port_list) {
            Some(list) => self.registry.branch_objects(port_list, list.layout()),
            None => Vec::new(),
        }
    }

    pub fn port_list_last_object(&self, port_list: Handle) -> Option<Handle> {
        self.port_list_objects(port_list).last().copied()
    }

    /// Equipment serving `zone`, in attachment order.
    pub fn zone_equipment(&self, zone: Handle) -> Vec<Handle> {
        self.zone_ref(zone)
            .map(|z| z.equipment.clone())
            .unwrap_or_default()
    }

    /// Zone a terminal serves.
    pub fn terminal_zone(&self, terminal: Handle) -> Option<Handle> {
        self.objects
            .iter()
            .find(|(_, c)| c.as_zone().is_some_and(|z| z.equipment.contains(&terminal)))
            .map(|(h, _)| *h)
    }

    /// Node feeding a terminal's secondary inlet.
    pub fn induced_air_inlet_node(&self, terminal: Handle) -> Option<Handle> {
        let secondary = self
            .objects
            .get(&terminal)?
            .as_terminal()?
            .secondary_inlet_port()?;
        self.connected_object(terminal, secondary)
    }

    pub fn return_air_node(&self, zone: Handle) -> Option<Handle> {
        self.zone_ref(zone)?;
        self.connected_object(zone, ThermalZone::RETURN_AIR)
    }

    /// Nodes delivering supply air to `zone`.
    pub fn zone_inlet_nodes(&self, zone: Handle) -> Vec<Handle> {
        self.inlet_port_list(zone)
            .map(|list| self.port_list_objects(list))
            .unwrap_or_default()
    }

    pub(crate) fn ensure_port_list(&mut self, owner: Handle, role: PortListRole) -> Handle {
        let existing = match (self.objects.get(&owner), role) {
            (Some(Component::Zone(z)), PortListRole::ZoneInlet) => z.inlet_port_list,
            (Some(Component::Zone(z)), PortListRole::ZoneExhaust) => z.exhaust_port_list,
            (Some(Component::ReturnPlenum(p)), PortListRole::PlenumInducedAir) => p.induced_air,
            _ => panic!("object {owner} cannot own a {role:?} port list"),
        };
        if let Some(list) = existing {
            return list;
        }

        let suffix = match role {
            PortListRole::ZoneInlet => "Inlet Port List",
            PortListRole::ZoneExhaust => "Exhaust Port List",
            PortListRole::PlenumInducedAir => "Induced Air Port List",
        };
        let name = format!("{} {suffix}", self.name(owner).unwrap_or_default());
        let list = self.insert(Component::PortList(PortList::new(name, role)));
        self.owners.insert(list, owner);
        match self.objects.get_mut(&owner) {
            Some(Component::Zone(z)) if role == PortListRole::ZoneInlet => {
                z.inlet_port_list = Some(list)
            }
            Some(Component::Zone(z)) => z.exhaust_port_list = Some(list),
            Some(Component::ReturnPlenum(p)) => p.induced_air = Some(list),
            _ => {}
        }
        self.sync_references(list);
        self.sync_references(owner);
        debug!(%owner, %list, ?role, "create port list");
        list
    }

    /// The air loop whose demand side `node` is on.
    pub(crate) fn require_air_demand(
        &self,
        node: Handle,
        kind: ObjectKind,
    ) -> TopologyResult<Handle> {
        let (loop_handle, side) = self.loop_of(node).ok_or(TopologyError::NotOnLoop { node })?;
        let loop_kind = self
            .loop_kind(loop_handle)
            .ok_or(TopologyError::NotOnLoop { node })?;
        if (loop_kind, side) != (LoopKind::Air, LoopSide::Demand) {
            return Err(TopologyError::Placement {
                kind,
                loop_kind,
                side,
            });
        }
        Ok(loop_handle)
    }

    pub(crate) fn plan_zone(&self, zone: Handle, node: Handle) -> TopologyResult<ZonePlan> {
        let z = self.expect_zone(zone)?;
        if z.is_plenum {
            return Err(TopologyError::PlenumZone { zone });
        }
        let has_inlets = z
            .inlet_port_list
            .is_some_and(|list| !self.port_list_objects(list).is_empty());
        if has_inlets || self.registry.is_connected(zone, ThermalZone::RETURN_AIR) {
            return Err(match self.air_loop_of(zone) {
                Some(air_loop) => TopologyError::ZoneAlreadyServed { zone, air_loop },
                None => TopologyError::AlreadyConnected { handle: zone },
            });
        }

        let air_loop = self.require_air_demand(node, ObjectKind::ThermalZone)?;
        if self.is_dual_duct(air_loop) {
            return Err(TopologyError::Unsupported {
                what: "zones on dual-duct air loops",
            });
        }

        let mixer = self
            .downstream(node, Node::OUTLET)
            .filter(|ep| self.is_kind(ep.object, ObjectKind::ZoneMixer))
            .ok_or(TopologyError::Precondition {
                what: "a zone attaches to a node that feeds the zone mixer",
            })?;
        let upstream = self
            .upstream(node, Node::INLET)
            .ok_or(TopologyError::Precondition {
                what: "target node has no upstream connection",
            })?;
        let terminal = match self.kind_of(upstream.object)? {
            ObjectKind::ZoneSplitter | ObjectKind::SupplyPlenum => None,
            ObjectKind::Terminal(_) => Some(upstream.object),
            _ => {
                return Err(TopologyError::Precondition {
                    what: "a zone attaches downstream of a zone splitter, supply plenum or terminal",
                });
            }
        };
        Ok(ZonePlan { mixer, terminal })
    }

    /// `node -> inlet port list`, `zone return -> new node -> mixer`.
    pub(crate) fn apply_zone(&mut self, zone: Handle, node: Handle, plan: ZonePlan) {
        self.unlink(node, Node::OUTLET);
        let list = self.ensure_port_list(zone, PortListRole::ZoneInlet);
        self.append_inlet_branch(Endpoint::new(node, Node::OUTLET), list);

        let name = format!("{} Return Air Node", self.name(zone).unwrap_or_default());
        let return_node = self.insert_named_node(name);
        self.link(
            Endpoint::new(zone, ThermalZone::RETURN_AIR),
            Endpoint::new(return_node, Node::INLET),
        );
        self.link(Endpoint::new(return_node, Node::OUTLET), plan.mixer);

        if let Some(terminal) = plan.terminal {
            self.attach_terminal_to_zone(terminal, zone);
        }
        debug!(%zone, %node, "attach zone");
    }

    /// Record the terminal as zone equipment and wire its induced air.
    pub(crate) fn attach_terminal_to_zone(&mut self, terminal: Handle, zone: Handle) {
        let z = self.zone_mut(zone);
        if !z.equipment.contains(&terminal) {
            z.equipment.push(terminal);
        }

        let Some(secondary) = self.secondary_port(terminal) else {
            return;
        };
        if self.registry.is_connected(terminal, secondary) {
            return;
        }
        let source = self.induced_air_source(zone);
        let name = format!("{} Induced Air Node", self.name(terminal).unwrap_or_default());
        let node = self.insert_named_node(name);
        self.append_outlet_branch(source, Endpoint::new(node, Node::INLET));
        self.link(
            Endpoint::new(node, Node::OUTLET),
            Endpoint::new(terminal, secondary),
        );
        debug!(%terminal, %zone, induced_from = %source, "wire induced air");
    }

    /// Drop a terminal from zone equipment and remove its induced-air node.
    pub(crate) fn detach_terminal_extras(&mut self, terminal: Handle) {
        for component in self.objects.values_mut() {
            if let Component::Zone(z) = component {
                z.equipment.retain(|&h| h != terminal);
            }
        }

        let Some(secondary) = self.secondary_port(terminal) else {
            return;
        };
        let Some(feed) = self.upstream(terminal, secondary) else {
            return;
        };
        self.unlink(terminal, secondary);
        if self.is_kind(feed.object, ObjectKind::Node) {
            if let Some(source) = self.upstream(feed.object, Node::INLET) {
                self.release_branch_endpoint(source);
            }
            self.delete_object(feed.object);
        }
    }

    /// Where terminals in `zone` draw induced air from: the return plenum's
    /// induced-air list if the zone has one, else the zone's exhaust list.
    pub(crate) fn induced_air_source(&mut self, zone: Handle) -> Handle {
        match self.return_plenum(zone) {
            Some(plenum) => self.ensure_port_list(plenum, PortListRole::PlenumInducedAir),
            None => self.ensure_port_list(zone, PortListRole::ZoneExhaust),
        }
    }

    /// Move the induced-air feeds of the zone's terminals to the current source.
    pub(crate) fn rehome_induced_air(&mut self, zone: Handle) {
        for terminal in self.zone_equipment(zone) {
            let Some(node) = self.induced_air_inlet_node(terminal) else {
                continue;
            };
            let target = self.induced_air_source(zone);
            let current = self.upstream(node, Node::INLET);
            if current.is_some_and(|ep| ep.object == target) {
                continue;
            }
            if let Some(current) = current {
                self.release_branch_endpoint(current);
            }
            self.append_outlet_branch(target, Endpoint::new(node, Node::INLET));
            debug!(%terminal, %zone, to = %target, "move induced air");
        }
    }

    fn secondary_port(&self, terminal: Handle) -> Option<hf_graph::Port> {
        self.objects
            .get(&terminal)
            .and_then(Component::as_terminal)
            .and_then(AirTerminal::secondary_inlet_port)
    }

    pub(crate) fn remove_zone(&mut self, zone: Handle) -> TopologyResult<()> {
        let referenced = self.objects.values().any(|c| match c {
            Component::SupplyPlenum(p) => p.plenum_zone == zone,
            Component::ReturnPlenum(p) => p.plenum_zone == zone,
            _ => false,
        });
        if referenced {
            return Err(TopologyError::InUse { handle: zone });
        }
        if let Some(air_loop) = self.air_loop_of(zone) {
            self.detach_zone_branch(air_loop, zone);
        }
        self.delete_object(zone);
        Ok(())
    }
}
