//! Splicing components onto nodes and removing them again.
//!
//! Every edit is planned against an immutable model first; the plan is only
//! applied once every precondition holds.

use hf_components::{AirTerminal, Component, LoopKind, Node, ObjectKind, WaterCoil};
use hf_core::Handle;
use hf_graph::{Endpoint, Port};
use tracing::debug;

use crate::error::{TopologyError, TopologyResult};
use crate::model::Model;

/// Which side of the target node a straight component goes.
enum SpliceAt {
    /// `up -> new node -> component -> target`
    Upstream { up: Endpoint },
    /// `target -> component -> new node -> down`, used right after a loop inlet.
    Downstream { down: Endpoint },
}

pub(crate) struct StraightPlan {
    inlet: Port,
    outlet: Port,
    at: SpliceAt,
}

pub(crate) struct TerminalPlan {
    /// Splitter or supply plenum outlet feeding the target node.
    up: Endpoint,
    /// Zone the target node already feeds.
    zone: Option<Handle>,
}

impl Model {
    /// Splice `component` onto `node`.
    ///
    /// Straight equipment and water coils go in series next to the node;
    /// terminals go between a zone splitter and the node; zones attach to a
    /// node that feeds the zone mixer; plenums attach right after a zone
    /// splitter or a zone's return node. On `Err` nothing was changed.
    pub fn add_to_node(&mut self, component: Handle, node: Handle) -> TopologyResult<()> {
        let result = self.splice_onto(component, node);
        match &result {
            Ok(()) => debug!(%component, %node, "add to node"),
            Err(err) => debug!(%component, %node, %err, "add to node rejected"),
        }
        result
    }

    fn splice_onto(&mut self, component: Handle, node: Handle) -> TopologyResult<()> {
        let kind = self.kind_of(component)?;
        self.expect_kind(node, "node", ObjectKind::is_node)?;
        match kind {
            ObjectKind::Equipment(_) | ObjectKind::WaterCoil(_) => {
                let plan = self.plan_straight(component, node)?;
                self.apply_straight(component, node, plan);
            }
            ObjectKind::Terminal(_) => {
                let plan = self.plan_terminal(component, node)?;
                self.apply_terminal(component, node, plan);
            }
            ObjectKind::ThermalZone => {
                let plan = self.plan_zone(component, node)?;
                self.apply_zone(component, node, plan);
            }
            ObjectKind::SupplyPlenum => {
                let up = self.plan_supply_plenum(component, node)?;
                self.apply_supply_plenum(component, node, up);
            }
            ObjectKind::ReturnPlenum => {
                let (zone, mixer) = self.plan_return_plenum(component, node)?;
                self.apply_return_plenum(component, node, zone, mixer);
            }
            other => {
                return Err(TopologyError::WrongKind {
                    handle: component,
                    expected: "equipment, terminal, zone or plenum",
                    actual: other,
                });
            }
        }
        Ok(())
    }

    /// Port pair a component uses on a loop of `loop_kind`.
    pub(crate) fn port_pair(&self, component: Handle, loop_kind: LoopKind) -> Option<(Port, Port)> {
        match self.objects.get(&component)? {
            Component::WaterCoil(_) if loop_kind == LoopKind::Plant => {
                Some((WaterCoil::WATER_INLET, WaterCoil::WATER_OUTLET))
            }
            other => {
                let owner = other.port_owner();
                Some((owner.inlet_port()?, owner.outlet_port()?))
            }
        }
    }

    pub(crate) fn plan_straight(&self, component: Handle, node: Handle) -> TopologyResult<StraightPlan> {
        let kind = self.kind_of(component)?;
        let (loop_handle, side) = self.loop_of(node).ok_or(TopologyError::NotOnLoop { node })?;
        let loop_kind = self
            .loop_kind(loop_handle)
            .ok_or(TopologyError::NotOnLoop { node })?;
        if !kind.allows(loop_kind, side) {
            return Err(TopologyError::Placement {
                kind,
                loop_kind,
                side,
            });
        }
        let (inlet, outlet) = self
            .port_pair(component, loop_kind)
            .ok_or(TopologyError::Precondition {
                what: "component has no inlet and outlet pair",
            })?;
        if self.registry.is_connected(component, inlet) || self.registry.is_connected(component, outlet) {
            return Err(TopologyError::AlreadyConnected { handle: component });
        }

        let up = self
            .upstream(node, Node::INLET)
            .ok_or(TopologyError::Precondition {
                what: "target node has no upstream connection",
            })?;
        let at = if self.is_loop(up.object) {
            let down = self
                .downstream(node, Node::OUTLET)
                .ok_or(TopologyError::Precondition {
                    what: "target node has no downstream connection",
                })?;
            SpliceAt::Downstream { down }
        } else {
            SpliceAt::Upstream { up }
        };
        Ok(StraightPlan { inlet, outlet, at })
    }

    pub(crate) fn apply_straight(&mut self, component: Handle, node: Handle, plan: StraightPlan) {
        let fresh = self.add_node();
        let inlet = Endpoint::new(component, plan.inlet);
        let outlet = Endpoint::new(component, plan.outlet);
        match plan.at {
            SpliceAt::Upstream { up } => {
                self.unlink(node, Node::INLET);
                self.link(up, Endpoint::new(fresh, Node::INLET));
                self.link(Endpoint::new(fresh, Node::OUTLET), inlet);
                self.link(outlet, Endpoint::new(node, Node::INLET));
            }
            SpliceAt::Downstream { down } => {
                self.unlink(node, Node::OUTLET);
                self.link(Endpoint::new(node, Node::OUTLET), inlet);
                self.link(outlet, Endpoint::new(fresh, Node::INLET));
                self.link(Endpoint::new(fresh, Node::OUTLET), down);
            }
        }
    }

    pub(crate) fn plan_terminal(&self, terminal: Handle, node: Handle) -> TopologyResult<TerminalPlan> {
        let kind = self.kind_of(terminal)?;
        self.require_air_demand(node, kind)?;
        let connected = self
            .component(terminal)?
            .fixed_ports()
            .into_iter()
            .any(|port| self.registry.is_connected(terminal, port));
        if connected {
            return Err(TopologyError::AlreadyConnected { handle: terminal });
        }

        let up = self
            .upstream(node, Node::INLET)
            .filter(|ep| {
                matches!(
                    self.kind_of(ep.object),
                    Ok(ObjectKind::ZoneSplitter | ObjectKind::SupplyPlenum)
                )
            })
            .ok_or(TopologyError::Precondition {
                what: "a terminal attaches to a node fed by a zone splitter or supply plenum",
            })?;
        let down = self
            .downstream(node, Node::OUTLET)
            .ok_or(TopologyError::Precondition {
                what: "target node has no downstream connection",
            })?;
        let zone = match self.kind_of(down.object)? {
            ObjectKind::ZoneMixer => None,
            ObjectKind::PortList => Some(self.port_list_owner(down.object).ok_or(
                TopologyError::Inconsistent {
                    what: format!("port list {} has no owner", down.object),
                },
            )?),
            _ => {
                return Err(TopologyError::Precondition {
                    what: "a terminal attaches to a node that feeds a zone or the zone mixer",
                });
            }
        };
        Ok(TerminalPlan { up, zone })
    }

    /// `up -> new node -> terminal -> node`, then zone bookkeeping.
    pub(crate) fn apply_terminal(&mut self, terminal: Handle, node: Handle, plan: TerminalPlan) {
        let fresh = self.add_node();
        self.unlink(node, Node::INLET);
        self.link(plan.up, Endpoint::new(fresh, Node::INLET));
        self.link(
            Endpoint::new(fresh, Node::OUTLET),
            Endpoint::new(terminal, AirTerminal::INLET),
        );
        self.link(
            Endpoint::new(terminal, AirTerminal::OUTLET),
            Endpoint::new(node, Node::INLET),
        );
        if let Some(zone) = plan.zone {
            self.attach_terminal_to_zone(terminal, zone);
        }
    }

    /// Remove `object` from the model.
    ///
    /// Spliced components are taken out and their neighbours re-stitched;
    /// zones leave their loop first; loops are torn down whole. Bare nodes,
    /// splitters and mixers can only be removed once nothing is connected.
    pub fn remove(&mut self, object: Handle) -> TopologyResult<()> {
        let kind = self.kind_of(object)?;
        match kind {
            ObjectKind::Node
            | ObjectKind::ZoneSplitter
            | ObjectKind::ZoneMixer
            | ObjectKind::ConnectorSplitter
            | ObjectKind::ConnectorMixer => {
                if !self.registry.connections_of(object).is_empty() {
                    debug!(%object, %kind, "remove rejected: still connected");
                    return Err(TopologyError::InUse { handle: object });
                }
                self.delete_object(object);
            }
            ObjectKind::Equipment(_) | ObjectKind::WaterCoil(_) | ObjectKind::Terminal(_) => {
                self.remove_spliced(object);
            }
            ObjectKind::ThermalZone => self.remove_zone(object)?,
            ObjectKind::SupplyPlenum | ObjectKind::ReturnPlenum => self.remove_plenum(object),
            ObjectKind::PortList => return Err(TopologyError::InUse { handle: object }),
            ObjectKind::AirLoop | ObjectKind::PlantLoop => self.remove_loop(object),
        }
        debug!(%object, %kind, "remove");
        Ok(())
    }

    /// Take a spliced component out, re-stitch each port pair, delete it.
    pub(crate) fn remove_spliced(&mut self, component: Handle) {
        let Ok(kind) = self.kind_of(component) else {
            return;
        };
        if kind.is_terminal() {
            self.detach_terminal_extras(component);
        }
        let pairs = match self.objects.get(&component) {
            Some(Component::WaterCoil(_)) => vec![
                (WaterCoil::AIR_INLET, WaterCoil::AIR_OUTLET),
                (WaterCoil::WATER_INLET, WaterCoil::WATER_OUTLET),
            ],
            Some(other) => {
                let owner = other.port_owner();
                owner.inlet_port().zip(owner.outlet_port()).into_iter().collect()
            }
            None => Vec::new(),
        };
        for (inlet, outlet) in pairs {
            self.unsplice(component, inlet, outlet);
        }
        self.delete_object(component);
    }

    /// Disconnect one port pair and join what was on either side.
    ///
    /// One of the nodes around the component is deleted so that a single
    /// node is left between the neighbours. Nodes that sit right after a loop
    /// inlet or right before a loop outlet are kept.
    pub(crate) fn unsplice(&mut self, component: Handle, inlet: Port, outlet: Port) {
        let up = self.upstream(component, inlet);
        let down = self.downstream(component, outlet);
        self.unlink(component, inlet);
        self.unlink(component, outlet);
        let (Some(up), Some(down)) = (up, down) else {
            return;
        };

        if let Some(further_up) = self.removable_upstream_node(up.object) {
            self.unlink(up.object, Node::INLET);
            self.delete_object(up.object);
            self.link(further_up, down);
        } else if let Some(further_down) = self.removable_downstream_node(down.object) {
            self.unlink(down.object, Node::OUTLET);
            self.delete_object(down.object);
            self.link(up, further_down);
        } else {
            self.link(up, down);
        }
        debug!(%component, "unsplice");
    }

    /// What feeds `node`, when `node` may be dropped in favour of it.
    fn removable_upstream_node(&self, node: Handle) -> Option<Endpoint> {
        if !self.is_kind(node, ObjectKind::Node) {
            return None;
        }
        self.upstream(node, Node::INLET)
            .filter(|ep| !self.is_loop(ep.object))
    }

    /// What `node` feeds, when `node` may be dropped in favour of it.
    fn removable_downstream_node(&self, node: Handle) -> Option<Endpoint> {
        if !self.is_kind(node, ObjectKind::Node) {
            return None;
        }
        self.downstream(node, Node::OUTLET)
            .filter(|ep| !self.is_loop(ep.object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_components::StraightKind;

    #[test]
    fn unattached_nodes_are_not_on_a_loop() {
        let mut model = Model::new();
        let fan = model.add_equipment(StraightKind::FanConstantVolume);
        let node = model.add_node();
        assert_eq!(model.add_to_node(fan, node), Err(TopologyError::NotOnLoop { node }));
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn only_nodes_are_targets() {
        let mut model = Model::new();
        let fan = model.add_equipment(StraightKind::FanConstantVolume);
        let other = model.add_equipment(StraightKind::FanConstantVolume);
        assert!(matches!(
            model.add_to_node(fan, other),
            Err(TopologyError::WrongKind { .. })
        ));
    }

    #[test]
    fn connected_nodes_cannot_be_removed() {
        let mut model = Model::new();
        let a = model.add_node();
        let b = model.add_node();
        model.connect(a, Node::OUTLET, b, Node::INLET).unwrap();
        assert_eq!(model.remove(a), Err(TopologyError::InUse { handle: a }));
        model.disconnect(a, Node::OUTLET);
        model.remove(a).unwrap();
        assert!(!model.contains(a));
    }
}
