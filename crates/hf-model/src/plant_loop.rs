//! Plant loops and their branches.

use hf_components::{Component, ConnectorKind, LoopKind, LoopSide, Mixer, Node, ObjectKind, PlantLoop, Splitter};
use hf_core::Handle;
use hf_graph::Endpoint;
use tracing::debug;

use crate::error::{TopologyError, TopologyResult};
use crate::model::{Model, validated};

impl Model {
    /// New plant loop. Each side is
    /// `inlet node -> splitter -> placeholder -> mixer -> outlet node`.
    pub fn add_plant_loop(&mut self, name: impl Into<String>) -> Handle {
        let plant = PlantLoop::new(name);
        let ports = plant.ports();
        let plant_loop = self.insert(Component::PlantLoop(plant));
        let loop_name = self.name(plant_loop).unwrap_or_default().to_owned();

        let sides = [
            ("Supply", ports.supply_inlet, ports.supply_outlets[0]),
            ("Demand", ports.demand_inlets[0], ports.demand_outlet),
        ];
        for (side, inlet_port, outlet_port) in sides {
            let inlet = self.insert_named_node(format!("{loop_name} {side} Inlet Node"));
            self.link(
                Endpoint::new(plant_loop, inlet_port),
                Endpoint::new(inlet, Node::INLET),
            );
            let splitter = self.insert(Component::Splitter(Splitter::new(
                format!("{loop_name} {side} Splitter"),
                ConnectorKind::Connector,
            )));
            self.link(
                Endpoint::new(inlet, Node::OUTLET),
                Endpoint::new(splitter, Splitter::INLET),
            );
            let mixer = self.insert(Component::Mixer(Mixer::new(
                format!("{loop_name} {side} Mixer"),
                ConnectorKind::Connector,
            )));
            self.branch_node(splitter, mixer);
            let outlet = self.insert_named_node(format!("{loop_name} {side} Outlet Node"));
            self.link(
                Endpoint::new(mixer, Mixer::OUTLET),
                Endpoint::new(outlet, Node::INLET),
            );
            self.link(
                Endpoint::new(outlet, Node::OUTLET),
                Endpoint::new(plant_loop, outlet_port),
            );
        }

        debug!(%plant_loop, name = %loop_name, "add plant loop");
        plant_loop
    }

    pub fn plant_loops(&self) -> Vec<Handle> {
        self.objects_of_kind(ObjectKind::PlantLoop)
    }

    pub fn supply_splitter(&self, plant_loop: Handle) -> Option<Handle> {
        self.side_connector(plant_loop, LoopSide::Supply, ObjectKind::ConnectorSplitter)
    }

    pub fn supply_mixer(&self, plant_loop: Handle) -> Option<Handle> {
        self.side_connector(plant_loop, LoopSide::Supply, ObjectKind::ConnectorMixer)
    }

    pub fn demand_splitter(&self, plant_loop: Handle) -> Option<Handle> {
        self.side_connector(plant_loop, LoopSide::Demand, ObjectKind::ConnectorSplitter)
    }

    pub fn demand_mixer(&self, plant_loop: Handle) -> Option<Handle> {
        self.side_connector(plant_loop, LoopSide::Demand, ObjectKind::ConnectorMixer)
    }

    fn side_connector(&self, plant_loop: Handle, side: LoopSide, kind: ObjectKind) -> Option<Handle> {
        if !self.is_kind(plant_loop, ObjectKind::PlantLoop) {
            return None;
        }
        let found = match side {
            LoopSide::Supply => self.supply_components(plant_loop, Some(kind)),
            LoopSide::Demand => self.demand_components(plant_loop, Some(kind)),
        };
        found.first().copied()
    }

    /// Put `component` on a new supply branch.
    pub fn add_supply_branch_for_component(
        &mut self,
        plant_loop: Handle,
        component: Handle,
    ) -> TopologyResult<()> {
        self.add_plant_branch(plant_loop, LoopSide::Supply, component)
    }

    /// Put `component` on a new demand branch. Water coils join through
    /// their water ports.
    pub fn add_demand_branch_for_component(
        &mut self,
        plant_loop: Handle,
        component: Handle,
    ) -> TopologyResult<()> {
        self.add_plant_branch(plant_loop, LoopSide::Demand, component)
    }

    fn add_plant_branch(
        &mut self,
        plant_loop: Handle,
        side: LoopSide,
        component: Handle,
    ) -> TopologyResult<()> {
        self.expect_kind(plant_loop, "plant loop", |k| k == ObjectKind::PlantLoop)?;
        let kind = self.kind_of(component)?;
        if !kind.allows(LoopKind::Plant, side) {
            return Err(TopologyError::Placement {
                kind,
                loop_kind: LoopKind::Plant,
                side,
            });
        }
        let (inlet, outlet) =
            self.port_pair(component, LoopKind::Plant)
                .ok_or(TopologyError::Precondition {
                    what: "component has no inlet and outlet pair",
                })?;
        if self.registry.is_connected(component, inlet) || self.registry.is_connected(component, outlet) {
            return Err(TopologyError::AlreadyConnected { handle: component });
        }
        let (splitter, mixer) = self.plant_side_pair(plant_loop, side)?;

        let node = self.branch_node(splitter, mixer);
        let plan = validated(self.plan_straight(component, node), "plant branch");
        self.apply_straight(component, node, plan);
        debug!(%plant_loop, %side, %component, "add plant branch");
        Ok(())
    }

    fn plant_side_pair(&self, plant_loop: Handle, side: LoopSide) -> TopologyResult<(Handle, Handle)> {
        let splitter = self.side_connector(plant_loop, side, ObjectKind::ConnectorSplitter);
        let mixer = self.side_connector(plant_loop, side, ObjectKind::ConnectorMixer);
        match (splitter, mixer) {
            (Some(splitter), Some(mixer)) => Ok((splitter, mixer)),
            _ => Err(TopologyError::Inconsistent {
                what: format!("plant loop {plant_loop} {side} side has no splitter and mixer"),
            }),
        }
    }

    /// Take `component` and its branch off the plant loop.
    ///
    /// With other branches left, the branch is removed and its nodes
    /// deleted. On the last branch the component is unspliced and a
    /// placeholder node remains. The component itself stays in the model.
    pub fn remove_branch_with_component(
        &mut self,
        plant_loop: Handle,
        component: Handle,
    ) -> TopologyResult<()> {
        self.expect_kind(plant_loop, "plant loop", |k| k == ObjectKind::PlantLoop)?;
        self.kind_of(component)?;
        let (on_loop, side) = self.plant_side_of(component).ok_or(TopologyError::Precondition {
            what: "component is not on a plant loop",
        })?;
        if on_loop != plant_loop {
            return Err(TopologyError::Precondition {
                what: "component is on a different plant loop",
            });
        }
        let (splitter, mixer) = self.plant_side_pair(plant_loop, side)?;
        let (Some(s_index), Some(m_index)) = (
            self.branch_leading_to(splitter, component),
            self.branch_leading_from(mixer, component),
        ) else {
            return Err(TopologyError::Precondition {
                what: "component is not on a splitter branch",
            });
        };

        let (Some(first), Some(last)) = (
            self.outlet_object_for_branch(splitter, s_index),
            self.inlet_object_for_branch(mixer, m_index),
        ) else {
            return Err(TopologyError::Inconsistent {
                what: format!("branch {s_index} of splitter {splitter} is empty"),
            });
        };
        let mut branch = self.components_between(first, component, None);
        for object in self.components_between(component, last, None) {
            if !branch.contains(&object) {
                branch.push(object);
            }
        }

        if self.branch_count(splitter) > 1 {
            validated(self.compact_branch(splitter, s_index), "plant splitter branch");
            validated(self.compact_branch(mixer, m_index), "plant mixer branch");
            for object in branch {
                if self.is_kind(object, ObjectKind::Node) {
                    self.delete_object(object);
                } else if let Some((inlet, outlet)) = self.port_pair(object, LoopKind::Plant) {
                    self.unlink(object, inlet);
                    self.unlink(object, outlet);
                }
            }
        } else {
            for object in branch {
                if self.is_kind(object, ObjectKind::Node) {
                    continue;
                }
                if let Some((inlet, outlet)) = self.port_pair(object, LoopKind::Plant) {
                    self.unsplice(object, inlet, outlet);
                }
            }
        }
        debug!(%plant_loop, %component, "remove plant branch");
        Ok(())
    }

    /// Whether the demand side holds nothing but nodes, the splitter and the mixer.
    pub fn is_demand_branch_empty(&self, plant_loop: Handle) -> bool {
        self.demand_components(plant_loop, None).into_iter().all(|h| {
            matches!(
                self.kind_of(h),
                Ok(ObjectKind::Node | ObjectKind::ConnectorSplitter | ObjectKind::ConnectorMixer)
            )
        })
    }
}
