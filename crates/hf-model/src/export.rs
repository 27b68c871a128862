//! Graph export: petgraph views, DOT output and a serializable summary.

use std::collections::HashMap;

use hf_components::Component;
use hf_core::Handle;
use hf_graph::Connection;
use petgraph::algo::is_cyclic_directed;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::model::Model;

/// One object in a [`TopologySummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSummary {
    pub handle: u32,
    pub name: String,
    pub kind: String,
}

/// A loop's sides in flow order plus the zones it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopSummary {
    pub handle: u32,
    pub name: String,
    pub supply: Vec<ObjectSummary>,
    pub demand: Vec<ObjectSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopologySummary {
    pub objects: usize,
    pub connections: usize,
    pub air_loops: Vec<LoopSummary>,
    pub plant_loops: Vec<LoopSummary>,
}

impl Model {
    /// Every object as a vertex, every connection as an edge.
    pub fn to_digraph(&self) -> DiGraph<Handle, Connection> {
        self.digraph_where(|_| true)
    }

    fn digraph_where(&self, keep: impl Fn(&Component) -> bool) -> DiGraph<Handle, Connection> {
        let mut graph = DiGraph::new();
        let mut index: HashMap<Handle, NodeIndex> = HashMap::new();
        for (&handle, component) in &self.objects {
            if keep(component) {
                index.insert(handle, graph.add_node(handle));
            }
        }
        for connection in self.registry.connections() {
            if let (Some(&from), Some(&to)) = (
                index.get(&connection.source.object),
                index.get(&connection.target.object),
            ) {
                graph.add_edge(from, to, connection);
            }
        }
        graph
    }

    /// Graphviz rendering labelled with object names and kinds.
    pub fn to_dot(&self) -> String {
        let graph = self.to_digraph().map(
            |_, &handle| {
                let component = &self.objects[&handle];
                format!("{} [{}]", component.name(), component.kind())
            },
            |_, connection| {
                format!("{} -> {}", connection.source.port, connection.target.port)
            },
        );
        format!("{}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
    }

    /// Whether the graph without loop objects is free of cycles.
    ///
    /// Loops close each side into a ring; everything between them must flow
    /// one way.
    pub fn is_branch_graph_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.digraph_where(|c| !c.kind().is_loop()))
    }

    pub fn summary(&self) -> TopologySummary {
        TopologySummary {
            objects: self.objects.len(),
            connections: self.registry.len(),
            air_loops: self
                .air_loops()
                .into_iter()
                .map(|l| self.loop_summary(l, self.thermal_zones(l)))
                .collect(),
            plant_loops: self
                .plant_loops()
                .into_iter()
                .map(|l| self.loop_summary(l, Vec::new()))
                .collect(),
        }
    }

    fn loop_summary(&self, loop_handle: Handle, zones: Vec<Handle>) -> LoopSummary {
        LoopSummary {
            handle: loop_handle.index(),
            name: self.name(loop_handle).unwrap_or_default().to_owned(),
            supply: self.object_summaries(self.supply_components(loop_handle, None)),
            demand: self.object_summaries(self.demand_components(loop_handle, None)),
            zones: zones
                .into_iter()
                .filter_map(|z| self.name(z).map(str::to_owned))
                .collect(),
        }
    }

    fn object_summaries(&self, handles: Vec<Handle>) -> Vec<ObjectSummary> {
        handles
            .into_iter()
            .filter_map(|handle| {
                let component = self.objects.get(&handle)?;
                Some(ObjectSummary {
                    handle: handle.index(),
                    name: component.name().to_owned(),
                    kind: component.kind().schema_name().to_owned(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digraph_mirrors_registry() {
        let mut model = Model::new();
        let air_loop = model.add_air_loop("AHU", false);
        let graph = model.to_digraph();
        assert_eq!(graph.node_count(), model.len());
        assert_eq!(graph.edge_count(), model.registry().len());
        // Loops close both sides into rings
        assert!(is_cyclic_directed(&graph));
        assert!(model.is_branch_graph_acyclic());

        let dot = model.to_dot();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("AHU Supply Inlet Node"));

        let summary = model.summary();
        assert_eq!(summary.air_loops.len(), 1);
        assert_eq!(summary.air_loops[0].handle, air_loop.index());
        assert_eq!(summary.air_loops[0].supply.len(), 2);
        assert!(summary.plant_loops.is_empty());
    }

    #[test]
    fn summary_serializes() {
        let mut model = Model::new();
        model.add_plant_loop("HW");
        let json = serde_json::to_value(model.summary()).unwrap();
        assert_eq!(json["plant_loops"][0]["name"], "HW");
        assert_eq!(json["plant_loops"][0]["demand"].as_array().unwrap().len(), 5);
        assert!(json["plant_loops"][0].get("zones").is_none());
    }
}
