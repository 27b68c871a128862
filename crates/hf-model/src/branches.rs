//! Splitter, mixer and plenum branch queries on the model.

use hf_components::{Node, ObjectKind};
use hf_core::Handle;
use hf_graph::{BranchLayout, BranchSide, Endpoint, Port};

use crate::model::{Model, validated};

impl Model {
    fn layout_on(&self, object: Handle, side: BranchSide) -> Option<BranchLayout> {
        self.layout_of(object).filter(|l| l.side == side)
    }

    /// Occupied branches on a splitter, mixer, plenum or port list.
    pub fn branch_count(&self, object: Handle) -> usize {
        self.layout_of(object)
            .map(|l| self.registry.branch_count(object, l))
            .unwrap_or(0)
    }

    /// Port a new outlet branch of `splitter` would use.
    pub fn next_outlet_port(&self, splitter: Handle) -> Option<Port> {
        let layout = self.layout_on(splitter, BranchSide::Outlet)?;
        Some(self.registry.next_branch_port(splitter, layout))
    }

    /// Port a new inlet branch of `mixer` would use.
    pub fn next_inlet_port(&self, mixer: Handle) -> Option<Port> {
        let layout = self.layout_on(mixer, BranchSide::Inlet)?;
        Some(self.registry.next_branch_port(mixer, layout))
    }

    pub fn outlet_objects(&self, splitter: Handle) -> Vec<Handle> {
        self.layout_on(splitter, BranchSide::Outlet)
            .map(|l| self.registry.branch_objects(splitter, l))
            .unwrap_or_default()
    }

    pub fn inlet_objects(&self, mixer: Handle) -> Vec<Handle> {
        self.layout_on(mixer, BranchSide::Inlet)
            .map(|l| self.registry.branch_objects(mixer, l))
            .unwrap_or_default()
    }

    pub fn outlet_object_for_branch(&self, splitter: Handle, index: usize) -> Option<Handle> {
        let layout = self.layout_on(splitter, BranchSide::Outlet)?;
        self.registry.branch_object(splitter, layout, index)
    }

    pub fn inlet_object_for_branch(&self, mixer: Handle, index: usize) -> Option<Handle> {
        let layout = self.layout_on(mixer, BranchSide::Inlet)?;
        self.registry.branch_object(mixer, layout, index)
    }

    pub fn last_outlet_object(&self, splitter: Handle) -> Option<Handle> {
        self.outlet_objects(splitter).last().copied()
    }

    pub fn last_inlet_object(&self, mixer: Handle) -> Option<Handle> {
        self.inlet_objects(mixer).last().copied()
    }

    /// Branch whose outlet connects directly to `object`.
    pub fn branch_index_for_outlet_object(&self, splitter: Handle, object: Handle) -> Option<usize> {
        let layout = self.layout_on(splitter, BranchSide::Outlet)?;
        self.registry.branch_index_for(splitter, layout, object)
    }

    /// Branch whose inlet connects directly to `object`.
    pub fn branch_index_for_inlet_object(&self, mixer: Handle, object: Handle) -> Option<usize> {
        let layout = self.layout_on(mixer, BranchSide::Inlet)?;
        self.registry.branch_index_for(mixer, layout, object)
    }

    /// Outlet branch of `splitter` that flow follows to reach `target`.
    pub(crate) fn branch_leading_to(&self, splitter: Handle, target: Handle) -> Option<usize> {
        self.outlet_objects(splitter)
            .into_iter()
            .position(|first| !self.components_between(first, target, None).is_empty())
    }

    /// Inlet branch of `mixer` that flow from `source` arrives on.
    pub(crate) fn branch_leading_from(&self, mixer: Handle, source: Handle) -> Option<usize> {
        self.inlet_objects(mixer)
            .into_iter()
            .position(|last| !self.components_between(source, last, None).is_empty())
    }

    /// Connect `target` on the next free outlet branch of `owner`.
    pub(crate) fn append_outlet_branch(&mut self, owner: Handle, target: Endpoint) -> Port {
        let port = match self.next_outlet_port(owner) {
            Some(port) => port,
            None => panic!("object {owner} has no outlet branches"),
        };
        self.link(Endpoint::new(owner, port), target);
        port
    }

    /// Connect `source` on the next free inlet branch of `owner`.
    pub(crate) fn append_inlet_branch(&mut self, source: Endpoint, owner: Handle) -> Port {
        let port = match self.next_inlet_port(owner) {
            Some(port) => port,
            None => panic!("object {owner} has no inlet branches"),
        };
        self.link(source, Endpoint::new(owner, port));
        port
    }

    /// Free the connection at `endpoint`, compacting if it is a branch port.
    pub(crate) fn release_branch_endpoint(&mut self, endpoint: Endpoint) {
        let index = self
            .layout_of(endpoint.object)
            .and_then(|l| l.index_of(endpoint.port));
        match index {
            Some(index) => {
                validated(self.compact_branch(endpoint.object, index), "branch release");
            }
            None => {
                self.unlink(endpoint.object, endpoint.port);
            }
        }
    }

    /// Node for a new branch between `splitter` and `mixer`.
    ///
    /// A branch holding nothing but its placeholder node is reused; otherwise
    /// a fresh node is appended on both sides.
    pub(crate) fn branch_node(&mut self, splitter: Handle, mixer: Handle) -> Handle {
        if let Some(placeholder) = self.lone_placeholder(splitter, mixer) {
            return placeholder;
        }
        let node = self.add_node();
        self.append_outlet_branch(splitter, Endpoint::new(node, Node::INLET));
        self.append_inlet_branch(Endpoint::new(node, Node::OUTLET), mixer);
        node
    }

    /// The placeholder node when `splitter` has exactly one empty branch.
    pub(crate) fn lone_placeholder(&self, splitter: Handle, mixer: Handle) -> Option<Handle> {
        let between = self.components_between(splitter, mixer, None);
        match between.as_slice() {
            [_, node, _] if self.is_kind(*node, ObjectKind::Node) => Some(*node),
            _ => None,
        }
    }
}
