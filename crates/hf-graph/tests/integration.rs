//! Integration tests for hf-graph.

use std::collections::HashMap;

use hf_core::Handle;
use hf_graph::{
    BranchLayout, BranchSide, ConnectionRegistry, Endpoint, Port, PortOwner, Topology,
    components_between, upstream_root,
};
use proptest::prelude::*;

enum Shape {
    Source,
    Straight,
    Splitter,
    Mixer,
}

impl PortOwner for Shape {
    fn inlet_port(&self) -> Option<Port> {
        match self {
            Shape::Straight | Shape::Splitter => Some(Port::new(1)),
            Shape::Source | Shape::Mixer => None,
        }
    }

    fn outlet_port(&self) -> Option<Port> {
        match self {
            Shape::Straight | Shape::Mixer => Some(Port::new(2)),
            Shape::Source => Some(Port::new(1)),
            Shape::Splitter => None,
        }
    }

    fn branch_layout(&self) -> Option<BranchLayout> {
        match self {
            Shape::Splitter => Some(BranchLayout::new(BranchSide::Outlet, Port::new(2))),
            Shape::Mixer => Some(BranchLayout::new(BranchSide::Inlet, Port::new(3))),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Net {
    registry: ConnectionRegistry,
    shapes: HashMap<Handle, Shape>,
}

impl Net {
    fn add(&mut self, shape: Shape) -> Handle {
        let handle = Handle::fresh();
        self.shapes.insert(handle, shape);
        handle
    }

    fn link(&mut self, from: Handle, from_port: Port, to: Handle, to_port: Port) {
        self.registry
            .connect(Endpoint::new(from, from_port), Endpoint::new(to, to_port))
            .unwrap();
    }

    fn layout(&self, object: Handle) -> BranchLayout {
        self.shapes[&object].branch_layout().unwrap()
    }

    /// Straight chain `from -> a -> b -> ... -> to` using the next branch ports.
    fn branch(&mut self, splitter: Handle, mixer: Handle, len: usize) -> Vec<Handle> {
        let items: Vec<Handle> = (0..len).map(|_| self.add(Shape::Straight)).collect();
        let out = self.registry.next_branch_port(splitter, self.layout(splitter));
        let inn = self.registry.next_branch_port(mixer, self.layout(mixer));
        self.link(splitter, out, items[0], Port::new(1));
        for pair in items.windows(2) {
            self.link(pair[0], Port::new(2), pair[1], Port::new(1));
        }
        self.link(items[len - 1], Port::new(2), mixer, inn);
        items
    }
}

impl Topology for Net {
    fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    fn port_owner(&self, object: Handle) -> Option<&dyn PortOwner> {
        self.shapes.get(&object).map(|s| s as &dyn PortOwner)
    }
}

/// source -> inlet -> splitter -> {branches} -> mixer -> outlet
fn fan_out(branch_lengths: &[usize]) -> (Net, Handle, Handle, Handle, Handle, Vec<Vec<Handle>>) {
    let mut net = Net::default();
    let source = net.add(Shape::Source);
    let inlet = net.add(Shape::Straight);
    let splitter = net.add(Shape::Splitter);
    let mixer = net.add(Shape::Mixer);
    let outlet = net.add(Shape::Straight);
    net.link(source, Port::new(1), inlet, Port::new(1));
    net.link(inlet, Port::new(2), splitter, Port::new(1));
    net.link(mixer, Port::new(2), outlet, Port::new(1));
    let branches = branch_lengths
        .iter()
        .map(|&len| net.branch(splitter, mixer, len))
        .collect();
    (net, inlet, splitter, mixer, outlet, branches)
}

#[test]
fn straight_chain_is_listed_in_flow_order() {
    let (net, inlet, splitter, mixer, outlet, branches) = fan_out(&[2]);
    let found = components_between(&net, inlet, outlet);
    let mut expected = vec![inlet, splitter];
    expected.extend(&branches[0]);
    expected.extend([mixer, outlet]);
    assert_eq!(found, expected);
}

#[test]
fn every_branch_is_walked_in_branch_order() {
    let (net, inlet, splitter, mixer, outlet, branches) = fan_out(&[1, 3, 2]);
    let found = components_between(&net, inlet, outlet);
    assert_eq!(found.len(), 4 + 6);
    assert_eq!(found[0], inlet);
    assert_eq!(found[1], splitter);
    assert_eq!(&found[2..3], branches[0].as_slice());
    assert_eq!(&found[3..6], branches[1].as_slice());
    assert_eq!(&found[6..8], branches[2].as_slice());
    assert_eq!(found[8], mixer);
    assert_eq!(found[9], outlet);
}

#[test]
fn walk_to_a_branch_member_keeps_only_that_branch() {
    let (net, _, splitter, _, _, branches) = fan_out(&[2, 2]);
    let target = branches[1][1];
    let found = components_between(&net, splitter, target);
    assert_eq!(found, vec![splitter, branches[1][0], target]);
}

#[test]
fn unreachable_end_gives_empty_list() {
    let (net, inlet, _, _, outlet, _) = fan_out(&[1]);
    // Reversed direction
    assert!(components_between(&net, outlet, inlet).is_empty());
    // Disjoint object
    let mut net = net;
    let stray = net.add(Shape::Straight);
    assert!(components_between(&net, inlet, stray).is_empty());
}

#[test]
fn start_equal_to_end_lists_itself() {
    let (net, inlet, ..) = fan_out(&[1]);
    assert_eq!(components_between(&net, inlet, inlet), vec![inlet]);
}

#[test]
fn upstream_root_reaches_the_source() {
    let (net, _, _, _, outlet, branches) = fan_out(&[2, 1]);
    let root = upstream_root(&net, branches[1][0], None).unwrap();
    assert_eq!(net.shapes[&root.object].inlet_port(), None);
    assert_eq!(root.port, Port::new(1));
    // Through the mixer the first branch is followed, ending at the same source
    assert_eq!(upstream_root(&net, outlet, None), Some(root));
}

#[test]
fn walk_stops_at_cycles() {
    let mut net = Net::default();
    let a = net.add(Shape::Straight);
    let b = net.add(Shape::Straight);
    let c = net.add(Shape::Straight);
    net.link(a, Port::new(2), b, Port::new(1));
    net.link(b, Port::new(2), a, Port::new(1));
    assert!(components_between(&net, a, c).is_empty());
    assert_eq!(upstream_root(&net, a, None), None);
}

proptest! {
    #[test]
    fn traversal_is_deterministic(lengths in proptest::collection::vec(1usize..4, 1..6)) {
        let (net, inlet, _, _, outlet, branches) = fan_out(&lengths);
        let first = components_between(&net, inlet, outlet);
        let second = components_between(&net, inlet, outlet);
        prop_assert_eq!(&first, &second);
        let branch_total: usize = branches.iter().map(Vec::len).sum();
        prop_assert_eq!(first.len(), 4 + branch_total);
    }

    #[test]
    fn registry_stays_a_bijection(ops in proptest::collection::vec((0usize..6, 1u32..4, 0usize..6, 1u32..4, any::<bool>()), 0..60)) {
        let objects: Vec<Handle> = (0..6).map(|_| Handle::fresh()).collect();
        let mut registry = ConnectionRegistry::new();
        for (src, src_port, dst, dst_port, connect) in ops {
            let source = Endpoint::new(objects[src], Port::new(src_port));
            let target = Endpoint::new(objects[dst], Port::new(dst_port));
            if connect {
                let before = registry.clone();
                if registry.connect(source, target).is_err() {
                    prop_assert_eq!(&registry, &before);
                }
            } else {
                let first = registry.disconnect(source.object, source.port);
                let second = registry.disconnect(source.object, source.port);
                prop_assert!(second.is_none());
                if let Some(edge) = first {
                    prop_assert!(edge.source == source || edge.target == source);
                }
            }
            prop_assert!(registry.check_invariants().is_ok());
        }
    }
}
