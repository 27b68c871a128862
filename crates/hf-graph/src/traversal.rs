//! Ordered walks over the connection graph.

use std::collections::{HashMap, HashSet};

use hf_core::Handle;

use crate::branch::BranchSide;
use crate::port::{Endpoint, Port, PortOwner};
use crate::registry::ConnectionRegistry;

/// Read-only view of a graph that walks can run over.
///
/// The defaults cover splitters, mixers and straight components. Models
/// override [`Topology::resolve`] and [`Topology::entry`] for objects whose
/// connections go through an auxiliary object, like a zone and its port lists.
pub trait Topology {
    fn registry(&self) -> &ConnectionRegistry;

    fn port_owner(&self, object: Handle) -> Option<&dyn PortOwner>;

    /// Object that stands for `object` in walk results.
    fn resolve(&self, object: Handle) -> Handle {
        object
    }

    /// Endpoints downstream of `object` when flow entered it at `entered`.
    ///
    /// `None` means the walk starts here (or arrived through a resolved
    /// auxiliary object), so every outlet is followed.
    fn exits(&self, object: Handle, entered: Option<Port>) -> Vec<Endpoint> {
        owner_exits(self, object, entered)
    }

    /// Endpoint on `object` through which flow arrives when it leaves by `outlet`.
    fn entry(&self, object: Handle, outlet: Option<Port>) -> Option<Endpoint> {
        owner_entry(self, object, outlet)
    }
}

/// [`Topology::exits`] computed from the object's [`PortOwner`] alone.
pub fn owner_exits<T: Topology + ?Sized>(
    topo: &T,
    object: Handle,
    entered: Option<Port>,
) -> Vec<Endpoint> {
    let Some(owner) = topo.port_owner(object) else {
        return Vec::new();
    };
    let registry = topo.registry();
    let layout = owner.branch_layout();
    let branch_outlets = || match layout {
        Some(l) if l.side == BranchSide::Outlet => registry.branch_ports(object, l),
        _ => Vec::new(),
    };

    let ports: Vec<Port> = match entered {
        None => owner.outlet_port().into_iter().chain(branch_outlets()).collect(),
        Some(port) => match layout {
            Some(l) if l.side == BranchSide::Outlet && Some(port) == owner.inlet_port() => {
                branch_outlets()
            }
            Some(l) if l.side == BranchSide::Inlet && l.index_of(port).is_some() => {
                owner.outlet_port().into_iter().collect()
            }
            _ => owner.paired_outlet(port).into_iter().collect(),
        },
    };

    ports
        .into_iter()
        .filter_map(|port| registry.downstream(Endpoint::new(object, port)))
        .collect()
}

/// [`Topology::entry`] computed from the object's [`PortOwner`] alone.
///
/// Mixers report their first occupied branch.
pub fn owner_entry<T: Topology + ?Sized>(
    topo: &T,
    object: Handle,
    outlet: Option<Port>,
) -> Option<Endpoint> {
    let owner = topo.port_owner(object)?;
    let layout = owner.branch_layout();
    let first_branch = || match layout {
        Some(l) if l.side == BranchSide::Inlet => {
            topo.registry().branch_ports(object, l).first().copied()
        }
        _ => None,
    };

    let port = match outlet {
        None => owner.inlet_port().or_else(first_branch),
        Some(port) => match layout {
            Some(l) if l.side == BranchSide::Inlet && Some(port) == owner.outlet_port() => {
                first_branch()
            }
            Some(l) if l.side == BranchSide::Outlet && l.index_of(port).is_some() => {
                owner.inlet_port()
            }
            _ => owner.paired_inlet(port),
        },
    }?;
    Some(Endpoint::new(object, port))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Active,
    Done(bool),
}

struct Walk<'a, T: Topology + ?Sized> {
    topo: &'a T,
    end: Handle,
    marks: HashMap<Handle, Mark>,
    postorder: Vec<Handle>,
}

impl<T: Topology + ?Sized> Walk<'_, T> {
    /// Depth-first search; returns whether `end` is reachable from `object`.
    fn visit(&mut self, object: Handle, entered: Option<Port>) -> bool {
        match self.marks.get(&object) {
            // A cycle back into the active path never reaches the end through here
            Some(Mark::Active) => return false,
            Some(Mark::Done(reached)) => return *reached,
            None => {}
        }
        if object == self.end {
            self.marks.insert(object, Mark::Done(true));
            self.postorder.push(object);
            return true;
        }

        self.marks.insert(object, Mark::Active);
        let mut reached = false;
        // Reverse branch order so that reversing the postorder lists branches ascending
        for hit in self.topo.exits(object, entered).into_iter().rev() {
            let next = self.topo.resolve(hit.object);
            let entered = (next == hit.object).then_some(hit.port);
            if self.visit(next, entered) {
                reached = true;
            }
        }
        self.marks.insert(object, Mark::Done(reached));
        if reached {
            self.postorder.push(object);
        }
        reached
    }
}

/// Every object on a path from `start` to `end`, both included, in flow order.
///
/// All branches are explored, so a walk from a splitter to its mixer lists
/// each branch's objects in branch order before the mixer. Objects that do not
/// lead to `end` are left out. Returns an empty list when `end` is not
/// reachable. The walk never mutates the graph and visits each object at most
/// once, so repeated calls return identical lists.
pub fn components_between<T: Topology + ?Sized>(topo: &T, start: Handle, end: Handle) -> Vec<Handle> {
    let mut walk = Walk {
        topo,
        end: topo.resolve(end),
        marks: HashMap::new(),
        postorder: Vec::new(),
    };
    walk.visit(topo.resolve(start), None);
    let mut order = walk.postorder;
    order.reverse();
    tracing::trace!(%start, %end, found = order.len(), "components between");
    order
}

/// Walk upstream from `object` to the endpoint where its flow originates.
///
/// `outlet` picks the port pair to start from on objects with more than one
/// (a water coil's water side); `None` starts from the primary inlet. At
/// mixers the first branch is followed. Returns the source endpoint on the
/// object that has no inlet of its own (a loop, for anything on a loop), or
/// `None` when the chain is broken or cycles.
pub fn upstream_root<T: Topology + ?Sized>(
    topo: &T,
    object: Handle,
    outlet: Option<Port>,
) -> Option<Endpoint> {
    let registry = topo.registry();
    let mut current = topo.resolve(object);
    let mut outlet = outlet;
    let mut seen = HashSet::new();

    loop {
        if !seen.insert(current) {
            return None;
        }
        let entry = topo.entry(current, outlet)?;
        let source = registry.upstream(entry)?;
        let next = topo.resolve(source.object);
        let next_outlet = (next == source.object).then_some(source.port);
        if topo.entry(next, next_outlet).is_none() {
            return Some(source);
        }
        current = next;
        outlet = next_outlet;
    }
}
