//! Whole-model consistency checks.

use hf_components::{Component, PortList};
use hf_core::Handle;
use hf_graph::Port;
use hf_store::StoreResult;

use crate::error::{TopologyError, TopologyResult};
use crate::model::Model;

fn inconsistent(what: String) -> TopologyError {
    TopologyError::Inconsistent { what }
}

fn read<T>(result: StoreResult<T>, handle: Handle) -> TopologyResult<T> {
    result.map_err(|err| inconsistent(format!("record {handle}: {err}")))
}

impl Model {
    /// Check that the registry, the store mirror and the object state agree.
    ///
    /// Every editing operation leaves these invariants holding; tests and
    /// imports call this to prove it.
    pub fn check_invariants(&self) -> TopologyResult<()> {
        self.registry.check_invariants()?;
        self.check_connections()?;
        for (&handle, component) in &self.objects {
            self.check_record(handle, component)?;
        }
        self.check_owners()?;
        self.check_loops()?;
        Ok(())
    }

    fn check_connections(&self) -> TopologyResult<()> {
        for connection in self.registry.connections() {
            for (end, peer) in [
                (connection.source, connection.target),
                (connection.target, connection.source),
            ] {
                let component = self
                    .objects
                    .get(&end.object)
                    .ok_or_else(|| inconsistent(format!("{connection} touches a missing object")))?;
                let known = component.fixed_ports().contains(&end.port)
                    || component
                        .branch_layout()
                        .is_some_and(|l| l.index_of(end.port).is_some());
                if !known {
                    return Err(inconsistent(format!("{connection} uses unknown port {end}")));
                }
                let stored = read(self.store.get_pointer(end.object, end.port.field()), end.object)?;
                if stored != Some(peer.object) {
                    return Err(inconsistent(format!("{connection} is not mirrored at {end}")));
                }
            }
        }
        Ok(())
    }

    /// Record exists, fixed port fields match the registry, branch ports are
    /// contiguous and nothing past the last branch holds a pointer.
    fn check_record(&self, handle: Handle, component: &Component) -> TopologyResult<()> {
        if self.store.kind(handle) != Some(component.kind().schema_name()) {
            return Err(inconsistent(format!("object {handle} has no matching record")));
        }
        for port in component.fixed_ports() {
            self.check_port_field(handle, port)?;
        }
        if let Some(layout) = component.branch_layout() {
            self.registry.check_branch_contiguity(handle, layout)?;
            let fields = read(self.store.num_fields(handle), handle)?;
            let count = self.registry.branch_count(handle, layout);
            let mut index = count;
            while layout.port(index).field() < fields {
                let stray = read(self.store.get_pointer(handle, layout.port(index).field()), handle)?;
                if stray.is_some() {
                    return Err(inconsistent(format!(
                        "object {handle} has a pointer past its last branch"
                    )));
                }
                index += 1;
            }
        }
        if let Component::Zone(zone) = component {
            for &equipment in &zone.equipment {
                if !self.objects.get(&equipment).is_some_and(|c| c.kind().is_terminal()) {
                    return Err(inconsistent(format!(
                        "zone {handle} lists {equipment}, which is not a terminal"
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_port_field(&self, handle: Handle, port: Port) -> TopologyResult<()> {
        let stored = read(self.store.get_pointer(handle, port.field()), handle)?;
        if stored != self.registry.connected_object(handle, port) {
            return Err(inconsistent(format!(
                "object {handle} port {port} disagrees with its record"
            )));
        }
        Ok(())
    }

    /// Every port list has a live owner that points back at it.
    fn check_owners(&self) -> TopologyResult<()> {
        for (&list, &owner) in &self.owners {
            if !matches!(self.objects.get(&list), Some(Component::PortList(_))) {
                return Err(inconsistent(format!("owner index names missing port list {list}")));
            }
            let points_back = match self.objects.get(&owner) {
                Some(Component::Zone(z)) => {
                    z.inlet_port_list == Some(list) || z.exhaust_port_list == Some(list)
                }
                Some(Component::ReturnPlenum(p)) => p.induced_air == Some(list),
                _ => false,
            };
            if !points_back {
                return Err(inconsistent(format!(
                    "port list {list} is not referenced by its owner {owner}"
                )));
            }
            let stored = read(self.store.get_pointer(list, PortList::OWNER_FIELD), list)?;
            if stored != Some(owner) {
                return Err(inconsistent(format!("port list {list} record names the wrong owner")));
            }
        }
        for (&handle, component) in &self.objects {
            if matches!(component, Component::PortList(_)) && !self.owners.contains_key(&handle) {
                return Err(inconsistent(format!("port list {handle} has no owner")));
            }
        }
        Ok(())
    }

    /// Loops keep every one of their own ports connected.
    fn check_loops(&self) -> TopologyResult<()> {
        for (&handle, component) in &self.objects {
            let Some(ports) = component.loop_ports() else {
                continue;
            };
            for port in ports.all() {
                if !self.registry.is_connected(handle, port) {
                    return Err(inconsistent(format!("loop {handle} port {port} is open")));
                }
            }
        }
        Ok(())
    }
}
