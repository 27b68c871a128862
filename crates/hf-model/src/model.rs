//! The model arena: objects, connections and their field-store mirror.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use hf_components::{
    AirTerminal, Component, Equipment, LoopKind, LoopSide, Node, ObjectKind, PortList,
    ReturnPlenum, StraightKind, SupplyPlenum, TerminalKind, ThermalZone, WaterCoil, WaterCoilKind,
};
use hf_core::Handle;
use hf_graph::{
    BranchCompaction, BranchLayout, ConnectionRegistry, Endpoint, Port, PortOwner, Topology,
    components_between, owner_entry, owner_exits, upstream_root,
};
use hf_store::{FieldStore, FieldValue, MemoryStore, StoreResult};
use tracing::debug;

use crate::error::{TopologyError, TopologyResult};

/// Unwrap a store result after the model has already validated the edit.
///
/// The store only fails here if it no longer matches the model, which is
/// not recoverable.
pub(crate) fn store_op<T>(result: StoreResult<T>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("field store out of sync during {what}: {err}"),
    }
}

/// Unwrap an internal step whose preconditions were already checked.
pub(crate) fn validated<T>(result: TopologyResult<T>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{what} failed after validation: {err}"),
    }
}

/// HVAC topology: every object, how they connect, and the record store
/// that mirrors both.
///
/// The connection registry is authoritative. Each connection is also
/// written into the pointer fields of both records so the store always
/// describes the same graph.
pub struct Model {
    pub(crate) objects: BTreeMap<Handle, Component>,
    pub(crate) registry: ConnectionRegistry,
    pub(crate) store: Box<dyn FieldStore>,
    /// Port list -> the zone or return plenum it belongs to.
    pub(crate) owners: HashMap<Handle, Handle>,
    name_counters: HashMap<&'static str, usize>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("objects", &self.objects.len())
            .field("connections", &self.registry.len())
            .finish()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    pub fn new() -> Self {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    /// Model backed by a caller-supplied store. The store should be empty.
    pub fn with_store(store: Box<dyn FieldStore>) -> Self {
        Self {
            objects: BTreeMap::new(),
            registry: ConnectionRegistry::new(),
            store,
            owners: HashMap::new(),
            name_counters: HashMap::new(),
        }
    }

    // ------------------------------------------------------------------
    // Object creation
    // ------------------------------------------------------------------

    pub fn add_node(&mut self) -> Handle {
        self.insert(Component::Node(Node::new(String::new())))
    }

    pub fn add_equipment(&mut self, kind: StraightKind) -> Handle {
        self.insert(Component::Equipment(Equipment::new(String::new(), kind)))
    }

    pub fn add_water_coil(&mut self, kind: WaterCoilKind) -> Handle {
        self.insert(Component::WaterCoil(WaterCoil::new(String::new(), kind)))
    }

    pub fn add_terminal(&mut self, kind: TerminalKind) -> Handle {
        self.insert(Component::Terminal(AirTerminal::new(String::new(), kind)))
    }

    pub fn add_thermal_zone(&mut self) -> Handle {
        self.insert(Component::Zone(ThermalZone::new(String::new(), false)))
    }

    /// Zone that can only serve as a supply or return plenum.
    pub fn add_plenum_zone(&mut self) -> Handle {
        self.insert(Component::Zone(ThermalZone::new(String::new(), true)))
    }

    /// Unattached supply plenum around `plenum_zone`.
    pub fn add_supply_plenum(&mut self, plenum_zone: Handle) -> TopologyResult<Handle> {
        self.expect_plenum_zone(plenum_zone)?;
        Ok(self.insert(Component::SupplyPlenum(SupplyPlenum::new(String::new(), plenum_zone))))
    }

    /// Unattached return plenum around `plenum_zone`.
    pub fn add_return_plenum(&mut self, plenum_zone: Handle) -> TopologyResult<Handle> {
        self.expect_plenum_zone(plenum_zone)?;
        Ok(self.insert(Component::ReturnPlenum(ReturnPlenum::new(String::new(), plenum_zone))))
    }

    /// Add `component` with a fresh handle and create its record.
    ///
    /// An empty name is replaced by a generated one, e.g. "Node 3".
    pub(crate) fn insert(&mut self, mut component: Component) -> Handle {
        let kind = component.kind();
        if component.name().is_empty() {
            component.set_name(self.next_name(kind));
        }
        let handle = Handle::fresh();
        store_op(
            self.store
                .create_record(handle, kind.schema_name(), component.field_count()),
            "record creation",
        );
        store_op(
            self.store
                .set_field(handle, 0, FieldValue::Text(component.name().to_owned())),
            "name write",
        );
        debug!(%handle, %kind, name = component.name(), "add object");
        self.objects.insert(handle, component);
        self.sync_references(handle);
        handle
    }

    /// Node named after what it sits next to.
    pub(crate) fn insert_named_node(&mut self, name: String) -> Handle {
        self.insert(Component::Node(Node::new(name)))
    }

    fn next_name(&mut self, kind: ObjectKind) -> String {
        let label = kind.label();
        let counter = self.name_counters.entry(label).or_insert(0);
        *counter += 1;
        format!("{label} {counter}")
    }

    /// Copy of a standalone object: same kind and data fields, no connections.
    pub fn clone_component(&mut self, original: Handle) -> TopologyResult<Handle> {
        let copy = match self.component(original)? {
            Component::Node(_) => Component::Node(Node::new(String::new())),
            Component::Equipment(e) => Component::Equipment(Equipment::new(String::new(), e.kind)),
            Component::WaterCoil(c) => Component::WaterCoil(WaterCoil::new(String::new(), c.kind)),
            Component::Terminal(t) => Component::Terminal(AirTerminal::new(String::new(), t.kind)),
            Component::Zone(z) => Component::Zone(ThermalZone::new(String::new(), z.is_plenum)),
            _ => {
                return Err(TopologyError::Unsupported {
                    what: "cloning objects other than nodes, equipment, terminals and zones",
                });
            }
        };
        let handle = self.insert(copy);

        // Data fields only; pointers describe connections the copy does not have
        let fields = store_op(self.store.num_fields(original), "clone");
        for index in 1..fields {
            let value = store_op(self.store.get_field(original, index), "clone");
            if !value.is_empty() && value.as_pointer().is_none() {
                store_op(self.store.set_field(handle, index, value), "clone");
            }
        }
        debug!(%original, copy = %handle, "clone object");
        Ok(handle)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.objects.contains_key(&handle)
    }

    pub fn component(&self, handle: Handle) -> TopologyResult<&Component> {
        self.objects
            .get(&handle)
            .ok_or(TopologyError::NotFound { handle })
    }

    pub fn kind_of(&self, handle: Handle) -> TopologyResult<ObjectKind> {
        self.component(handle).map(Component::kind)
    }

    pub fn name(&self, handle: Handle) -> Option<&str> {
        self.objects.get(&handle).map(Component::name)
    }

    pub fn set_name(&mut self, handle: Handle, name: impl Into<String>) -> TopologyResult<()> {
        let name = name.into();
        let component = self
            .objects
            .get_mut(&handle)
            .ok_or(TopologyError::NotFound { handle })?;
        component.set_name(name.clone());
        store_op(
            self.store.set_field(handle, 0, FieldValue::Text(name)),
            "name write",
        );
        Ok(())
    }

    /// Every object in handle (creation) order.
    pub fn objects(&self) -> impl Iterator<Item = (Handle, &Component)> + '_ {
        self.objects.iter().map(|(h, c)| (*h, c))
    }

    /// Handles of every object of `kind`, in creation order.
    pub fn objects_of_kind(&self, kind: ObjectKind) -> Vec<Handle> {
        self.objects
            .iter()
            .filter(|(_, c)| c.kind() == kind)
            .map(|(h, _)| *h)
            .collect()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Read-only view of the record store.
    pub fn store(&self) -> &dyn FieldStore {
        self.store.as_ref()
    }

    /// Zone or return plenum a port list belongs to.
    pub fn port_list_owner(&self, port_list: Handle) -> Option<Handle> {
        self.owners.get(&port_list).copied()
    }

    pub(crate) fn expect_kind(
        &self,
        handle: Handle,
        expected: &'static str,
        accept: impl Fn(ObjectKind) -> bool,
    ) -> TopologyResult<ObjectKind> {
        let actual = self.kind_of(handle)?;
        if accept(actual) {
            Ok(actual)
        } else {
            Err(TopologyError::WrongKind {
                handle,
                expected,
                actual,
            })
        }
    }

    pub(crate) fn expect_zone(&self, zone: Handle) -> TopologyResult<&ThermalZone> {
        self.expect_kind(zone, "thermal zone", |k| k == ObjectKind::ThermalZone)?;
        self.component(zone)?
            .as_zone()
            .ok_or(TopologyError::NotFound { handle: zone })
    }

    pub(crate) fn expect_plenum_zone(&self, zone: Handle) -> TopologyResult<()> {
        if self.expect_zone(zone)?.is_plenum {
            Ok(())
        } else {
            Err(TopologyError::NotPlenum { zone })
        }
    }

    pub(crate) fn is_kind(&self, handle: Handle, kind: ObjectKind) -> bool {
        self.objects.get(&handle).map(Component::kind) == Some(kind)
    }

    pub(crate) fn is_loop(&self, handle: Handle) -> bool {
        self.objects
            .get(&handle)
            .is_some_and(|c| c.kind().is_loop())
    }

    pub(crate) fn layout_of(&self, handle: Handle) -> Option<BranchLayout> {
        self.objects.get(&handle).and_then(Component::branch_layout)
    }

    pub(crate) fn zone_ref(&self, zone: Handle) -> Option<&ThermalZone> {
        self.objects.get(&zone).and_then(Component::as_zone)
    }

    pub(crate) fn zone_mut(&mut self, zone: Handle) -> &mut ThermalZone {
        match self.objects.get_mut(&zone).and_then(Component::as_zone_mut) {
            Some(z) => z,
            None => panic!("object {zone} is not a thermal zone"),
        }
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    /// Connect `source_port` on `source` to `target_port` on `target`.
    ///
    /// Both ports must exist on their objects. Fails without changes if
    /// either endpoint is occupied or the edge would be a self loop.
    pub fn connect(
        &mut self,
        source: Handle,
        source_port: Port,
        target: Handle,
        target_port: Port,
    ) -> TopologyResult<()> {
        self.expect_port(source, source_port)?;
        self.expect_port(target, target_port)?;
        let from = Endpoint::new(source, source_port);
        let to = Endpoint::new(target, target_port);
        self.registry.connect(from, to)?;
        self.mirror(from, Some(target));
        self.mirror(to, Some(source));
        debug!(source = %from, target = %to, "connect");
        Ok(())
    }

    /// Remove the connection at `port` on `object`, whichever end it is.
    ///
    /// Returns whether anything was disconnected; disconnecting a free port
    /// is a no-op.
    pub fn disconnect(&mut self, object: Handle, port: Port) -> bool {
        self.unlink(object, port).is_some()
    }

    pub fn connected_object(&self, object: Handle, port: Port) -> Option<Handle> {
        self.registry.connected_object(object, port)
    }

    pub fn connected_port(&self, object: Handle, port: Port) -> Option<Port> {
        self.registry.connected_port(object, port)
    }

    /// Object feeding a node's inlet.
    pub fn inlet_object(&self, node: Handle) -> Option<Handle> {
        self.connected_object(node, Node::INLET)
    }

    /// Object fed by a node's outlet.
    pub fn outlet_object(&self, node: Handle) -> Option<Handle> {
        self.connected_object(node, Node::OUTLET)
    }

    fn expect_port(&self, object: Handle, port: Port) -> TopologyResult<()> {
        let component = self.component(object)?;
        let valid = component.fixed_ports().contains(&port)
            || component
                .branch_layout()
                .is_some_and(|l| l.index_of(port).is_some());
        if valid {
            Ok(())
        } else {
            Err(TopologyError::InvalidPort {
                handle: object,
                port,
            })
        }
    }

    /// Connect after validation; a failure here means the model is corrupt.
    pub(crate) fn link(&mut self, source: Endpoint, target: Endpoint) {
        if let Err(err) = self.registry.connect(source, target) {
            panic!("cannot link {source} -> {target}: {err}");
        }
        self.mirror(source, Some(target.object));
        self.mirror(target, Some(source.object));
        debug!(%source, %target, "link");
    }

    pub(crate) fn unlink(&mut self, object: Handle, port: Port) -> Option<hf_graph::Connection> {
        let connection = self.registry.disconnect(object, port)?;
        self.mirror(connection.source, None);
        self.mirror(connection.target, None);
        debug!(%connection, "unlink");
        Some(connection)
    }

    pub(crate) fn upstream(&self, object: Handle, port: Port) -> Option<Endpoint> {
        self.registry.upstream(Endpoint::new(object, port))
    }

    pub(crate) fn downstream(&self, object: Handle, port: Port) -> Option<Endpoint> {
        self.registry.downstream(Endpoint::new(object, port))
    }

    fn mirror(&mut self, endpoint: Endpoint, peer: Option<Handle>) {
        store_op(
            self.store
                .set_pointer(endpoint.object, endpoint.port.field(), peer),
            "pointer write",
        );
    }

    /// Write the non-connection pointer fields from the object's state.
    pub(crate) fn sync_references(&mut self, handle: Handle) {
        let refs: Vec<(usize, Option<Handle>)> = match self.objects.get(&handle) {
            Some(Component::SupplyPlenum(p)) => vec![(SupplyPlenum::ZONE_FIELD, Some(p.plenum_zone))],
            Some(Component::ReturnPlenum(p)) => vec![
                (ReturnPlenum::ZONE_FIELD, Some(p.plenum_zone)),
                (ReturnPlenum::INDUCED_AIR_FIELD, p.induced_air),
            ],
            Some(Component::Zone(z)) => vec![
                (ThermalZone::INLET_PORT_LIST_FIELD, z.inlet_port_list),
                (ThermalZone::EXHAUST_PORT_LIST_FIELD, z.exhaust_port_list),
            ],
            Some(Component::PortList(_)) => {
                vec![(PortList::OWNER_FIELD, self.owners.get(&handle).copied())]
            }
            _ => Vec::new(),
        };
        for (field, value) in refs {
            store_op(self.store.set_pointer(handle, field, value), "reference write");
        }
    }

    /// Remove branch `index` from a splitter, mixer, plenum or port list and
    /// shift later branches down.
    pub fn remove_port_for_branch(&mut self, object: Handle, index: usize) -> TopologyResult<()> {
        self.compact_branch(object, index).map(|_| ())
    }

    pub(crate) fn compact_branch(
        &mut self,
        object: Handle,
        index: usize,
    ) -> TopologyResult<BranchCompaction> {
        let layout = self
            .layout_of(object)
            .ok_or(TopologyError::Precondition {
                what: "object has no branch ports",
            })?;
        let compaction = self.registry.remove_port_for_branch(object, layout, index)?;
        let removed = compaction.removed;
        self.mirror(removed.source, None);
        self.mirror(removed.target, None);
        for (before, after) in &compaction.moved {
            self.mirror(before.source, None);
            self.mirror(before.target, None);
            self.mirror(after.source, Some(after.target.object));
            self.mirror(after.target, Some(after.source.object));
        }
        debug!(%object, index, shifted = compaction.moved.len(), "remove branch");
        Ok(compaction)
    }

    /// Drop an object, its connections, the port lists it owns and its record.
    pub(crate) fn delete_object(&mut self, handle: Handle) {
        let owned: Vec<Handle> = self
            .owners
            .iter()
            .filter(|(_, owner)| **owner == handle)
            .map(|(list, _)| *list)
            .collect();
        for list in owned {
            self.delete_object(list);
        }

        for connection in self.registry.disconnect_object(handle) {
            self.mirror(connection.source, None);
            self.mirror(connection.target, None);
        }

        if let Some(owner) = self.owners.remove(&handle) {
            match self.objects.get_mut(&owner) {
                Some(Component::Zone(z)) => {
                    if z.inlet_port_list == Some(handle) {
                        z.inlet_port_list = None;
                    }
                    if z.exhaust_port_list == Some(handle) {
                        z.exhaust_port_list = None;
                    }
                }
                Some(Component::ReturnPlenum(p)) if p.induced_air == Some(handle) => {
                    p.induced_air = None;
                }
                _ => {}
            }
            self.sync_references(owner);
        }

        for component in self.objects.values_mut() {
            if let Component::Zone(z) = component {
                z.equipment.retain(|&h| h != handle);
            }
        }

        if let Some(component) = self.objects.remove(&handle) {
            store_op(self.store.remove_record(handle), "record removal");
            debug!(%handle, kind = %component.kind(), "remove object");
        }
    }

    // ------------------------------------------------------------------
    // Loop membership and walks
    // ------------------------------------------------------------------

    /// Loop and side `object` sits on, found by walking upstream.
    pub fn loop_of(&self, object: Handle) -> Option<(Handle, LoopSide)> {
        self.loop_via(object, None)
    }

    /// Air loop `object` is on, either side.
    pub fn air_loop_of(&self, object: Handle) -> Option<Handle> {
        self.loop_of(object)
            .map(|(l, _)| l)
            .filter(|&l| self.is_kind(l, ObjectKind::AirLoop))
    }

    /// Plant loop `object` is on. Water coils are followed through their
    /// water ports.
    pub fn plant_loop_of(&self, object: Handle) -> Option<Handle> {
        self.plant_side_of(object)
            .map(|(l, _)| l)
            .filter(|&l| self.is_kind(l, ObjectKind::PlantLoop))
    }

    pub(crate) fn plant_side_of(&self, object: Handle) -> Option<(Handle, LoopSide)> {
        let outlet = matches!(self.objects.get(&object), Some(Component::WaterCoil(_)))
            .then_some(WaterCoil::WATER_OUTLET);
        self.loop_via(object, outlet)
    }

    fn loop_via(&self, object: Handle, outlet: Option<Port>) -> Option<(Handle, LoopSide)> {
        if self.objects.get(&object)?.kind().is_loop() {
            return None;
        }
        let root = upstream_root(self, object, outlet)?;
        let side = self.objects.get(&root.object)?.loop_ports()?.side_of(root.port)?;
        Some((root.object, side))
    }

    pub(crate) fn loop_kind(&self, loop_handle: Handle) -> Option<LoopKind> {
        match self.objects.get(&loop_handle)?.kind() {
            ObjectKind::AirLoop => Some(LoopKind::Air),
            ObjectKind::PlantLoop => Some(LoopKind::Plant),
            _ => None,
        }
    }

    /// Objects on every path from `start` to `end`, both included, in flow
    /// order, optionally keeping only one kind.
    pub fn components_between(
        &self,
        start: Handle,
        end: Handle,
        kind: Option<ObjectKind>,
    ) -> Vec<Handle> {
        let mut found = components_between(self, start, end);
        if let Some(kind) = kind {
            found.retain(|&h| self.is_kind(h, kind));
        }
        found
    }
}

impl Topology for Model {
    fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    fn port_owner(&self, object: Handle) -> Option<&dyn PortOwner> {
        self.objects.get(&object).map(Component::port_owner)
    }

    /// Port lists stand in for the zone or plenum that owns them.
    fn resolve(&self, object: Handle) -> Handle {
        match self.objects.get(&object) {
            Some(Component::PortList(_)) => self.owners.get(&object).copied().unwrap_or(object),
            _ => object,
        }
    }

    /// A walk starting at a water coil follows both the air and the water stream.
    fn exits(&self, object: Handle, entered: Option<Port>) -> Vec<Endpoint> {
        if entered.is_none() && matches!(self.objects.get(&object), Some(Component::WaterCoil(_))) {
            return [WaterCoil::AIR_OUTLET, WaterCoil::WATER_OUTLET]
                .into_iter()
                .filter_map(|port| self.registry.downstream(Endpoint::new(object, port)))
                .collect();
        }
        owner_exits(self, object, entered)
    }

    /// Zones are entered through the first port of their inlet port list.
    fn entry(&self, object: Handle, outlet: Option<Port>) -> Option<Endpoint> {
        if let Some(zone) = self.zone_ref(object) {
            let list = zone.inlet_port_list?;
            let layout = self.layout_of(list)?;
            let port = self.registry.branch_ports(list, layout).first().copied()?;
            return Some(Endpoint::new(list, port));
        }
        owner_entry(self, object, outlet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objects_get_records_and_names() {
        let mut model = Model::new();
        let a = model.add_node();
        let b = model.add_node();
        assert_eq!(model.name(a), Some("Node 1"));
        assert_eq!(model.name(b), Some("Node 2"));
        assert_eq!(model.store().kind(a), Some("Node"));
        assert_eq!(
            model.store().get_field(a, 0).unwrap().as_text(),
            Some("Node 1")
        );

        model.set_name(a, "Supply Inlet").unwrap();
        assert_eq!(model.name(a), Some("Supply Inlet"));
        assert_eq!(
            model.store().get_field(a, 0).unwrap().as_text(),
            Some("Supply Inlet")
        );
    }

    #[test]
    fn connect_mirrors_into_store() {
        let mut model = Model::new();
        let a = model.add_node();
        let b = model.add_node();
        model.connect(a, Node::OUTLET, b, Node::INLET).unwrap();
        assert_eq!(model.outlet_object(a), Some(b));
        assert_eq!(model.store().get_pointer(a, 2).unwrap(), Some(b));
        assert_eq!(model.store().get_pointer(b, 1).unwrap(), Some(a));

        assert!(model.disconnect(b, Node::INLET));
        assert!(!model.disconnect(b, Node::INLET));
        assert_eq!(model.store().get_pointer(a, 2).unwrap(), None);
        assert_eq!(model.store().get_pointer(b, 1).unwrap(), None);
    }

    #[test]
    fn connect_rejects_unknown_ports_and_occupied_ends() {
        let mut model = Model::new();
        let a = model.add_node();
        let b = model.add_node();
        let c = model.add_node();
        assert!(matches!(
            model.connect(a, Port::new(9), b, Node::INLET),
            Err(TopologyError::InvalidPort { .. })
        ));
        model.connect(a, Node::OUTLET, b, Node::INLET).unwrap();
        assert!(matches!(
            model.connect(a, Node::OUTLET, c, Node::INLET),
            Err(TopologyError::Graph(_))
        ));
        assert_eq!(model.registry().len(), 1);
    }

    #[test]
    fn clone_copies_kind_not_connections() {
        let mut model = Model::new();
        let fan = model.add_equipment(StraightKind::FanConstantVolume);
        let node = model.add_node();
        model.connect(fan, Equipment::OUTLET, node, Node::INLET).unwrap();
        let copy = model.clone_component(fan).unwrap();
        assert_eq!(model.kind_of(copy).unwrap(), model.kind_of(fan).unwrap());
        assert_ne!(model.name(copy), model.name(fan));
        assert!(model.registry().connections_of(copy).is_empty());
    }

    #[test]
    fn delete_clears_peer_pointers() {
        let mut model = Model::new();
        let a = model.add_node();
        let b = model.add_node();
        model.connect(a, Node::OUTLET, b, Node::INLET).unwrap();
        model.delete_object(b);
        assert!(!model.contains(b));
        assert!(!model.store().contains(b));
        assert_eq!(model.store().get_pointer(a, 2).unwrap(), None);
        assert!(model.registry().is_empty());
    }
}
