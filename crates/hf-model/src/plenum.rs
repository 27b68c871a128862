//! Supply and return plenums on zone branches.
//!
//! A plenum for a given plenum zone is shared by every zone branch on the
//! same loop that uses it. Joining a shared plenum compacts the zone's own
//! splitter or mixer branch away; leaving it re-appends one.

use hf_components::{Component, Mixer, Node, ObjectKind, ReturnPlenum, SupplyPlenum};
use hf_core::Handle;
use hf_graph::Endpoint;
use tracing::debug;

use crate::error::{TopologyError, TopologyResult};
use crate::model::{Model, validated};

impl Model {
    /// Supply plenum between the zone splitter and `zone`.
    pub fn supply_plenum(&self, zone: Handle) -> Option<Handle> {
        let air_loop = self.air_loop_of(zone)?;
        self.zone_splitters(air_loop).into_iter().find_map(|splitter| {
            self.components_between(splitter, zone, Some(ObjectKind::SupplyPlenum))
                .first()
                .copied()
        })
    }

    /// Return plenum between `zone` and the zone mixer.
    pub fn return_plenum(&self, zone: Handle) -> Option<Handle> {
        let air_loop = self.air_loop_of(zone)?;
        let mixer = self.zone_mixer(air_loop)?;
        self.components_between(zone, mixer, Some(ObjectKind::ReturnPlenum))
            .first()
            .copied()
    }

    /// Zones whose branches pass through `plenum`.
    pub fn zones_served_by_plenum(&self, plenum: Handle) -> Vec<Handle> {
        let supply = self.is_kind(plenum, ObjectKind::SupplyPlenum);
        self.objects_of_kind(ObjectKind::ThermalZone)
            .into_iter()
            .filter(|&zone| {
                let found = if supply {
                    self.supply_plenum(zone)
                } else {
                    self.return_plenum(zone)
                };
                found == Some(plenum)
            })
            .collect()
    }

    /// Route `zone`'s supply air through a plenum around `plenum_zone`.
    ///
    /// Reuses the loop's existing plenum for that plenum zone, if any.
    pub fn set_supply_plenum(&mut self, zone: Handle, plenum_zone: Handle) -> TopologyResult<()> {
        let result = self.try_set_supply_plenum(zone, plenum_zone);
        match &result {
            Ok(()) => debug!(%zone, %plenum_zone, "set supply plenum"),
            Err(err) => debug!(%zone, %plenum_zone, %err, "set supply plenum rejected"),
        }
        result
    }

    /// Route `zone`'s return air through a plenum around `plenum_zone`.
    ///
    /// Induced air for the zone's terminals moves to the plenum.
    pub fn set_return_plenum(&mut self, zone: Handle, plenum_zone: Handle) -> TopologyResult<()> {
        let result = self.try_set_return_plenum(zone, plenum_zone);
        match &result {
            Ok(()) => debug!(%zone, %plenum_zone, "set return plenum"),
            Err(err) => debug!(%zone, %plenum_zone, %err, "set return plenum rejected"),
        }
        result
    }

    /// Take `zone` off its supply plenum. A no-op when it has none.
    pub fn remove_supply_plenum(&mut self, zone: Handle) -> TopologyResult<()> {
        self.expect_zone(zone)?;
        self.detach_supply_plenum(zone);
        Ok(())
    }

    /// Take `zone` off its return plenum. A no-op when it has none.
    pub fn remove_return_plenum(&mut self, zone: Handle) -> TopologyResult<()> {
        self.expect_zone(zone)?;
        self.detach_return_plenum(zone);
        Ok(())
    }

    /// Air loop a plenum may be set on for `zone`.
    fn plenum_target(&self, zone: Handle, plenum_zone: Handle) -> TopologyResult<Handle> {
        if self.expect_zone(zone)?.is_plenum {
            return Err(TopologyError::PlenumZone { zone });
        }
        self.expect_plenum_zone(plenum_zone)?;
        let air_loop = self.air_loop_of(zone).ok_or(TopologyError::Precondition {
            what: "zone is not on an air loop",
        })?;
        if self.is_dual_duct(air_loop) {
            return Err(TopologyError::Unsupported {
                what: "plenums on dual-duct air loops",
            });
        }
        Ok(air_loop)
    }

    fn try_set_supply_plenum(&mut self, zone: Handle, plenum_zone: Handle) -> TopologyResult<()> {
        self.plenum_target(zone, plenum_zone)?;
        if let Some(current) = self.supply_plenum(zone) {
            if self.plenum_zone_of(current) == Some(plenum_zone) {
                return Ok(());
            }
            self.detach_supply_plenum(zone);
        }

        let splitter = self.zone_splitter_for(zone);
        let index = validated(
            self.branch_leading_to(splitter, zone)
                .ok_or(TopologyError::Inconsistent {
                    what: format!("no splitter branch reaches zone {zone}"),
                }),
            "supply plenum",
        );
        let first = self.outlet_object_for_branch(splitter, index);
        let first = validated(
            first.ok_or(TopologyError::Inconsistent {
                what: format!("splitter {splitter} branch {index} is empty"),
            }),
            "supply plenum",
        );

        match self.supply_plenum_on(splitter, plenum_zone) {
            Some(plenum) => {
                validated(self.compact_branch(splitter, index), "supply plenum");
                self.append_outlet_branch(plenum, Endpoint::new(first, Node::INLET));
            }
            None => {
                let plenum = validated(self.add_supply_plenum(plenum_zone), "supply plenum");
                let port = SupplyPlenum::LAYOUT.port(0);
                let splitter_port = self.upstream(first, Node::INLET);
                let splitter_port = validated(
                    splitter_port.ok_or(TopologyError::Inconsistent {
                        what: format!("node {first} lost its splitter connection"),
                    }),
                    "supply plenum",
                );
                self.unlink(first, Node::INLET);
                let inlet_node = self.add_node();
                self.link(splitter_port, Endpoint::new(inlet_node, Node::INLET));
                self.link(
                    Endpoint::new(inlet_node, Node::OUTLET),
                    Endpoint::new(plenum, SupplyPlenum::INLET),
                );
                self.link(Endpoint::new(plenum, port), Endpoint::new(first, Node::INLET));
            }
        }
        Ok(())
    }

    fn try_set_return_plenum(&mut self, zone: Handle, plenum_zone: Handle) -> TopologyResult<()> {
        let air_loop = self.plenum_target(zone, plenum_zone)?;
        if let Some(current) = self.return_plenum(zone) {
            if self.plenum_zone_of(current) == Some(plenum_zone) {
                return Ok(());
            }
            self.detach_return_plenum(zone);
        }

        let mixer = validated(
            self.zone_mixer(air_loop).ok_or(TopologyError::Inconsistent {
                what: format!("air loop {air_loop} has no zone mixer"),
            }),
            "return plenum",
        );
        let index = validated(
            self.branch_leading_from(mixer, zone)
                .ok_or(TopologyError::Inconsistent {
                    what: format!("no mixer branch leaves zone {zone}"),
                }),
            "return plenum",
        );
        let last = validated(
            self.inlet_object_for_branch(mixer, index)
                .ok_or(TopologyError::Inconsistent {
                    what: format!("mixer {mixer} branch {index} is empty"),
                }),
            "return plenum",
        );

        match self.return_plenum_on(mixer, plenum_zone) {
            Some(plenum) => {
                validated(self.compact_branch(mixer, index), "return plenum");
                self.append_inlet_branch(Endpoint::new(last, Node::OUTLET), plenum);
            }
            None => {
                let plenum = validated(self.add_return_plenum(plenum_zone), "return plenum");
                let mixer_port = Endpoint::new(mixer, Mixer::LAYOUT.port(index));
                self.unlink(last, Node::OUTLET);
                let outlet_node = self.add_node();
                self.link(
                    Endpoint::new(plenum, ReturnPlenum::OUTLET),
                    Endpoint::new(outlet_node, Node::INLET),
                );
                self.link(Endpoint::new(outlet_node, Node::OUTLET), mixer_port);
                self.append_inlet_branch(Endpoint::new(last, Node::OUTLET), plenum);
            }
        }
        self.rehome_induced_air(zone);
        Ok(())
    }

    pub(crate) fn detach_supply_plenum(&mut self, zone: Handle) {
        let Some(plenum) = self.supply_plenum(zone) else {
            return;
        };
        let Some(index) = self.branch_leading_to(plenum, zone) else {
            return;
        };
        let Some(first) = self.outlet_object_for_branch(plenum, index) else {
            return;
        };
        let inlet_node = self.upstream(plenum, SupplyPlenum::INLET).map(|ep| ep.object);
        let feed = inlet_node.and_then(|node| self.upstream(node, Node::INLET));

        if self.branch_count(plenum) == 1 {
            self.unlink(plenum, SupplyPlenum::LAYOUT.port(index));
            if let Some(node) = inlet_node {
                self.delete_object(node);
            }
            self.delete_object(plenum);
            if let Some(feed) = feed {
                self.link(feed, Endpoint::new(first, Node::INLET));
            }
        } else {
            validated(self.compact_branch(plenum, index), "supply plenum removal");
            if let Some(feed) = feed {
                self.append_outlet_branch(feed.object, Endpoint::new(first, Node::INLET));
            }
        }
        debug!(%zone, %plenum, "leave supply plenum");
    }

    pub(crate) fn detach_return_plenum(&mut self, zone: Handle) {
        let Some(plenum) = self.return_plenum(zone) else {
            return;
        };
        let Some(index) = self.branch_leading_from(plenum, zone) else {
            return;
        };
        let Some(last) = self.inlet_object_for_branch(plenum, index) else {
            return;
        };
        let outlet_node = self.downstream(plenum, ReturnPlenum::OUTLET).map(|ep| ep.object);
        let feed = outlet_node.and_then(|node| self.downstream(node, Node::OUTLET));

        if self.branch_count(plenum) == 1 {
            self.unlink(plenum, ReturnPlenum::LAYOUT.port(index));
            if let Some(node) = outlet_node {
                self.delete_object(node);
            }
            self.delete_object(plenum);
            if let Some(feed) = feed {
                self.link(Endpoint::new(last, Node::OUTLET), feed);
            }
        } else {
            validated(self.compact_branch(plenum, index), "return plenum removal");
            if let Some(feed) = feed {
                self.append_inlet_branch(Endpoint::new(last, Node::OUTLET), feed.object);
            }
        }
        self.rehome_induced_air(zone);
        debug!(%zone, %plenum, "leave return plenum");
    }

    /// Plenum attached to `splitter` for `plenum_zone`.
    fn supply_plenum_on(&self, splitter: Handle, plenum_zone: Handle) -> Option<Handle> {
        self.outlet_objects(splitter).into_iter().find_map(|node| {
            let plenum = self.downstream(node, Node::OUTLET)?.object;
            (self.is_kind(plenum, ObjectKind::SupplyPlenum)
                && self.plenum_zone_of(plenum) == Some(plenum_zone))
            .then_some(plenum)
        })
    }

    /// Plenum feeding `mixer` for `plenum_zone`.
    fn return_plenum_on(&self, mixer: Handle, plenum_zone: Handle) -> Option<Handle> {
        self.inlet_objects(mixer).into_iter().find_map(|node| {
            let plenum = self.upstream(node, Node::INLET)?.object;
            (self.is_kind(plenum, ObjectKind::ReturnPlenum)
                && self.plenum_zone_of(plenum) == Some(plenum_zone))
            .then_some(plenum)
        })
    }

    pub fn plenum_zone_of(&self, plenum: Handle) -> Option<Handle> {
        match self.objects.get(&plenum)? {
            Component::SupplyPlenum(p) => Some(p.plenum_zone),
            Component::ReturnPlenum(p) => Some(p.plenum_zone),
            _ => None,
        }
    }

    fn plenum_unattached(&self, plenum: Handle) -> bool {
        self.registry.connections_of(plenum).is_empty()
    }

    /// Plenum goes right after a zone splitter, ahead of a zone branch.
    pub(crate) fn plan_supply_plenum(&self, plenum: Handle, node: Handle) -> TopologyResult<Endpoint> {
        if !self.plenum_unattached(plenum) {
            return Err(TopologyError::AlreadyConnected { handle: plenum });
        }
        let air_loop = self.require_air_demand(node, ObjectKind::SupplyPlenum)?;
        if self.is_dual_duct(air_loop) {
            return Err(TopologyError::Unsupported {
                what: "plenums on dual-duct air loops",
            });
        }
        let fed_by_splitter = self
            .upstream(node, Node::INLET)
            .is_some_and(|ep| self.is_kind(ep.object, ObjectKind::ZoneSplitter));
        if !fed_by_splitter {
            return Err(TopologyError::Precondition {
                what: "a supply plenum attaches to a node fed by the zone splitter",
            });
        }
        self.downstream(node, Node::OUTLET)
            .filter(|ep| !self.is_kind(ep.object, ObjectKind::ZoneMixer))
            .ok_or(TopologyError::Precondition {
                what: "a supply plenum attaches ahead of a zone branch",
            })
    }

    /// `node -> plenum -> new node -> down`
    pub(crate) fn apply_supply_plenum(&mut self, plenum: Handle, node: Handle, down: Endpoint) {
        self.unlink(node, Node::OUTLET);
        self.link(
            Endpoint::new(node, Node::OUTLET),
            Endpoint::new(plenum, SupplyPlenum::INLET),
        );
        let fresh = self.add_node();
        self.append_outlet_branch(plenum, Endpoint::new(fresh, Node::INLET));
        self.link(Endpoint::new(fresh, Node::OUTLET), down);
    }

    /// Plenum goes on a zone's return node, ahead of the zone mixer.
    pub(crate) fn plan_return_plenum(
        &self,
        plenum: Handle,
        node: Handle,
    ) -> TopologyResult<(Handle, Endpoint)> {
        if !self.plenum_unattached(plenum) {
            return Err(TopologyError::AlreadyConnected { handle: plenum });
        }
        let air_loop = self.require_air_demand(node, ObjectKind::ReturnPlenum)?;
        if self.is_dual_duct(air_loop) {
            return Err(TopologyError::Unsupported {
                what: "plenums on dual-duct air loops",
            });
        }
        let zone = self
            .upstream(node, Node::INLET)
            .filter(|ep| self.is_kind(ep.object, ObjectKind::ThermalZone))
            .ok_or(TopologyError::Precondition {
                what: "a return plenum attaches to a zone's return air node",
            })?
            .object;
        let mixer = self
            .downstream(node, Node::OUTLET)
            .filter(|ep| self.is_kind(ep.object, ObjectKind::ZoneMixer))
            .ok_or(TopologyError::Precondition {
                what: "a return plenum attaches to a node that feeds the zone mixer",
            })?;
        Ok((zone, mixer))
    }

    /// `node -> plenum -> new node -> mixer`, then move the zone's induced air.
    pub(crate) fn apply_return_plenum(
        &mut self,
        plenum: Handle,
        node: Handle,
        zone: Handle,
        mixer: Endpoint,
    ) {
        self.unlink(node, Node::OUTLET);
        self.append_inlet_branch(Endpoint::new(node, Node::OUTLET), plenum);
        let fresh = self.add_node();
        self.link(
            Endpoint::new(plenum, ReturnPlenum::OUTLET),
            Endpoint::new(fresh, Node::INLET),
        );
        self.link(Endpoint::new(fresh, Node::OUTLET), mixer);
        self.rehome_induced_air(zone);
    }

    /// Detach every zone from `plenum`, then drop it.
    pub(crate) fn remove_plenum(&mut self, plenum: Handle) {
        let supply = self.is_kind(plenum, ObjectKind::SupplyPlenum);
        for zone in self.zones_served_by_plenum(plenum) {
            if supply {
                self.detach_supply_plenum(zone);
            } else {
                self.detach_return_plenum(zone);
            }
        }
        if !self.contains(plenum) {
            return;
        }
        // Attached with no zone behind it: a single pass-through branch
        if self.branch_count(plenum) == 1 {
            let (inlet, outlet) = if supply {
                (SupplyPlenum::INLET, SupplyPlenum::LAYOUT.port(0))
            } else {
                (ReturnPlenum::LAYOUT.port(0), ReturnPlenum::OUTLET)
            };
            self.unsplice(plenum, inlet, outlet);
        }
        self.delete_object(plenum);
    }
}
