//! hf-components: component library for HVAC topologies.
//!
//! Provides the objects that take part in an air or plant loop:
//! - Nodes, the passthrough vertices every connection goes through
//! - Straight equipment (fans, electric coils, pumps, boilers, pipes)
//! - Water coils, with separate air and water port pairs
//! - Air terminals, some with a secondary (induced air) inlet
//! - Splitters, mixers and plenums with variable branch ports
//! - Thermal zones and their port lists
//! - Air and plant loops
//!
//! Every object implements `PortOwner`; `Component` dispatches to the right
//! implementation for whatever kind a handle refers to.

pub mod component;
pub mod connector;
pub mod equipment;
pub mod kind;
pub mod loops;
pub mod node;
pub mod terminal;
pub mod zone;

// Re-exports
pub use component::Component;
pub use connector::{ConnectorKind, Mixer, ReturnPlenum, Splitter, SupplyPlenum};
pub use equipment::{Equipment, StraightKind, WaterCoil, WaterCoilKind};
pub use kind::{LoopKind, LoopSide, ObjectKind};
pub use loops::{AirLoop, LoopPorts, PlantLoop};
pub use node::Node;
pub use terminal::{AirTerminal, TerminalKind};
pub use zone::{PortList, PortListRole, ThermalZone};
