//! hf-model: HVAC topology model.
//!
//! A [`Model`] owns every object, the connection registry and the field store
//! that mirrors connections as pointer fields. All editing goes through it:
//! - Object creation and loop skeletons (air, dual-duct air, plant)
//! - Splicing components onto nodes and removing them again
//! - Zone branches, terminals, induced air and plenums
//! - Plant branches
//! - Flow-ordered queries, invariant checks and graph export
//!
//! Every fallible operation validates its preconditions before touching the
//! graph, so an `Err` means the model is exactly as it was.

pub mod error;
pub mod export;
pub mod model;

mod air_loop;
mod branches;
mod plant_loop;
mod plenum;
mod splice;
mod validate;
mod zone;

// Re-exports
pub use error::{TopologyError, TopologyResult};
pub use export::{LoopSummary, ObjectSummary, TopologySummary};
pub use model::Model;
