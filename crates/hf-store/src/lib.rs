//! hf-store: field-level persistence boundary for hvacflow.
//!
//! Provides:
//! - `FieldStore`: abstract record store (get/set field by index, pointer
//!   resolution, extensible groups, first empty pointer slot)
//! - `FieldValue`: the value of a single field
//! - `MemoryStore`: in-process implementation backed by ordered maps
//!
//! The topology core only ever talks to a `FieldStore`, so other backends can
//! be plugged in without touching the graph code.

pub mod error;
pub mod memory;
pub mod store;
pub mod value;

// Re-exports
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::FieldStore;
pub use value::FieldValue;
