//! hf-graph: connection layer for hvacflow.
//!
//! Provides:
//! - Port/endpoint/connection value types
//! - `ConnectionRegistry`, the single authority on which (object, port) pairs are joined
//! - `PortOwner`, the capability every graph participant implements
//! - Branch port algebra for variable-arity owners (splitters, mixers, port lists)
//! - Ordered traversal between two objects over any `Topology`
//!
//! # Example
//!
//! ```
//! use hf_core::Handle;
//! use hf_graph::{ConnectionRegistry, Endpoint, Port};
//!
//! let mut registry = ConnectionRegistry::new();
//! let fan = Handle::fresh();
//! let node = Handle::fresh();
//! registry
//!     .connect(Endpoint::new(fan, Port::new(2)), Endpoint::new(node, Port::new(1)))
//!     .unwrap();
//!
//! assert_eq!(registry.connected_object(node, Port::new(1)), Some(fan));
//! assert!(registry.disconnect(node, Port::new(1)).is_some());
//! assert!(registry.disconnect(node, Port::new(1)).is_none());
//! ```

pub mod branch;
pub mod error;
pub mod port;
pub mod registry;
pub mod traversal;

// Re-exports for ergonomics
pub use branch::{BranchCompaction, BranchLayout, BranchSide};
pub use error::{GraphError, GraphResult};
pub use port::{Connection, Endpoint, Port, PortOwner};
pub use registry::ConnectionRegistry;
pub use traversal::{Topology, components_between, owner_entry, owner_exits, upstream_root};
