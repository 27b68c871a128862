//! hf-core: stable foundation for hvacflow.
//!
//! Contains:
//! - handle (process-unique compact IDs for every model object)
//! - error (shared error types)

pub mod error;
pub mod handle;

// Re-exports: nice ergonomics for downstream crates
pub use error::{HfError, HfResult};
pub use handle::Handle;
