//! Shared application service layer for hvacflow.
//!
//! This crate gives the CLI one place to load recipes, validate them, build
//! models and report on the result.

pub mod error;
pub mod project_service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use project_service::{
    Format, LoopOverview, build_model, list_loops, load_project, save_project, summarize,
    validate_project,
};
