//! Error types for the hf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// behind one interface for front-ends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write project file: {path}")]
    ProjectFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Loop not found: {0}")]
    LoopNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hf-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<hf_project::ProjectError> for AppError {
    fn from(err: hf_project::ProjectError) -> Self {
        match err {
            hf_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            hf_project::ProjectError::Build(e) => AppError::Topology(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<hf_project::ValidationError> for AppError {
    fn from(err: hf_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<hf_model::TopologyError> for AppError {
    fn from(err: hf_model::TopologyError) -> Self {
        AppError::Topology(err.to_string())
    }
}
