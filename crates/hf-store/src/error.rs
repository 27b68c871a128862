//! Error types for field store operations.

use hf_core::{Handle, HfError};
use thiserror::Error;

/// Errors raised by a [`crate::FieldStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("No record for object {handle}")]
    MissingRecord { handle: Handle },

    #[error("Record for object {handle} already exists")]
    DuplicateRecord { handle: Handle },

    #[error("Field {index} out of range for object {handle} ({len} fields)")]
    FieldOutOfRange {
        handle: Handle,
        index: usize,
        len: usize,
    },

    #[error("Field {index} of object {handle} does not hold a pointer")]
    NotAPointer { handle: Handle, index: usize },

    #[error("Extensible group width must be positive")]
    EmptyGroup,
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for HfError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MissingRecord { handle } => HfError::NotFound {
                what: "record",
                handle,
            },
            StoreError::FieldOutOfRange { index, len, .. } => HfError::IndexOob {
                what: "field",
                index,
                len,
            },
            StoreError::EmptyGroup => HfError::InvalidArg {
                what: "extensible group width",
            },
            other => HfError::Invariant {
                what: other.to_string(),
            },
        }
    }
}
