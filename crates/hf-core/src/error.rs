use thiserror::Error;

use crate::handle::Handle;

pub type HfResult<T> = Result<T, HfError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HfError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{what} not found: {handle}")]
    NotFound { what: &'static str, handle: Handle },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}
