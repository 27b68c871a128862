//! Graph-specific error types.

use hf_core::{Handle, HfError};

use crate::port::{Endpoint, Port};

/// Connection and branch errors.
///
/// Every variant is raised before the registry is touched, so an `Err` always
/// means the registry is unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The source endpoint already takes part in an edge.
    SourceOccupied { endpoint: Endpoint },

    /// The target endpoint already takes part in an edge.
    TargetOccupied { endpoint: Endpoint },

    /// Source and target belong to the same object.
    SelfLoop { object: Handle },

    /// No edge touches this endpoint.
    NotConnected { endpoint: Endpoint },

    /// Branch index past the current branch count.
    BranchOutOfRange {
        object: Handle,
        index: usize,
        count: usize,
    },

    /// The object has no variable branch ports.
    NoBranches { object: Handle },

    /// Internal maps disagree with each other.
    Inconsistent { what: String },
}

pub type GraphResult<T> = Result<T, GraphError>;

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::SourceOccupied { endpoint } => {
                write!(f, "Source {} is already connected", endpoint)
            }
            GraphError::TargetOccupied { endpoint } => {
                write!(f, "Target {} is already connected", endpoint)
            }
            GraphError::SelfLoop { object } => {
                write!(f, "Object {} cannot be connected to itself", object)
            }
            GraphError::NotConnected { endpoint } => {
                write!(f, "No connection at {}", endpoint)
            }
            GraphError::BranchOutOfRange {
                object,
                index,
                count,
            } => {
                write!(
                    f,
                    "Branch {} out of range for object {} ({} branches)",
                    index, object, count
                )
            }
            GraphError::NoBranches { object } => {
                write!(f, "Object {} has no branch ports", object)
            }
            GraphError::Inconsistent { what } => {
                write!(f, "Connection registry inconsistent: {}", what)
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for HfError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::BranchOutOfRange { index, count, .. } => HfError::IndexOob {
                what: "branch",
                index,
                len: count,
            },
            other => HfError::Invariant {
                what: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_endpoint() {
        let endpoint = Endpoint::new(Handle::from_index(4), Port::new(2));
        let err = GraphError::SourceOccupied { endpoint };
        assert_eq!(err.to_string(), "Source 4:2 is already connected");
    }

    #[test]
    fn branch_error_converts_to_index_oob() {
        let err = GraphError::BranchOutOfRange {
            object: Handle::from_index(1),
            index: 5,
            count: 2,
        };
        let core: HfError = err.into();
        assert_eq!(
            core,
            HfError::IndexOob {
                what: "branch",
                index: 5,
                len: 2
            }
        );
    }
}
