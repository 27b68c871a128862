//! Errors raised by topology edits.

use hf_components::{LoopKind, LoopSide, ObjectKind};
use hf_core::{Handle, HfError};
use hf_graph::{GraphError, Port};
use thiserror::Error;

/// Rejected edit or query.
///
/// Returned before any mutation: an `Err` leaves the model unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Object {handle} not found")]
    NotFound { handle: Handle },

    #[error("Object {handle} is a {actual}, expected {expected}")]
    WrongKind {
        handle: Handle,
        expected: &'static str,
        actual: ObjectKind,
    },

    #[error("Object {handle} has no port {port}")]
    InvalidPort { handle: Handle, port: Port },

    #[error("Object {handle} is already connected")]
    AlreadyConnected { handle: Handle },

    #[error("Object {handle} is still in use")]
    InUse { handle: Handle },

    #[error("Node {node} is not on a loop")]
    NotOnLoop { node: Handle },

    #[error("{kind} cannot be placed on the {side} side of a {loop_kind}")]
    Placement {
        kind: ObjectKind,
        loop_kind: LoopKind,
        side: LoopSide,
    },

    #[error("Zone {zone} is already served by air loop {air_loop}")]
    ZoneAlreadyServed { zone: Handle, air_loop: Handle },

    #[error("Zone {zone} is not on air loop {air_loop}")]
    ZoneNotOnLoop { zone: Handle, air_loop: Handle },

    #[error("Zone {zone} is a plenum")]
    PlenumZone { zone: Handle },

    #[error("Zone {zone} is not a plenum")]
    NotPlenum { zone: Handle },

    #[error("Precondition failed: {what}")]
    Precondition { what: &'static str },

    #[error("Unsupported: {what}")]
    Unsupported { what: &'static str },

    #[error("Topology inconsistent: {what}")]
    Inconsistent { what: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type TopologyResult<T> = Result<T, TopologyError>;

impl From<TopologyError> for HfError {
    fn from(e: TopologyError) -> Self {
        match e {
            TopologyError::NotFound { handle } => HfError::NotFound {
                what: "object",
                handle,
            },
            TopologyError::Graph(graph) => graph.into(),
            TopologyError::Inconsistent { what } => HfError::Invariant { what },
            other => HfError::InvalidArg {
                what: other.static_reason(),
            },
        }
    }
}

impl TopologyError {
    fn static_reason(&self) -> &'static str {
        match self {
            TopologyError::WrongKind { .. } => "object kind",
            TopologyError::InvalidPort { .. } => "port",
            TopologyError::AlreadyConnected { .. } => "already connected",
            TopologyError::InUse { .. } => "object in use",
            TopologyError::NotOnLoop { .. } => "node not on a loop",
            TopologyError::Placement { .. } => "placement",
            TopologyError::ZoneAlreadyServed { .. } => "zone already served",
            TopologyError::ZoneNotOnLoop { .. } => "zone not on loop",
            TopologyError::PlenumZone { .. } => "plenum zone",
            TopologyError::NotPlenum { .. } => "not a plenum",
            TopologyError::Precondition { what } | TopologyError::Unsupported { what } => what,
            TopologyError::NotFound { .. }
            | TopologyError::Inconsistent { .. }
            | TopologyError::Graph(_) => "topology",
        }
    }
}
