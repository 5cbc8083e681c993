//! Routing error types

use thiserror::Error;
use wayfinder_core::limits::ValidationError;
use wayfinder_core::NodeId;

/// Result type alias for planning operations
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Planning error types
///
/// An unreachable destination is not an error: searches signal it with an
/// empty edge sequence and the composer degrades to a partial route.
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("World error: {0}")]
    World(#[from] wayfinder_core::Error),

    #[error("Origin and destination are the same node: {0}")]
    DegenerateTrip(NodeId),

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Sub-goal sequence needs at least two nodes, got {0}")]
    ShortSequence(usize),

    #[error("Invalid agent profile: {0}")]
    InvalidAgent(#[from] ValidationError),

    #[error("Invalid planner config: {0}")]
    InvalidConfig(ValidationError),
}
