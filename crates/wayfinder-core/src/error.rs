//! Error types for Wayfinder Core

use crate::ids::{BarrierId, BuildingId, EdgeId, NodeId, RegionId};
use thiserror::Error;

/// Result type alias using Wayfinder's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Wayfinder world-model error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    #[error("Region not found: {0}")]
    RegionNotFound(RegionId),

    #[error("Barrier not found: {0}")]
    BarrierNotFound(BarrierId),

    #[error("Building not found: {0}")]
    BuildingNotFound(BuildingId),

    #[error("Invalid edge {edge}: {reason}")]
    InvalidEdge { edge: EdgeId, reason: String },

    #[error("Invalid gateway {exit} -> {entry}: {reason}")]
    InvalidGateway {
        exit: NodeId,
        entry: NodeId,
        reason: String,
    },

    #[error("Invalid world: {0}")]
    InvalidWorld(String),

    #[error("Validation error: {0}")]
    Validation(#[from] crate::limits::ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
