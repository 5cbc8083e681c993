//! Wayfinder Core - World model for pedestrian route choice
//!
//! This crate provides the street graph, its dual, regions and gateways,
//! barriers, buildings and agent profiles that the Wayfinder planners read.
//! Everything here is built once and then shared read-only.

pub mod agent;
pub mod barrier;
pub mod dual;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod ids;
pub mod landmark;
pub mod limits;
pub mod region;
pub mod subgraph;
pub mod traffic;
pub mod world;

pub use agent::{AgentProperties, LocalHeuristic, MarkKind, RouteStrategy};
pub use barrier::{Barrier, BarrierKind, BarrierPreference};
pub use dual::DualGraph;
pub use error::{Error, Result};
pub use graph::{DirectedEdge, Edge, EdgeBarriers, Graph, Node};
pub use ids::{BarrierId, BuildingId, EdgeId, NodeId, RegionId};
pub use landmark::{Anchor, Building};
pub use region::{Gateway, Region};
pub use subgraph::SubGraph;
pub use traffic::TrafficCounters;
pub use world::{
    BarrierSpec, BuildingSpec, EdgeSpec, GatewaySpec, NodeSpec, RegionSpec, World, WorldSpec,
};
