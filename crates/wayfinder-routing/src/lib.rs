//! Wayfinder Routing - route-planning engine
//!
//! Turns an agent profile and a trip into a walkable edge sequence: the
//! agent's strategy picks sub-goals (region gateways, barriers, on-route
//! marks) and the composer joins them with Dijkstra legs under perceived
//! costs.

pub mod barrier;
pub mod composer;
pub mod config;
pub mod cost;
pub mod dijkstra;
pub mod error;
pub mod landmark;
pub mod leg;
pub mod perception;
pub mod planner;
pub mod region;
pub mod traits;

pub use barrier::BarrierNavigator;
pub use composer::RouteComposer;
pub use config::PlannerConfig;
pub use cost::CostModel;
pub use dijkstra::{DijkstraEngine, Search, SearchSpace};
pub use error::{Result, RoutingError};
pub use landmark::LandmarkNavigator;
pub use leg::{LegObjective, LegPlanner};
pub use perception::{Clip, Perception};
pub use planner::{Route, RoutePlanner, TripRequest};
pub use region::RegionNavigator;
pub use traits::SubGoalNavigator;
