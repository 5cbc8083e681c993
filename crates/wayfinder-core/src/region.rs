//! Regions of the primal graph and the gateways connecting them

use crate::ids::{BuildingId, EdgeId, NodeId, RegionId};
use crate::subgraph::SubGraph;
use serde::{Deserialize, Serialize};

/// A directed region crossing: leave `region_from` at `exit`, arrive in
/// `region_to` at `entry`, over the bridging `edge`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    pub exit: NodeId,
    pub entry: NodeId,
    pub edge: EdgeId,
    pub region_from: RegionId,
    pub region_to: RegionId,

    /// Bearing from exit to entry
    pub entry_angle: f64,

    /// Length of the bridging edge
    pub distance: f64,
}

impl Gateway {
    pub fn key(&self) -> (NodeId, NodeId) {
        (self.exit, self.entry)
    }
}

/// A spatial partition of the street network
#[derive(Debug, Clone)]
pub struct Region {
    pub id: RegionId,

    /// Primal sub-graph of the region's own edges
    pub primal: SubGraph,

    /// Dual sub-graph of the turns between the region's own segments
    pub dual: SubGraph,

    /// Gateways leaving this region
    pub gateways: Vec<Gateway>,

    pub buildings: Vec<BuildingId>,
    pub landmarks: Vec<BuildingId>,

    /// Share of buildings that offer no landmark cue, in `[0, 1]`
    pub complexity: f64,
}

impl Region {
    /// Gateways leaving this region towards `target`
    pub fn gateways_to(&self, target: RegionId) -> impl Iterator<Item = &Gateway> + '_ {
        self.gateways.iter().filter(move |g| g.region_to == target)
    }

    /// Gateways leaving this region through `exit`
    pub fn gateways_at(&self, exit: NodeId) -> impl Iterator<Item = &Gateway> + '_ {
        self.gateways.iter().filter(move |g| g.exit == exit)
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.primal.contains_parent_node(node)
    }
}
