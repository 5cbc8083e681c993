//! Street graph arena shared by the primal and dual representations

use crate::error::{Error, Result};
use crate::geometry;
use crate::ids::{BarrierId, BuildingId, EdgeId, NodeId, RegionId};
use crate::landmark::Anchor;
use geo::Coord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A graph node
///
/// In the primal graph a node is a junction; in the dual graph it stands for
/// one primal street segment and sits at its midpoint.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub coord: Coord<f64>,

    /// Region the node belongs to, `None` when unassigned
    pub region: Option<RegionId>,

    /// Precomputed centrality score
    pub centrality: f64,

    /// Whether the node is the exit or entry of some gateway
    pub gateway: bool,

    /// Buildings acting as local landmarks at this junction
    pub local_landmarks: Vec<BuildingId>,

    /// Distant landmarks visible from this junction
    pub distant_landmarks: Vec<BuildingId>,

    /// Distant landmarks anchoring this node when it is a destination
    pub anchors: Vec<Anchor>,
}

impl Node {
    pub fn new(id: NodeId, coord: Coord<f64>) -> Self {
        Self {
            id,
            coord,
            region: None,
            centrality: 0.0,
            gateway: false,
            local_landmarks: Vec::new(),
            distant_landmarks: Vec::new(),
            anchors: Vec::new(),
        }
    }

    pub fn with_region(mut self, region: RegionId) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_centrality(mut self, centrality: f64) -> Self {
        self.centrality = centrality;
        self
    }
}

/// Barriers an edge runs along or crosses, grouped the way cost perception reads them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeBarriers {
    #[serde(default)]
    pub positive: Vec<BarrierId>,
    #[serde(default)]
    pub negative: Vec<BarrierId>,
    #[serde(default)]
    pub water: Vec<BarrierId>,
    #[serde(default)]
    pub parks: Vec<BarrierId>,
}

impl EdgeBarriers {
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty()
            && self.negative.is_empty()
            && self.water.is_empty()
            && self.parks.is_empty()
    }
}

/// An undirected graph edge
///
/// Primal edges are street segments; dual edges are turns between two
/// segments sharing a junction and carry the turn's deflection angle.
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub length: f64,

    /// Heading change through the shared junction (dual edges only)
    pub deflection: f64,

    /// Region of the edge, `None` on boundary edges spanning two regions
    pub region: Option<RegionId>,

    pub barriers: EdgeBarriers,
}

impl Edge {
    pub fn new(id: EdgeId, from: NodeId, to: NodeId, length: f64) -> Self {
        Self {
            id,
            from,
            to,
            length,
            deflection: 0.0,
            region: None,
            barriers: EdgeBarriers::default(),
        }
    }

    /// The endpoint opposite to `node`, if `node` is an endpoint
    pub fn opposite(&self, node: NodeId) -> Option<NodeId> {
        if self.from == node {
            Some(self.to)
        } else if self.to == node {
            Some(self.from)
        } else {
            None
        }
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }

    /// Endpoint shared with `other`, if any
    pub fn shared_node(&self, other: &Edge) -> Option<NodeId> {
        if other.touches(self.from) {
            Some(self.from)
        } else if other.touches(self.to) {
            Some(self.to)
        } else {
            None
        }
    }
}

/// An edge traversed in a given direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectedEdge {
    pub edge: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
}

impl DirectedEdge {
    pub fn reversed(self) -> Self {
        Self {
            edge: self.edge,
            from: self.to,
            to: self.from,
        }
    }
}

/// Node/edge arena with incidence lists and a centrality ranking
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    incidence: Vec<Vec<EdgeId>>,
    /// Nodes sorted by ascending centrality
    ranking: Vec<(NodeId, f64)>,
}

impl Graph {
    /// Build a graph, checking that ids are dense and endpoints exist
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self> {
        for (index, node) in nodes.iter().enumerate() {
            if node.id.index() != index {
                return Err(Error::InvalidWorld(format!(
                    "node {} stored at position {}",
                    node.id, index
                )));
            }
        }

        let mut incidence = vec![Vec::new(); nodes.len()];
        for (index, edge) in edges.iter().enumerate() {
            if edge.id.index() != index {
                return Err(Error::InvalidEdge {
                    edge: edge.id,
                    reason: format!("stored at position {}", index),
                });
            }
            if edge.from.index() >= nodes.len() || edge.to.index() >= nodes.len() {
                return Err(Error::InvalidEdge {
                    edge: edge.id,
                    reason: format!("endpoint {} or {} does not exist", edge.from, edge.to),
                });
            }
            if edge.from == edge.to {
                return Err(Error::InvalidEdge {
                    edge: edge.id,
                    reason: "self loop".to_string(),
                });
            }
            if !(edge.length.is_finite() && edge.length >= 0.0) {
                return Err(Error::InvalidEdge {
                    edge: edge.id,
                    reason: format!("length {} is not a finite non-negative number", edge.length),
                });
            }
            incidence[edge.from.index()].push(edge.id);
            incidence[edge.to.index()].push(edge.id);
        }

        let mut ranking: Vec<(NodeId, f64)> = nodes.iter().map(|n| (n.id, n.centrality)).collect();
        ranking.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        Ok(Self {
            nodes,
            edges,
            incidence,
            ranking,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    pub fn try_node(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(Error::NodeNotFound(id))
    }

    pub fn try_edge(&self, id: EdgeId) -> Result<&Edge> {
        self.edge(id).ok_or(Error::EdgeNotFound(id))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Edges incident to `node`
    pub fn incident_edges(&self, node: NodeId) -> &[EdgeId] {
        self.incidence
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `(edge, neighbour)` pairs around `node`
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, NodeId)> + '_ {
        self.incident_edges(node).iter().filter_map(move |&e| {
            self.edges[e.index()].opposite(node).map(|other| (e, other))
        })
    }

    pub fn are_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.edge_between(a, b).is_some()
    }

    /// The shortest edge joining `a` and `b`, if any
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.incident_edges(a)
            .iter()
            .map(|&e| &self.edges[e.index()])
            .filter(|e| e.opposite(a) == Some(b))
            .min_by(|x, y| x.length.total_cmp(&y.length))
            .map(|e| e.id)
    }

    /// The edge joining `from` and `to`, oriented from `from`
    pub fn directed_edge_between(&self, from: NodeId, to: NodeId) -> Option<DirectedEdge> {
        self.edge_between(from, to)
            .map(|edge| DirectedEdge { edge, from, to })
    }

    /// Orient `edge` so that it starts at `from`
    pub fn orient(&self, edge: EdgeId, from: NodeId) -> Option<DirectedEdge> {
        let e = self.edge(edge)?;
        e.opposite(from).map(|to| DirectedEdge { edge, from, to })
    }

    /// Straight-line distance between two nodes
    pub fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        match (self.node(a), self.node(b)) {
            (Some(x), Some(y)) => geometry::distance(x.coord, y.coord),
            _ => f64::INFINITY,
        }
    }

    /// Nodes ranked by ascending centrality
    pub fn centrality_ranking(&self) -> &[(NodeId, f64)] {
        &self.ranking
    }

    /// `(min, max)` centrality over the graph
    pub fn centrality_range(&self) -> (f64, f64) {
        match (self.ranking.first(), self.ranking.last()) {
            (Some(lo), Some(hi)) => (lo.1, hi.1),
            _ => (0.0, 0.0),
        }
    }

    /// Centrality rescaled to `[0, 1]`; a flat range yields 0
    pub fn normalized_centrality(&self, node: NodeId) -> f64 {
        let (min, max) = self.centrality_range();
        let width = max - min;
        if width <= 0.0 {
            return 0.0;
        }
        self.node(node)
            .map(|n| ((n.centrality - min) / width).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }

    /// Centrality value at `percentile` of the graph-wide ranking
    pub fn centrality_cutoff(&self, percentile: f64) -> f64 {
        if self.ranking.is_empty() {
            return 0.0;
        }
        let position = (self.ranking.len() as f64 * percentile.clamp(0.0, 1.0)) as usize;
        self.ranking[position.min(self.ranking.len() - 1)].1
    }

    /// Nodes within `radius` of `centre`
    pub fn nodes_within(&self, centre: Coord<f64>, radius: f64) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| geometry::distance(centre, n.coord) <= radius)
            .map(|n| n.id)
            .collect()
    }

    /// Salient nodes in the smallest circle enclosing `a` and `b`
    ///
    /// Keeps nodes whose centrality reaches the graph-wide `percentile`
    /// cutoff. The result is empty when nothing qualifies; callers relax the
    /// percentile themselves.
    pub fn salient_nodes_within_space(
        &self,
        a: NodeId,
        b: NodeId,
        percentile: f64,
    ) -> BTreeMap<NodeId, f64> {
        let (Some(na), Some(nb)) = (self.node(a), self.node(b)) else {
            return BTreeMap::new();
        };
        let (centre, radius) = geometry::enclosing_circle(na.coord, nb.coord);
        let cutoff = self.centrality_cutoff(percentile);

        self.nodes
            .iter()
            .filter(|n| geometry::distance(centre, n.coord) <= radius + 1e-6)
            .filter(|n| n.centrality >= cutoff)
            .map(|n| (n.id, n.centrality))
            .collect()
    }

    /// Node walk visited by a contiguous edge sequence
    pub fn walk_nodes(path: &[DirectedEdge]) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(path.len() + 1);
        if let Some(first) = path.first() {
            nodes.push(first.from);
        }
        nodes.extend(path.iter().map(|d| d.to));
        nodes
    }

    /// Total length of a path of edges in this graph
    pub fn path_length(&self, path: &[DirectedEdge]) -> f64 {
        path.iter()
            .filter_map(|d| self.edge(d.edge))
            .map(|e| e.length)
            .sum()
    }
}
