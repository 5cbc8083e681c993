//! The immutable world model every planning call reads from
//!
//! A [`World`] owns the primal graph, its dual, the regions with their
//! sub-graphs and gateways, the barriers and the buildings. It is assembled
//! once from a [`WorldSpec`] and never mutated afterwards, so any number of
//! planners can share it without locking.

use crate::barrier::{Barrier, BarrierKind};
use crate::dual::DualGraph;
use crate::error::{Error, Result};
use crate::geometry;
use crate::graph::{Edge, Graph, Node};
use crate::ids::{BarrierId, BuildingId, EdgeId, NodeId, RegionId};
use crate::landmark::{Anchor, Building};
use crate::limits;
use crate::region::{Gateway, Region};
use crate::subgraph::SubGraph;
use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ─────────────────────────────────────────────────────────────────────────────
// Input form
// ─────────────────────────────────────────────────────────────────────────────

/// Serializable description of a world, as produced by the world builder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSpec {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeSpec>,
    #[serde(default)]
    pub regions: Vec<RegionSpec>,
    #[serde(default)]
    pub gateways: Vec<GatewaySpec>,
    #[serde(default)]
    pub barriers: Vec<BarrierSpec>,
    #[serde(default)]
    pub buildings: Vec<BuildingSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionId>,
    #[serde(default)]
    pub centrality: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_landmarks: Vec<BuildingId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distant_landmarks: Vec<BuildingId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<Anchor>,
}

impl NodeSpec {
    pub fn new(id: u32, x: f64, y: f64) -> Self {
        Self {
            id: NodeId(id),
            x,
            y,
            region: None,
            centrality: 0.0,
            local_landmarks: Vec::new(),
            distant_landmarks: Vec::new(),
            anchors: Vec::new(),
        }
    }

    pub fn in_region(mut self, region: u32) -> Self {
        self.region = Some(RegionId(region));
        self
    }

    pub fn with_centrality(mut self, centrality: f64) -> Self {
        self.centrality = centrality;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    /// Declared length; the straight-line distance when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
}

impl EdgeSpec {
    pub fn new(id: u32, from: u32, to: u32) -> Self {
        Self {
            id: EdgeId(id),
            from: NodeId(from),
            to: NodeId(to),
            length: None,
        }
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSpec {
    pub id: RegionId,
    /// Overrides the complexity derived from building membership
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySpec {
    pub exit: NodeId,
    pub entry: NodeId,
    /// Bridging edge; looked up between exit and entry when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge: Option<EdgeId>,
}

impl GatewaySpec {
    pub fn new(exit: u32, entry: u32) -> Self {
        Self {
            exit: NodeId(exit),
            entry: NodeId(entry),
            edge: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarrierSpec {
    pub id: BarrierId,
    pub kind: BarrierKind,
    pub coords: Vec<[f64; 2]>,
    #[serde(default)]
    pub edges: Vec<EdgeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingSpec {
    pub id: BuildingId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionId>,
    #[serde(default)]
    pub local_landmarkness: f64,
    #[serde(default)]
    pub global_landmarkness: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// World
// ─────────────────────────────────────────────────────────────────────────────

/// Share of buildings that are not landmarks; 1 when there are no buildings
pub fn landmark_complexity(buildings: usize, landmarks: usize) -> f64 {
    if buildings == 0 {
        return 1.0;
    }
    1.0 - landmarks as f64 / buildings as f64
}

/// Aggregate, read-only world model
#[derive(Debug, Clone)]
pub struct World {
    primal: Graph,
    dual: DualGraph,
    regions: BTreeMap<RegionId, Region>,
    barriers: Vec<Barrier>,
    buildings: Vec<Building>,
}

impl World {
    /// Assemble and validate a world from its serializable description
    pub fn from_spec(spec: WorldSpec) -> Result<Self> {
        limits::validate_arena_size("nodes", spec.nodes.len())?;
        limits::validate_arena_size("edges", spec.edges.len())?;

        let buildings = Self::build_buildings(spec.buildings)?;
        let mut nodes = Self::build_nodes(spec.nodes, buildings.len())?;
        let mut edges = Self::build_edges(spec.edges, &nodes)?;
        let barriers = Self::build_barriers(spec.barriers, &mut edges)?;

        // gateway flags are needed on nodes before the graph is frozen
        let gateway_specs = spec.gateways;
        for g in &gateway_specs {
            for id in [g.exit, g.entry] {
                nodes
                    .get_mut(id.index())
                    .ok_or(Error::NodeNotFound(id))?
                    .gateway = true;
            }
        }

        let primal = Graph::new(nodes, edges)?;
        let dual = DualGraph::derive(&primal)?;

        let mut gateways: BTreeMap<RegionId, Vec<Gateway>> = BTreeMap::new();
        for g in gateway_specs {
            let gateway = Self::build_gateway(&primal, &g)?;
            gateways.entry(gateway.region_from).or_default().push(gateway);
        }

        let mut region_ids: BTreeSet<RegionId> = primal.nodes().iter().filter_map(|n| n.region).collect();
        let complexities: BTreeMap<RegionId, Option<f64>> =
            spec.regions.iter().map(|r| (r.id, r.complexity)).collect();
        region_ids.extend(complexities.keys().copied());

        let mut regions = BTreeMap::new();
        for id in region_ids {
            let primal_edges = primal.edges().iter().filter(|e| e.region == Some(id)).map(|e| e.id);
            let dual_edges = dual.graph.edges().iter().filter(|e| e.region == Some(id)).map(|e| e.id);
            let members: Vec<BuildingId> = buildings.iter().filter(|b| b.region == Some(id)).map(|b| b.id).collect();
            let landmarks: Vec<BuildingId> = members
                .iter()
                .copied()
                .filter(|b| buildings[b.index()].is_landmark())
                .collect();
            let complexity = complexities
                .get(&id)
                .copied()
                .flatten()
                .unwrap_or_else(|| landmark_complexity(members.len(), landmarks.len()));
            limits::validate_fraction("region complexity", complexity)?;

            regions.insert(
                id,
                Region {
                    id,
                    primal: SubGraph::derive(&primal, primal_edges.collect::<Vec<_>>())?,
                    dual: SubGraph::derive(&dual.graph, dual_edges.collect::<Vec<_>>())?,
                    gateways: gateways.remove(&id).unwrap_or_default(),
                    buildings: members,
                    landmarks,
                    complexity,
                },
            );
        }

        tracing::debug!(
            "Assembled world: {} nodes, {} edges, {} regions, {} barriers, {} buildings",
            primal.node_count(),
            primal.edge_count(),
            regions.len(),
            barriers.len(),
            buildings.len()
        );

        Ok(Self {
            primal,
            dual,
            regions,
            barriers,
            buildings,
        })
    }

    /// Parse a JSON world description and assemble it
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: WorldSpec = serde_json::from_str(json)?;
        Self::from_spec(spec)
    }

    fn build_buildings(mut specs: Vec<BuildingSpec>) -> Result<Vec<Building>> {
        specs.sort_by_key(|b| b.id);
        specs
            .into_iter()
            .enumerate()
            .map(|(index, b)| {
                if b.id.index() != index {
                    return Err(Error::BuildingNotFound(BuildingId::new(index)));
                }
                limits::validate_fraction("local landmarkness", b.local_landmarkness)?;
                limits::validate_fraction("global landmarkness", b.global_landmarkness)?;
                Ok(Building {
                    id: b.id,
                    coord: Coord { x: b.x, y: b.y },
                    region: b.region,
                    local_landmarkness: b.local_landmarkness,
                    global_landmarkness: b.global_landmarkness,
                })
            })
            .collect()
    }

    fn build_nodes(mut specs: Vec<NodeSpec>, building_count: usize) -> Result<Vec<Node>> {
        specs.sort_by_key(|n| n.id);
        let check = |b: BuildingId| {
            if b.index() < building_count {
                Ok(())
            } else {
                Err(Error::BuildingNotFound(b))
            }
        };

        specs
            .into_iter()
            .enumerate()
            .map(|(index, n)| {
                if n.id.index() != index {
                    return Err(Error::NodeNotFound(NodeId::new(index)));
                }
                for &b in n.local_landmarks.iter().chain(&n.distant_landmarks) {
                    check(b)?;
                }
                for anchor in &n.anchors {
                    check(anchor.building)?;
                }
                let mut node = Node::new(n.id, Coord { x: n.x, y: n.y }).with_centrality(n.centrality);
                node.region = n.region;
                node.local_landmarks = n.local_landmarks;
                node.distant_landmarks = n.distant_landmarks;
                node.anchors = n.anchors;
                Ok(node)
            })
            .collect()
    }

    fn build_edges(mut specs: Vec<EdgeSpec>, nodes: &[Node]) -> Result<Vec<Edge>> {
        specs.sort_by_key(|e| e.id);
        specs
            .into_iter()
            .enumerate()
            .map(|(index, e)| {
                if e.id.index() != index {
                    return Err(Error::EdgeNotFound(EdgeId::new(index)));
                }
                let from = nodes.get(e.from.index()).ok_or(Error::NodeNotFound(e.from))?;
                let to = nodes.get(e.to.index()).ok_or(Error::NodeNotFound(e.to))?;
                let length = e.length.unwrap_or_else(|| geometry::distance(from.coord, to.coord));
                let mut edge = Edge::new(e.id, e.from, e.to, length);
                edge.region = match (from.region, to.region) {
                    (Some(a), Some(b)) if a == b => Some(a),
                    _ => None,
                };
                Ok(edge)
            })
            .collect()
    }

    fn build_barriers(mut specs: Vec<BarrierSpec>, edges: &mut [Edge]) -> Result<Vec<Barrier>> {
        specs.sort_by_key(|b| b.id);
        let mut barriers = Vec::with_capacity(specs.len());
        for (index, spec) in specs.into_iter().enumerate() {
            if spec.id.index() != index {
                return Err(Error::BarrierNotFound(BarrierId::new(index)));
            }
            if spec.coords.len() < 2 {
                return Err(Error::InvalidWorld(format!(
                    "barrier {} needs at least two coordinates",
                    spec.id
                )));
            }
            for &edge_id in &spec.edges {
                let edge = edges
                    .get_mut(edge_id.index())
                    .ok_or(Error::EdgeNotFound(edge_id))?;
                let lists = &mut edge.barriers;
                if spec.kind.is_positive() {
                    lists.positive.push(spec.id);
                }
                if spec.kind.is_negative() {
                    lists.negative.push(spec.id);
                }
                match spec.kind {
                    BarrierKind::Water => lists.water.push(spec.id),
                    BarrierKind::Park => lists.parks.push(spec.id),
                    BarrierKind::Railway | BarrierKind::Road => {}
                }
            }
            barriers.push(Barrier {
                id: spec.id,
                kind: spec.kind,
                geometry: LineString::from(
                    spec.coords.iter().map(|c| (c[0], c[1])).collect::<Vec<_>>(),
                ),
                edges: spec.edges,
            });
        }
        Ok(barriers)
    }

    fn build_gateway(primal: &Graph, spec: &GatewaySpec) -> Result<Gateway> {
        let invalid = |reason: &str| Error::InvalidGateway {
            exit: spec.exit,
            entry: spec.entry,
            reason: reason.to_string(),
        };
        let exit = primal.try_node(spec.exit)?;
        let entry = primal.try_node(spec.entry)?;
        let edge_id = match spec.edge {
            Some(id) => id,
            None => primal
                .edge_between(spec.exit, spec.entry)
                .ok_or_else(|| invalid("no edge joins exit and entry"))?,
        };
        let edge = primal.try_edge(edge_id)?;
        if edge.opposite(spec.exit) != Some(spec.entry) {
            return Err(invalid("bridging edge does not join exit and entry"));
        }
        let (Some(region_from), Some(region_to)) = (exit.region, entry.region) else {
            return Err(invalid("exit and entry must both belong to a region"));
        };
        if region_from == region_to {
            return Err(invalid("exit and entry lie in the same region"));
        }
        Ok(Gateway {
            exit: spec.exit,
            entry: spec.entry,
            edge: edge_id,
            region_from,
            region_to,
            entry_angle: geometry::bearing(exit.coord, entry.coord),
            distance: edge.length,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Graph access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn primal(&self) -> &Graph {
        &self.primal
    }

    pub fn dual(&self) -> &Graph {
        &self.dual.graph
    }

    /// Dual node standing for a primal edge
    pub fn dual_node_of(&self, edge: EdgeId) -> Option<NodeId> {
        self.dual.node_of_edge.get(edge.index()).copied()
    }

    /// Primal edge behind a dual node
    pub fn primal_edge_of(&self, dual_node: NodeId) -> Option<EdgeId> {
        self.dual.edge_of_node.get(dual_node.index()).copied()
    }

    /// Dual nodes of the segments meeting at a primal junction
    pub fn dual_nodes_at(&self, junction: NodeId) -> Vec<NodeId> {
        self.primal
            .incident_edges(junction)
            .iter()
            .filter_map(|&e| self.dual_node_of(e))
            .collect()
    }

    /// Primal junction shared by the segments behind two dual nodes
    pub fn common_junction(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let ea = self.primal.edge(self.primal_edge_of(a)?)?;
        let eb = self.primal.edge(self.primal_edge_of(b)?)?;
        ea.shared_node(eb)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Regions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.values()
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    pub fn try_region(&self, id: RegionId) -> Result<&Region> {
        self.region(id).ok_or(Error::RegionNotFound(id))
    }

    pub fn region_of(&self, node: NodeId) -> Option<RegionId> {
        self.primal.node(node).and_then(|n| n.region)
    }

    /// The region holding both nodes, if they share one
    pub fn shared_region(&self, a: NodeId, b: NodeId) -> Option<RegionId> {
        match (self.region_of(a), self.region_of(b)) {
            (Some(ra), Some(rb)) if ra == rb => Some(ra),
            _ => None,
        }
    }

    pub fn gateway_count(&self) -> usize {
        self.regions.values().map(|r| r.gateways.len()).sum()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Barriers and buildings
    // ─────────────────────────────────────────────────────────────────────────

    pub fn barriers(&self) -> &[Barrier] {
        &self.barriers
    }

    pub fn barrier(&self, id: BarrierId) -> Option<&Barrier> {
        self.barriers.get(id.index())
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id.index())
    }

    /// Buildings within `radius` of `centre`
    pub fn buildings_within(&self, centre: Coord<f64>, radius: f64) -> impl Iterator<Item = &Building> + '_ {
        self.buildings
            .iter()
            .filter(move |b| geometry::distance(centre, b.coord) <= radius)
    }

    /// Strongest local landmark at a junction, 0 when there is none
    pub fn local_landmarkness(&self, node: NodeId) -> f64 {
        self.primal
            .node(node)
            .map(|n| {
                n.local_landmarks
                    .iter()
                    .filter_map(|&b| self.building(b))
                    .map(|b| b.local_landmarkness)
                    .fold(0.0, f64::max)
            })
            .unwrap_or(0.0)
    }

    /// Landmark complexity of the space enclosing `a` and `b`
    pub fn area_complexity(&self, a: NodeId, b: NodeId) -> f64 {
        let (Some(na), Some(nb)) = (self.primal.node(a), self.primal.node(b)) else {
            return 1.0;
        };
        let (centre, radius) = geometry::enclosing_circle(na.coord, nb.coord);
        let (mut total, mut landmarks) = (0, 0);
        for building in self.buildings_within(centre, radius) {
            total += 1;
            if building.is_landmark() {
                landmarks += 1;
            }
        }
        landmark_complexity(total, landmarks)
    }
}
