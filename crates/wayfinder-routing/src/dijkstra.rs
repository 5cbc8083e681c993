//! Dijkstra engine: one search skeleton, three cost strategies
//!
//! The skeleton runs over a [`SearchSpace`], either a full graph or a
//! sub-graph of it, and always reports its result in the ids of the graph the
//! space was carved from. Edge weights come from a [`CostStrategy`]:
//!
//! - [`RoadDistance`]: perceived length on the primal graph
//! - [`AngularChange`]: perceived turning on the dual graph, with a guard
//!   against turning back through the junction just crossed
//! - [`GlobalLandmarkness`]: prefers edges towards well-visible landmarks
//!   near the destination, ignoring turns
//!
//! An unreachable destination yields an empty sequence, never an error.

use crate::cost::{CostModel, MIN_COST};
use crate::perception::Perception;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use wayfinder_core::{DirectedEdge, Edge, EdgeId, Graph, NodeId, SubGraph, World};

/// Where a search is allowed to go
#[derive(Debug, Clone, Copy)]
pub enum SearchSpace<'a> {
    Full(&'a Graph),
    Sub(&'a SubGraph),
}

impl<'a> SearchSpace<'a> {
    pub fn graph(&self) -> &'a Graph {
        match *self {
            Self::Full(graph) => graph,
            Self::Sub(sub) => sub.graph(),
        }
    }

    fn local_node(&self, node: NodeId) -> Option<NodeId> {
        match *self {
            Self::Full(graph) => graph.contains_node(node).then_some(node),
            Self::Sub(sub) => sub.child_node(node),
        }
    }

    fn parent_node(&self, local: NodeId) -> NodeId {
        match *self {
            Self::Full(_) => local,
            Self::Sub(sub) => sub.parent_node(local).unwrap_or(local),
        }
    }

    fn parent_edge(&self, local: EdgeId) -> EdgeId {
        match *self {
            Self::Full(_) => local,
            Self::Sub(sub) => sub.parent_edge(local).unwrap_or(local),
        }
    }
}

/// Edge weighting used by the search skeleton
///
/// Node and edge ids passed in are parent ids of the search space.
pub trait CostStrategy {
    /// Weight of moving from `from` to `to` over `edge`
    fn weight(&self, edge: &Edge, from: NodeId, to: NodeId, perception: &mut Perception) -> f64;

    /// Whether the move over `via` into `to` is excluded by the primal avoid-set
    fn blocked(&self, via: EdgeId, to: NodeId, avoid: &HashSet<EdgeId>) -> bool;

    /// Primal junction crossed when moving from `from` to `to`
    ///
    /// Only dual searches report one; the skeleton then refuses to leave a
    /// node through the junction it was entered by.
    fn junction(&self, _from: NodeId, _to: NodeId) -> Option<NodeId> {
        None
    }
}

/// Perceived walking distance on the primal graph
#[derive(Debug, Clone, Copy)]
pub struct RoadDistance<'a> {
    pub cost: CostModel<'a>,
}

impl CostStrategy for RoadDistance<'_> {
    fn weight(&self, edge: &Edge, _from: NodeId, to: NodeId, perception: &mut Perception) -> f64 {
        self.cost.distance_cost(edge, to, perception)
    }

    fn blocked(&self, via: EdgeId, _to: NodeId, avoid: &HashSet<EdgeId>) -> bool {
        avoid.contains(&via)
    }
}

/// Perceived turning on the dual graph
#[derive(Debug, Clone, Copy)]
pub struct AngularChange<'a> {
    pub cost: CostModel<'a>,
}

impl CostStrategy for AngularChange<'_> {
    fn weight(&self, turn: &Edge, from: NodeId, to: NodeId, perception: &mut Perception) -> f64 {
        let world = self.cost.world();
        let segment = world.primal_edge_of(to).and_then(|e| world.primal().edge(e));
        let junction = world.common_junction(from, to);
        match (segment, junction) {
            (Some(segment), Some(junction)) => {
                let target = segment.opposite(junction).unwrap_or(segment.to);
                self.cost.angular_cost(turn, segment, target, perception)
            }
            _ => turn.deflection.max(MIN_COST),
        }
    }

    fn blocked(&self, _via: EdgeId, to: NodeId, avoid: &HashSet<EdgeId>) -> bool {
        self.cost
            .world()
            .primal_edge_of(to)
            .map_or(false, |segment| avoid.contains(&segment))
    }

    fn junction(&self, from: NodeId, to: NodeId) -> Option<NodeId> {
        self.cost.world().common_junction(from, to)
    }
}

/// Landmark-guided weighting on the primal graph
///
/// Edge weight is `(1 - global landmarkness of the target) / length`, so the
/// objective is decoupled from topological distance.
#[derive(Debug, Clone, Copy)]
pub struct GlobalLandmarkness<'a> {
    pub cost: CostModel<'a>,
}

impl CostStrategy for GlobalLandmarkness<'_> {
    fn weight(&self, edge: &Edge, _from: NodeId, to: NodeId, _perception: &mut Perception) -> f64 {
        let landmarkness = self.cost.global_landmarkness(to, self.cost.destination());
        (1.0 - landmarkness) / edge.length.max(MIN_COST)
    }

    fn blocked(&self, via: EdgeId, _to: NodeId, avoid: &HashSet<EdgeId>) -> bool {
        avoid.contains(&via)
    }
}

/// State for Dijkstra priority queue
#[derive(Clone, Copy, PartialEq)]
struct DijkstraState {
    cost: f64,
    node: NodeId,
}

impl Eq for DijkstraState {}

impl Ord for DijkstraState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap, ties by node id for determinism
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for DijkstraState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best known way of reaching a node during one search
#[derive(Debug, Clone, Copy)]
struct NodeWrapper {
    cost: f64,
    predecessor: Option<(NodeId, EdgeId)>,
    /// Junction crossed to get here (dual searches only)
    junction: Option<NodeId>,
}

/// One shortest-path query
#[derive(Debug, Clone, Copy)]
pub struct Search<'a> {
    pub space: SearchSpace<'a>,
    pub origin: NodeId,
    pub destination: NodeId,
    /// Junction the walker arrived at the origin by (dual searches)
    pub origin_junction: Option<NodeId>,
    pub avoid: &'a HashSet<EdgeId>,
}

/// Dijkstra search skeleton
pub struct DijkstraEngine;

impl DijkstraEngine {
    /// Least-cost edge sequence from origin to destination, in parent ids
    pub fn search<S: CostStrategy>(query: &Search<'_>, strategy: &S, perception: &mut Perception) -> Vec<DirectedEdge> {
        Self::search_with_cost(query, strategy, perception)
            .map(|(_, path)| path)
            .unwrap_or_default()
    }

    /// Like [`DijkstraEngine::search`], also returning the perceived cost
    pub fn search_with_cost<S: CostStrategy>(
        query: &Search<'_>,
        strategy: &S,
        perception: &mut Perception,
    ) -> Option<(f64, Vec<DirectedEdge>)> {
        let (Some(origin), Some(destination)) = (
            query.space.local_node(query.origin),
            query.space.local_node(query.destination),
        ) else {
            tracing::debug!(
                "Search endpoints {} -> {} outside the search space",
                query.origin,
                query.destination
            );
            return None;
        };
        if origin == destination {
            return None;
        }

        let graph = query.space.graph();
        let mut wrappers: HashMap<NodeId, NodeWrapper> = HashMap::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut heap = BinaryHeap::new();

        wrappers.insert(
            origin,
            NodeWrapper {
                cost: 0.0,
                predecessor: None,
                junction: query.origin_junction,
            },
        );
        heap.push(DijkstraState { cost: 0.0, node: origin });

        while let Some(DijkstraState { cost, node }) = heap.pop() {
            if !visited.insert(node) {
                continue;
            }
            if node == destination {
                tracing::debug!("Dijkstra reached {} with cost {}", query.destination, cost);
                break;
            }

            let entered_by = wrappers.get(&node).and_then(|w| w.junction);
            let node_parent = query.space.parent_node(node);

            for (edge_id, next) in graph.neighbours(node) {
                if visited.contains(&next) {
                    continue;
                }
                let next_parent = query.space.parent_node(next);
                let edge_parent = query.space.parent_edge(edge_id);
                if strategy.blocked(edge_parent, next_parent, query.avoid) {
                    continue;
                }

                let junction = strategy.junction(node_parent, next_parent);
                if junction.is_some() && junction == entered_by {
                    continue;
                }

                let Some(edge) = graph.edge(edge_id) else {
                    continue;
                };
                let new_cost = cost + strategy.weight(edge, node_parent, next_parent, perception);

                let better = wrappers.get(&next).map_or(true, |w| new_cost < w.cost);
                if better {
                    wrappers.insert(
                        next,
                        NodeWrapper {
                            cost: new_cost,
                            predecessor: Some((node, edge_id)),
                            junction,
                        },
                    );
                    heap.push(DijkstraState { cost: new_cost, node: next });
                }
            }
        }

        let Some(reached) = wrappers.get(&destination) else {
            tracing::debug!("No path from {} to {}", query.origin, query.destination);
            return None;
        };
        Some((reached.cost, Self::reconstruct_path(query, destination, &wrappers)))
    }

    fn reconstruct_path(
        query: &Search<'_>,
        destination: NodeId,
        wrappers: &HashMap<NodeId, NodeWrapper>,
    ) -> Vec<DirectedEdge> {
        let mut path = Vec::new();
        let mut current = destination;
        while let Some((previous, edge)) = wrappers.get(&current).and_then(|w| w.predecessor) {
            path.push(DirectedEdge {
                edge: query.space.parent_edge(edge),
                from: query.space.parent_node(previous),
                to: query.space.parent_node(current),
            });
            current = previous;
        }
        path.reverse();
        path
    }
}

/// Turn a dual-graph path into the primal walk it describes
///
/// The first segment is walked away from `origin`; the walk is cut as soon
/// as it reaches `destination`, which drops a trailing segment that would
/// only lead back out of the stitch point. Returns an empty walk when the
/// segments do not chain or never reach the destination.
pub fn dual_to_primal(world: &World, dual_path: &[DirectedEdge], origin: NodeId, destination: NodeId) -> Vec<DirectedEdge> {
    let mut segments: Vec<NodeId> = Vec::with_capacity(dual_path.len() + 1);
    if let Some(first) = dual_path.first() {
        segments.push(first.from);
    }
    segments.extend(dual_path.iter().map(|d| d.to));

    let primal = world.primal();
    let mut walk: Vec<DirectedEdge> = Vec::with_capacity(segments.len());
    let mut at = origin;
    for dual_node in segments {
        let Some(step) = world.primal_edge_of(dual_node).and_then(|e| primal.orient(e, at)) else {
            return Vec::new();
        };
        at = step.to;
        walk.push(step);
        if at == destination {
            return walk;
        }
    }
    Vec::new()
}
