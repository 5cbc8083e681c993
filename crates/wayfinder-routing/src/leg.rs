//! Single legs between two consecutive sub-goals
//!
//! A leg picks its search space (region sub-graph, convex hull, or the full
//! graph), runs the Dijkstra engine with the agent's objective and falls back
//! to the full graph exactly once when a confined search comes back empty.
//! Angular legs are searched on the dual graph between every acceptable pair
//! of segments around the two junctions, keeping the cheapest walk.

use crate::cost::CostModel;
use crate::dijkstra::{
    dual_to_primal, AngularChange, CostStrategy, DijkstraEngine, GlobalLandmarkness, RoadDistance, Search,
    SearchSpace,
};
use crate::perception::Perception;
use std::collections::HashSet;
use wayfinder_core::geometry;
use wayfinder_core::{DirectedEdge, EdgeId, LocalHeuristic, NodeId, RouteStrategy, SubGraph, World};

/// Quantity minimised by a leg search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegObjective {
    RoadDistance,
    AngularChange,
    GlobalLandmarks,
}

impl LegObjective {
    pub fn for_strategy(strategy: RouteStrategy) -> Self {
        match strategy.heuristic() {
            Some(LocalHeuristic::RoadDistance) => Self::RoadDistance,
            Some(LocalHeuristic::AngularChange) => Self::AngularChange,
            None => Self::GlobalLandmarks,
        }
    }
}

/// Plans legs for one agent trip
#[derive(Debug, Clone, Copy)]
pub struct LegPlanner<'a> {
    world: &'a World,
    cost: CostModel<'a>,
    objective: LegObjective,
    /// Confine same-region legs to their region
    regional: bool,
    hull_buffer: Option<f64>,
}

impl<'a> LegPlanner<'a> {
    pub fn new(world: &'a World, cost: CostModel<'a>, objective: LegObjective) -> Self {
        Self {
            world,
            cost,
            objective,
            regional: false,
            hull_buffer: None,
        }
    }

    pub fn regional(mut self, regional: bool) -> Self {
        self.regional = regional;
        self
    }

    pub fn with_hull_buffer(mut self, buffer: Option<f64>) -> Self {
        self.hull_buffer = buffer;
        self
    }

    pub fn objective(&self) -> LegObjective {
        self.objective
    }

    /// Edge sequence from `origin` to `target`, empty when unreachable
    ///
    /// `avoid` holds primal edges the leg must not use; `arrived_by` is the
    /// edge the walker reached `origin` on, which angular legs will not
    /// immediately walk back.
    pub fn plan(
        &self,
        origin: NodeId,
        target: NodeId,
        avoid: &HashSet<EdgeId>,
        arrived_by: Option<EdgeId>,
        perception: &mut Perception,
    ) -> Vec<DirectedEdge> {
        match self.objective {
            LegObjective::RoadDistance => {
                let strategy = RoadDistance { cost: self.cost };
                self.primal_leg(&strategy, origin, target, avoid, true, perception)
            }
            LegObjective::GlobalLandmarks => {
                let strategy = GlobalLandmarkness { cost: self.cost };
                self.primal_leg(&strategy, origin, target, avoid, false, perception)
            }
            LegObjective::AngularChange => self.angular_leg(origin, target, avoid, arrived_by, perception),
        }
    }

    fn shared_region_sub(&self, origin: NodeId, target: NodeId, dual: bool) -> Option<&'a SubGraph> {
        if !self.regional {
            return None;
        }
        let region = self.world.region(self.world.shared_region(origin, target)?)?;
        Some(if dual { &region.dual } else { &region.primal })
    }

    fn primal_leg<S: CostStrategy>(
        &self,
        strategy: &S,
        origin: NodeId,
        target: NodeId,
        avoid: &HashSet<EdgeId>,
        use_hull: bool,
        perception: &mut Perception,
    ) -> Vec<DirectedEdge> {
        let hull = match (self.shared_region_sub(origin, target, false), self.hull_buffer) {
            (None, Some(buffer)) if use_hull => {
                match SubGraph::within_hull(self.world.primal(), &[origin, target], buffer) {
                    Ok(sub) => Some(sub),
                    Err(e) => {
                        tracing::debug!("Skipping hull confinement: {}", e);
                        None
                    }
                }
            }
            _ => None,
        };
        let confined = self.shared_region_sub(origin, target, false).or(hull.as_ref());

        let mut query = Search {
            space: SearchSpace::Full(self.world.primal()),
            origin,
            destination: target,
            origin_junction: None,
            avoid,
        };
        if let Some(sub) = confined {
            query.space = SearchSpace::Sub(sub);
            let path = DijkstraEngine::search(&query, strategy, perception);
            if !path.is_empty() {
                return path;
            }
            tracing::debug!("Confined search {} -> {} failed, retrying on the full graph", origin, target);
            query.space = SearchSpace::Full(self.world.primal());
        }
        DijkstraEngine::search(&query, strategy, perception)
    }

    fn angular_leg(
        &self,
        origin: NodeId,
        target: NodeId,
        avoid: &HashSet<EdgeId>,
        arrived_by: Option<EdgeId>,
        perception: &mut Perception,
    ) -> Vec<DirectedEdge> {
        let world = self.world;
        let primal = world.primal();
        let usable = |dual: &NodeId| world.primal_edge_of(*dual).map_or(false, |e| !avoid.contains(&e));

        let mut starts: Vec<NodeId> = world
            .dual_nodes_at(origin)
            .into_iter()
            .filter(usable)
            .filter(|d| world.primal_edge_of(*d) != arrived_by)
            .collect();
        let ends: Vec<NodeId> = world.dual_nodes_at(target).into_iter().filter(usable).collect();

        // two segments meeting at a middle junction need no search
        for &start in &starts {
            for &end in &ends {
                let Some(junction) = world.common_junction(start, end) else {
                    continue;
                };
                if junction == origin || junction == target {
                    continue;
                }
                let first = world.primal_edge_of(start).and_then(|e| primal.orient(e, origin));
                let second = world.primal_edge_of(end).and_then(|e| primal.orient(e, junction));
                if let (Some(first), Some(second)) = (first, second) {
                    if first.to == junction && second.to == target {
                        return vec![first, second];
                    }
                }
            }
        }

        // on equal cost the most direct first segment wins
        let (Some(from), Some(to)) = (primal.node(origin), primal.node(target)) else {
            return Vec::new();
        };
        let heading = geometry::bearing(from.coord, to.coord);
        let deviation = |dual: NodeId| {
            world
                .primal_edge_of(dual)
                .and_then(|e| primal.orient(e, origin))
                .and_then(|d| primal.node(d.to))
                .map_or(f64::INFINITY, |n| {
                    geometry::angle_difference(geometry::bearing(from.coord, n.coord), heading)
                })
        };
        starts.sort_by(|a, b| deviation(*a).total_cmp(&deviation(*b)).then(a.cmp(b)));

        let strategy = AngularChange { cost: self.cost };
        if let Some(sub) = self.shared_region_sub(origin, target, true) {
            let walk = self.angular_pairs(SearchSpace::Sub(sub), &strategy, &starts, &ends, origin, target, avoid, perception);
            if !walk.is_empty() {
                return walk;
            }
            tracing::debug!("Regional angular leg {} -> {} failed, retrying on the full dual graph", origin, target);
        }
        self.angular_pairs(SearchSpace::Full(world.dual()), &strategy, &starts, &ends, origin, target, avoid, perception)
    }

    /// Cheapest walk over every pairing of start and end segments
    #[allow(clippy::too_many_arguments)]
    fn angular_pairs(
        &self,
        space: SearchSpace<'_>,
        strategy: &AngularChange<'_>,
        starts: &[NodeId],
        ends: &[NodeId],
        origin: NodeId,
        target: NodeId,
        avoid: &HashSet<EdgeId>,
        perception: &mut Perception,
    ) -> Vec<DirectedEdge> {
        let primal = self.world.primal();
        let mut best: Option<(f64, Vec<DirectedEdge>)> = None;
        for &start in starts {
            for &end in ends {
                if start == end {
                    // the segment joins origin and target directly
                    if let Some(step) = self.world.primal_edge_of(start).and_then(|e| primal.orient(e, origin)) {
                        if step.to == target {
                            return vec![step];
                        }
                    }
                    continue;
                }
                let query = Search {
                    space,
                    origin: start,
                    destination: end,
                    origin_junction: Some(origin),
                    avoid,
                };
                let Some((cost, dual_path)) = DijkstraEngine::search_with_cost(&query, strategy, perception) else {
                    continue;
                };
                let walk = dual_to_primal(self.world, &dual_path, origin, target);
                if walk.is_empty() {
                    continue;
                }
                if best.as_ref().map_or(true, |(c, _)| cost < *c) {
                    best = Some((cost, walk));
                }
            }
        }
        best.map(|(_, walk)| walk).unwrap_or_default()
    }
}
