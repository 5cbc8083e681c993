//! Route planner: one call per agent trip
//!
//! Resolves the agent's strategy, asks the matching navigator for sub-goals
//! and hands them to the composer. The world is only ever borrowed, so any
//! number of planners can run over the same world at once.

use crate::barrier::BarrierNavigator;
use crate::composer::RouteComposer;
use crate::config::PlannerConfig;
use crate::cost::CostModel;
use crate::error::{Result, RoutingError};
use crate::landmark::LandmarkNavigator;
use crate::leg::{LegObjective, LegPlanner};
use crate::perception::Perception;
use crate::region::RegionNavigator;
use crate::traits::{check_trip, dedup_sequence, SubGoalNavigator};
use serde::{Deserialize, Serialize};
use wayfinder_core::{AgentProperties, DirectedEdge, EdgeId, Graph, MarkKind, NodeId, RouteStrategy, World};

/// One trip to plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: NodeId,
    pub destination: NodeId,

    /// Position of the trip in the agent's day; selects the random stream
    #[serde(default)]
    pub trip_index: u64,
}

/// A planned route
///
/// `edges` may stop short of the destination when a sub-goal or the
/// destination itself could not be reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub origin: NodeId,
    pub destination: NodeId,
    pub strategy: RouteStrategy,
    pub sub_goals: Vec<NodeId>,
    pub edges: Vec<DirectedEdge>,
}

impl Route {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether the walk runs all the way from origin to destination
    pub fn reaches_destination(&self) -> bool {
        match (self.edges.first(), self.edges.last()) {
            (Some(first), Some(last)) => first.from == self.origin && last.to == self.destination,
            _ => false,
        }
    }

    /// Walked length in metres
    pub fn length(&self, world: &World) -> f64 {
        world.primal().path_length(&self.edges)
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        Graph::walk_nodes(&self.edges)
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.iter().map(|d| d.edge).collect()
    }
}

pub struct RoutePlanner<'a> {
    world: &'a World,
    config: &'a PlannerConfig,
}

impl<'a> RoutePlanner<'a> {
    pub fn new(world: &'a World, config: &'a PlannerConfig) -> Self {
        Self { world, config }
    }

    /// Plan `origin -> destination` for `agent`
    pub fn plan(
        &self,
        agent: &AgentProperties,
        origin: NodeId,
        destination: NodeId,
        perception: &mut Perception,
    ) -> Result<Route> {
        self.config.validate()?;
        agent.validate()?;
        check_trip(self.world, origin, destination)?;

        let strategy = agent.strategy();
        let sub_goals = self.sub_goals(agent, strategy, origin, destination)?;
        tracing::debug!(
            "Planning {} -> {} for agent {} ({}) through {:?}",
            origin,
            destination,
            agent.agent_id,
            strategy.label(),
            sub_goals
        );
        Ok(self.compose(agent, strategy, origin, destination, sub_goals, perception))
    }

    /// Plan one trip with the agent's own random stream for it
    pub fn plan_trip(&self, agent: &AgentProperties, trip: &TripRequest) -> Result<Route> {
        let mut perception = Perception::for_trip(agent.agent_id, trip.trip_index);
        self.plan(agent, trip.origin, trip.destination, &mut perception)
    }

    /// Compose a route through a sequence chosen by the caller
    pub fn plan_sequence(
        &self,
        agent: &AgentProperties,
        sequence: &[NodeId],
        perception: &mut Perception,
    ) -> Result<Route> {
        self.config.validate()?;
        agent.validate()?;
        if sequence.len() < 2 {
            return Err(RoutingError::ShortSequence(sequence.len()));
        }
        if let Some(&unknown) = sequence.iter().find(|&&n| !self.world.primal().contains_node(n)) {
            return Err(RoutingError::UnknownNode(unknown));
        }

        let (origin, destination) = (sequence[0], sequence[sequence.len() - 1]);
        let mut sub_goals = sequence.to_vec();
        sub_goals.dedup();
        Ok(self.compose(agent, agent.strategy(), origin, destination, sub_goals, perception))
    }

    fn sub_goals(
        &self,
        agent: &AgentProperties,
        strategy: RouteStrategy,
        origin: NodeId,
        destination: NodeId,
    ) -> Result<Vec<NodeId>> {
        match strategy {
            RouteStrategy::Minimising { .. } | RouteStrategy::GlobalLandmarks => Ok(vec![origin, destination]),
            RouteStrategy::Regional { barriers, marks, .. } => RegionNavigator::new(self.world, self.config, agent)
                .with_barriers(barriers)
                .with_marks(marks)
                .sub_goals(origin, destination),
            RouteStrategy::BarrierSubGoals { marks, .. } => {
                let goals = BarrierNavigator::new(self.world, self.config, agent).sub_goals(origin, destination)?;
                match marks {
                    Some(marks) => self.splice_marks(marks, &goals),
                    None => Ok(goals),
                }
            }
            RouteStrategy::OnRouteMarks { marks, .. } => {
                LandmarkNavigator::new(self.world, self.config, marks).sub_goals(origin, destination)
            }
        }
    }

    /// On-route marks between each pair of consecutive sub-goals
    fn splice_marks(&self, marks: MarkKind, goals: &[NodeId]) -> Result<Vec<NodeId>> {
        let navigator = LandmarkNavigator::new(self.world, self.config, marks);
        let mut sequence = Vec::with_capacity(goals.len());
        for pair in goals.windows(2) {
            let leg = navigator.sub_goals(pair[0], pair[1])?;
            if let Some((_, head)) = leg.split_last() {
                sequence.extend_from_slice(head);
            }
        }
        sequence.extend(goals.last().copied());
        Ok(dedup_sequence(sequence))
    }

    fn compose(
        &self,
        agent: &AgentProperties,
        strategy: RouteStrategy,
        origin: NodeId,
        destination: NodeId,
        sub_goals: Vec<NodeId>,
        perception: &mut Perception,
    ) -> Route {
        let cost = CostModel::new(self.world, agent, self.config, strategy, destination);
        let legs = LegPlanner::new(self.world, cost, LegObjective::for_strategy(strategy))
            .regional(matches!(strategy, RouteStrategy::Regional { .. }))
            .with_hull_buffer(self.config.hull_buffer);
        let edges = RouteComposer::new(self.world, legs).compose(&sub_goals, perception);

        let route = Route {
            origin,
            destination,
            strategy,
            sub_goals,
            edges,
        };
        if !route.reaches_destination() {
            tracing::warn!(
                "Route {} -> {} is incomplete ({} edges)",
                origin,
                destination,
                route.edges.len()
            );
        }
        route
    }
}
