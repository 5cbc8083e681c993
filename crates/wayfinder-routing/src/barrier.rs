//! Barrier navigator: orientation along rivers, parks, railways and roads
//!
//! From the current location the walker looks towards the destination
//! through a view-field cone. Barriers of a preferred kind inside the cone
//! and no farther than the destination are candidates; the farthest one (ties
//! broken water, park, then the rest) provides the next sub-goal, the nearer
//! endpoint of its closest usable segment.

use crate::config::PlannerConfig;
use crate::error::Result;
use crate::traits::{check_trip, dedup_sequence, SubGoalNavigator};
use std::cmp::Ordering;
use std::collections::HashSet;
use wayfinder_core::geometry;
use wayfinder_core::{AgentProperties, Barrier, BarrierId, BarrierPreference, NodeId, RegionId, World};

pub struct BarrierNavigator<'a> {
    world: &'a World,
    config: &'a PlannerConfig,
    preference: BarrierPreference,
    /// Only pick sub-goals inside this region
    region: Option<RegionId>,
}

impl<'a> BarrierNavigator<'a> {
    pub fn new(world: &'a World, config: &'a PlannerConfig, agent: &AgentProperties) -> Self {
        Self {
            world,
            config,
            preference: agent.barrier_preference,
            region: None,
        }
    }

    pub fn within_region(mut self, region: Option<RegionId>) -> Self {
        self.region = region;
        self
    }

    /// Next sub-goal from `current`, marking the barrier that provided it as used
    fn next_sub_goal(
        &self,
        current: NodeId,
        destination: NodeId,
        visited: &HashSet<NodeId>,
        used: &mut HashSet<BarrierId>,
    ) -> Option<NodeId> {
        let primal = self.world.primal();
        let here = primal.node(current)?.coord;
        let there = primal.node(destination)?.coord;
        let reach = geometry::distance(here, there);
        let cone = geometry::view_field(here, there, self.config.view_field_aperture, reach);

        let mut ranked: Vec<(f64, &Barrier)> = self
            .world
            .barriers()
            .iter()
            .filter(|b| self.preference.accepts(b.kind))
            .filter(|b| !used.contains(&b.id))
            .filter(|b| !self.touches_visited(b, visited))
            .filter_map(|b| {
                geometry::nearest_intersection_distance(here, &b.geometry, &cone)
                    .filter(|&d| d <= reach)
                    .map(|d| (d, b))
            })
            .collect();
        ranked.sort_by(|(da, a), (db, b)| {
            db.total_cmp(da)
                .then(a.kind.priority().cmp(&b.kind.priority()))
                .then(a.id.cmp(&b.id))
        });

        for (distance, barrier) in ranked {
            used.insert(barrier.id);
            if let Some(sub_goal) = self.closest_endpoint(barrier, here, reach, visited) {
                tracing::debug!(
                    "Barrier {} ({:?}) at {:.1} m gives sub-goal {}",
                    barrier.id,
                    barrier.kind,
                    distance,
                    sub_goal
                );
                return Some(sub_goal);
            }
        }
        None
    }

    fn touches_visited(&self, barrier: &Barrier, visited: &HashSet<NodeId>) -> bool {
        barrier
            .edges
            .iter()
            .filter_map(|&e| self.world.primal().edge(e))
            .any(|e| visited.contains(&e.from) || visited.contains(&e.to))
    }

    fn in_scope(&self, node: NodeId) -> bool {
        self.region.map_or(true, |r| self.world.region_of(node) == Some(r))
    }

    /// Nearer endpoint of the barrier segment closest to `here`
    fn closest_endpoint(
        &self,
        barrier: &Barrier,
        here: geo::Coord<f64>,
        reach: f64,
        visited: &HashSet<NodeId>,
    ) -> Option<NodeId> {
        let primal = self.world.primal();
        let mut best: Option<(f64, NodeId)> = None;
        for edge in barrier.edges.iter().filter_map(|&e| primal.edge(e)) {
            if visited.contains(&edge.from) || visited.contains(&edge.to) {
                continue;
            }
            if !(self.in_scope(edge.from) && self.in_scope(edge.to)) {
                continue;
            }
            let (Some(a), Some(b)) = (primal.node(edge.from), primal.node(edge.to)) else {
                continue;
            };
            let d = geometry::distance_to_segment(here, a.coord, b.coord);
            if d > reach {
                continue;
            }
            let nearer = match geometry::distance(here, a.coord).total_cmp(&geometry::distance(here, b.coord)) {
                Ordering::Greater => b.id,
                _ => a.id,
            };
            if best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, nearer));
            }
        }
        best.map(|(_, node)| node)
    }
}

impl SubGoalNavigator for BarrierNavigator<'_> {
    fn sub_goals(&self, origin: NodeId, destination: NodeId) -> Result<Vec<NodeId>> {
        check_trip(self.world, origin, destination)?;

        let mut sequence = vec![origin];
        let mut visited: HashSet<NodeId> = [origin].into_iter().collect();
        let mut used: HashSet<BarrierId> = HashSet::new();
        let mut current = origin;

        while let Some(sub_goal) = self.next_sub_goal(current, destination, &visited, &mut used) {
            if sub_goal == destination {
                break;
            }
            sequence.push(sub_goal);
            visited.insert(sub_goal);
            current = sub_goal;
        }

        sequence.push(destination);
        tracing::debug!("Barrier sub-goals {} -> {}: {:?}", origin, destination, sequence);
        Ok(dedup_sequence(sequence))
    }
}
