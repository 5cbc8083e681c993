//! Region navigator: hierarchical routing through gateways
//!
//! The walker first decides which regions to cross, as a chain of gateways
//! from the origin's region to the destination's. Gateways are scored by how
//! far the way to the exit and the crossing itself turn away from the
//! destination. A region without a usable gateway sends the search back one
//! crossing; the abandoned gateway is never offered again. When the search
//! unwinds to the origin, region planning is abandoned for the trip.
//!
//! Each region leg can then be refined with barrier sub-goals and on-route
//! marks scoped to that region.

use crate::barrier::BarrierNavigator;
use crate::config::PlannerConfig;
use crate::error::Result;
use crate::landmark::LandmarkNavigator;
use crate::traits::{check_trip, dedup_sequence, SubGoalNavigator};
use std::collections::HashSet;
use wayfinder_core::geometry;
use wayfinder_core::{AgentProperties, Gateway, MarkKind, NodeId, RegionId, World};

pub struct RegionNavigator<'a> {
    world: &'a World,
    config: &'a PlannerConfig,
    agent: &'a AgentProperties,
    barriers: bool,
    marks: Option<MarkKind>,
}

impl<'a> RegionNavigator<'a> {
    pub fn new(world: &'a World, config: &'a PlannerConfig, agent: &'a AgentProperties) -> Self {
        Self {
            world,
            config,
            agent,
            barriers: false,
            marks: None,
        }
    }

    /// Refine each region leg with barrier sub-goals
    pub fn with_barriers(mut self, barriers: bool) -> Self {
        self.barriers = barriers;
        self
    }

    /// Refine each region leg with on-route marks
    pub fn with_marks(mut self, marks: Option<MarkKind>) -> Self {
        self.marks = marks;
        self
    }

    /// Deviation of a gateway from the heading `current -> destination`
    ///
    /// Sums the turn towards the exit and the turn of the crossing itself.
    /// The first part alone decides whether the gateway lies in the cone.
    fn deviation(&self, current: NodeId, destination: NodeId, gateway: &Gateway) -> (f64, f64) {
        let primal = self.world.primal();
        let (Some(here), Some(exit), Some(there)) = (
            primal.node(current),
            primal.node(gateway.exit),
            primal.node(destination),
        ) else {
            return (f64::INFINITY, f64::INFINITY);
        };
        let target = geometry::bearing(here.coord, there.coord);
        let towards_exit = if current == gateway.exit {
            gateway.entry_angle
        } else {
            geometry::bearing(here.coord, exit.coord)
        };
        let cone = geometry::angle_difference(towards_exit, target);
        (cone, cone + geometry::angle_difference(gateway.entry_angle, target))
    }

    /// Best of `candidates` seen from `current`
    ///
    /// Gateways inside the direction cone win; without any, the least bad
    /// one outside it is taken.
    fn best_gateway<'g>(
        &self,
        current: NodeId,
        destination: NodeId,
        candidates: impl Iterator<Item = &'g Gateway>,
    ) -> Option<Gateway> {
        let scored: Vec<(bool, f64, Gateway)> = candidates
            .map(|g| {
                let (cone, total) = self.deviation(current, destination, g);
                (cone <= self.config.gateway_cone, total, *g)
            })
            .collect();
        let compliant = scored.iter().any(|(inside, _, _)| *inside);
        scored
            .into_iter()
            .filter(|(inside, _, _)| *inside || !compliant)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.2.key().cmp(&b.2.key())))
            .map(|(_, _, g)| g)
    }

    /// Gateway chain from `origin` to `destination`
    ///
    /// `Some(vec![])` when both share a region, `None` when no chain exists.
    pub fn gateway_sequence(&self, origin: NodeId, destination: NodeId) -> Option<Vec<Gateway>> {
        let (Some(start), Some(goal)) = (self.world.region_of(origin), self.world.region_of(destination)) else {
            tracing::debug!("Trip {} -> {} leaves the regions, no gateways", origin, destination);
            return None;
        };

        let mut stack: Vec<Gateway> = Vec::new();
        let mut visited: HashSet<RegionId> = [start].into_iter().collect();
        let mut blacklist: HashSet<(NodeId, NodeId)> = HashSet::new();

        loop {
            let (current, region) = stack.last().map_or((origin, start), |g| (g.entry, g.region_to));
            if region == goal {
                return Some(stack);
            }

            let next = self.world.region(region).and_then(|r| {
                let candidates = r
                    .gateways
                    .iter()
                    .filter(|g| !blacklist.contains(&g.key()))
                    .filter(|g| !visited.contains(&g.region_to));
                self.best_gateway(current, destination, candidates)
            });

            match next {
                Some(gateway) => {
                    tracing::debug!(
                        "Gateway {} -> {} into region {}",
                        gateway.exit,
                        gateway.entry,
                        gateway.region_to
                    );
                    visited.insert(gateway.region_to);
                    stack.push(gateway);
                }
                None => match stack.pop() {
                    Some(dead_end) => {
                        tracing::debug!(
                            "Region {} is a dead end, blacklisting gateway {} -> {}",
                            dead_end.region_to,
                            dead_end.exit,
                            dead_end.entry
                        );
                        blacklist.insert(dead_end.key());
                        visited.remove(&dead_end.region_to);
                    }
                    None => return None,
                },
            }
        }
    }

    /// Re-pick the crossing out of `region` after a spliced sub-goal
    ///
    /// A gateway leaving from the sub-goal itself is preferred; otherwise
    /// the best one towards the same region, seen from the sub-goal.
    fn regateway(&self, planned: Gateway, sub_goal: NodeId, destination: NodeId) -> Gateway {
        let Some(region) = self.world.region(planned.region_from) else {
            return planned;
        };
        let towards = || region.gateways_to(planned.region_to);
        let at_sub_goal = self.best_gateway(sub_goal, destination, towards().filter(|g| g.exit == sub_goal));
        at_sub_goal
            .or_else(|| self.best_gateway(sub_goal, destination, towards()))
            .unwrap_or(planned)
    }

    /// Barrier sub-goals strictly between `from` and `to`, inside `region`
    fn barrier_goals(&self, from: NodeId, to: NodeId, region: RegionId) -> Result<Vec<NodeId>> {
        if from == to {
            return Ok(Vec::new());
        }
        let goals = BarrierNavigator::new(self.world, self.config, self.agent)
            .within_region(Some(region))
            .sub_goals(from, to)?;
        Ok(interior(goals))
    }

    /// On-route marks strictly between `from` and `to`, inside `region`
    fn mark_goals(&self, marks: MarkKind, from: NodeId, to: NodeId, region: RegionId) -> Result<Vec<NodeId>> {
        if from == to {
            return Ok(Vec::new());
        }
        let goals = LandmarkNavigator::new(self.world, self.config, marks)
            .within_region(region, to)
            .sub_goals(from, to)?;
        Ok(interior(goals))
    }

    /// Sub-goals of one region leg, possibly moving its exit gateway
    fn refine_leg(
        &self,
        from: NodeId,
        region: RegionId,
        mut gateway: Option<Gateway>,
        destination: NodeId,
    ) -> Result<(Vec<NodeId>, Option<Gateway>)> {
        let mut goals = Vec::new();
        let leg_end = |g: &Option<Gateway>| g.map_or(destination, |g| g.exit);

        if self.barriers {
            goals = self.barrier_goals(from, leg_end(&gateway), region)?;
            if let (Some(&last), Some(planned)) = (goals.last(), gateway) {
                let moved = self.regateway(planned, last, destination);
                if moved.key() != planned.key() {
                    tracing::debug!(
                        "Barrier sub-goal {} moves the crossing to {} -> {}",
                        last,
                        moved.exit,
                        moved.entry
                    );
                }
                gateway = Some(moved);
            }
        }

        if let Some(marks) = self.marks {
            let start = goals.last().copied().unwrap_or(from);
            let end = leg_end(&gateway);
            goals.extend(self.mark_goals(marks, start, end, region)?);
        }

        Ok((goals, gateway))
    }
}

/// Drop the two endpoints of a navigator sequence
fn interior(mut goals: Vec<NodeId>) -> Vec<NodeId> {
    if goals.len() <= 2 {
        return Vec::new();
    }
    goals.pop();
    goals.remove(0);
    goals
}

impl SubGoalNavigator for RegionNavigator<'_> {
    fn sub_goals(&self, origin: NodeId, destination: NodeId) -> Result<Vec<NodeId>> {
        check_trip(self.world, origin, destination)?;

        let Some(gateways) = self.gateway_sequence(origin, destination) else {
            tracing::warn!(
                "No gateway chain {} -> {}, ignoring regions for this trip",
                origin,
                destination
            );
            return Ok(vec![origin, destination]);
        };
        if gateways.is_empty() {
            return Ok(vec![origin, destination]);
        }

        let mut sequence = vec![origin];
        let mut current = origin;
        for planned in gateways {
            let (goals, gateway) = self.refine_leg(current, planned.region_from, Some(planned), destination)?;
            let gateway = gateway.unwrap_or(planned);
            sequence.extend(goals);
            sequence.push(gateway.exit);
            sequence.push(gateway.entry);
            current = gateway.entry;
        }

        if let Some(region) = self.world.region_of(current) {
            let (goals, _) = self.refine_leg(current, region, None, destination)?;
            sequence.extend(goals);
        }
        sequence.push(destination);

        tracing::debug!("Region sub-goals {} -> {}: {:?}", origin, destination, sequence);
        Ok(dedup_sequence(sequence))
    }
}
