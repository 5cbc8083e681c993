//! Landmark navigator: salient on-route marks
//!
//! Walkers who find the way hard to read pick intermediate junctions that
//! stand out, either through local landmarks or through centrality. How hard
//! the way is to read is the wayfinding easiness:
//!
//! ```text
//! easiness = 1 - (remaining / total distance + landmark complexity) / 2
//! ```
//!
//! Marks are added until easiness reaches the configured threshold.

use crate::config::PlannerConfig;
use crate::error::Result;
use crate::traits::{check_trip, dedup_sequence, SubGoalNavigator};
use std::collections::{BTreeMap, HashSet};
use wayfinder_core::{MarkKind, NodeId, RegionId, World};

/// Confinement of a mark search to one region, heading for its exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionScope {
    pub region: RegionId,
    pub exit: NodeId,
}

pub struct LandmarkNavigator<'a> {
    world: &'a World,
    config: &'a PlannerConfig,
    marks: MarkKind,
    scope: Option<RegionScope>,
}

impl<'a> LandmarkNavigator<'a> {
    pub fn new(world: &'a World, config: &'a PlannerConfig, marks: MarkKind) -> Self {
        Self {
            world,
            config,
            marks,
            scope: None,
        }
    }

    /// Search marks inside `region` only, never moving away from `exit`
    pub fn within_region(mut self, region: RegionId, exit: NodeId) -> Self {
        self.scope = Some(RegionScope { region, exit });
        self
    }

    fn weights(&self) -> (f64, f64) {
        if self.scope.is_some() {
            (self.config.regional_landmark_weight, self.config.regional_gain_weight)
        } else {
            (self.config.landmark_weight, self.config.gain_weight)
        }
    }

    /// Salient nodes between `from` and `to`, relaxing the percentile until something qualifies
    fn salient_nodes(&self, from: NodeId, to: NodeId) -> BTreeMap<NodeId, f64> {
        let primal = self.world.primal();
        let mut percentile = self.config.salient_percentile;
        loop {
            let mut salient = primal.salient_nodes_within_space(from, to, percentile);
            if let Some(scope) = self.scope {
                salient.retain(|&n, _| self.world.region_of(n) == Some(scope.region));
            }
            if !salient.is_empty() {
                return salient;
            }
            percentile -= self.config.percentile_step;
            if percentile < self.config.percentile_floor - 1e-9 || self.config.percentile_step <= 0.0 {
                tracing::debug!("No salient nodes between {} and {}", from, to);
                return BTreeMap::new();
            }
            tracing::debug!("Relaxing salience percentile to {:.2}", percentile);
        }
    }

    fn complexity(&self, from: NodeId, to: NodeId) -> f64 {
        match self.scope.and_then(|s| self.world.region(s.region)) {
            Some(region) => region.complexity,
            None => self.world.area_complexity(from, to),
        }
    }

    fn mark_score(&self, node: NodeId) -> f64 {
        match self.marks {
            MarkKind::Landmarks => self.world.local_landmarkness(node),
            MarkKind::Centrality => self.world.primal().normalized_centrality(node),
        }
    }

    /// Best mark around `current` on the way to `destination`
    fn next_mark(
        &self,
        current: NodeId,
        origin: NodeId,
        destination: NodeId,
        total: f64,
        used: &HashSet<NodeId>,
    ) -> Option<NodeId> {
        let primal = self.world.primal();
        let remaining = primal.distance(current, destination);
        if remaining <= 0.0 || total <= 0.0 {
            return None;
        }
        let easiness = 1.0 - ((remaining / total).min(1.0) + self.complexity(current, destination)) / 2.0;
        if easiness >= self.config.easiness_threshold {
            return None;
        }

        let salient = self.salient_nodes(current, destination);
        if salient.is_empty() {
            return None;
        }
        let (landmark_weight, gain_weight) = self.weights();
        let exit_distance = self.scope.map(|s| primal.distance(current, s.exit));

        let mut radius = remaining * easiness.max(0.0);
        loop {
            let best = salient
                .keys()
                .copied()
                .filter(|&n| n != current && n != origin && !used.contains(&n))
                .filter(|&n| !primal.are_adjacent(current, n))
                .filter(|&n| primal.distance(current, n) <= radius)
                .filter(|&n| primal.distance(n, destination) < remaining)
                .filter(|&n| {
                    match (self.scope, exit_distance) {
                        (Some(scope), Some(limit)) => primal.distance(n, scope.exit) <= limit,
                        _ => true,
                    }
                })
                .map(|n| {
                    let gain = (remaining - primal.distance(n, destination)) / remaining;
                    (n, landmark_weight * self.mark_score(n) + gain_weight * gain)
                })
                .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)));

            if let Some((node, score)) = best {
                tracing::debug!("On-route mark {} scores {:.3} (radius {:.1} m)", node, score, radius);
                return Some(node);
            }
            if radius >= remaining || self.config.radius_growth <= 0.0 {
                return None;
            }
            radius = (radius + remaining * self.config.radius_growth).min(remaining);
        }
    }
}

impl SubGoalNavigator for LandmarkNavigator<'_> {
    fn sub_goals(&self, origin: NodeId, destination: NodeId) -> Result<Vec<NodeId>> {
        check_trip(self.world, origin, destination)?;

        let total = self.world.primal().distance(origin, destination);
        let mut sequence = vec![origin];
        let mut used: HashSet<NodeId> = [origin].into_iter().collect();
        let mut current = origin;

        while let Some(mark) = self.next_mark(current, origin, destination, total, &used) {
            let exit = self.scope.map(|s| s.exit);
            if mark == destination || Some(mark) == exit {
                break;
            }
            sequence.push(mark);
            used.insert(mark);
            current = mark;
        }

        sequence.push(destination);
        tracing::debug!("On-route marks {} -> {}: {:?}", origin, destination, sequence);
        Ok(dedup_sequence(sequence))
    }
}
