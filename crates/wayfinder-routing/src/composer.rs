//! Route composer: stitches a sub-goal sequence into one walk
//!
//! Each consecutive pair of sub-goals becomes a leg. Legs never reuse an
//! edge already in the route; when a leg cannot be found the composer
//! backtracks one edge at a time and retries from the earlier node, and
//! skips the sub-goal once it has backtracked all the way to the origin.
//! Loops are cut out of the finished walk.

use crate::leg::LegPlanner;
use crate::perception::Perception;
use std::collections::{HashMap, HashSet};
use wayfinder_core::{DirectedEdge, EdgeId, NodeId, World};

pub struct RouteComposer<'a> {
    world: &'a World,
    legs: LegPlanner<'a>,
}

impl<'a> RouteComposer<'a> {
    pub fn new(world: &'a World, legs: LegPlanner<'a>) -> Self {
        Self { world, legs }
    }

    /// Walk visiting `sequence` in order, possibly partial
    pub fn compose(&self, sequence: &[NodeId], perception: &mut Perception) -> Vec<DirectedEdge> {
        let Some((&origin, targets)) = sequence.split_first() else {
            return Vec::new();
        };
        let primal = self.world.primal();
        let mut route: Vec<DirectedEdge> = Vec::new();

        for &target in targets {
            let position = route.last().map_or(origin, |d| d.to);
            if position == target {
                continue;
            }
            if let Some(index) = Self::visit_index(origin, &route, target) {
                tracing::debug!("Sub-goal {} already on the route, truncating", target);
                route.truncate(index);
                continue;
            }

            loop {
                let from = route.last().map_or(origin, |d| d.to);
                let avoid: HashSet<EdgeId> = route.iter().map(|d| d.edge).collect();

                if let Some(step) = primal.directed_edge_between(from, target) {
                    if !avoid.contains(&step.edge) {
                        route.push(step);
                        break;
                    }
                }

                let arrived_by = route.last().map(|d| d.edge);
                let leg = self.legs.plan(from, target, &avoid, arrived_by, perception);
                if !leg.is_empty() {
                    route.extend(leg);
                    break;
                }

                match route.pop() {
                    Some(dropped) => {
                        tracing::debug!("No leg {} -> {}, backtracking to {}", from, target, dropped.from);
                    }
                    None => {
                        tracing::warn!("Sub-goal {} unreachable from {}, skipping it", target, origin);
                        break;
                    }
                }
            }
        }

        Self::remove_loops(origin, route)
    }

    /// Number of edges after which the walk first stands on `node`
    fn visit_index(origin: NodeId, route: &[DirectedEdge], node: NodeId) -> Option<usize> {
        if origin == node {
            return Some(0);
        }
        route.iter().position(|d| d.to == node).map(|i| i + 1)
    }

    /// Cut every loop out of a walk starting at `origin`
    ///
    /// A node visited twice loses everything walked between its first and
    /// last visit; a ring back to the origin is the case where that node is
    /// the origin itself. The result visits each node once and so never
    /// repeats an edge.
    pub fn remove_loops(origin: NodeId, mut route: Vec<DirectedEdge>) -> Vec<DirectedEdge> {
        loop {
            let mut last_visit: HashMap<NodeId, usize> = HashMap::new();
            last_visit.insert(origin, 0);
            for (i, step) in route.iter().enumerate() {
                last_visit.insert(step.to, i + 1);
            }

            let mut nodes = std::iter::once(origin).chain(route.iter().map(|d| d.to));
            let Some((first, last)) = nodes
                .by_ref()
                .enumerate()
                .find_map(|(i, node)| last_visit.get(&node).filter(|&&j| j > i).map(|&j| (i, j)))
            else {
                return route;
            };
            tracing::debug!("Removing loop of {} edges from the route", last - first);
            route.drain(first..last);
        }
    }
}
