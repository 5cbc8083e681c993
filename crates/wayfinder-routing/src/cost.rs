//! Perceived edge and turn costs
//!
//! Costs are the physical quantity (metres or degrees) multiplied by a
//! sampled perception error. Agents that like natural barriers see edges
//! along parks and water as cheaper, agents that avoid severing barriers see
//! edges along railways and major roads as dearer, and agents guided by
//! distant landmarks get a discount on edges leading towards well-visible
//! landmarks near their destination.

use crate::config::PlannerConfig;
use crate::perception::{Clip, Perception};
use wayfinder_core::geometry;
use wayfinder_core::limits::{MAX_DEFLECTION_DEGREES, UNANCHORED_LANDMARK_DISCOUNT};
use wayfinder_core::{AgentProperties, Edge, EdgeBarriers, NodeId, RouteStrategy, World};

/// Smallest cost any edge or turn can have
pub const MIN_COST: f64 = f64::EPSILON;

/// Cost model bound to one agent and one final destination
#[derive(Debug, Clone, Copy)]
pub struct CostModel<'a> {
    world: &'a World,
    agent: &'a AgentProperties,
    config: &'a PlannerConfig,
    destination: NodeId,
    discount: bool,
}

impl<'a> CostModel<'a> {
    pub fn new(
        world: &'a World,
        agent: &'a AgentProperties,
        config: &'a PlannerConfig,
        strategy: RouteStrategy,
        destination: NodeId,
    ) -> Self {
        Self {
            world,
            agent,
            config,
            destination,
            discount: agent.using_distant_landmarks && strategy.allows_landmark_discount(),
        }
    }

    pub fn world(&self) -> &'a World {
        self.world
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Perception error for an edge with the given barrier membership
    pub fn edge_error(&self, barriers: &EdgeBarriers, perception: &mut Perception) -> f64 {
        if self.agent.prefer_natural_barriers && !barriers.positive.is_empty() {
            perception.sample(
                self.agent.natural_barriers_mean,
                self.agent.natural_barriers_sd,
                Clip::Left,
            )
        } else if self.agent.avoid_severing_barriers && !barriers.negative.is_empty() {
            perception.sample(
                self.agent.severing_barriers_mean,
                self.agent.severing_barriers_sd,
                Clip::Right,
            )
        } else {
            perception.sample(1.0, self.config.perception_sd, Clip::None)
        }
    }

    /// Perceived length of a primal edge walked towards `target`
    pub fn distance_cost(&self, edge: &Edge, target: NodeId, perception: &mut Perception) -> f64 {
        let cost = edge.length.max(MIN_COST) * self.edge_error(&edge.barriers, perception);
        self.landmark_discount(cost, target, self.config.global_landmark_weight_distance)
    }

    /// Perceived turn onto `segment` over the dual edge `turn`
    ///
    /// `target` is the junction the walker heads to along `segment`.
    pub fn angular_cost(&self, turn: &Edge, segment: &Edge, target: NodeId, perception: &mut Perception) -> f64 {
        let deflection = turn.deflection.clamp(0.0, MAX_DEFLECTION_DEGREES).max(MIN_COST);
        let cost = deflection * self.edge_error(&segment.barriers, perception);
        self.landmark_discount(cost, target, self.config.global_landmark_weight_angular)
    }

    fn landmark_discount(&self, cost: f64, target: NodeId, weight: f64) -> f64 {
        if !self.discount {
            return cost.max(MIN_COST);
        }
        let primal = self.world.primal();
        if primal.distance(target, self.destination) <= self.config.visibility_threshold {
            return cost.max(MIN_COST);
        }
        let landmarkness = self.global_landmarkness(target, self.destination);
        (cost * (1.0 - landmarkness * weight)).max(MIN_COST)
    }

    /// How strongly distant landmarks seen from `target` point at `destination`, in `[0, 1]`
    pub fn global_landmarkness(&self, target: NodeId, destination: NodeId) -> f64 {
        let primal = self.world.primal();
        let (Some(node), Some(dest)) = (primal.node(target), primal.node(destination)) else {
            return 0.0;
        };
        if node.distant_landmarks.is_empty() {
            return 0.0;
        }
        let to_destination = geometry::distance(node.coord, dest.coord);
        let proximity = |landmark_distance: f64| {
            if landmark_distance <= 0.0 {
                1.0
            } else {
                (to_destination / landmark_distance).min(1.0)
            }
        };

        let mut best: f64 = 0.0;
        if self.agent.only_anchors {
            for anchor in dest.anchors.iter().filter(|a| node.distant_landmarks.contains(&a.building)) {
                if let Some(building) = self.world.building(anchor.building) {
                    best = best.max(building.global_landmarkness * proximity(anchor.distance));
                }
            }
        } else {
            for &id in &node.distant_landmarks {
                let Some(building) = self.world.building(id) else {
                    continue;
                };
                let anchored = dest.anchors.iter().any(|a| a.building == id);
                let factor = if anchored { 1.0 } else { UNANCHORED_LANDMARK_DISCOUNT };
                let score = building.global_landmarkness
                    * proximity(geometry::distance(building.coord, dest.coord))
                    * factor;
                best = best.max(score);
            }
        }
        best.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfinder_core::{
        Anchor, BarrierId, BarrierKind, BarrierSpec, BuildingId, BuildingSpec, EdgeId, EdgeSpec, LocalHeuristic,
        NodeSpec, WorldSpec,
    };

    /// A straight street 0-1-2 running 1 km east, a river along the first
    /// block and a tower (building 0) beyond node 2
    fn create_test_world() -> World {
        let mut nodes = vec![
            NodeSpec::new(0, 0.0, 0.0),
            NodeSpec::new(1, 500.0, 0.0),
            NodeSpec::new(2, 1000.0, 0.0),
        ];
        nodes[0].distant_landmarks = vec![BuildingId(0)];
        nodes[1].distant_landmarks = vec![BuildingId(0)];
        nodes[2].anchors = vec![Anchor {
            building: BuildingId(0),
            distance: 100.0,
        }];
        World::from_spec(WorldSpec {
            nodes,
            edges: vec![EdgeSpec::new(0, 0, 1), EdgeSpec::new(1, 1, 2)],
            barriers: vec![BarrierSpec {
                id: BarrierId(0),
                kind: BarrierKind::Water,
                coords: vec![[0.0, 5.0], [500.0, 5.0]],
                edges: vec![EdgeId(0)],
            }],
            buildings: vec![BuildingSpec {
                id: BuildingId(0),
                x: 1100.0,
                y: 0.0,
                region: None,
                local_landmarkness: 0.0,
                global_landmarkness: 0.8,
            }],
            ..Default::default()
        })
        .unwrap()
    }

    fn model<'a>(world: &'a World, agent: &'a AgentProperties, config: &'a PlannerConfig) -> CostModel<'a> {
        CostModel::new(world, agent, config, agent.strategy(), NodeId(2))
    }

    #[test]
    fn test_exact_distance_cost_is_length() {
        let world = create_test_world();
        let agent = AgentProperties::default();
        let config = PlannerConfig::default();
        let cost = model(&world, &agent, &config);
        let edge = world.primal().edge(EdgeId(1)).unwrap();
        assert!((cost.distance_cost(edge, NodeId(2), &mut Perception::exact()) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_natural_barrier_preference_lowers_cost() {
        let world = create_test_world();
        let agent = AgentProperties {
            prefer_natural_barriers: true,
            ..Default::default()
        };
        let config = PlannerConfig::default();
        let cost = model(&world, &agent, &config);
        let along_river = world.primal().edge(EdgeId(0)).unwrap();
        let mut perception = Perception::seeded(5);
        for _ in 0..50 {
            assert!(cost.distance_cost(along_river, NodeId(1), &mut perception) <= 0.70 * 500.0 + 1e-9);
        }
    }

    #[test]
    fn test_costs_stay_positive() {
        let world = create_test_world();
        let agent = AgentProperties {
            natural_barriers_sd: 50.0,
            prefer_natural_barriers: true,
            ..Default::default()
        };
        let config = PlannerConfig {
            perception_sd: 50.0,
            ..Default::default()
        };
        let cost = model(&world, &agent, &config);
        let mut perception = Perception::seeded(1);
        let mut straight = Edge::new(EdgeId(0), NodeId(0), NodeId(1), 1.0);
        straight.deflection = 0.0;
        for edge in world.primal().edges() {
            for _ in 0..100 {
                assert!(cost.distance_cost(edge, NodeId(2), &mut perception) > 0.0);
                assert!(cost.angular_cost(&straight, edge, NodeId(2), &mut perception) > 0.0);
            }
        }
    }

    #[test]
    fn test_global_landmarkness() {
        let world = create_test_world();
        let config = PlannerConfig::default();
        let anchors_only = AgentProperties {
            using_distant_landmarks: true,
            only_anchors: true,
            ..Default::default()
        };
        let cost = model(&world, &anchors_only, &config);
        // node 0 is 1000 m from the destination, the tower 100 m: weight capped at 1
        assert!((cost.global_landmarkness(NodeId(0), NodeId(2)) - 0.8).abs() < 1e-9);
        // no visible landmarks at the destination itself
        assert_eq!(cost.global_landmarkness(NodeId(2), NodeId(2)), 0.0);
        // destination 1 has no anchors
        assert_eq!(cost.global_landmarkness(NodeId(0), NodeId(1)), 0.0);

        let any = AgentProperties {
            using_distant_landmarks: true,
            ..Default::default()
        };
        let cost = model(&world, &any, &config);
        // towards node 1 the tower is not an anchor: discounted
        let expected = 0.8 * (500.0_f64 / 600.0).min(1.0) * UNANCHORED_LANDMARK_DISCOUNT;
        assert!((cost.global_landmarkness(NodeId(0), NodeId(1)) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_discount_needs_distance_and_strategy() {
        let world = create_test_world();
        let config = PlannerConfig::default();
        let edge = world.primal().edge(EdgeId(0)).unwrap();

        let guided = AgentProperties {
            using_distant_landmarks: true,
            ..Default::default()
        };
        let cost = model(&world, &guided, &config);
        let discounted = cost.distance_cost(edge, NodeId(0), &mut Perception::exact());
        assert!((discounted - 500.0 * (1.0 - 0.8 * 0.85)).abs() < 1e-6);
        // node 2 is the destination itself: within the visibility threshold
        let near = cost.distance_cost(edge, NodeId(2), &mut Perception::exact());
        assert!((near - 500.0).abs() < 1e-9);

        let mut minimising = AgentProperties::minimising(LocalHeuristic::RoadDistance);
        minimising.using_distant_landmarks = true;
        let cost = model(&world, &minimising, &config);
        assert!((cost.distance_cost(edge, NodeId(0), &mut Perception::exact()) - 500.0).abs() < 1e-9);
    }
}
