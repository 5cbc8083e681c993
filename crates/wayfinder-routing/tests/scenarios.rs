//! End-to-end planning scenarios over small hand-built worlds

use std::collections::HashSet;
use wayfinder_core::{
    AgentProperties, BarrierId, BarrierKind, BarrierSpec, DirectedEdge, EdgeId, EdgeSpec, GatewaySpec, LocalHeuristic,
    NodeId, NodeSpec, World, WorldSpec,
};
use wayfinder_routing::dijkstra::RoadDistance;
use wayfinder_routing::{
    BarrierNavigator, CostModel, DijkstraEngine, LandmarkNavigator, Perception, PlannerConfig, RegionNavigator,
    RoutePlanner, RoutingError, Search, SearchSpace, SubGoalNavigator, TripRequest,
};

const A: NodeId = NodeId(0);
const B: NodeId = NodeId(1);
const C: NodeId = NodeId(2);
const D: NodeId = NodeId(3);

/// A-B 10 m, B-D 10 m, A-C 5 m, C-D 5 m; optionally A, B in region 1 and
/// C, D in region 2 with a single gateway B -> D
fn create_diamond_world(regions: bool) -> World {
    let node = |id: u32, x: f64, y: f64, region: u32| {
        let spec = NodeSpec::new(id, x, y);
        if regions {
            spec.in_region(region)
        } else {
            spec
        }
    };
    World::from_spec(WorldSpec {
        nodes: vec![
            node(0, 0.0, 0.0, 1),
            node(1, 10.0, 0.0, 1),
            node(2, 0.0, -5.0, 2),
            node(3, 10.0, -5.0, 2),
        ],
        edges: vec![
            EdgeSpec::new(0, 0, 1).with_length(10.0),
            EdgeSpec::new(1, 1, 3).with_length(10.0),
            EdgeSpec::new(2, 0, 2).with_length(5.0),
            EdgeSpec::new(3, 2, 3).with_length(5.0),
        ],
        gateways: if regions { vec![GatewaySpec::new(1, 3)] } else { vec![] },
        ..Default::default()
    })
    .unwrap()
}

/// 4x4 grid at 100 m spacing, node id = row * 4 + col
///
/// The two western columns form region 0, the eastern ones region 1, with
/// gateways both ways on every row. A river follows the northern row.
fn create_grid_world() -> World {
    let mut nodes = Vec::new();
    for row in 0..4u32 {
        for col in 0..4u32 {
            let centrality = ((row * 7 + col * 3) % 5) as f64;
            nodes.push(
                NodeSpec::new(row * 4 + col, 100.0 * col as f64, 100.0 * row as f64)
                    .in_region(if col < 2 { 0 } else { 1 })
                    .with_centrality(centrality),
            );
        }
    }

    let mut edges = Vec::new();
    for row in 0..4u32 {
        for col in 0..3u32 {
            let id = row * 4 + col;
            edges.push(EdgeSpec::new(edges.len() as u32, id, id + 1));
        }
    }
    for row in 0..3u32 {
        for col in 0..4u32 {
            let id = row * 4 + col;
            edges.push(EdgeSpec::new(edges.len() as u32, id, id + 4));
        }
    }

    let mut gateways = Vec::new();
    for row in 0..4u32 {
        gateways.push(GatewaySpec::new(row * 4 + 1, row * 4 + 2));
        gateways.push(GatewaySpec::new(row * 4 + 2, row * 4 + 1));
    }

    World::from_spec(WorldSpec {
        nodes,
        edges,
        gateways,
        barriers: vec![BarrierSpec {
            id: BarrierId(0),
            kind: BarrierKind::Water,
            coords: vec![[-50.0, 320.0], [350.0, 320.0]],
            edges: vec![EdgeId(9), EdgeId(10), EdgeId(11)],
        }],
        ..Default::default()
    })
    .unwrap()
}

fn assert_walk(route: &[DirectedEdge], origin: NodeId, destination: NodeId) {
    assert_eq!(route.first().map(|d| d.from), Some(origin));
    assert_eq!(route.last().map(|d| d.to), Some(destination));
    for pair in route.windows(2) {
        assert_eq!(pair[0].to, pair[1].from, "walk is not contiguous: {:?}", route);
    }
    let edges: HashSet<EdgeId> = route.iter().map(|d| d.edge).collect();
    assert_eq!(edges.len(), route.len(), "walk repeats an edge: {:?}", route);
}

#[test]
fn scenario_a_shortest_distance() {
    let world = create_diamond_world(false);
    let config = PlannerConfig::default();
    let agent = AgentProperties::minimising(LocalHeuristic::RoadDistance);

    let route = RoutePlanner::new(&world, &config)
        .plan(&agent, A, D, &mut Perception::exact())
        .unwrap();
    assert_eq!(route.nodes(), vec![A, C, D]);
    assert!((route.length(&world) - 10.0).abs() < 1e-9);
}

#[test]
fn exact_perception_reproduces_classical_cost() {
    let world = create_diamond_world(false);
    let config = PlannerConfig::default();
    let agent = AgentProperties::minimising(LocalHeuristic::RoadDistance);
    let cost = CostModel::new(&world, &agent, &config, agent.strategy(), D);
    let avoid = HashSet::new();
    let query = Search {
        space: SearchSpace::Full(world.primal()),
        origin: A,
        destination: D,
        origin_junction: None,
        avoid: &avoid,
    };

    let (total, path) =
        DijkstraEngine::search_with_cost(&query, &RoadDistance { cost }, &mut Perception::exact()).unwrap();
    assert!((total - 10.0).abs() < 1e-9);
    assert_eq!(path.len(), 2);
}

#[test]
fn scenario_b_region_sequence() {
    let world = create_diamond_world(true);
    let config = PlannerConfig::default();
    let agent = AgentProperties {
        region_based: true,
        ..Default::default()
    };

    let sequence = RegionNavigator::new(&world, &config, &agent).sub_goals(A, D).unwrap();
    assert_eq!(sequence, vec![A, B, D]);

    let route = RoutePlanner::new(&world, &config)
        .plan(&agent, A, D, &mut Perception::exact())
        .unwrap();
    assert_eq!(route.sub_goals, vec![A, B, D]);
    assert_eq!(route.edge_ids(), vec![EdgeId(0), EdgeId(1)]);
}

#[test]
fn scenario_c_identical_endpoints_are_rejected() {
    let world = create_diamond_world(true);
    let config = PlannerConfig::default();
    let agent = AgentProperties::default();

    let region = RegionNavigator::new(&world, &config, &agent).sub_goals(B, B);
    let barrier = BarrierNavigator::new(&world, &config, &agent).sub_goals(B, B);
    let landmark = LandmarkNavigator::new(&world, &config, wayfinder_core::MarkKind::Landmarks).sub_goals(B, B);
    for result in [region, barrier, landmark] {
        assert!(matches!(result, Err(RoutingError::DegenerateTrip(n)) if n == B));
    }

    let planned = RoutePlanner::new(&world, &config).plan(&agent, B, B, &mut Perception::exact());
    assert!(matches!(planned, Err(RoutingError::DegenerateTrip(_))));
}

#[test]
fn same_region_trip_is_direct() {
    let world = create_grid_world();
    let config = PlannerConfig::default();
    let agent = AgentProperties {
        region_based: true,
        barrier_based: true,
        ..Default::default()
    };
    let sequence = RegionNavigator::new(&world, &config, &agent)
        .with_barriers(true)
        .sub_goals(NodeId(0), NodeId(13))
        .unwrap();
    assert_eq!(sequence, vec![NodeId(0), NodeId(13)]);
}

#[test]
fn cross_region_sequence_uses_gateways() {
    let world = create_grid_world();
    let config = PlannerConfig::default();
    let agent = AgentProperties::default();
    let navigator = RegionNavigator::new(&world, &config, &agent);

    let gateways = navigator.gateway_sequence(NodeId(0), NodeId(15)).unwrap();
    assert_eq!(gateways.len(), 1);
    let gateway = gateways[0];
    assert_eq!(world.region_of(gateway.exit), world.region_of(NodeId(0)));
    assert_eq!(world.region_of(gateway.entry), world.region_of(NodeId(15)));
    assert!(world.primal().are_adjacent(gateway.exit, gateway.entry));

    let sequence = navigator.sub_goals(NodeId(0), NodeId(15)).unwrap();
    assert_eq!(sequence, vec![NodeId(0), gateway.exit, gateway.entry, NodeId(15)]);
}

#[test]
fn minimising_agents_get_no_sub_goals() {
    let world = create_grid_world();
    let config = PlannerConfig::default();
    let agent = AgentProperties {
        only_minimising: true,
        region_based: true,
        barrier_based: true,
        using_local_landmarks: true,
        using_distant_landmarks: true,
        ..Default::default()
    };
    let route = RoutePlanner::new(&world, &config)
        .plan(&agent, NodeId(0), NodeId(15), &mut Perception::seeded(11))
        .unwrap();
    assert_eq!(route.sub_goals, vec![NodeId(0), NodeId(15)]);
    assert_walk(&route.edges, NodeId(0), NodeId(15));
}

#[test]
fn perceived_costs_stay_positive() {
    let world = create_grid_world();
    let config = PlannerConfig {
        perception_sd: 5.0,
        ..Default::default()
    };
    let agent = AgentProperties {
        prefer_natural_barriers: true,
        natural_barriers_mean: 0.01,
        natural_barriers_sd: 10.0,
        avoid_severing_barriers: true,
        ..Default::default()
    };
    let cost = CostModel::new(&world, &agent, &config, agent.strategy(), NodeId(15));
    let mut perception = Perception::seeded(3);

    for _ in 0..50 {
        for edge in world.primal().edges() {
            assert!(cost.distance_cost(edge, edge.to, &mut perception) > 0.0);
        }
        for turn in world.dual().edges() {
            let segment = world
                .primal_edge_of(turn.to)
                .and_then(|e| world.primal().edge(e))
                .unwrap();
            assert!(cost.angular_cost(turn, segment, segment.to, &mut perception) > 0.0);
        }
    }
}

#[test]
fn every_strategy_yields_a_clean_walk() {
    let world = create_grid_world();
    let config = PlannerConfig::default();
    let planner = RoutePlanner::new(&world, &config);

    let profiles = [
        AgentProperties::minimising(LocalHeuristic::RoadDistance),
        AgentProperties::minimising(LocalHeuristic::AngularChange),
        AgentProperties {
            region_based: true,
            barrier_based: true,
            ..Default::default()
        },
        AgentProperties {
            region_based: true,
            using_salient_nodes: true,
            local_heuristic: LocalHeuristic::AngularChange,
            ..Default::default()
        },
        AgentProperties {
            barrier_based: true,
            prefer_natural_barriers: true,
            ..Default::default()
        },
        AgentProperties {
            using_salient_nodes: true,
            ..Default::default()
        },
        AgentProperties {
            using_distant_landmarks: true,
            ..Default::default()
        },
    ];

    for (agent_id, profile) in profiles.iter().enumerate() {
        let agent = profile.clone().with_id(agent_id as u64);
        for trip_index in 0..5 {
            for (origin, destination) in [(0, 15), (12, 3), (5, 14)] {
                let trip = TripRequest {
                    origin: NodeId(origin),
                    destination: NodeId(destination),
                    trip_index,
                };
                let route = planner.plan_trip(&agent, &trip).unwrap();
                assert_walk(&route.edges, trip.origin, trip.destination);
                assert_eq!(route.sub_goals.first(), Some(&trip.origin));
                assert_eq!(route.sub_goals.last(), Some(&trip.destination));
            }
        }
    }
}

#[test]
fn angular_walks_never_turn_back() {
    let world = create_grid_world();
    let config = PlannerConfig::default();
    let planner = RoutePlanner::new(&world, &config);
    let agent = AgentProperties::minimising(LocalHeuristic::AngularChange);

    for seed in 0..10 {
        let route = planner
            .plan(&agent, NodeId(4), NodeId(11), &mut Perception::seeded(seed))
            .unwrap();
        for pair in route.edges.windows(2) {
            assert_ne!(pair[0].edge, pair[1].edge);
            assert_ne!(pair[0].from, pair[1].to);
        }
    }
}
