//! Route command: plan one trip

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use wayfinder_core::{AgentProperties, NodeId, World};
use wayfinder_routing::{Perception, Route, RoutePlanner};

use super::io;
use crate::output::{format_length, format_walk, to_json, OutputFormat};
use crate::config::Config;
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct RouteArgs {
    /// Origin node id
    #[arg(short, long)]
    pub origin: u32,

    /// Destination node id
    #[arg(short, long)]
    pub destination: u32,

    /// Intermediate nodes to pass through, in order (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub via: Vec<u32>,

    /// Agent profile (TOML, or JSON by extension)
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Agent id, overriding the profile's
    #[arg(long)]
    pub agent_id: Option<u64>,

    /// Trip index within the agent's day
    #[arg(long, default_value = "0")]
    pub trip: u64,

    /// Fixed perception seed; wins over both `seed` and `exact` in the config file
    #[arg(long, conflicts_with = "exact")]
    pub seed: Option<u64>,

    /// Plan without perception error, whatever the config file says
    #[arg(long)]
    pub exact: bool,
}

/// Route plus the figures worth printing next to it
#[derive(Serialize)]
struct RouteReport<'a> {
    #[serde(flatten)]
    route: &'a Route,
    strategy_label: String,
    length: f64,
    reaches_destination: bool,
    nodes: Vec<NodeId>,
}

pub fn run(args: &RouteArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let world = ctx.load_world(cli)?;
    let mut agent = match &args.profile {
        Some(path) => io::load_profile(path)?,
        None => AgentProperties::default(),
    };
    if let Some(agent_id) = args.agent_id {
        agent.agent_id = agent_id;
    }

    let mut perception = perception(args, &ctx.config, agent.agent_id);

    let planner = RoutePlanner::new(&world, &ctx.config.planner);
    let (origin, destination) = (NodeId(args.origin), NodeId(args.destination));
    let route = if args.via.is_empty() {
        planner.plan(&agent, origin, destination, &mut perception)?
    } else {
        let mut sequence = vec![origin];
        sequence.extend(args.via.iter().map(|&n| NodeId(n)));
        sequence.push(destination);
        planner.plan_sequence(&agent, &sequence, &mut perception)?
    };
    tracing::info!("Planned {} edges from {} to {}", route.edges.len(), origin, destination);

    match cli.output_format(&ctx.config) {
        OutputFormat::Json => {
            let report = RouteReport {
                route: &route,
                strategy_label: route.strategy.label(),
                length: route.length(&world),
                reaches_destination: route.reaches_destination(),
                nodes: route.nodes(),
            };
            println!("{}", to_json(&report)?);
        }
        OutputFormat::Table => print_table(&route, &world),
    }
    Ok(())
}

/// Command-line flags first, then the config file, then the agent's own stream
fn perception(args: &RouteArgs, config: &Config, agent_id: u64) -> Perception {
    if args.exact {
        return Perception::exact();
    }
    if let Some(seed) = args.seed {
        return Perception::seeded(seed);
    }
    match (config.exact, config.seed) {
        (true, _) => Perception::exact(),
        (false, Some(seed)) => Perception::seeded(seed),
        (false, None) => Perception::for_trip(agent_id, args.trip),
    }
}

fn print_table(route: &Route, world: &World) {
    println!(
        "Route {} -> {} ({}): {} edges, {}",
        route.origin,
        route.destination,
        route.strategy.label(),
        route.edges.len(),
        format_length(route.length(world))
    );
    println!("Sub-goals: {}", format_walk(&route.sub_goals));
    if route.is_empty() {
        println!("No path found");
        return;
    }
    if !route.reaches_destination() {
        println!("Route is incomplete: it stops at {}", route.nodes().last().map_or(route.origin, |n| *n));
    }

    println!("  {:>4}  {:>6}  {:>6}  {:>6}  {:>10}", "#", "edge", "from", "to", "length");
    for (i, step) in route.edges.iter().enumerate() {
        let length = world.primal().edge(step.edge).map_or(0.0, |e| e.length);
        println!(
            "  {:>4}  {:>6}  {:>6}  {:>6}  {:>10}",
            i + 1,
            step.edge.to_string(),
            step.from.to_string(),
            step.to.to_string(),
            format_length(length)
        );
    }
}
