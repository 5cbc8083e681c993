//! Inspect command: summarise a world snapshot

use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;
use wayfinder_core::{RegionId, World};

use crate::output::{to_json, OutputFormat};
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct InspectArgs {
    /// Also list every region
    #[arg(long)]
    pub regions: bool,
}

#[derive(Debug, Serialize)]
struct WorldStats {
    nodes: usize,
    edges: usize,
    dual_nodes: usize,
    dual_edges: usize,
    total_length: f64,
    gateways: usize,
    barriers: BTreeMap<String, usize>,
    buildings: usize,
    landmarks: usize,
    regions: Vec<RegionStats>,
}

#[derive(Debug, Serialize)]
struct RegionStats {
    id: RegionId,
    nodes: usize,
    edges: usize,
    gateways: usize,
    buildings: usize,
    complexity: f64,
}

fn collect(world: &World) -> WorldStats {
    let mut barriers = BTreeMap::new();
    for barrier in world.barriers() {
        let kind = serde_json::to_value(barrier.kind)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{:?}", barrier.kind));
        *barriers.entry(kind).or_insert(0) += 1;
    }

    WorldStats {
        nodes: world.primal().node_count(),
        edges: world.primal().edge_count(),
        dual_nodes: world.dual().node_count(),
        dual_edges: world.dual().edge_count(),
        total_length: world.primal().edges().iter().map(|e| e.length).sum(),
        gateways: world.gateway_count(),
        barriers,
        buildings: world.buildings().len(),
        landmarks: world.buildings().iter().filter(|b| b.is_landmark()).count(),
        regions: world
            .regions()
            .map(|r| RegionStats {
                id: r.id,
                nodes: r.primal.graph().node_count(),
                edges: r.primal.graph().edge_count(),
                gateways: r.gateways.len(),
                buildings: r.buildings.len(),
                complexity: r.complexity,
            })
            .collect(),
    }
}

pub fn run(args: &InspectArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let world = ctx.load_world(cli)?;
    let stats = collect(&world);

    match cli.output_format(&ctx.config) {
        OutputFormat::Json => println!("{}", to_json(&stats)?),
        OutputFormat::Table => {
            println!("Nodes: {}", stats.nodes);
            println!("Edges: {}", stats.edges);
            println!("Dual graph: {} nodes, {} edges", stats.dual_nodes, stats.dual_edges);
            println!("Street length: {:.1} m", stats.total_length);
            println!("Regions: {} ({} gateways)", stats.regions.len(), stats.gateways);
            if stats.barriers.is_empty() {
                println!("Barriers: none");
            } else {
                let kinds: Vec<String> = stats.barriers.iter().map(|(k, n)| format!("{} {}", n, k)).collect();
                println!("Barriers: {}", kinds.join(", "));
            }
            println!("Buildings: {} ({} landmarks)", stats.buildings, stats.landmarks);

            if args.regions && !stats.regions.is_empty() {
                println!();
                println!(
                    "  {:>6}  {:>6}  {:>6}  {:>8}  {:>9}  {:>10}",
                    "region", "nodes", "edges", "gateways", "buildings", "complexity"
                );
                for r in &stats.regions {
                    println!(
                        "  {:>6}  {:>6}  {:>6}  {:>8}  {:>9}  {:>10.2}",
                        r.id.to_string(),
                        r.nodes,
                        r.edges,
                        r.gateways,
                        r.buildings,
                        r.complexity
                    );
                }
            }
        }
    }
    Ok(())
}
