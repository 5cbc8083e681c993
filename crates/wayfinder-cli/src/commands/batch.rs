//! Batch command: plan many trips and count edge traffic

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use wayfinder_core::{EdgeId, TrafficCounters};
use wayfinder_routing::RoutePlanner;

use super::io;
use crate::output::{format_length, to_json, OutputFormat};
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct BatchArgs {
    /// Trips file: a JSON array of {agent, origin, destination, trip_index}
    #[arg(short, long)]
    pub trips: PathBuf,

    /// Number of busiest edges to report
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Add this batch's traffic counters to this file, creating it if needed
    #[arg(long)]
    pub counters: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
struct BatchReport {
    trips: usize,
    complete: usize,
    incomplete: usize,
    failed: usize,
    total_length: f64,
    busiest: Vec<EdgeTraffic>,
}

#[derive(Debug, Serialize)]
struct EdgeTraffic {
    edge: EdgeId,
    count: u64,
}

pub fn run(args: &BatchArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let world = ctx.load_world(cli)?;
    let trips = io::load_trips(&args.trips)?;
    let planner = RoutePlanner::new(&world, &ctx.config.planner);

    let mut counters = TrafficCounters::new();
    let mut report = BatchReport {
        trips: trips.len(),
        ..Default::default()
    };

    for (i, entry) in trips.iter().enumerate() {
        let route = match planner.plan_trip(&entry.agent, &entry.trip) {
            Ok(route) => route,
            Err(e) => {
                tracing::warn!("Trip {} ({} -> {}) failed: {}", i, entry.trip.origin, entry.trip.destination, e);
                report.failed += 1;
                continue;
            }
        };
        if route.reaches_destination() {
            report.complete += 1;
        } else {
            report.incomplete += 1;
        }
        report.total_length += route.length(&world);
        // traffic is only counted once a route is final
        counters.record(&route.strategy.label(), &route.edges);
    }

    report.busiest = counters
        .busiest(args.top)
        .into_iter()
        .map(|(edge, count)| EdgeTraffic { edge, count })
        .collect();
    tracing::info!(
        "Planned {} trips: {} complete, {} incomplete, {} failed",
        report.trips,
        report.complete,
        report.incomplete,
        report.failed
    );

    if let Some(path) = &args.counters {
        let total = io::accumulate_counters(path, &counters)?;
        tracing::info!("Counters in {:?} now cover {}", path, total.labels().join(", "));
    }

    match cli.output_format(&ctx.config) {
        OutputFormat::Json => println!("{}", to_json(&report)?),
        OutputFormat::Table => {
            println!(
                "Trips: {} ({} complete, {} incomplete, {} failed)",
                report.trips, report.complete, report.incomplete, report.failed
            );
            println!("Total walked: {}", format_length(report.total_length));
            if !report.busiest.is_empty() {
                println!("Busiest edges:");
                for traffic in &report.busiest {
                    let labels: Vec<String> = counters
                        .labels()
                        .into_iter()
                        .filter_map(|label| {
                            let count = counters.count(traffic.edge, &label);
                            (count > 0).then(|| format!("{}={}", label, count))
                        })
                        .collect();
                    println!("  {:>6}  {:>6}  {}", traffic.edge.to_string(), traffic.count, labels.join(" "));
                }
            }
        }
    }
    Ok(())
}
