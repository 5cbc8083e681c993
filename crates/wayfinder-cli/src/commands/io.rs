//! Reading world snapshots, agent profiles and trip lists

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use wayfinder_core::{AgentProperties, TrafficCounters, World};
use wayfinder_routing::TripRequest;

/// Load a JSON world snapshot
pub fn load_world(path: &Path) -> anyhow::Result<World> {
    tracing::info!("Loading world from {:?}", path);
    let content = std::fs::read_to_string(path).with_context(|| format!("reading world {}", path.display()))?;
    let world = World::from_json(&content).with_context(|| format!("loading world {}", path.display()))?;
    tracing::debug!(
        "World has {} nodes, {} edges, {} regions",
        world.primal().node_count(),
        world.primal().edge_count(),
        world.regions().count()
    );
    Ok(world)
}

/// Load an agent profile, JSON when the extension says so and TOML otherwise
pub fn load_profile(path: &Path) -> anyhow::Result<AgentProperties> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading profile {}", path.display()))?;
    let profile = if has_json_extension(path) {
        serde_json::from_str(&content).with_context(|| format!("parsing profile {}", path.display()))?
    } else {
        toml::from_str(&content).with_context(|| format!("parsing profile {}", path.display()))?
    };
    Ok(profile)
}

/// One entry of a batch file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchTrip {
    #[serde(default)]
    pub agent: AgentProperties,
    #[serde(flatten)]
    pub trip: TripRequest,
}

/// Load a JSON array of trips
pub fn load_trips(path: &Path) -> anyhow::Result<Vec<BatchTrip>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading trips {}", path.display()))?;
    let trips: Vec<BatchTrip> =
        serde_json::from_str(&content).with_context(|| format!("parsing trips {}", path.display()))?;
    tracing::debug!("Read {} trips from {:?}", trips.len(), path);
    Ok(trips)
}

/// Add `counters` to the counts already saved at `path` and save the sum
///
/// A missing file starts from zero, so repeated batches accumulate.
pub fn accumulate_counters(path: &Path, counters: &TrafficCounters) -> anyhow::Result<TrafficCounters> {
    let mut total = if path.exists() {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading counters {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing counters {}", path.display()))?
    } else {
        TrafficCounters::new()
    };
    total.merge(counters);

    let content = serde_json::to_string_pretty(&total)?;
    std::fs::write(path, content).with_context(|| format!("writing counters {}", path.display()))?;
    tracing::info!("Wrote traffic counters to {:?}", path);
    Ok(total)
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
