//! Per-edge traffic counters, keyed by route strategy label

use crate::graph::DirectedEdge;
use crate::ids::EdgeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of times each primal edge was walked, split by strategy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficCounters {
    counts: BTreeMap<EdgeId, BTreeMap<String, u64>>,
}

impl TrafficCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one traversal of every edge in `route` under `label`
    pub fn record(&mut self, label: &str, route: &[DirectedEdge]) {
        for step in route {
            *self
                .counts
                .entry(step.edge)
                .or_default()
                .entry(label.to_string())
                .or_insert(0) += 1;
        }
    }

    /// Traversals of `edge` under `label`
    pub fn count(&self, edge: EdgeId, label: &str) -> u64 {
        self.counts
            .get(&edge)
            .and_then(|by_label| by_label.get(label))
            .copied()
            .unwrap_or(0)
    }

    /// Traversals of `edge` under every label
    pub fn total(&self, edge: EdgeId) -> u64 {
        self.counts
            .get(&edge)
            .map(|by_label| by_label.values().sum())
            .unwrap_or(0)
    }

    /// The `n` most walked edges, ties broken by edge id
    pub fn busiest(&self, n: usize) -> Vec<(EdgeId, u64)> {
        let mut totals: Vec<(EdgeId, u64)> = self.counts.keys().map(|&e| (e, self.total(e))).collect();
        totals.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        totals.truncate(n);
        totals
    }

    /// Labels seen so far
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .counts
            .values()
            .flat_map(|by_label| by_label.keys().cloned())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }

    /// Fold another set of counters into this one
    pub fn merge(&mut self, other: &TrafficCounters) {
        for (&edge, by_label) in &other.counts {
            let mine = self.counts.entry(edge).or_default();
            for (label, count) in by_label {
                *mine.entry(label.clone()).or_insert(0) += count;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
