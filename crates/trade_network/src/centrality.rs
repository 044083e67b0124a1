//! # Centrality Engine
//!
//! Weighted betweenness (Brandes with Dijkstra) and weighted total degree.
//!
//! ## Path Cost
//!
//! Shortest paths need a cost per edge. By default heavier trade is a
//! cheaper path (`1 / value`). [`EdgeCost::Value`] uses the raw value as the
//! distance instead.
//!
//! ## Normalisation
//!
//! Directed betweenness is scaled by `1 / ((n - 1)(n - 2))`, so every score
//! lies in [0, 1]. Graphs with two or fewer nodes score zero everywhere.

use crate::graph::TradeGraph;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use trade_core::types::CountryCode;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Relative tolerance for treating two path lengths as equal.
const PATH_EQ_TOLERANCE: f64 = 1e-12;

// =============================================================================
// Configuration
// =============================================================================

/// How a trade value maps to a shortest-path cost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EdgeCost {
    /// `1 / value`: strong trade links are short
    #[default]
    InverseValue,
    /// `value`: the raw weight is the distance
    Value,
}

impl EdgeCost {
    /// Path cost of an edge with trade value `weight`.
    #[inline]
    pub fn cost(&self, weight: f64) -> f64 {
        match self {
            EdgeCost::InverseValue => 1.0 / weight,
            EdgeCost::Value => weight,
        }
    }
}

/// Centrality engine settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CentralityConfig {
    /// Edge cost convention
    pub edge_cost: EdgeCost,
    /// Scale betweenness into [0, 1]
    pub normalized: bool,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            edge_cost: EdgeCost::default(),
            normalized: true,
        }
    }
}

// =============================================================================
// Results
// =============================================================================

/// Centrality scores for one country.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CentralityResult {
    /// Country
    pub country: CountryCode,
    /// Betweenness centrality
    pub betweenness: f64,
    /// Sum of incoming and outgoing edge values
    pub weighted_degree: f64,
}

/// Centrality for every node, ranked by betweenness descending then code.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CentralityTable {
    rows: Vec<CentralityResult>,
}

impl CentralityTable {
    fn from_rows(mut rows: Vec<CentralityResult>) -> Self {
        rows.sort_by(|a, b| {
            b.betweenness
                .total_cmp(&a.betweenness)
                .then_with(|| a.country.cmp(&b.country))
        });
        Self { rows }
    }

    /// Ranked rows.
    pub fn rows(&self) -> &[CentralityResult] {
        &self.rows
    }

    /// Iterate over ranked rows.
    pub fn iter(&self) -> std::slice::Iter<'_, CentralityResult> {
        self.rows.iter()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Scores for one country.
    pub fn get(&self, country: &CountryCode) -> Option<&CentralityResult> {
        self.rows.iter().find(|r| &r.country == country)
    }

    /// Highest-betweenness node, ties broken by code.
    pub fn most_central(&self) -> Option<&CentralityResult> {
        self.rows.first()
    }

    /// The `k` highest-betweenness nodes.
    pub fn top(&self, k: usize) -> &[CentralityResult] {
        &self.rows[..k.min(self.rows.len())]
    }
}

// =============================================================================
// Engine
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
struct QueueEntry {
    dist: f64,
    node: usize,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    // Reversed for a min-heap; ties pop the smaller index first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[inline]
fn same_length(a: f64, b: f64) -> bool {
    (a - b).abs() <= PATH_EQ_TOLERANCE * a.abs().max(b.abs())
}

/// Computes [`CentralityTable`]s for trade graphs.
///
/// # Example
///
/// ```rust
/// use trade_core::types::CountryCode;
/// use trade_network::{CentralityEngine, TradeGraph};
///
/// // A -> B -> C: every A..C path runs through B.
/// let graph = TradeGraph::from_edges(
///     Vec::new(),
///     vec![
///         (CountryCode::new("A"), CountryCode::new("B"), 1.0),
///         (CountryCode::new("B"), CountryCode::new("C"), 1.0),
///     ],
/// );
/// let table = CentralityEngine::default().compute(&graph);
/// assert_eq!(table.most_central().unwrap().country.as_str(), "B");
/// assert_eq!(table.get(&CountryCode::new("B")).unwrap().betweenness, 0.5);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CentralityEngine {
    config: CentralityConfig,
}

impl CentralityEngine {
    /// Create an engine with explicit settings.
    pub fn new(config: CentralityConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &CentralityConfig {
        &self.config
    }

    /// Betweenness and weighted degree for every node.
    pub fn compute(&self, graph: &TradeGraph) -> CentralityTable {
        let betweenness = self.betweenness(graph);
        let rows = graph
            .nodes()
            .enumerate()
            .map(|(idx, country)| CentralityResult {
                country: country.clone(),
                betweenness: betweenness[idx],
                weighted_degree: graph.weighted_degree_at(idx),
            })
            .collect();
        let table = CentralityTable::from_rows(rows);
        if let Some(top) = table.most_central() {
            debug!(
                nodes = table.len(),
                most_central = %top.country,
                betweenness = top.betweenness,
                "Computed centrality"
            );
        }
        table
    }

    /// Betweenness per node index.
    pub fn betweenness(&self, graph: &TradeGraph) -> Vec<f64> {
        let n = graph.node_count();
        let mut scores = vec![0.0; n];
        if n == 0 {
            return scores;
        }

        // Contributions are summed in source order so parallel and serial
        // runs give identical results.
        for contribution in self.source_contributions(graph) {
            for (score, delta) in scores.iter_mut().zip(contribution) {
                *score += delta;
            }
        }

        if self.config.normalized {
            let scale = if n > 2 {
                1.0 / ((n - 1) * (n - 2)) as f64
            } else {
                0.0
            };
            for score in &mut scores {
                *score *= scale;
            }
        }
        scores
    }

    #[cfg(not(feature = "parallel"))]
    fn source_contributions(&self, graph: &TradeGraph) -> Vec<Vec<f64>> {
        (0..graph.node_count())
            .map(|s| single_source_dependency(graph, s, self.config.edge_cost))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn source_contributions(&self, graph: &TradeGraph) -> Vec<Vec<f64>> {
        let cost = self.config.edge_cost;
        (0..graph.node_count())
            .into_par_iter()
            .map(|s| single_source_dependency(graph, s, cost))
            .collect()
    }
}

/// Dependency of `source` on every other node (Brandes accumulation).
fn single_source_dependency(graph: &TradeGraph, source: usize, cost: EdgeCost) -> Vec<f64> {
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut sigma = vec![0.0f64; n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut settled = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut heap = BinaryHeap::new();

    dist[source] = 0.0;
    sigma[source] = 1.0;
    heap.push(QueueEntry {
        dist: 0.0,
        node: source,
    });

    while let Some(QueueEntry { dist: d, node: v }) = heap.pop() {
        if settled[v] {
            continue;
        }
        settled[v] = true;
        order.push(v);

        for (w, weight) in graph.successors(v) {
            if settled[w] {
                continue;
            }
            let alt = d + cost.cost(weight);
            if dist[w].is_infinite() || (alt < dist[w] && !same_length(alt, dist[w])) {
                dist[w] = alt;
                sigma[w] = sigma[v];
                preds[w].clear();
                preds[w].push(v);
                heap.push(QueueEntry { dist: alt, node: w });
            } else if same_length(alt, dist[w]) {
                sigma[w] += sigma[v];
                preds[w].push(v);
            }
        }
    }

    let mut delta = vec![0.0f64; n];
    while let Some(w) = order.pop() {
        for &v in &preds[w] {
            delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
        }
    }
    delta[source] = 0.0;
    delta
}
