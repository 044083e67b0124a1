//! # Fragility Analysis
//!
//! Removes central countries from a trade graph and measures what breaks:
//! centrality shifts, lost reachable pairs and countries cut off from the
//! main component.

use crate::centrality::{CentralityEngine, CentralityTable};
use crate::error::GraphStateError;
use crate::graph::TradeGraph;
use std::collections::BTreeSet;
use trade_core::types::CountryCode;
use tracing::info;

/// Change in one country's centrality after a removal.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CentralityDelta {
    /// Country
    pub country: CountryCode,
    /// Betweenness before removal
    pub betweenness_before: f64,
    /// Betweenness after removal
    pub betweenness_after: f64,
    /// Weighted degree before removal
    pub degree_before: f64,
    /// Weighted degree after removal
    pub degree_after: f64,
}

impl CentralityDelta {
    /// `after - before` betweenness.
    pub fn betweenness_change(&self) -> f64 {
        self.betweenness_after - self.betweenness_before
    }

    /// `after - before` weighted degree.
    pub fn degree_change(&self) -> f64 {
        self.degree_after - self.degree_before
    }
}

/// Effect of removing one node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RemovalImpact {
    /// Removed country
    pub removed: CountryCode,
    /// Its betweenness just before removal
    pub removed_betweenness: f64,
    /// Centrality before removal
    pub before: CentralityTable,
    /// Centrality after removal
    pub after: CentralityTable,
    /// Surviving countries, largest betweenness gain first
    pub deltas: Vec<CentralityDelta>,
    /// Reachable ordered pairs before removal
    pub reachable_pairs_before: usize,
    /// Reachable ordered pairs after removal
    pub reachable_pairs_after: usize,
    /// Countries that left the largest linked weak component, sorted by code
    pub newly_disconnected: Vec<CountryCode>,
}

impl RemovalImpact {
    /// Reachable pairs lost.
    pub fn pairs_lost(&self) -> usize {
        self.reachable_pairs_before
            .saturating_sub(self.reachable_pairs_after)
    }
}

/// Sequential removal of the most central countries.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProgressiveFragility {
    /// One entry per removal, in removal order
    pub steps: Vec<RemovalImpact>,
}

impl ProgressiveFragility {
    /// Countries removed, in order.
    pub fn removed(&self) -> Vec<&CountryCode> {
        self.steps.iter().map(|s| &s.removed).collect()
    }

    /// Reachable pairs before the first removal.
    pub fn initial_reachable_pairs(&self) -> Option<usize> {
        self.steps.first().map(|s| s.reachable_pairs_before)
    }

    /// Reachable pairs after the last removal.
    pub fn final_reachable_pairs(&self) -> Option<usize> {
        self.steps.last().map(|s| s.reachable_pairs_after)
    }
}

/// Runs node-removal experiments with a fixed centrality engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct FragilityAnalyzer {
    engine: CentralityEngine,
}

impl FragilityAnalyzer {
    /// Create an analyzer around `engine`.
    pub fn new(engine: CentralityEngine) -> Self {
        Self { engine }
    }

    /// Remove the highest-betweenness country (ties by code).
    pub fn remove_most_central(&self, graph: &TradeGraph) -> Result<RemovalImpact, GraphStateError> {
        let before = self.engine.compute(graph);
        let target = before
            .most_central()
            .map(|r| r.country.clone())
            .ok_or(GraphStateError::EmptyGraph)?;
        self.impact(graph, before, &target).map(|(impact, _)| impact)
    }

    /// Remove a named country.
    pub fn remove_country(
        &self,
        graph: &TradeGraph,
        country: &CountryCode,
    ) -> Result<RemovalImpact, GraphStateError> {
        if graph.is_empty() {
            return Err(GraphStateError::EmptyGraph);
        }
        if !graph.contains(country) {
            return Err(GraphStateError::NodeNotFound(country.clone()));
        }
        let before = self.engine.compute(graph);
        self.impact(graph, before, country).map(|(impact, _)| impact)
    }

    /// Remove the `k` most central countries one at a time, recomputing
    /// centrality after each removal.
    pub fn progressive(
        &self,
        graph: &TradeGraph,
        k: usize,
    ) -> Result<ProgressiveFragility, GraphStateError> {
        if graph.is_empty() {
            return Err(GraphStateError::EmptyGraph);
        }
        if k > graph.node_count() {
            return Err(GraphStateError::RemovalExceedsNodes {
                requested: k,
                available: graph.node_count(),
            });
        }

        let mut current = graph.clone();
        let mut before = self.engine.compute(&current);
        let mut steps = Vec::with_capacity(k);
        for _ in 0..k {
            let target = before
                .most_central()
                .map(|r| r.country.clone())
                .ok_or(GraphStateError::EmptyGraph)?;
            let (impact, next) = self.impact(&current, before, &target)?;
            before = impact.after.clone();
            current = next;
            steps.push(impact);
        }
        Ok(ProgressiveFragility { steps })
    }

    fn impact(
        &self,
        graph: &TradeGraph,
        before: CentralityTable,
        target: &CountryCode,
    ) -> Result<(RemovalImpact, TradeGraph), GraphStateError> {
        let reduced = graph.without_node(target)?;
        let after = self.engine.compute(&reduced);

        let removed_betweenness = before.get(target).map_or(0.0, |r| r.betweenness);
        let mut deltas: Vec<CentralityDelta> = after
            .iter()
            .filter_map(|row| {
                let prior = before.get(&row.country)?;
                Some(CentralityDelta {
                    country: row.country.clone(),
                    betweenness_before: prior.betweenness,
                    betweenness_after: row.betweenness,
                    degree_before: prior.weighted_degree,
                    degree_after: row.weighted_degree,
                })
            })
            .collect();
        deltas.sort_by(|a, b| {
            b.betweenness_change()
                .total_cmp(&a.betweenness_change())
                .then_with(|| a.country.cmp(&b.country))
        });

        let main_before = main_component(graph);
        let main_after = main_component(&reduced);
        let newly_disconnected: Vec<CountryCode> = main_before
            .into_iter()
            .filter(|c| c != target && !main_after.contains(c))
            .collect();

        let impact = RemovalImpact {
            removed: target.clone(),
            removed_betweenness,
            reachable_pairs_before: graph.reachable_pairs(),
            reachable_pairs_after: reduced.reachable_pairs(),
            before,
            after,
            deltas,
            newly_disconnected,
        };
        info!(
            removed = %impact.removed,
            betweenness = impact.removed_betweenness,
            pairs_before = impact.reachable_pairs_before,
            pairs_after = impact.reachable_pairs_after,
            disconnected = impact.newly_disconnected.len(),
            "Removed node"
        );
        Ok((impact, reduced))
    }
}

/// Largest weak component with at least one link; empty otherwise.
fn main_component(graph: &TradeGraph) -> BTreeSet<CountryCode> {
    let largest = graph.largest_component();
    if largest.len() < 2 {
        return BTreeSet::new();
    }
    largest.into_iter().collect()
}
