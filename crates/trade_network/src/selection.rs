//! Node selection by total trade.

use crate::error::GraphStateError;
use std::collections::BTreeMap;
use trade_core::flows::FlowSnapshot;
use trade_core::types::CountryCode;
use tracing::debug;

/// Default number of countries kept in the network.
pub const DEFAULT_TOP_N: usize = 25;

/// Countries chosen for a trade graph, ranked by total trade.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NodeSelection {
    ranked: Vec<CountryCode>,
    total_trade: BTreeMap<CountryCode, f64>,
}

impl NodeSelection {
    /// Keep the `n` countries with the largest exports plus imports.
    ///
    /// Ties are broken by country code ascending. Fewer than `n` countries in
    /// the snapshot keeps them all.
    pub fn top_n_by_total_trade(snapshot: &FlowSnapshot, n: usize) -> Result<Self, GraphStateError> {
        if n == 0 {
            return Err(GraphStateError::InvalidTopN(n));
        }

        let mut ranked = ranked_totals(snapshot);
        ranked.truncate(n);

        debug!(
            requested = n,
            selected = ranked.len(),
            available = snapshot.country_count(),
            "Selected network nodes"
        );

        Ok(Self {
            ranked: ranked.iter().map(|(c, _)| c.clone()).collect(),
            total_trade: ranked.into_iter().collect(),
        })
    }

    /// Keep every country in the snapshot.
    pub fn all(snapshot: &FlowSnapshot) -> Self {
        let ranked = ranked_totals(snapshot);
        Self {
            ranked: ranked.iter().map(|(c, _)| c.clone()).collect(),
            total_trade: ranked.into_iter().collect(),
        }
    }

    /// Selected countries, largest total trade first.
    pub fn ranked(&self) -> &[CountryCode] {
        &self.ranked
    }

    /// Check whether `country` was selected.
    pub fn contains(&self, country: &CountryCode) -> bool {
        self.total_trade.contains_key(country)
    }

    /// Total trade of a selected country.
    pub fn total_trade(&self, country: &CountryCode) -> Option<f64> {
        self.total_trade.get(country).copied()
    }

    /// Number of selected countries.
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// Check if nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

fn ranked_totals(snapshot: &FlowSnapshot) -> Vec<(CountryCode, f64)> {
    let mut ranked: Vec<(CountryCode, f64)> = snapshot
        .totals()
        .map(|t| (t.country.clone(), t.total_trade()))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
