//! Flow aggregation.
//!
//! Collapses a [`TradeTable`] for one year into unique directed
//! `(exporter, importer)` edges and per-country totals.
//!
//! ## Invariants
//!
//! - Exactly one edge per ordered pair; its value is the sum of all records
//! - `exports_total` equals the sum of the country's outgoing edge values
//! - `imports_total` equals the sum of the country's incoming edge values
//! - A country seen on only one side carries `0.0` on the other, never absence

use crate::types::{CountryCode, Outcome, TradeTable};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Which year of the table to aggregate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum YearSelector {
    /// Most recent year present in the table
    #[default]
    Latest,
    /// Exactly this year; empty outcome if absent
    Exact(i32),
    /// This year when present, otherwise the latest
    PreferOrLatest(i32),
}

impl YearSelector {
    /// Resolve against the years present in `table`.
    pub fn resolve(&self, table: &TradeTable) -> Option<i32> {
        match *self {
            YearSelector::Latest => table.latest_year(),
            YearSelector::Exact(year) => table.has_year(year).then_some(year),
            YearSelector::PreferOrLatest(year) => {
                if table.has_year(year) {
                    Some(year)
                } else {
                    table.latest_year()
                }
            }
        }
    }
}

/// A directed, aggregated trade flow for a fixed year.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TradeEdge {
    /// Origin country
    pub exporter: CountryCode,
    /// Destination country
    pub importer: CountryCode,
    /// Summed trade value
    pub value: f64,
}

/// Export and import totals for one country.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CountryTotals {
    /// Country
    pub country: CountryCode,
    /// Sum of outgoing edge values
    pub exports_total: f64,
    /// Sum of incoming edge values
    pub imports_total: f64,
}

impl CountryTotals {
    fn zero(country: CountryCode) -> Self {
        Self {
            country,
            exports_total: 0.0,
            imports_total: 0.0,
        }
    }

    /// Exports plus imports.
    pub fn total_trade(&self) -> f64 {
        self.exports_total + self.imports_total
    }
}

/// Aggregated edges and totals for a single year.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlowSnapshot {
    year: i32,
    edges: Vec<TradeEdge>,
    totals: BTreeMap<CountryCode, CountryTotals>,
}

impl FlowSnapshot {
    /// Build a snapshot from `(exporter, importer, value)` triples.
    ///
    /// Duplicate pairs are summed. Edges come out sorted by exporter then
    /// importer.
    pub fn from_flows<I, E, M>(year: i32, flows: I) -> Self
    where
        I: IntoIterator<Item = (E, M, f64)>,
        E: Into<CountryCode>,
        M: Into<CountryCode>,
    {
        let mut pairs: BTreeMap<(CountryCode, CountryCode), f64> = BTreeMap::new();
        for (exporter, importer, value) in flows {
            *pairs.entry((exporter.into(), importer.into())).or_insert(0.0) += value;
        }

        let mut totals: BTreeMap<CountryCode, CountryTotals> = BTreeMap::new();
        let mut edges = Vec::with_capacity(pairs.len());
        for ((exporter, importer), value) in pairs {
            totals
                .entry(exporter.clone())
                .or_insert_with(|| CountryTotals::zero(exporter.clone()))
                .exports_total += value;
            totals
                .entry(importer.clone())
                .or_insert_with(|| CountryTotals::zero(importer.clone()))
                .imports_total += value;
            edges.push(TradeEdge {
                exporter,
                importer,
                value,
            });
        }

        Self {
            year,
            edges,
            totals,
        }
    }

    /// Aggregated year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// All edges, sorted by (exporter, importer).
    pub fn edges(&self) -> &[TradeEdge] {
        &self.edges
    }

    /// Totals for every country seen on either side, sorted by code.
    pub fn totals(&self) -> impl Iterator<Item = &CountryTotals> {
        self.totals.values()
    }

    /// Totals for one country.
    pub fn country_totals(&self, country: &CountryCode) -> Option<&CountryTotals> {
        self.totals.get(country)
    }

    /// Number of distinct countries.
    pub fn country_count(&self) -> usize {
        self.totals.len()
    }

    /// Value of the edge `exporter -> importer`, if any.
    pub fn edge_value(&self, exporter: &CountryCode, importer: &CountryCode) -> Option<f64> {
        self.edges
            .binary_search_by(|e| (&e.exporter, &e.importer).cmp(&(exporter, importer)))
            .ok()
            .map(|idx| self.edges[idx].value)
    }

    /// `(exporter, importer, value)` triples: subject is the exporter.
    pub fn export_flows(&self) -> impl Iterator<Item = (CountryCode, CountryCode, f64)> + '_ {
        self.edges
            .iter()
            .map(|e| (e.exporter.clone(), e.importer.clone(), e.value))
    }

    /// `(importer, exporter, value)` triples: subject is the importer.
    pub fn import_flows(&self) -> impl Iterator<Item = (CountryCode, CountryCode, f64)> + '_ {
        self.edges
            .iter()
            .map(|e| (e.importer.clone(), e.exporter.clone(), e.value))
    }
}

/// Aggregates trade tables into [`FlowSnapshot`]s.
pub struct FlowAggregator;

impl FlowAggregator {
    /// Aggregate the year chosen by `selector`.
    ///
    /// Returns [`Outcome::Empty`] when the table is empty or the selected
    /// year has no records.
    pub fn aggregate(table: &TradeTable, selector: YearSelector) -> Outcome<FlowSnapshot> {
        if table.is_empty() {
            return Outcome::empty("aggregate", "trade table has no records");
        }

        let year = match selector.resolve(table) {
            Some(year) => year,
            None => {
                return Outcome::empty(
                    "aggregate",
                    format!("no records for requested year ({:?})", selector),
                )
            }
        };

        if let YearSelector::PreferOrLatest(preferred) = selector {
            if preferred != year {
                info!(preferred, fallback = year, "Preferred year absent, using latest");
            }
        }

        let snapshot = FlowSnapshot::from_flows(
            year,
            table
                .iter()
                .filter(|r| r.year == year)
                .map(|r| (r.exporter.clone(), r.importer.clone(), r.value)),
        );

        debug!(
            year,
            edges = snapshot.edges.len(),
            countries = snapshot.totals.len(),
            "Aggregated trade flows"
        );

        Outcome::Ready(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TradeRecord;
    use approx::assert_relative_eq;

    fn code(s: &str) -> CountryCode {
        CountryCode::new(s)
    }

    fn abc_table() -> TradeTable {
        // Records are (importer, exporter, year, value)
        TradeTable::new(vec![
            TradeRecord::new("B", "A", 2023, 60.0),
            TradeRecord::new("B", "A", 2023, 40.0),
            TradeRecord::new("C", "A", 2023, 50.0),
            TradeRecord::new("C", "B", 2023, 30.0),
            TradeRecord::new("A", "C", 2021, 999.0),
        ])
    }

    #[test]
    fn test_duplicate_records_are_summed() {
        let snapshot = FlowAggregator::aggregate(&abc_table(), YearSelector::Latest)
            .ready()
            .unwrap();
        assert_eq!(snapshot.year(), 2023);
        assert_eq!(snapshot.edges().len(), 3);
        assert_relative_eq!(snapshot.edge_value(&code("A"), &code("B")).unwrap(), 100.0);
    }

    #[test]
    fn test_totals_match_scenario() {
        let snapshot = FlowAggregator::aggregate(&abc_table(), YearSelector::Latest)
            .ready()
            .unwrap();
        let a = snapshot.country_totals(&code("A")).unwrap();
        assert_relative_eq!(a.exports_total, 150.0);
        assert_relative_eq!(a.imports_total, 0.0);

        let c = snapshot.country_totals(&code("C")).unwrap();
        assert_relative_eq!(c.exports_total, 0.0);
        assert_relative_eq!(c.imports_total, 80.0);
        assert_relative_eq!(c.total_trade(), 80.0);
    }

    #[test]
    fn test_other_years_excluded() {
        let snapshot = FlowAggregator::aggregate(&abc_table(), YearSelector::Latest)
            .ready()
            .unwrap();
        assert!(snapshot.edge_value(&code("C"), &code("A")).is_none());
    }

    #[test]
    fn test_exact_year() {
        let snapshot = FlowAggregator::aggregate(&abc_table(), YearSelector::Exact(2021))
            .ready()
            .unwrap();
        assert_eq!(snapshot.edges().len(), 1);
        assert_relative_eq!(snapshot.edge_value(&code("C"), &code("A")).unwrap(), 999.0);
    }

    #[test]
    fn test_exact_missing_year_is_empty() {
        let outcome = FlowAggregator::aggregate(&abc_table(), YearSelector::Exact(2028));
        assert!(outcome.is_empty());
        assert_eq!(outcome.warning().unwrap().stage, "aggregate");
    }

    #[test]
    fn test_prefer_or_latest_falls_back() {
        let table = abc_table();
        assert_eq!(YearSelector::PreferOrLatest(2028).resolve(&table), Some(2023));
        assert_eq!(YearSelector::PreferOrLatest(2021).resolve(&table), Some(2021));
    }

    #[test]
    fn test_empty_table_is_empty_outcome() {
        let outcome = FlowAggregator::aggregate(&TradeTable::default(), YearSelector::Latest);
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_edges_sorted_and_unique() {
        let snapshot = FlowSnapshot::from_flows(
            2020,
            vec![("Z", "A", 1.0), ("A", "Z", 2.0), ("A", "B", 3.0), ("A", "Z", 4.0)],
        );
        let pairs: Vec<_> = snapshot
            .edges()
            .iter()
            .map(|e| (e.exporter.as_str().to_string(), e.importer.as_str().to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("A".to_string(), "B".to_string()),
                ("A".to_string(), "Z".to_string()),
                ("Z".to_string(), "A".to_string()),
            ]
        );
        assert_relative_eq!(snapshot.edge_value(&code("A"), &code("Z")).unwrap(), 6.0);
    }

    #[test]
    fn test_import_and_export_flows_orientation() {
        let snapshot = FlowSnapshot::from_flows(2020, vec![("A", "B", 5.0)]);
        let exports: Vec<_> = snapshot.export_flows().collect();
        let imports: Vec<_> = snapshot.import_flows().collect();
        assert_eq!(exports, vec![(code("A"), code("B"), 5.0)]);
        assert_eq!(imports, vec![(code("B"), code("A"), 5.0)]);
    }
}
