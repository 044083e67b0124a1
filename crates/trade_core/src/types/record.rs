//! Canonical trade records and in-memory trade tables.

use super::country::CountryCode;
use std::collections::BTreeSet;

/// Flow direction as declared by the reporting country.
///
/// Datasets without a flow column are treated as import reports, which is
/// the orientation of the canonical `{Importer, Exporter}` schema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FlowDirection {
    /// Reporter imported goods from the partner, re-imports included
    #[default]
    Import,
    /// Reporter exported goods to the partner, re-exports included
    Export,
    /// Declared flows with no direction, read in import orientation
    Other,
}

impl FlowDirection {
    /// Parse a flow label such as `"Import"`, `"Re-export"`, `"M"` or `"RX"`.
    ///
    /// A `re` prefix keeps the direction of the flow it qualifies. Anything
    /// unrecognised maps to [`FlowDirection::Other`].
    pub fn parse(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "m" | "rm" | "fm" => return Self::Import,
            "x" | "rx" | "dx" => return Self::Export,
            _ => {}
        }
        let base = label
            .strip_prefix("re")
            .map(|rest| rest.trim_start_matches(['-', ' ']))
            .unwrap_or(label.as_str());
        if base.starts_with("import") {
            Self::Import
        } else if base.starts_with("export") {
            Self::Export
        } else {
            Self::Other
        }
    }

    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Import => "Import",
            Self::Export => "Export",
            Self::Other => "Other",
        }
    }
}

/// A single raw trade observation before aggregation.
///
/// Several records may share the same `(importer, exporter, year)`; they are
/// summed during aggregation, never overwritten.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TradeRecord {
    /// Destination country of the flow
    pub importer: CountryCode,
    /// Origin country of the flow
    pub exporter: CountryCode,
    /// Reference year
    pub year: i32,
    /// Trade value (non-negative, consistent currency unit)
    pub value: f64,
    /// Commodity description, when the source carries one
    pub commodity: Option<String>,
    /// Reporter-declared flow direction
    pub flow: FlowDirection,
}

impl TradeRecord {
    /// Create a record with no commodity and an import flow.
    pub fn new(
        importer: impl Into<CountryCode>,
        exporter: impl Into<CountryCode>,
        year: i32,
        value: f64,
    ) -> Self {
        Self {
            importer: importer.into(),
            exporter: exporter.into(),
            year,
            value,
            commodity: None,
            flow: FlowDirection::Import,
        }
    }

    /// Attach a commodity description.
    pub fn with_commodity(mut self, commodity: impl Into<String>) -> Self {
        self.commodity = Some(commodity.into());
        self
    }

    /// Set the declared flow direction.
    pub fn with_flow(mut self, flow: FlowDirection) -> Self {
        self.flow = flow;
        self
    }

    /// Case-insensitive check whether the commodity mentions any keyword.
    ///
    /// Records without a commodity never match.
    pub fn commodity_matches(&self, keywords: &[&str]) -> bool {
        match &self.commodity {
            Some(commodity) => {
                let commodity = commodity.to_lowercase();
                keywords
                    .iter()
                    .any(|k| commodity.contains(&k.to_lowercase()))
            }
            None => false,
        }
    }
}

/// An in-memory table of canonical trade records.
///
/// Filters return new tables; the source table is never mutated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TradeTable {
    records: Vec<TradeRecord>,
}

impl TradeTable {
    /// Create a table from records.
    pub fn new(records: Vec<TradeRecord>) -> Self {
        Self { records }
    }

    /// All records in input order.
    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    /// Iterate over records.
    pub fn iter(&self) -> std::slice::Iter<'_, TradeRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> BTreeSet<i32> {
        self.records.iter().map(|r| r.year).collect()
    }

    /// Most recent year present.
    pub fn latest_year(&self) -> Option<i32> {
        self.records.iter().map(|r| r.year).max()
    }

    /// Check if any record falls in `year`.
    pub fn has_year(&self, year: i32) -> bool {
        self.records.iter().any(|r| r.year == year)
    }

    /// Records for a single year.
    pub fn filter_year(&self, year: i32) -> TradeTable {
        self.filter(|r| r.year == year)
    }

    /// Records whose declared flow equals `flow`.
    pub fn filter_flow(&self, flow: FlowDirection) -> TradeTable {
        self.filter(|r| r.flow == flow)
    }

    /// Records whose commodity mentions any of `keywords`.
    pub fn filter_commodity(&self, keywords: &[&str]) -> TradeTable {
        self.filter(|r| r.commodity_matches(keywords))
    }

    /// Records satisfying an arbitrary predicate.
    pub fn filter<F>(&self, predicate: F) -> TradeTable
    where
        F: Fn(&TradeRecord) -> bool,
    {
        TradeTable::new(self.records.iter().filter(|r| predicate(r)).cloned().collect())
    }
}

impl FromIterator<TradeRecord> for TradeTable {
    fn from_iter<I: IntoIterator<Item = TradeRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TradeTable {
    type Item = &'a TradeRecord;
    type IntoIter = std::slice::Iter<'a, TradeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> TradeTable {
        TradeTable::new(vec![
            TradeRecord::new("USA", "CHN", 2022, 10.0).with_commodity("Wheat and meslin"),
            TradeRecord::new("USA", "MEX", 2023, 20.0).with_commodity("Textile yarn"),
            TradeRecord::new("CHN", "USA", 2023, 5.0)
                .with_commodity("Soya beans")
                .with_flow(FlowDirection::Export),
        ])
    }

    #[test]
    fn test_flow_direction_parse() {
        assert_eq!(FlowDirection::parse("Import"), FlowDirection::Import);
        assert_eq!(FlowDirection::parse(" EXPORT "), FlowDirection::Export);
        assert_eq!(FlowDirection::parse("M"), FlowDirection::Import);
        assert_eq!(FlowDirection::parse("x"), FlowDirection::Export);
        assert_eq!(FlowDirection::parse("Re-Export"), FlowDirection::Export);
        assert_eq!(FlowDirection::parse("Re-import"), FlowDirection::Import);
        assert_eq!(FlowDirection::parse("reexport"), FlowDirection::Export);
        assert_eq!(FlowDirection::parse("RX"), FlowDirection::Export);
        assert_eq!(FlowDirection::parse("RM"), FlowDirection::Import);
        assert_eq!(FlowDirection::parse("Export of goods for outward processing"), FlowDirection::Export);
        assert_eq!(FlowDirection::parse("Transit"), FlowDirection::Other);
        assert_eq!(FlowDirection::parse("Return"), FlowDirection::Other);
    }

    #[test]
    fn test_years_and_latest() {
        let table = sample_table();
        assert_eq!(table.years().into_iter().collect::<Vec<_>>(), vec![2022, 2023]);
        assert_eq!(table.latest_year(), Some(2023));
        assert!(table.has_year(2022));
        assert!(!table.has_year(2028));
    }

    #[test]
    fn test_latest_year_empty_table() {
        assert_eq!(TradeTable::default().latest_year(), None);
    }

    #[test]
    fn test_filter_year() {
        let filtered = sample_table().filter_year(2023);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.year == 2023));
    }

    #[test]
    fn test_filter_commodity_is_case_insensitive() {
        let filtered = sample_table().filter_commodity(&["WHEAT", "soy"]);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_commodity_skips_missing_commodity() {
        let table = TradeTable::new(vec![TradeRecord::new("USA", "CHN", 2022, 1.0)]);
        assert!(table.filter_commodity(&["wheat"]).is_empty());
    }

    #[test]
    fn test_filter_flow() {
        let table = sample_table();
        assert_eq!(table.filter_flow(FlowDirection::Import).len(), 2);
        assert_eq!(table.filter_flow(FlowDirection::Export).len(), 1);
    }
}
