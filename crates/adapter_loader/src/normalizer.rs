//! Row normalisation into canonical trade records.

use crate::error::SchemaError;
use crate::schema::{ResolvedSchema, SchemaConfig};
use trade_core::types::{CountryCode, FlowDirection, TradeRecord, TradeTable};
use tracing::{debug, warn};

/// Row counts from one normalisation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    /// Data rows read
    pub total_rows: usize,
    /// Rows kept
    pub kept_rows: usize,
    /// Rows dropped for an empty importer or exporter
    pub missing_country: usize,
    /// Rows dropped for a missing or non-integral year
    pub invalid_year: usize,
    /// Rows dropped for a missing, non-numeric or negative value
    pub invalid_value: usize,
    /// Rows dropped because a canonical field was not valid UTF-8
    pub invalid_encoding: usize,
}

impl NormalizationReport {
    /// Total rows dropped.
    pub fn dropped_rows(&self) -> usize {
        self.missing_country + self.invalid_year + self.invalid_value + self.invalid_encoding
    }
}

/// Canonical table plus the diagnostics from building it.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedTable {
    /// Records that passed normalisation
    pub table: TradeTable,
    /// Dropped-row diagnostics
    pub report: NormalizationReport,
    /// Header columns chosen for each role
    pub columns: ResolvedSchema,
}

impl ResolvedSchema {
    /// Parse one data row.
    ///
    /// Returns `None` and bumps the matching counter in `report` when the row
    /// is unusable. The first failing field decides the reason.
    pub fn parse_row(&self, fields: &[&str], report: &mut NormalizationReport) -> Option<TradeRecord> {
        let cell = |idx: usize| fields.get(idx).copied().unwrap_or("");

        let reporter = CountryCode::new(cell(self.importer.index));
        let partner = CountryCode::new(cell(self.exporter.index));
        if reporter.is_empty() || partner.is_empty() {
            report.missing_country += 1;
            return None;
        }

        let Some(year) = parse_year(cell(self.year.index)) else {
            report.invalid_year += 1;
            return None;
        };

        let Some(value) = parse_value(cell(self.value.index)) else {
            report.invalid_value += 1;
            return None;
        };

        let flow = self
            .flow
            .as_ref()
            .map(|c| FlowDirection::parse(cell(c.index)))
            .unwrap_or_default();

        // Export and re-export reports name the reporter as origin.
        let (importer, exporter) = match flow {
            FlowDirection::Export => (partner, reporter),
            _ => (reporter, partner),
        };

        let mut record = TradeRecord::new(importer, exporter, year, value).with_flow(flow);
        if let Some(column) = &self.commodity {
            let commodity = cell(column.index).trim();
            if !commodity.is_empty() {
                record = record.with_commodity(commodity);
            }
        }
        Some(record)
    }
}

fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(year) = raw.parse::<i32>() {
        return Some(year);
    }
    let as_float = raw.parse::<f64>().ok()?;
    if as_float.is_finite()
        && as_float.fract() == 0.0
        && as_float >= i32::MIN as f64
        && as_float <= i32::MAX as f64
    {
        Some(as_float as i32)
    } else {
        None
    }
}

fn parse_value(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Maps raw tables onto the canonical `{Importer, Exporter, Year, Value}` schema.
#[derive(Clone, Debug, Default)]
pub struct TableNormalizer {
    schema: SchemaConfig,
}

impl TableNormalizer {
    /// Create a normaliser for a role configuration.
    pub fn new(schema: SchemaConfig) -> Self {
        Self { schema }
    }

    /// Role configuration in use.
    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    /// Resolve header positions.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> Result<ResolvedSchema, SchemaError> {
        let resolved = self.schema.resolve(headers)?;
        debug!(
            importer = %resolved.importer.name,
            exporter = %resolved.exporter.name,
            year = %resolved.year.name,
            value = %resolved.value.name,
            "Resolved trade columns"
        );
        Ok(resolved)
    }

    /// Normalise an in-memory table.
    ///
    /// Fails only when the header row cannot be resolved; bad rows are dropped
    /// and counted.
    pub fn normalize<H, I, R, S>(&self, headers: &[H], rows: I) -> Result<NormalizedTable, SchemaError>
    where
        H: AsRef<str>,
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let schema = self.resolve(headers)?;
        let mut report = NormalizationReport::default();
        let mut records = Vec::new();

        for row in rows {
            let fields: Vec<&str> = row.as_ref().iter().map(|s| s.as_ref()).collect();
            report.total_rows += 1;
            if let Some(record) = schema.parse_row(&fields, &mut report) {
                records.push(record);
            }
        }

        Ok(Self::finish(schema, records, report))
    }

    pub(crate) fn finish(
        columns: ResolvedSchema,
        records: Vec<TradeRecord>,
        mut report: NormalizationReport,
    ) -> NormalizedTable {
        report.kept_rows = records.len();
        if report.dropped_rows() > 0 {
            warn!(
                dropped = report.dropped_rows(),
                missing_country = report.missing_country,
                invalid_year = report.invalid_year,
                invalid_value = report.invalid_value,
                invalid_encoding = report.invalid_encoding,
                "Dropped unparsable trade rows"
            );
        }
        NormalizedTable {
            table: TradeTable::new(records),
            report,
            columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: [&str; 4] = ["reporterISO", "partnerISO", "refYear", "primaryValue"];

    #[test]
    fn test_parse_year_accepts_integral_floats() {
        assert_eq!(parse_year("2023"), Some(2023));
        assert_eq!(parse_year(" 2023.0 "), Some(2023));
        assert_eq!(parse_year("2023.5"), None);
        assert_eq!(parse_year("twenty"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn test_parse_value_rejects_negative_and_nan() {
        assert_eq!(parse_value("12.5"), Some(12.5));
        assert_eq!(parse_value("1e3"), Some(1000.0));
        assert_eq!(parse_value("-1"), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("inf"), None);
    }

    #[test]
    fn test_normalize_uppercases_and_trims_codes() {
        let rows = vec![vec![" usa", "chn ", "2023", "10"]];
        let normalized = TableNormalizer::default().normalize(&HEADERS, rows).unwrap();
        let record = &normalized.table.records()[0];
        assert_eq!(record.importer.as_str(), "USA");
        assert_eq!(record.exporter.as_str(), "CHN");
        assert_eq!(record.year, 2023);
        assert_eq!(record.value, 10.0);
    }

    #[test]
    fn test_normalize_counts_dropped_rows() {
        let rows = vec![
            vec!["USA", "CHN", "2023", "10"],
            vec!["", "CHN", "2023", "10"],
            vec!["USA", "CHN", "year?", "10"],
            vec!["USA", "CHN", "2023", "n/a"],
            vec!["USA", "CHN", "2023"],
        ];
        let normalized = TableNormalizer::default().normalize(&HEADERS, rows).unwrap();
        let report = &normalized.report;
        assert_eq!(report.total_rows, 5);
        assert_eq!(report.kept_rows, 1);
        assert_eq!(report.missing_country, 1);
        assert_eq!(report.invalid_year, 1);
        assert_eq!(report.invalid_value, 2);
        assert_eq!(report.dropped_rows(), 4);
    }

    #[test]
    fn test_export_flow_is_reoriented() {
        let headers = ["reporterISO", "partnerISO", "refYear", "primaryValue", "flowDesc", "cmdDesc"];
        let rows = vec![
            vec!["VNM", "USA", "2023", "7", "Export", "Footwear"],
            vec!["VNM", "CHN", "2023", "3", "Import", "Cotton"],
        ];
        let normalized = TableNormalizer::default().normalize(&headers, rows).unwrap();
        let export = &normalized.table.records()[0];
        assert_eq!(export.exporter.as_str(), "VNM");
        assert_eq!(export.importer.as_str(), "USA");
        assert_eq!(export.flow, FlowDirection::Export);
        assert_eq!(export.commodity.as_deref(), Some("Footwear"));

        let import = &normalized.table.records()[1];
        assert_eq!(import.importer.as_str(), "VNM");
        assert_eq!(import.exporter.as_str(), "CHN");
    }

    #[test]
    fn test_re_export_and_re_import_keep_direction() {
        let headers = ["reporterISO", "partnerISO", "refYear", "primaryValue", "flowDesc"];
        let rows = vec![
            vec!["USA", "MEX", "2023", "10", "Export"],
            vec!["USA", "MEX", "2023", "4", "Re-export"],
            vec!["USA", "MEX", "2023", "2", "Re-import"],
        ];
        let normalized = TableNormalizer::default().normalize(&headers, rows).unwrap();
        let records = normalized.table.records();

        for record in &records[..2] {
            assert_eq!(record.flow, FlowDirection::Export);
            assert_eq!(record.exporter.as_str(), "USA");
            assert_eq!(record.importer.as_str(), "MEX");
        }
        assert_eq!(records[2].flow, FlowDirection::Import);
        assert_eq!(records[2].importer.as_str(), "USA");
        assert_eq!(records[2].exporter.as_str(), "MEX");
    }

    #[test]
    fn test_normalize_schema_error_is_fatal() {
        let rows: Vec<Vec<&str>> = vec![];
        let err = TableNormalizer::default()
            .normalize(&["a", "b"], rows)
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { .. }));
    }
}
