//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Commands load the trade
//! file through [`Context`], run one analysis and hand the result to
//! [`crate::report`].

pub mod check;
pub mod dependency;
pub mod exposure;
pub mod food_security;
pub mod labour;
pub mod network;

use crate::config::AnalysisConfig;
use crate::report::{self, OutputFormat};
use crate::{CliError, Result};
use adapter_loader::{CsvTradeReader, NormalizedTable, TableNormalizer};
use clap::ValueEnum;
use std::path::PathBuf;
use trade_core::flows::{FlowAggregator, FlowSnapshot, YearSelector};
use trade_core::types::{Outcome, TradeTable};
use trade_risk::SubjectSide;
use tracing::info;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Validated configuration
    pub config: AnalysisConfig,
    /// Output format
    pub format: OutputFormat,
    /// Trade file, if given
    pub input: Option<PathBuf>,
    /// Maximum rows per printed table
    pub limit: usize,
}

impl Context {
    /// Read and normalise the input file.
    pub fn load(&self) -> Result<NormalizedTable> {
        let path = self.input.as_ref().ok_or(CliError::MissingInput)?;
        let reader = CsvTradeReader::new(TableNormalizer::new(self.config.schema.to_schema_config()));
        let normalized = reader.read_path(path)?;
        info!(
            kept = normalized.report.kept_rows,
            dropped = normalized.report.dropped_rows(),
            years = normalized.table.years().len(),
            "Trade table ready"
        );
        Ok(normalized)
    }

    /// Normalised table only.
    pub fn table(&self) -> Result<TradeTable> {
        Ok(self.load()?.table)
    }

    /// Aggregate `table`, printing the warning when nothing is left.
    ///
    /// `Ok(None)` means the empty result has already been reported.
    pub fn snapshot(&self, table: &TradeTable, selector: YearSelector) -> Result<Option<FlowSnapshot>> {
        self.ready(FlowAggregator::aggregate(table, selector))
    }

    /// Unwrap a ready outcome or report the empty one.
    pub fn ready<T>(&self, outcome: Outcome<T>) -> Result<Option<T>> {
        match outcome {
            Outcome::Ready(value) => Ok(Some(value)),
            Outcome::Empty(warning) => {
                report::emit_empty(self.format, &warning)?;
                Ok(None)
            }
        }
    }
}

/// Year to analyse: the given one exactly, else the latest.
pub fn year_selector(year: Option<i32>) -> YearSelector {
    year.map_or(YearSelector::Latest, YearSelector::Exact)
}

/// Grouping side for dependency shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Side {
    /// Exporters and their destination markets
    Exporter,
    /// Importers and their suppliers
    Importer,
}

impl From<Side> for SubjectSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Exporter => SubjectSide::Exporter,
            Side::Importer => SubjectSide::Importer,
        }
    }
}

/// Table title fragment for a side.
pub fn side_label(side: SubjectSide) -> &'static str {
    match side {
        SubjectSide::Exporter => "Export",
        SubjectSide::Importer => "Import",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn context(input: Option<PathBuf>) -> Context {
        Context {
            config: AnalysisConfig::default(),
            format: OutputFormat::Json,
            input,
            limit: 10,
        }
    }

    #[test]
    fn test_year_selector() {
        assert_eq!(year_selector(None), YearSelector::Latest);
        assert_eq!(year_selector(Some(2021)), YearSelector::Exact(2021));
    }

    #[test]
    fn test_load_requires_input() {
        let err = context(None).load().unwrap_err();
        assert!(matches!(err, CliError::MissingInput));
    }

    #[test]
    fn test_load_uses_configured_schema() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "origin,dest,period,fob\nCHN,USA,2023,10\nMEX,USA,2023,x").unwrap();

        let mut ctx = context(Some(file.path().to_path_buf()));
        ctx.config = AnalysisConfig::from_toml(
            "[schema]\nimporter = [\"dest\"]\nexporter = [\"origin\"]\nyear = [\"period\"]\nvalue = [\"fob\"]",
        )
        .unwrap();

        let normalized = ctx.load().unwrap();
        assert_eq!(normalized.table.len(), 1);
        assert_eq!(normalized.report.invalid_value, 1);
        assert_eq!(normalized.columns.value.name, "fob");
    }

    #[test]
    fn test_empty_snapshot_is_reported_not_failed() {
        let ctx = context(None);
        let snapshot = ctx
            .snapshot(&TradeTable::default(), YearSelector::Latest)
            .unwrap();
        assert!(snapshot.is_none());
    }
}
