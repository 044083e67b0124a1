//! Labour command implementation
//!
//! Ranks exporters by the share of their exports made up of
//! labour-intensive manufactures.

use super::{year_selector, Context};
use crate::report;
use crate::Result;
use serde::Serialize;
use trade_core::types::{CountryCode, FlowDirection, Outcome, TradeTable};
use trade_risk::shocks::LABOUR_INTENSIVE_KEYWORDS;
use trade_risk::{commodity_index, keyword_exposure, KeywordExposure, SubjectSide};
use tracing::{info, warn};

/// Which rows were read as exports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportSource {
    /// Rows the reporter declared as exports
    Declared,
    /// Every row of the year, with the partner as exporter
    Mirror,
}

/// Everything the labour command reports.
#[derive(Debug, Serialize)]
pub struct LabourOutput {
    /// Analysed year
    pub year: i32,
    /// Rows the shares were computed from
    pub source: ExportSource,
    /// Minimum share reported
    pub min_share: f64,
    /// Exporters above the minimum share, most exposed first
    pub exposures: Vec<KeywordExposure<CountryCode>>,
}

/// Export records for one year.
///
/// Uses rows declared as exports; tables without any fall back to every
/// row, read as mirror flows with the partner as exporter.
pub fn export_records(table: &TradeTable, year: i32) -> (TradeTable, ExportSource) {
    let year_table = table.filter_year(year);
    let exports = year_table.filter_flow(FlowDirection::Export);
    if exports.is_empty() {
        warn!(
            year,
            rows = year_table.len(),
            "No declared exports, reading every row as a mirror flow"
        );
        (year_table, ExportSource::Mirror)
    } else {
        (exports, ExportSource::Declared)
    }
}

/// Compute labour-intensive exposure for the selected year.
pub fn analyse(
    table: &TradeTable,
    year: Option<i32>,
    min_share: f64,
) -> Result<Outcome<LabourOutput>> {
    let Some(year) = year_selector(year).resolve(table) else {
        return Ok(Outcome::empty("labour", "no records for requested year"));
    };
    let (exports, source) = export_records(table, year);
    match commodity_index(&exports, SubjectSide::Exporter) {
        Outcome::Ready(index) => Ok(Outcome::Ready(LabourOutput {
            year,
            source,
            min_share,
            exposures: keyword_exposure(&index, LABOUR_INTENSIVE_KEYWORDS, min_share)?,
        })),
        Outcome::Empty(warning) => Ok(Outcome::Empty(warning)),
    }
}

/// Run the labour command
pub fn run(ctx: &Context, year: Option<i32>, min_share: Option<f64>) -> Result<()> {
    let table = ctx.table()?;
    let min_share = min_share.unwrap_or(ctx.config.dependency.keyword_min_share);
    let Some(output) = ctx.ready(analyse(&table, year, min_share)?)? else {
        return Ok(());
    };
    info!(
        year = output.year,
        exporters = output.exposures.len(),
        "Labour exposure analysis complete"
    );

    let mut title = format!(
        "Labour-intensive export share > {:.0}%, {}",
        output.min_share * 100.0,
        output.year
    );
    if output.source == ExportSource::Mirror {
        title.push_str(" (mirror flows)");
    }
    report::emit(ctx.format, &output, |out| {
        report::write_keyword(out, &title, &output.exposures, ctx.limit)
    })
}
