//! Dependency command implementation
//!
//! Trade dependency index, top-K concentration and concentration flags for
//! one year of bilateral flows.

use super::{side_label, year_selector, Context};
use crate::report;
use crate::Result;
use serde::Serialize;
use std::io::Write;
use trade_core::types::CountryCode;
use trade_risk::{
    ConcentrationFlag, DependencyIndex, SubjectSide, TopKConcentration, TradeDependency,
};
use tracing::info;

type Code = CountryCode;

/// Everything the dependency command reports.
#[derive(Debug, Serialize)]
pub struct DependencyOutput {
    /// Aggregated year
    pub year: i32,
    /// Grouping side
    pub side: SubjectSide,
    /// Top-1 partner per subject, most dependent first
    pub dependencies: Vec<TradeDependency<Code, Code>>,
    /// Top-K concentration per subject
    pub concentration: Vec<(Code, TopKConcentration<Code>)>,
    /// Subjects over the concentration rule
    pub flagged: Vec<ConcentrationFlag<Code, Code>>,
    /// Subjects with zero total, left out of every share
    pub excluded: Vec<Code>,
}

/// Compute dependency tables for `index`.
pub fn analyse(
    index: &DependencyIndex<Code, Code>,
    year: i32,
    side: SubjectSide,
    ctx: &Context,
    top_k: Option<usize>,
) -> Result<DependencyOutput> {
    let k = top_k.unwrap_or(ctx.config.dependency.top_k);
    let rule = ctx.config.dependency.rule()?;
    Ok(DependencyOutput {
        year,
        side,
        dependencies: index.dependency_index(),
        concentration: index.top_k(k)?,
        flagged: index.flag_concentrated(&rule),
        excluded: index.excluded_subjects().to_vec(),
    })
}

/// Run the dependency command
pub fn run(ctx: &Context, side: SubjectSide, year: Option<i32>, top_k: Option<usize>) -> Result<()> {
    let table = ctx.table()?;
    let Some(snapshot) = ctx.snapshot(&table, year_selector(year))? else {
        return Ok(());
    };

    let index = DependencyIndex::for_side(&snapshot, side);
    let output = analyse(&index, snapshot.year(), side, ctx, top_k)?;
    info!(
        year = output.year,
        subjects = output.dependencies.len(),
        flagged = output.flagged.len(),
        excluded = output.excluded.len(),
        "Dependency analysis complete"
    );

    let title = format!("{} dependency, {}", side_label(side), output.year);
    report::emit(ctx.format, &output, |out| {
        report::write_dependency(
            out,
            &title,
            &output.dependencies,
            &output.concentration,
            ctx.limit,
        )?;
        report::write_concentration(out, &output.flagged, ctx.limit)?;
        if !output.excluded.is_empty() {
            let excluded: Vec<&str> = output.excluded.iter().map(CountryCode::as_str).collect();
            writeln!(out, "Excluded (zero total): {}", excluded.join(", "))?;
        }
        Ok(())
    })
}
