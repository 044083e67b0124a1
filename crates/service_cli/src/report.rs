//! Presentation layer.
//!
//! Analyses return plain structs; this module turns them into ranked text
//! tables or pretty-printed JSON. Table writers take any [`Write`] so they can
//! be captured in tests.

use crate::Result;
use adapter_loader::NormalizationReport;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Display;
use std::io::{self, Write};
use trade_core::types::EmptyResultWarning;
use trade_network::{CentralityTable, ProgressiveFragility, RemovalImpact};
use trade_risk::{
    BanOutcome, ConcentrationFlag, KeywordExposure, RiskThresholds, ShockReport, TopKConcentration,
    TradeDependency,
};

const RULE: &str = "==========================================================================";
const LINE: &str = "--------------------------------------------------------------------------";

/// Output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Ranked text tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Print `value` as JSON, or run `table` against stdout.
pub fn emit<T, F>(format: OutputFormat, value: &T, table: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputFormat::Table => table(&mut out)?,
    }
    out.flush()?;
    Ok(())
}

/// Report an empty analysis.
pub fn emit_empty(format: OutputFormat, warning: &EmptyResultWarning) -> Result<()> {
    #[derive(Serialize)]
    struct Empty<'a> {
        empty: &'a EmptyResultWarning,
    }
    emit(format, &Empty { empty: warning }, |out| {
        writeln!(out, "No results: {}", warning)
    })
}

/// Human-readable trade value.
pub fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{:.2}", value)
    }
}

fn percent(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn header(out: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", RULE)
}

/// Rows kept and dropped while loading.
pub fn write_normalization(out: &mut dyn Write, report: &NormalizationReport) -> io::Result<()> {
    writeln!(out, "Rows read:        {}", report.total_rows)?;
    writeln!(out, "Rows kept:        {}", report.kept_rows)?;
    writeln!(out, "Dropped:          {}", report.dropped_rows())?;
    writeln!(out, "  missing country {}", report.missing_country)?;
    writeln!(out, "  invalid year    {}", report.invalid_year)?;
    writeln!(out, "  invalid value   {}", report.invalid_value)?;
    writeln!(out, "  bad encoding    {}", report.invalid_encoding)
}

/// Dependency index with top-K concentration.
pub fn write_dependency<S: Display + PartialEq, P: Display>(
    out: &mut dyn Write,
    title: &str,
    rows: &[TradeDependency<S, P>],
    top_k: &[(S, TopKConcentration<P>)],
    limit: usize,
) -> io::Result<()> {
    header(out, title)?;
    let k = top_k.first().map_or(0, |(_, c)| c.k);
    writeln!(
        out,
        "{:<8} {:<10} {:>12} {:>12} {:>8} {:>8}",
        "Subject",
        "Top",
        "Value",
        "Total",
        "Index",
        format!("Top-{}", k)
    )?;
    writeln!(out, "{}", LINE)?;
    for row in rows.iter().take(limit) {
        let cumulative = top_k
            .iter()
            .find(|(s, _)| *s == row.subject)
            .map_or_else(String::new, |(_, c)| percent(c.cumulative_share));
        writeln!(
            out,
            "{:<8} {:<10} {:>12} {:>12} {:>8} {:>8}",
            row.subject,
            row.top_partner,
            format_value(row.partner_value),
            format_value(row.subject_total),
            percent(row.index),
            cumulative
        )?;
    }
    if rows.len() > limit {
        writeln!(out, "... {} more", rows.len() - limit)?;
    }
    Ok(())
}

/// Subjects flagged by a concentration rule.
pub fn write_concentration<S: Display, P: Display>(
    out: &mut dyn Write,
    flags: &[ConcentrationFlag<S, P>],
    limit: usize,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Concentrated subjects: {}", flags.len())?;
    for flag in flags.iter().take(limit) {
        let cumulative: Vec<String> = flag
            .cumulative
            .iter()
            .map(|(k, share)| format!("top-{} {}", k, percent(*share)))
            .collect();
        let partners: Vec<&P> = flag.top_partners.iter().map(|p| &p.partner).collect();
        writeln!(
            out,
            "  {:<8} {:>12}  {}  [{}]",
            flag.subject,
            format_value(flag.total),
            cumulative.join(", "),
            join(&partners)
        )?;
    }
    Ok(())
}

/// Exposures under a proportional shock.
pub fn write_shock<S: Display, P: Display>(
    out: &mut dyn Write,
    report: &ShockReport<S, P>,
    thresholds: &RiskThresholds,
    limit: usize,
) -> io::Result<()> {
    header(
        out,
        &format!("{} (-{:.0}%)", report.scenario, report.reduction * 100.0),
    )?;
    writeln!(
        out,
        "{:<8} {:>12} {:>12} {:>9} {:>9}  {:<8} {}",
        "Subject", "Hit value", "Shock", "Share", "Loss", "Tier", "Partners"
    )?;
    writeln!(out, "{}", LINE)?;
    for exposure in report.exposures.iter().take(limit) {
        let tier = exposure
            .tier(thresholds)
            .map_or_else(|| "-".to_string(), |t| t.to_string());
        writeln!(
            out,
            "{:<8} {:>12} {:>12} {:>9} {:>8.1}%  {:<8} {}",
            exposure.subject,
            format_value(exposure.edge_value),
            format_value(exposure.shock_value),
            percent(exposure.affected_share),
            exposure.shock_pct_of_total,
            tier,
            join(&exposure.partners)
        )?;
    }
    writeln!(out, "{}", LINE)?;
    writeln!(
        out,
        "Subjects affected: {}   Total shock: {}",
        report.exposures.len(),
        format_value(report.total_shock_value())
    )
}

/// Supply disruptions under one ban.
pub fn write_ban<S: Display, P: Display>(
    out: &mut dyn Write,
    outcome: &BanOutcome<S, P>,
    banned: &[P],
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{} [{}]", outcome.scenario, join(banned))?;
    writeln!(
        out,
        "  evaluated {}, at risk {}, critical {}",
        outcome.evaluated,
        outcome.disruptions.len(),
        outcome.critical().count()
    )?;
    for d in &outcome.disruptions {
        writeln!(
            out,
            "  {:<8} {:<8} disruption {:>6}  top-K {:>6}  via {}",
            d.subject,
            d.tier,
            percent(d.disruption),
            percent(d.top_k_share),
            join(&d.matched_partners)
        )?;
    }
    Ok(())
}

/// Keyword-matched sector exposure.
pub fn write_keyword<S: Display>(
    out: &mut dyn Write,
    title: &str,
    rows: &[KeywordExposure<S>],
    limit: usize,
) -> io::Result<()> {
    header(out, title)?;
    writeln!(out, "{:<8} {:>12} {:>8}  {}", "Subject", "Value", "Share", "Commodities")?;
    writeln!(out, "{}", LINE)?;
    for row in rows.iter().take(limit) {
        writeln!(
            out,
            "{:<8} {:>12} {:>8}  {}",
            row.subject,
            format_value(row.matched_value),
            percent(row.matched_share),
            row.commodities.join("; ")
        )?;
    }
    Ok(())
}

/// Centrality ranking.
pub fn write_centrality(out: &mut dyn Write, table: &CentralityTable, limit: usize) -> io::Result<()> {
    writeln!(out, "{:<5} {:<8} {:>12} {:>16}", "Rank", "Country", "Betweenness", "Weighted degree")?;
    writeln!(out, "{}", LINE)?;
    for (rank, row) in table.iter().take(limit).enumerate() {
        writeln!(
            out,
            "{:<5} {:<8} {:>12.4} {:>16}",
            rank + 1,
            row.country,
            row.betweenness,
            format_value(row.weighted_degree)
        )?;
    }
    Ok(())
}

/// Effect of one node removal.
pub fn write_removal(out: &mut dyn Write, impact: &RemovalImpact, limit: usize) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Removed {} (betweenness {:.4})",
        impact.removed, impact.removed_betweenness
    )?;
    writeln!(
        out,
        "Reachable pairs: {} -> {} ({} lost)",
        impact.reachable_pairs_before,
        impact.reachable_pairs_after,
        impact.pairs_lost()
    )?;
    if impact.newly_disconnected.is_empty() {
        writeln!(out, "No country left the main component")?;
    } else {
        writeln!(
            out,
            "Cut off from main component: {}",
            join(&impact.newly_disconnected)
        )?;
    }
    writeln!(out, "{:<8} {:>10} {:>10} {:>10}", "Country", "Before", "After", "Change")?;
    for delta in impact.deltas.iter().take(limit) {
        writeln!(
            out,
            "{:<8} {:>10.4} {:>10.4} {:>+10.4}",
            delta.country,
            delta.betweenness_before,
            delta.betweenness_after,
            delta.betweenness_change()
        )?;
    }
    Ok(())
}

/// Sequential removal summary.
pub fn write_progressive(out: &mut dyn Write, report: &ProgressiveFragility) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Progressive removal")?;
    writeln!(out, "{:<5} {:<8} {:>12} {:>10} {}", "Step", "Removed", "Betweenness", "Pairs", "Cut off")?;
    for (step, impact) in report.steps.iter().enumerate() {
        writeln!(
            out,
            "{:<5} {:<8} {:>12.4} {:>10} {}",
            step + 1,
            impact.removed,
            impact.removed_betweenness,
            impact.reachable_pairs_after,
            join(&impact.newly_disconnected)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trade_core::flows::FlowSnapshot;
    use trade_risk::DependencyIndex;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_format_value_units() {
        assert_eq!(format_value(2.6e11), "260.00B");
        assert_eq!(format_value(1_500_000.0), "1.50M");
        assert_eq!(format_value(2_500.0), "2.50K");
        assert_eq!(format_value(25.0), "25.00");
    }

    #[test]
    fn test_dependency_table_lists_index_and_top_k() {
        let snapshot = FlowSnapshot::from_flows(
            2023,
            vec![("A", "B", 100.0), ("A", "C", 50.0), ("B", "C", 30.0)],
        );
        let index = DependencyIndex::exports(&snapshot);
        let rows = index.dependency_index();
        let top_k = index.top_k(2).unwrap();
        let text = render(|out| write_dependency(out, "Exports 2023", &rows, &top_k, 10));

        assert!(text.contains("Exports 2023"));
        assert!(text.contains("Top-2"));
        let a_line = text.lines().find(|l| l.starts_with("A ")).unwrap();
        assert!(a_line.contains("66.7%"));
        assert!(a_line.contains("100.0%"));
        assert!(!text.contains("more"));
    }

    #[test]
    fn test_dependency_table_truncates() {
        let snapshot =
            FlowSnapshot::from_flows(2023, vec![("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 1.0)]);
        let index = DependencyIndex::exports(&snapshot);
        let rows = index.dependency_index();
        let text = render(|out| write_dependency(out, "t", &rows, &[], 1));
        assert!(text.ends_with("... 2 more\n"));
    }

    #[test]
    fn test_normalization_summary() {
        let report = NormalizationReport {
            total_rows: 5,
            kept_rows: 3,
            missing_country: 1,
            invalid_year: 0,
            invalid_value: 1,
            invalid_encoding: 1,
        };
        let text = render(|out| write_normalization(out, &report));
        assert!(text.contains("Dropped:          3"));
        assert!(text.contains("bad encoding    1"));
    }

    #[test]
    fn test_empty_centrality_table_has_header_only() {
        let text = render(|out| write_centrality(out, &CentralityTable::default(), 10));
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("Rank"));
    }
}
