//! Exposure command implementation
//!
//! Applies a proportional shock, either a preset or a custom partner list,
//! and ranks the subjects by the share of their trade it removes.

use super::{year_selector, Context};
use crate::report;
use crate::{CliError, Result};
use clap::ValueEnum;
use serde::Serialize;
use trade_core::flows::YearSelector;
use trade_core::types::CountryCode;
use trade_risk::{
    DependencyIndex, PresetShockType, ProportionalShock, ShockReport, ShockSimulator, ShockTarget,
    SubjectSide,
};
use tracing::info;

/// Preset shocks selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ShockPreset {
    /// Imports from China fall 25%
    ChinaExportDrop,
    /// Each exporter loses 40% of sales to its largest market
    TopPartnerCollapse,
}

impl From<ShockPreset> for PresetShockType {
    fn from(preset: ShockPreset) -> Self {
        match preset {
            ShockPreset::ChinaExportDrop => PresetShockType::ChinaExportDrop,
            ShockPreset::TopPartnerCollapse => PresetShockType::TopPartnerCollapse,
        }
    }
}

/// Exposure command arguments.
#[derive(Debug, Clone, Default)]
pub struct ExposureArgs {
    /// Preset scenario
    pub preset: Option<ShockPreset>,
    /// Custom shocked partners; empty means each subject's top partner
    pub partners: Vec<String>,
    /// Reduction override
    pub reduction: Option<f64>,
    /// Grouping side override
    pub side: Option<SubjectSide>,
    /// Year override
    pub year: Option<i32>,
}

/// A shock ready to apply, with the index side and year it expects.
#[derive(Debug, Clone)]
pub struct ShockPlan {
    /// Shock to apply
    pub shock: ProportionalShock<CountryCode, CountryCode>,
    /// Grouping side
    pub side: SubjectSide,
    /// Year selection
    pub selector: YearSelector,
}

/// Everything the exposure command reports.
#[derive(Debug, Serialize)]
pub struct ExposureOutput {
    /// Aggregated year
    pub year: i32,
    /// Grouping side
    pub side: SubjectSide,
    /// Shock exposures
    pub report: ShockReport<CountryCode, CountryCode>,
}

/// Resolve arguments and configuration into a shock.
pub fn plan(args: &ExposureArgs, default_reduction: f64) -> Result<ShockPlan> {
    match args.preset {
        Some(_) if !args.partners.is_empty() => Err(CliError::invalid_argument(
            "--preset and --partner cannot be combined",
        )),
        Some(preset) => {
            let preset = PresetShockType::from(preset);
            let mut shock = preset.shock();
            if let Some(reduction) = args.reduction {
                shock = ProportionalShock::new(shock.name(), shock.target().clone(), reduction)?;
            }
            let selector = match (args.year, preset.preferred_year()) {
                (Some(year), _) => YearSelector::Exact(year),
                (None, Some(preferred)) => YearSelector::PreferOrLatest(preferred),
                (None, None) => YearSelector::Latest,
            };
            Ok(ShockPlan {
                shock,
                side: args.side.unwrap_or_else(|| preset.subject_side()),
                selector,
            })
        }
        None => {
            let reduction = args.reduction.unwrap_or(default_reduction);
            let (name, target, side) = if args.partners.is_empty() {
                ("Top partner shock".to_string(), ShockTarget::TopPartner, SubjectSide::Exporter)
            } else {
                let partners: Vec<CountryCode> = args.partners.iter().map(CountryCode::new).collect();
                let name = format!(
                    "Supply shock from {}",
                    partners.iter().map(CountryCode::as_str).collect::<Vec<_>>().join(", ")
                );
                (name, ShockTarget::partners(partners), SubjectSide::Importer)
            };
            Ok(ShockPlan {
                shock: ProportionalShock::new(name, target, reduction)?,
                side: args.side.unwrap_or(side),
                selector: year_selector(args.year),
            })
        }
    }
}

/// Run the exposure command
pub fn run(ctx: &Context, args: &ExposureArgs) -> Result<()> {
    let plan = plan(args, ctx.config.shocks.reduction)?;
    let thresholds = ctx.config.shocks.thresholds()?;

    let table = ctx.table()?;
    let Some(snapshot) = ctx.snapshot(&table, plan.selector)? else {
        return Ok(());
    };

    let index = DependencyIndex::for_side(&snapshot, plan.side);
    let output = ExposureOutput {
        year: snapshot.year(),
        side: plan.side,
        report: ShockSimulator::apply(&index, &plan.shock),
    };
    info!(
        year = output.year,
        affected = output.report.exposures.len(),
        "Exposure analysis complete"
    );

    report::emit(ctx.format, &output, |out| {
        report::write_shock(out, &output.report, &thresholds, ctx.limit)
    })
}
