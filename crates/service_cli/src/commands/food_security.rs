//! Food-security command implementation
//!
//! Restricts the table to agricultural imports, flags importers whose
//! supply is concentrated in a few partners and runs export-ban scenarios
//! against them.

use super::{year_selector, Context};
use crate::report;
use crate::Result;
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;
use trade_core::types::{CountryCode, EmptyResultWarning, FlowDirection, TradeTable};
use trade_risk::shocks::AGRICULTURAL_KEYWORDS;
use trade_risk::{
    AttributionPolicy, BanOutcome, BanScenario, BanSimulation, ConcentrationFlag, DependencyIndex,
    PresetBanType,
};
use tracing::{info, warn};

/// Preset bans selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BanPreset {
    /// USA, Russia, Ukraine and Argentina
    MajorGrainExporters,
    /// China, India and Brazil
    RegionalCrisis,
    /// Australia, Canada and the USA
    ClimateEmergency,
}

impl From<BanPreset> for PresetBanType {
    fn from(preset: BanPreset) -> Self {
        match preset {
            BanPreset::MajorGrainExporters => PresetBanType::MajorGrainExporters,
            BanPreset::RegionalCrisis => PresetBanType::RegionalCrisis,
            BanPreset::ClimateEmergency => PresetBanType::ClimateEmergency,
        }
    }
}

/// Attribution policy override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Attribution {
    /// Whole top-K share when any partner matches
    EqualSplitMatched,
    /// Sum of the matched partners' own shares
    ActualShare,
    /// Top-K share divided by the configured divisor per matched partner
    FixedDivisor,
}

/// Food-security command arguments.
#[derive(Debug, Clone, Default)]
pub struct FoodSecurityArgs {
    /// Preset bans to run; none selected runs every preset
    pub bans: Vec<BanPreset>,
    /// Custom banned exporters
    pub banned: Vec<String>,
    /// Attribution override
    pub attribution: Option<Attribution>,
    /// Evaluate every importer, not only concentrated ones
    pub all_subjects: bool,
    /// Year override
    pub year: Option<i32>,
}

/// One ban and its result.
#[derive(Debug, Serialize)]
pub struct BanRun {
    /// Ban applied
    pub scenario: BanScenario<CountryCode>,
    /// Disruptions found
    pub outcome: BanOutcome<CountryCode, CountryCode>,
}

/// Everything the food-security command reports.
#[derive(Debug, Serialize)]
pub struct FoodSecurityOutput {
    /// Aggregated year
    pub year: i32,
    /// Agricultural import records used
    pub records: usize,
    /// Importers over the concentration rule
    pub flagged: Vec<ConcentrationFlag<CountryCode, CountryCode>>,
    /// Ban results, in scenario order
    pub bans: Vec<BanRun>,
}

/// Agricultural import records.
pub fn agricultural_imports(table: &TradeTable) -> TradeTable {
    table
        .filter_commodity(AGRICULTURAL_KEYWORDS)
        .filter_flow(FlowDirection::Import)
}

fn scenarios(args: &FoodSecurityArgs) -> Result<Vec<BanScenario<CountryCode>>> {
    let mut scenarios: Vec<BanScenario<CountryCode>> =
        args.bans.iter().map(|&b| PresetBanType::from(b).scenario()).collect();
    if !args.banned.is_empty() {
        scenarios.push(BanScenario::new(
            "Custom ban",
            args.banned.iter().map(CountryCode::new),
        )?);
    }
    if scenarios.is_empty() {
        scenarios = PresetBanType::all().iter().map(PresetBanType::scenario).collect();
    }
    Ok(scenarios)
}

fn simulation(ctx: &Context, args: &FoodSecurityArgs) -> Result<BanSimulation> {
    let shocks = &ctx.config.shocks;
    let policy = match args.attribution {
        None => shocks.policy(),
        Some(Attribution::EqualSplitMatched) => AttributionPolicy::EqualSplitMatched,
        Some(Attribution::ActualShare) => AttributionPolicy::ActualShare,
        Some(Attribution::FixedDivisor) => AttributionPolicy::FixedDivisor(shocks.divisor),
    };
    let sim = BanSimulation::new()
        .with_top_k(ctx.config.dependency.top_k)?
        .try_with_policy(policy)?
        .with_rule(ctx.config.dependency.rule()?)
        .with_thresholds(shocks.thresholds()?);
    Ok(if args.all_subjects { sim.all_subjects() } else { sim })
}

/// Flag concentrated importers and run every selected ban.
pub fn analyse(
    ctx: &Context,
    args: &FoodSecurityArgs,
    agricultural: &TradeTable,
) -> Result<Option<FoodSecurityOutput>> {
    let sim = simulation(ctx, args)?;
    let scenarios = scenarios(args)?;

    let Some(snapshot) = ctx.snapshot(agricultural, year_selector(args.year))? else {
        return Ok(None);
    };
    let index = DependencyIndex::imports(&snapshot);
    let flagged = index.flag_concentrated(&ctx.config.dependency.rule()?);

    let mut bans = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let outcome = sim.run(&index, &scenario)?;
        bans.push(BanRun { scenario, outcome });
    }

    Ok(Some(FoodSecurityOutput {
        year: snapshot.year(),
        records: agricultural.len(),
        flagged,
        bans,
    }))
}

/// Run the food-security command
pub fn run(ctx: &Context, args: &FoodSecurityArgs) -> Result<()> {
    let table = ctx.table()?;
    let agricultural = agricultural_imports(&table);
    if agricultural.is_empty() {
        let warning = EmptyResultWarning::new(
            "food_security",
            "no import records match the agricultural keywords",
        );
        warn!(stage = %warning.stage, "{}", warning.reason);
        return report::emit_empty(ctx.format, &warning);
    }

    let Some(output) = analyse(ctx, args, &agricultural)? else {
        return Ok(());
    };
    info!(
        year = output.year,
        records = output.records,
        flagged = output.flagged.len(),
        scenarios = output.bans.len(),
        "Food-security analysis complete"
    );

    report::emit(ctx.format, &output, |out| {
        writeln!(
            out,
            "Agricultural imports {}: {} records",
            output.year, output.records
        )?;
        report::write_concentration(out, &output.flagged, ctx.limit)?;
        for run in &output.bans {
            let banned: Vec<CountryCode> = run.scenario.banned().iter().cloned().collect();
            report::write_ban(out, &run.outcome, &banned)?;
        }
        Ok(())
    })
}
