//! tradenet CLI - Bilateral Trade Dependency and Network Analytics
//!
//! This is the operational entry point for the tradenet analytics crates.
//!
//! # Commands
//!
//! - `tradenet dependency --input <csv>` - Trade dependency index and top-K concentration
//! - `tradenet exposure --input <csv>` - Proportional partner shocks
//! - `tradenet food-security --input <csv>` - Agricultural import concentration and export bans
//! - `tradenet labour --input <csv>` - Labour-intensive export exposure
//! - `tradenet network --input <csv>` - Trade graph centrality and fragility
//! - `tradenet check` - Configuration and input diagnostics
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate wires the loader, the flow
//! aggregator and the analytics crates together and owns all presentation.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod report;

pub use error::{CliError, Result};

use commands::exposure::{ExposureArgs, ShockPreset};
use commands::food_security::{Attribution, BanPreset, FoodSecurityArgs};
use commands::network::{Cost, NetworkArgs};
use commands::{Context, Side};
use config::AnalysisConfig;
use report::OutputFormat;

/// tradenet bilateral trade analytics CLI
#[derive(Parser)]
#[command(name = "tradenet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "tradenet.toml")]
    config: PathBuf,

    /// Trade data CSV file
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Maximum rows per printed table
    #[arg(short, long, global = true, default_value = "25")]
    limit: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trade dependency index and top-K partner concentration
    Dependency {
        /// Group by exporter or importer
        #[arg(short, long, value_enum, default_value = "exporter")]
        side: Side,

        /// Year to analyse (default: latest)
        #[arg(short, long)]
        year: Option<i32>,

        /// Partners in the top-K concentration
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Proportional shock exposure
    Exposure {
        /// Preset scenario
        #[arg(short, long, value_enum)]
        preset: Option<ShockPreset>,

        /// Shocked partner (repeatable); omit for each subject's top partner
        #[arg(long = "partner")]
        partners: Vec<String>,

        /// Fraction of each targeted edge removed, in [0, 1]
        #[arg(short, long)]
        reduction: Option<f64>,

        /// Group by exporter or importer
        #[arg(short, long, value_enum)]
        side: Option<Side>,

        /// Year to analyse
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Agricultural import concentration and export-ban scenarios
    FoodSecurity {
        /// Preset ban (repeatable); none runs every preset
        #[arg(short, long = "ban", value_enum)]
        bans: Vec<BanPreset>,

        /// Custom banned exporter (repeatable)
        #[arg(long = "banned")]
        banned: Vec<String>,

        /// Loss attribution policy
        #[arg(short, long, value_enum)]
        attribution: Option<Attribution>,

        /// Evaluate every importer, not only concentrated ones
        #[arg(long)]
        all_subjects: bool,

        /// Year to analyse (default: latest)
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Labour-intensive export exposure
    Labour {
        /// Year to analyse (default: latest)
        #[arg(short, long)]
        year: Option<i32>,

        /// Minimum labour-intensive share reported
        #[arg(short, long)]
        min_share: Option<f64>,
    },

    /// Trade graph centrality and fragility
    Network {
        /// Countries kept by total trade
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Year to analyse (default: latest)
        #[arg(short, long)]
        year: Option<i32>,

        /// Country to remove instead of the most central one
        #[arg(short, long)]
        remove: Option<String>,

        /// Also remove this many top countries in sequence
        #[arg(short, long)]
        progressive: Option<usize>,

        /// Shortest-path cost convention
        #[arg(short, long, value_enum)]
        edge_cost: Option<Cost>,

        /// Write the nodes/links view as JSON to this file
        #[arg(long)]
        view: Option<PathBuf>,
    },

    /// Check configuration and input file
    Check,
}

fn init_tracing(verbose: bool, log_level: &str) -> anyhow::Result<()> {
    let default = if verbose { "debug" } else { log_level };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default)?,
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AnalysisConfig::load_with_env_and_validate(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // Initialise tracing
    init_tracing(cli.verbose, &config.log_level)?;
    debug!(config = %cli.config.display(), "Configuration loaded");

    let ctx = Context {
        config,
        format: cli.format,
        input: cli.input,
        limit: cli.limit,
    };

    match cli.command {
        Commands::Dependency { side, year, top_k } => {
            commands::dependency::run(&ctx, side.into(), year, top_k)
        }
        Commands::Exposure {
            preset,
            partners,
            reduction,
            side,
            year,
        } => commands::exposure::run(
            &ctx,
            &ExposureArgs {
                preset,
                partners,
                reduction,
                side: side.map(Into::into),
                year,
            },
        ),
        Commands::FoodSecurity {
            bans,
            banned,
            attribution,
            all_subjects,
            year,
        } => commands::food_security::run(
            &ctx,
            &FoodSecurityArgs {
                bans,
                banned,
                attribution,
                all_subjects,
                year,
            },
        ),
        Commands::Labour { year, min_share } => commands::labour::run(&ctx, year, min_share),
        Commands::Network {
            top_n,
            year,
            remove,
            progressive,
            edge_cost,
            view,
        } => commands::network::run(
            &ctx,
            &NetworkArgs {
                top_n,
                year,
                remove,
                progressive,
                edge_cost,
                view,
            },
        ),
        Commands::Check => commands::check::run(&ctx, &cli.config),
    }?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tradenet",
            "network",
            "--input",
            "trade.csv",
            "--format",
            "json",
            "-n",
            "10",
        ])
        .unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("trade.csv")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Network { top_n: Some(10), .. }));
    }

    #[test]
    fn test_repeatable_bans() {
        let cli = Cli::try_parse_from([
            "tradenet",
            "food-security",
            "--ban",
            "major-grain-exporters",
            "--ban",
            "climate-emergency",
            "--attribution",
            "fixed-divisor",
        ])
        .unwrap();
        match cli.command {
            Commands::FoodSecurity {
                bans, attribution, ..
            } => {
                assert_eq!(
                    bans,
                    vec![BanPreset::MajorGrainExporters, BanPreset::ClimateEmergency]
                );
                assert_eq!(attribution, Some(Attribution::FixedDivisor));
            }
            _ => panic!("expected food-security"),
        }
    }
}
