//! Check command implementation
//!
//! Reports the effective configuration and, when an input file is given,
//! which columns were matched and how many rows survived normalisation.

use super::Context;
use crate::report;
use crate::Result;
use adapter_loader::NormalizationReport;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Column matched for one role.
#[derive(Debug, Serialize)]
pub struct ColumnMatch {
    /// Canonical role
    pub role: &'static str,
    /// Header as found in the file
    pub header: String,
    /// Position in the header row
    pub index: usize,
}

/// Input file diagnostics.
#[derive(Debug, Serialize)]
pub struct InputCheck {
    /// File checked
    pub path: String,
    /// Resolved columns
    pub columns: Vec<ColumnMatch>,
    /// Rows read
    pub rows_read: usize,
    /// Rows kept
    pub rows_kept: usize,
    /// Rows dropped for a missing country
    pub missing_country: usize,
    /// Rows dropped for a bad year
    pub invalid_year: usize,
    /// Rows dropped for a bad value
    pub invalid_value: usize,
    /// Rows dropped for undecodable text
    pub invalid_encoding: usize,
    /// Years present
    pub years: Vec<i32>,
}

/// Everything the check command reports.
#[derive(Debug, Serialize)]
pub struct CheckOutput {
    /// Configuration path
    pub config_path: String,
    /// Whether the configuration file exists
    pub config_found: bool,
    /// Log level in effect
    pub log_level: String,
    /// Top-K partners
    pub top_k: usize,
    /// Graph size
    pub top_n: usize,
    /// Input diagnostics, when `--input` was given
    pub input: Option<InputCheck>,
}

/// Gather diagnostics.
pub fn inspect(ctx: &Context, config_path: &Path) -> Result<CheckOutput> {
    let input = match &ctx.input {
        Some(path) => {
            let normalized = ctx.load()?;
            let report = &normalized.report;
            Some(InputCheck {
                path: path.display().to_string(),
                columns: normalized
                    .columns
                    .columns()
                    .into_iter()
                    .map(|(role, column)| ColumnMatch {
                        role: role.name(),
                        header: column.name.clone(),
                        index: column.index,
                    })
                    .collect(),
                rows_read: report.total_rows,
                rows_kept: report.kept_rows,
                missing_country: report.missing_country,
                invalid_year: report.invalid_year,
                invalid_value: report.invalid_value,
                invalid_encoding: report.invalid_encoding,
                years: normalized.table.years().into_iter().collect(),
            })
        }
        None => None,
    };

    Ok(CheckOutput {
        config_path: config_path.display().to_string(),
        config_found: config_path.exists(),
        log_level: ctx.config.log_level.clone(),
        top_k: ctx.config.dependency.top_k,
        top_n: ctx.config.network.top_n,
        input,
    })
}

/// Run the check command
pub fn run(ctx: &Context, config_path: &Path) -> Result<()> {
    let output = inspect(ctx, config_path)?;

    report::emit(ctx.format, &output, |out| {
        writeln!(out, "tradenet {}", env!("CARGO_PKG_VERSION"))?;
        let source = if output.config_found { "" } else { " (not found, using defaults)" };
        writeln!(out, "Config:    {}{}", output.config_path, source)?;
        writeln!(out, "Log level: {}", output.log_level)?;
        writeln!(out, "Top-K:     {}", output.top_k)?;
        writeln!(out, "Top-N:     {}", output.top_n)?;

        let Some(input) = &output.input else {
            writeln!(out, "No input file given")?;
            return Ok(());
        };
        writeln!(out)?;
        writeln!(out, "Input:     {}", input.path)?;
        for column in &input.columns {
            writeln!(
                out,
                "  {:<10} <- {} (column {})",
                column.role, column.header, column.index
            )?;
        }
        report::write_normalization(
            out,
            &NormalizationReport {
                total_rows: input.rows_read,
                kept_rows: input.rows_kept,
                missing_country: input.missing_country,
                invalid_year: input.invalid_year,
                invalid_value: input.invalid_value,
                invalid_encoding: input.invalid_encoding,
            },
        )?;
        let years: Vec<String> = input.years.iter().map(i32::to_string).collect();
        writeln!(out, "Years:     {}", years.join(", "))?;
        writeln!(out, "Configuration OK")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::report::OutputFormat;
    use std::path::PathBuf;

    fn ctx(input: Option<PathBuf>) -> Context {
        Context {
            config: AnalysisConfig::default(),
            format: OutputFormat::Json,
            input,
            limit: 10,
        }
    }

    #[test]
    fn test_inspect_without_input() {
        let output = inspect(&ctx(None), Path::new("/nonexistent/tradenet.toml")).unwrap();
        assert!(!output.config_found);
        assert_eq!(output.top_n, 25);
        assert!(output.input.is_none());
    }

    #[test]
    fn test_inspect_reports_columns_and_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "refYear,reporterISO,partnerISO,cmdDesc,primaryValue\n\
             2022,USA,CHN,Toys,10\n\
             2023,USA,MEX,Cars,20\n\
             2023,,MEX,Cars,20"
        )
        .unwrap();

        let output = inspect(
            &ctx(Some(file.path().to_path_buf())),
            Path::new("/nonexistent/tradenet.toml"),
        )
        .unwrap();
        let input = output.input.unwrap();
        assert_eq!(input.columns.len(), 5);
        assert_eq!(input.columns[0].role, "Importer");
        assert_eq!(input.columns[0].header, "reporterISO");
        assert_eq!(input.rows_read, 3);
        assert_eq!(input.rows_kept, 2);
        assert_eq!(input.missing_country, 1);
        assert_eq!(input.years, vec![2022, 2023]);
    }
}
