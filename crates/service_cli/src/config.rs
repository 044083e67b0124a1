//! Analysis configuration.
//!
//! Loads `tradenet.toml` with `serde` defaults for every section, applies
//! environment variable overrides and validates the result.
//!
//! ```toml
//! log_level = "info"
//!
//! [schema]
//! importer = ["reporteriso", "reporter"]
//! value = ["primaryvalue", "fobvalue"]
//!
//! [dependency]
//! top_k = 3
//! keyword_min_share = 0.1
//!
//! [[dependency.concentration]]
//! k = 2
//! share = 0.5
//!
//! [shocks]
//! reduction = 0.25
//! critical = 0.4
//! high = 0.2
//! attribution = "equal_split_matched"
//!
//! [network]
//! top_n = 25
//! labelled = 10
//! edge_cost = "inverse_value"
//! ```

use adapter_loader::{ColumnRole, SchemaConfig};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use trade_network::{CentralityConfig, EdgeCost};
use trade_risk::{AttributionPolicy, ConcentrationRule, RiskThresholds};

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("Cannot read {path}: {source}")]
    Io {
        /// Config path
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Unparsable environment override
    #[error("Invalid value '{value}' for {var}")]
    Env {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// One or more settings out of range
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Column candidate overrides. `None` keeps the built-in candidates.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchemaSection {
    /// Importer (reporter) column candidates
    pub importer: Option<Vec<String>>,
    /// Exporter (partner) column candidates
    pub exporter: Option<Vec<String>>,
    /// Year column candidates
    pub year: Option<Vec<String>>,
    /// Value column candidates
    pub value: Option<Vec<String>>,
    /// Commodity column candidates
    pub commodity: Option<Vec<String>>,
    /// Flow column candidates
    pub flow: Option<Vec<String>>,
}

impl SchemaSection {
    fn overrides(&self) -> [(ColumnRole, Option<&Vec<String>>); 6] {
        [
            (ColumnRole::Importer, self.importer.as_ref()),
            (ColumnRole::Exporter, self.exporter.as_ref()),
            (ColumnRole::Year, self.year.as_ref()),
            (ColumnRole::Value, self.value.as_ref()),
            (ColumnRole::Commodity, self.commodity.as_ref()),
            (ColumnRole::Flow, self.flow.as_ref()),
        ]
    }

    /// Built-in role configuration with these overrides applied.
    pub fn to_schema_config(&self) -> SchemaConfig {
        self.overrides()
            .into_iter()
            .fold(SchemaConfig::default(), |schema, (role, candidates)| match candidates {
                Some(candidates) => schema.with_candidates(role, candidates.iter().cloned()),
                None => schema,
            })
    }
}

/// One `top-k share > threshold` clause.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct ConcentrationClause {
    /// Number of partners
    pub k: usize,
    /// Cumulative share that must be exceeded
    pub share: f64,
}

/// Dependency settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DependencySection {
    /// Partners in the top-K concentration
    pub top_k: usize,
    /// Concentration rule, any clause flags a subject
    pub concentration: Vec<ConcentrationClause>,
    /// Minimum keyword-matched share reported by sector exposure
    pub keyword_min_share: f64,
}

impl Default for DependencySection {
    fn default() -> Self {
        Self {
            top_k: trade_risk::DEFAULT_TOP_K,
            concentration: ConcentrationRule::default()
                .clauses()
                .iter()
                .map(|&(k, share)| ConcentrationClause { k, share })
                .collect(),
            keyword_min_share: 0.1,
        }
    }
}

impl DependencySection {
    /// Concentration rule built from the configured clauses.
    pub fn rule(&self) -> Result<ConcentrationRule, trade_risk::DependencyError> {
        ConcentrationRule::new(self.concentration.iter().map(|c| (c.k, c.share)).collect())
    }
}

/// How ban losses are attributed to matched partners.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttributionSetting {
    /// Whole top-K share when any partner matches
    #[default]
    EqualSplitMatched,
    /// Sum of the matched partners' own shares
    ActualShare,
    /// Top-K share divided by `divisor` per matched partner
    FixedDivisor,
}

/// Shock and ban settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShockSection {
    /// Reduction applied by custom shocks
    pub reduction: f64,
    /// Lost fraction above which a subject is CRITICAL
    pub critical: f64,
    /// Lost fraction above which a subject is HIGH
    pub high: f64,
    /// Ban attribution policy
    pub attribution: AttributionSetting,
    /// Divisor for `fixed_divisor` attribution
    pub divisor: usize,
}

impl Default for ShockSection {
    fn default() -> Self {
        let thresholds = RiskThresholds::default();
        Self {
            reduction: 0.25,
            critical: thresholds.critical(),
            high: thresholds.high(),
            attribution: AttributionSetting::default(),
            divisor: 3,
        }
    }
}

impl ShockSection {
    /// Risk tier thresholds.
    pub fn thresholds(&self) -> Result<RiskThresholds, trade_risk::ShockError> {
        RiskThresholds::new(self.critical, self.high)
    }

    /// Attribution policy.
    pub fn policy(&self) -> AttributionPolicy {
        match self.attribution {
            AttributionSetting::EqualSplitMatched => AttributionPolicy::EqualSplitMatched,
            AttributionSetting::ActualShare => AttributionPolicy::ActualShare,
            AttributionSetting::FixedDivisor => AttributionPolicy::FixedDivisor(self.divisor),
        }
    }
}

/// Network settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkSection {
    /// Countries kept in the graph
    pub top_n: usize,
    /// Most central countries labelled in the view
    pub labelled: usize,
    /// Shortest-path cost derived from edge value
    pub edge_cost: EdgeCost,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            top_n: trade_network::DEFAULT_TOP_N,
            labelled: trade_network::DEFAULT_LABELLED,
            edge_cost: EdgeCost::default(),
        }
    }
}

impl NetworkSection {
    /// Centrality settings with normalised betweenness.
    pub fn centrality(&self) -> CentralityConfig {
        CentralityConfig {
            edge_cost: self.edge_cost,
            ..CentralityConfig::default()
        }
    }
}

/// Analysis configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Column candidates
    #[serde(default)]
    pub schema: SchemaSection,

    /// Dependency settings
    #[serde(default)]
    pub dependency: DependencySection,

    /// Shock and ban settings
    #[serde(default)]
    pub shocks: ShockSection,

    /// Network settings
    #[serde(default)]
    pub network: NetworkSection,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            schema: SchemaSection::default(),
            dependency: DependencySection::default(),
            shocks: ShockSection::default(),
            network: NetworkSection::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment variable overrides
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let parse = |var: &'static str, value: String| {
            value
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::Env { var, value })
        };

        if let Some(value) = lookup("TRADENET_TOP_N") {
            self.network.top_n = parse("TRADENET_TOP_N", value)?;
        }
        if let Some(value) = lookup("TRADENET_TOP_K") {
            self.dependency.top_k = parse("TRADENET_TOP_K", value)?;
        }
        if let Some(value) = lookup("TRADENET_LOG_LEVEL") {
            self.log_level = value;
        }
        Ok(self)
    }

    /// Validate the configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log_level '{}'. Valid values: {:?}",
                self.log_level, VALID_LOG_LEVELS
            ));
        }

        for (role, candidates) in self.schema.overrides() {
            if candidates.is_some_and(|c| c.is_empty()) {
                errors.push(format!("schema.{} has no candidates", role.name().to_lowercase()));
            }
        }

        if self.dependency.top_k == 0 {
            errors.push("dependency.top_k must be greater than 0".to_string());
        }
        if let Err(err) = self.dependency.rule() {
            errors.push(format!("dependency.concentration: {}", err));
        }
        if !(0.0..=1.0).contains(&self.dependency.keyword_min_share) {
            errors.push(format!(
                "dependency.keyword_min_share {} must lie in [0, 1]",
                self.dependency.keyword_min_share
            ));
        }

        if !(0.0..=1.0).contains(&self.shocks.reduction) {
            errors.push(format!(
                "shocks.reduction {} must lie in [0, 1]",
                self.shocks.reduction
            ));
        }
        if let Err(err) = self.shocks.thresholds() {
            errors.push(format!("shocks: {}", err));
        }
        if self.shocks.attribution == AttributionSetting::FixedDivisor && self.shocks.divisor == 0 {
            errors.push("shocks.divisor must be greater than 0".to_string());
        }

        if self.network.top_n == 0 {
            errors.push("network.top_n must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load from file with environment overrides and validate
    pub fn load_with_env_and_validate(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?.with_env_override()?;
        config.validate()?;
        Ok(config)
    }
}
