//! Risk tiers for disruption ratios.

use crate::error::ShockError;
use std::fmt;

/// Severity of a disruption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RiskTier {
    /// Above the high threshold
    High,
    /// Above the critical threshold
    Critical,
}

impl RiskTier {
    /// Upper-case label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::High => "HIGH",
            RiskTier::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Lower bounds (exclusive) for each tier, as ratios in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RiskThresholds {
    critical: f64,
    high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical: 0.4,
            high: 0.2,
        }
    }
}

impl RiskThresholds {
    /// Create thresholds; requires `0 <= high <= critical <= 1`.
    pub fn new(critical: f64, high: f64) -> Result<Self, ShockError> {
        let valid = (0.0..=1.0).contains(&high) && (0.0..=1.0).contains(&critical) && high <= critical;
        if !valid {
            return Err(ShockError::InvalidThresholds { critical, high });
        }
        Ok(Self { critical, high })
    }

    /// Critical lower bound.
    pub fn critical(&self) -> f64 {
        self.critical
    }

    /// High lower bound.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Tier for `ratio`, or `None` when at or below the high threshold.
    pub fn classify(&self, ratio: f64) -> Option<RiskTier> {
        if ratio > self.critical {
            Some(RiskTier::Critical)
        } else if ratio > self.high {
            Some(RiskTier::High)
        } else {
            None
        }
    }
}
