//! Error types for dependency and shock analysis.
//!
//! Both enums reject parameters at construction time, so running an
//! analysis with validated parameters cannot fail.

use thiserror::Error;

/// Invalid parameters for the dependency index engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DependencyError {
    /// Top-K must keep at least one partner.
    #[error("Invalid top-K: {0} (must be at least 1)")]
    InvalidTopK(usize),

    /// Share thresholds live in [0, 1].
    #[error("Invalid share threshold: {0} (must be within [0, 1])")]
    InvalidThreshold(f64),

    /// A concentration rule needs at least one clause.
    #[error("Concentration rule has no clauses")]
    EmptyRule,
}

/// Invalid parameters for shock and ban scenarios.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShockError {
    /// Proportional reductions live in [0, 1].
    #[error("Invalid reduction: {0} (must be within [0, 1])")]
    InvalidReduction(f64),

    /// A fixed attribution divisor of zero would divide by zero.
    #[error("Invalid attribution divisor: {0} (must be at least 1)")]
    InvalidDivisor(usize),

    /// Tier thresholds must satisfy 0 <= high <= critical <= 1.
    #[error("Invalid risk thresholds: critical={critical}, high={high}")]
    InvalidThresholds {
        /// Critical tier lower bound
        critical: f64,
        /// High tier lower bound
        high: f64,
    },

    /// A ban scenario with no banned partners.
    #[error("Ban scenario '{0}' names no partners")]
    EmptyBan(String),

    /// Underlying dependency parameter error.
    #[error(transparent)]
    Dependency(#[from] DependencyError),
}
