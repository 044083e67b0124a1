//! Explicit empty results.
//!
//! A filter that leaves nothing to aggregate (no agricultural rows, a target
//! year with no data) is not an error: the analysis returns
//! [`Outcome::Empty`] and the caller decides what to do before any share
//! computation can divide by zero.

use thiserror::Error;
use tracing::warn;

/// Non-fatal warning carried by an empty analysis result.
///
/// # Examples
///
/// ```
/// use trade_core::types::EmptyResultWarning;
///
/// let warning = EmptyResultWarning::new("aggregate", "no records for year 2028");
/// assert_eq!(
///     warning.to_string(),
///     "Empty result at aggregate: no records for year 2028"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[error("Empty result at {stage}: {reason}")]
pub struct EmptyResultWarning {
    /// Analysis stage that produced no rows
    pub stage: String,
    /// Why the stage came back empty
    pub reason: String,
}

impl EmptyResultWarning {
    /// Create a warning.
    pub fn new(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            reason: reason.into(),
        }
    }
}

/// Result of an analysis that may legitimately be empty.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The analysis produced a value
    Ready(T),
    /// A filter left nothing to analyse
    Empty(EmptyResultWarning),
}

impl<T> Outcome<T> {
    /// Build an empty outcome and log the warning.
    pub fn empty(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        let warning = EmptyResultWarning::new(stage, reason);
        warn!(stage = %warning.stage, "{}", warning.reason);
        Outcome::Empty(warning)
    }

    /// Check if the outcome is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty(_))
    }

    /// Check if the outcome holds a value.
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    /// Get the value, discarding the warning.
    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::Empty(_) => None,
        }
    }

    /// Get the warning, if empty.
    pub fn warning(&self) -> Option<&EmptyResultWarning> {
        match self {
            Outcome::Ready(_) => None,
            Outcome::Empty(warning) => Some(warning),
        }
    }

    /// Borrow the contents.
    pub fn as_ref(&self) -> Outcome<&T> {
        match self {
            Outcome::Ready(value) => Outcome::Ready(value),
            Outcome::Empty(warning) => Outcome::Empty(warning.clone()),
        }
    }

    /// Transform the value, keeping an empty outcome empty.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Ready(value) => Outcome::Ready(f(value)),
            Outcome::Empty(warning) => Outcome::Empty(warning),
        }
    }

    /// Chain a further stage that may itself come back empty.
    pub fn and_then<U, F: FnOnce(T) -> Outcome<U>>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Ready(value) => f(value),
            Outcome::Empty(warning) => Outcome::Empty(warning),
        }
    }

    /// Treat emptiness as an error, for callers that cannot proceed without data.
    pub fn into_result(self) -> Result<T, EmptyResultWarning> {
        match self {
            Outcome::Ready(value) => Ok(value),
            Outcome::Empty(warning) => Err(warning),
        }
    }
}
