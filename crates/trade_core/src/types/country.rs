//! Country identifier type.
//!
//! Country codes arrive from heterogeneous sources with inconsistent case and
//! stray whitespace. `CountryCode` normalises on construction so that every
//! grouping, comparison and tie-break downstream operates on one spelling.

use std::fmt;

/// Normalised country identifier (trimmed, uppercase).
///
/// Ordering is lexicographic on the normalised code, which is the tie-break
/// rule used by every ranking in the workspace.
///
/// # Examples
///
/// ```
/// use trade_core::types::CountryCode;
///
/// let code = CountryCode::new("  chn ");
/// assert_eq!(code.as_str(), "CHN");
/// assert!(CountryCode::new("ARG") < CountryCode::new("BRA"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CountryCode(String);

impl CountryCode {
    /// Creates a country code, trimming whitespace and uppercasing.
    #[inline]
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    /// Returns the code as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the normalised code is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for CountryCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CountryCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for CountryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_and_uppercases() {
        assert_eq!(CountryCode::new(" usa\t").as_str(), "USA");
    }

    #[test]
    fn test_equal_after_normalisation() {
        assert_eq!(CountryCode::from("deu"), CountryCode::from("DEU "));
    }

    #[test]
    fn test_blank_is_empty() {
        assert!(CountryCode::new("   ").is_empty());
    }

    #[test]
    fn test_display_respects_width() {
        let code = CountryCode::new("fra");
        assert_eq!(format!("{:<5}|", code), "FRA  |");
    }
}
