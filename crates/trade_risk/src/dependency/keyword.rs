//! Commodity keyword exposure.

use super::DependencyIndex;
use crate::error::DependencyError;
use trade_core::types::{CountryCode, Outcome, TradeRecord, TradeTable};
use tracing::debug;

/// Which side of a record is the subject of a commodity index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SubjectSide {
    /// Group by exporter: what a country sells
    #[default]
    Exporter,
    /// Group by importer: what a country buys
    Importer,
}

impl SubjectSide {
    fn subject(&self, record: &TradeRecord) -> CountryCode {
        match self {
            SubjectSide::Exporter => record.exporter.clone(),
            SubjectSide::Importer => record.importer.clone(),
        }
    }
}

/// Country -> commodity index from records carrying a commodity.
///
/// Records without a commodity are skipped. Returns [`Outcome::Empty`] when
/// none remain.
pub fn commodity_index(
    table: &TradeTable,
    side: SubjectSide,
) -> Outcome<DependencyIndex<CountryCode, String>> {
    let flows: Vec<(CountryCode, String, f64)> = table
        .iter()
        .filter_map(|record| {
            record
                .commodity
                .as_ref()
                .map(|commodity| (side.subject(record), commodity.clone(), record.value))
        })
        .collect();

    if flows.is_empty() {
        return Outcome::empty("commodity_index", "no records carry a commodity description");
    }
    Outcome::Ready(DependencyIndex::from_flows(flows))
}

/// Share of a subject's total held by commodities matching a keyword list.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KeywordExposure<S> {
    /// Subject key
    pub subject: S,
    /// Summed value of matching commodities
    pub matched_value: f64,
    /// Cumulative share of matching commodities
    pub matched_share: f64,
    /// Matching commodities, largest first
    pub commodities: Vec<String>,
}

/// Subjects whose keyword-matched share exceeds `min_share`, largest first.
///
/// Matching is a case-insensitive substring test against each commodity.
pub fn keyword_exposure<S: Ord + Clone>(
    index: &DependencyIndex<S, String>,
    keywords: &[&str],
    min_share: f64,
) -> Result<Vec<KeywordExposure<S>>, DependencyError> {
    if !(0.0..=1.0).contains(&min_share) {
        return Err(DependencyError::InvalidThreshold(min_share));
    }
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    let mut rows: Vec<KeywordExposure<S>> = index
        .profiles()
        .filter_map(|profile| {
            let matched: Vec<_> = profile
                .partners
                .iter()
                .filter(|p| {
                    let commodity = p.partner.to_lowercase();
                    keywords.iter().any(|k| commodity.contains(k.as_str()))
                })
                .collect();
            if matched.is_empty() {
                return None;
            }
            Some(KeywordExposure {
                subject: profile.subject.clone(),
                matched_value: matched.iter().map(|p| p.value).sum(),
                matched_share: matched.iter().map(|p| p.share).sum(),
                commodities: matched.iter().map(|p| p.partner.clone()).collect(),
            })
        })
        .filter(|row| row.matched_share > min_share)
        .collect();

    rows.sort_by(|a, b| {
        b.matched_share
            .total_cmp(&a.matched_share)
            .then_with(|| a.subject.cmp(&b.subject))
    });
    debug!(subjects = rows.len(), min_share, "Computed keyword exposure");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn labour_table() -> TradeTable {
        TradeTable::new(vec![
            TradeRecord::new("USA", "VNM", 2023, 60.0).with_commodity("Footwear"),
            TradeRecord::new("USA", "VNM", 2023, 20.0).with_commodity("Textile yarn"),
            TradeRecord::new("USA", "VNM", 2023, 20.0).with_commodity("Electronics"),
            TradeRecord::new("USA", "DEU", 2023, 95.0).with_commodity("Vehicles"),
            TradeRecord::new("USA", "DEU", 2023, 5.0).with_commodity("Wooden furniture"),
            TradeRecord::new("USA", "JPN", 2023, 10.0),
        ])
    }

    #[test]
    fn test_commodity_index_groups_by_exporter() {
        let index = commodity_index(&labour_table(), SubjectSide::Exporter)
            .ready()
            .unwrap();
        let vnm = index.profile(&CountryCode::new("VNM")).unwrap();
        assert_relative_eq!(vnm.total, 100.0);
        assert_eq!(vnm.top_partner().unwrap().partner, "Footwear");
        assert!(index.profile(&CountryCode::new("JPN")).is_none());
    }

    #[test]
    fn test_commodity_index_without_commodities_is_empty() {
        let table = TradeTable::new(vec![TradeRecord::new("USA", "VNM", 2023, 1.0)]);
        assert!(commodity_index(&table, SubjectSide::Importer).is_empty());
    }

    #[test]
    fn test_keyword_exposure_threshold() {
        let index = commodity_index(&labour_table(), SubjectSide::Exporter)
            .ready()
            .unwrap();
        let rows = keyword_exposure(&index, &["textile", "FOOTWEAR", "furniture"], 0.1).unwrap();
        // DEU's furniture share is 0.05, below the threshold.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subject, CountryCode::new("VNM"));
        assert_relative_eq!(rows[0].matched_share, 0.8);
        assert_relative_eq!(rows[0].matched_value, 80.0);
        assert_eq!(rows[0].commodities, vec!["Footwear".to_string(), "Textile yarn".to_string()]);
    }

    #[test]
    fn test_keyword_exposure_invalid_threshold() {
        let index: DependencyIndex<&str, String> = DependencyIndex::from_flows(Vec::new());
        assert_eq!(
            keyword_exposure(&index, &["x"], -0.1),
            Err(DependencyError::InvalidThreshold(-0.1))
        );
    }
}
