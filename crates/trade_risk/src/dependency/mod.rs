//! Dependency index engine.
//!
//! Computes, for every subject, the share each partner contributes to the
//! subject's total, then answers top-1 (Trade Dependency Index), top-K and
//! concentration questions from the same table.
//!
//! ## Keys
//!
//! The engine is generic over subject and partner keys. Country-to-country
//! analysis uses `CountryCode` for both; commodity exposure uses a commodity
//! description as the partner.
//!
//! ## Invariants
//!
//! - For every subject with a positive total, shares sum to 1
//! - Partners are ordered by share descending, then partner ascending
//! - Subjects whose total is zero are listed in `excluded_subjects`, never
//!   reported with a NaN share

mod keyword;

pub use keyword::{commodity_index, keyword_exposure, KeywordExposure, SubjectSide};

use crate::error::DependencyError;
use std::collections::BTreeMap;
use trade_core::flows::FlowSnapshot;
use trade_core::types::CountryCode;
use tracing::debug;

/// Default K for top-K concentration.
pub const DEFAULT_TOP_K: usize = 3;

/// One partner's contribution to a subject.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PartnerShare<P> {
    /// Partner key
    pub partner: P,
    /// Summed value from this partner
    pub value: f64,
    /// `value / subject total`, within [0, 1]
    pub share: f64,
}

/// Flattened `(subject, partner, share)` row.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DependencyShare<S, P> {
    /// Subject key
    pub subject: S,
    /// Partner key
    pub partner: P,
    /// Partner's share of the subject total
    pub share: f64,
}

/// Cumulative share of a subject's K largest partners.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TopKConcentration<P> {
    /// Requested K
    pub k: usize,
    /// Up to K partners, largest first
    pub partners: Vec<P>,
    /// Sum of their shares
    pub cumulative_share: f64,
}

/// All partner shares for one subject.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SubjectProfile<S, P> {
    /// Subject key
    pub subject: S,
    /// Sum over all partners
    pub total: f64,
    /// Partners ordered by share descending, partner ascending
    pub partners: Vec<PartnerShare<P>>,
}

impl<S, P: Clone + PartialEq> SubjectProfile<S, P> {
    /// Largest partner, ties broken by the smaller partner key.
    pub fn top_partner(&self) -> Option<&PartnerShare<P>> {
        self.partners.first()
    }

    /// The K largest partners and their cumulative share.
    pub fn top_k(&self, k: usize) -> TopKConcentration<P> {
        let top = &self.partners[..k.min(self.partners.len())];
        TopKConcentration {
            k,
            partners: top.iter().map(|p| p.partner.clone()).collect(),
            cumulative_share: top.iter().map(|p| p.share).sum(),
        }
    }

    /// Lookup a single partner.
    pub fn partner(&self, partner: &P) -> Option<&PartnerShare<P>> {
        self.partners.iter().find(|p| &p.partner == partner)
    }
}

/// Top-1 partner row: the Trade Dependency Index when subjects are exporters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TradeDependency<S, P> {
    /// Subject key
    pub subject: S,
    /// Largest partner
    pub top_partner: P,
    /// Value from the largest partner
    pub partner_value: f64,
    /// Subject total
    pub subject_total: f64,
    /// Largest partner's share (the index)
    pub index: f64,
}

/// Concentration rule: flag a subject when any top-K clause is exceeded.
///
/// The default flags when the top-2 share exceeds 0.5 or the top-3 share
/// exceeds 0.6.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConcentrationRule {
    clauses: Vec<(usize, f64)>,
}

impl Default for ConcentrationRule {
    fn default() -> Self {
        Self {
            clauses: vec![(2, 0.5), (3, 0.6)],
        }
    }
}

impl ConcentrationRule {
    /// Build a rule from `(k, threshold)` clauses joined by OR.
    pub fn new(clauses: Vec<(usize, f64)>) -> Result<Self, DependencyError> {
        if clauses.is_empty() {
            return Err(DependencyError::EmptyRule);
        }
        for &(k, threshold) in &clauses {
            if k == 0 {
                return Err(DependencyError::InvalidTopK(k));
            }
            if !(0.0..=1.0).contains(&threshold) {
                return Err(DependencyError::InvalidThreshold(threshold));
            }
        }
        Ok(Self { clauses })
    }

    /// `(k, threshold)` clauses.
    pub fn clauses(&self) -> &[(usize, f64)] {
        &self.clauses
    }

    /// Largest K named by any clause.
    pub fn max_k(&self) -> usize {
        self.clauses.iter().map(|(k, _)| *k).max().unwrap_or(DEFAULT_TOP_K)
    }

    /// Check a profile against every clause.
    pub fn is_concentrated<S, P: Clone + PartialEq>(&self, profile: &SubjectProfile<S, P>) -> bool {
        self.clauses
            .iter()
            .any(|&(k, threshold)| profile.top_k(k).cumulative_share > threshold)
    }
}

/// A subject flagged by a [`ConcentrationRule`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConcentrationFlag<S, P> {
    /// Subject key
    pub subject: S,
    /// Subject total
    pub total: f64,
    /// Largest partners up to the rule's max K
    pub top_partners: Vec<PartnerShare<P>>,
    /// Cumulative share for every K in the rule, ascending K
    pub cumulative: Vec<(usize, f64)>,
}

impl<S, P> ConcentrationFlag<S, P> {
    /// Cumulative share for a given K, if the rule named it.
    pub fn cumulative_share(&self, k: usize) -> Option<f64> {
        self.cumulative.iter().find(|(kk, _)| *kk == k).map(|(_, s)| *s)
    }
}

/// Partner shares for every subject.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DependencyIndex<S: Ord, P> {
    profiles: BTreeMap<S, SubjectProfile<S, P>>,
    excluded: Vec<S>,
}

impl<S: Ord + Clone, P: Ord + Clone> DependencyIndex<S, P> {
    /// Build from `(subject, partner, value)` triples.
    ///
    /// Duplicate pairs are summed. Non-finite or negative values are ignored.
    pub fn from_flows<I>(flows: I) -> Self
    where
        I: IntoIterator<Item = (S, P, f64)>,
    {
        let mut grouped: BTreeMap<S, BTreeMap<P, f64>> = BTreeMap::new();
        let mut ignored = 0usize;
        for (subject, partner, value) in flows {
            if !value.is_finite() || value < 0.0 {
                ignored += 1;
                continue;
            }
            *grouped.entry(subject).or_default().entry(partner).or_insert(0.0) += value;
        }

        let mut profiles = BTreeMap::new();
        let mut excluded = Vec::new();
        for (subject, partners) in grouped {
            let total: f64 = partners.values().sum();
            if total <= 0.0 {
                excluded.push(subject);
                continue;
            }
            let mut shares: Vec<PartnerShare<P>> = partners
                .into_iter()
                .map(|(partner, value)| PartnerShare {
                    partner,
                    value,
                    share: value / total,
                })
                .collect();
            shares.sort_by(|a, b| {
                b.share
                    .total_cmp(&a.share)
                    .then_with(|| a.partner.cmp(&b.partner))
            });
            profiles.insert(
                subject.clone(),
                SubjectProfile {
                    subject,
                    total,
                    partners: shares,
                },
            );
        }

        debug!(
            subjects = profiles.len(),
            excluded = excluded.len(),
            ignored,
            "Built dependency index"
        );

        Self { profiles, excluded }
    }

    /// Profile for one subject.
    pub fn profile(&self, subject: &S) -> Option<&SubjectProfile<S, P>> {
        self.profiles.get(subject)
    }

    /// All profiles, ordered by subject.
    pub fn profiles(&self) -> impl Iterator<Item = &SubjectProfile<S, P>> {
        self.profiles.values()
    }

    /// Subjects dropped because their total was zero.
    pub fn excluded_subjects(&self) -> &[S] {
        &self.excluded
    }

    /// Number of subjects with a defined share.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if no subject has a defined share.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Share of `partner` in `subject`'s total.
    pub fn share(&self, subject: &S, partner: &P) -> Option<f64> {
        self.profile(subject)?.partner(partner).map(|p| p.share)
    }

    /// Every `(subject, partner, share)` row.
    pub fn shares(&self) -> impl Iterator<Item = DependencyShare<S, P>> + '_ {
        self.profiles.values().flat_map(|profile| {
            profile.partners.iter().map(move |p| DependencyShare {
                subject: profile.subject.clone(),
                partner: p.partner.clone(),
                share: p.share,
            })
        })
    }

    /// Top-1 partner per subject, ranked by share descending then subject.
    pub fn dependency_index(&self) -> Vec<TradeDependency<S, P>> {
        let mut rows: Vec<TradeDependency<S, P>> = self
            .profiles
            .values()
            .filter_map(|profile| {
                profile.top_partner().map(|top| TradeDependency {
                    subject: profile.subject.clone(),
                    top_partner: top.partner.clone(),
                    partner_value: top.value,
                    subject_total: profile.total,
                    index: top.share,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.index.total_cmp(&a.index).then_with(|| a.subject.cmp(&b.subject)));
        rows
    }

    /// Top-K concentration for every subject, ordered by subject.
    pub fn top_k(&self, k: usize) -> Result<Vec<(S, TopKConcentration<P>)>, DependencyError> {
        if k == 0 {
            return Err(DependencyError::InvalidTopK(k));
        }
        Ok(self
            .profiles
            .values()
            .map(|profile| (profile.subject.clone(), profile.top_k(k)))
            .collect())
    }

    /// Subjects matching `rule`, most concentrated first.
    ///
    /// Ranking uses the cumulative share at the rule's largest K, ties broken
    /// by subject.
    pub fn flag_concentrated(&self, rule: &ConcentrationRule) -> Vec<ConcentrationFlag<S, P>> {
        let max_k = rule.max_k();
        let mut ks: Vec<usize> = rule.clauses().iter().map(|(k, _)| *k).collect();
        ks.sort_unstable();
        ks.dedup();

        let mut flags: Vec<ConcentrationFlag<S, P>> = self
            .profiles
            .values()
            .filter(|profile| rule.is_concentrated(profile))
            .map(|profile| ConcentrationFlag {
                subject: profile.subject.clone(),
                total: profile.total,
                top_partners: profile.partners.iter().take(max_k).cloned().collect(),
                cumulative: ks.iter().map(|&k| (k, profile.top_k(k).cumulative_share)).collect(),
            })
            .collect();

        flags.sort_by(|a, b| {
            let a_share = a.cumulative_share(max_k).unwrap_or(0.0);
            let b_share = b.cumulative_share(max_k).unwrap_or(0.0);
            b_share
                .total_cmp(&a_share)
                .then_with(|| a.subject.cmp(&b.subject))
        });
        flags
    }
}

impl DependencyIndex<CountryCode, CountryCode> {
    /// Export dependency: subject is the exporter, partner the importer.
    pub fn exports(snapshot: &FlowSnapshot) -> Self {
        Self::from_flows(snapshot.export_flows())
    }

    /// Import dependency: subject is the importer, partner the exporter.
    pub fn imports(snapshot: &FlowSnapshot) -> Self {
        Self::from_flows(snapshot.import_flows())
    }

    /// Export or import dependency depending on `side`.
    pub fn for_side(snapshot: &FlowSnapshot, side: SubjectSide) -> Self {
        match side {
            SubjectSide::Exporter => Self::exports(snapshot),
            SubjectSide::Importer => Self::imports(snapshot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn code(s: &str) -> CountryCode {
        CountryCode::new(s)
    }

    fn abc_snapshot() -> FlowSnapshot {
        FlowSnapshot::from_flows(2023, vec![("A", "B", 100.0), ("A", "C", 50.0), ("B", "C", 30.0)])
    }

    #[test]
    fn test_export_shares() {
        let index = DependencyIndex::exports(&abc_snapshot());
        assert_relative_eq!(index.share(&code("A"), &code("B")).unwrap(), 100.0 / 150.0);
        assert_relative_eq!(index.share(&code("A"), &code("C")).unwrap(), 50.0 / 150.0);
        assert_relative_eq!(index.share(&code("B"), &code("C")).unwrap(), 1.0);
    }

    #[test]
    fn test_top_partner() {
        let index = DependencyIndex::exports(&abc_snapshot());
        let top = index.profile(&code("A")).unwrap().top_partner().unwrap();
        assert_eq!(top.partner, code("B"));
        assert_relative_eq!(top.share, 0.6666666666666666, epsilon = 1e-12);
    }

    #[test]
    fn test_tie_break_prefers_smaller_partner() {
        let index = DependencyIndex::from_flows(vec![
            ("X", "ZZZ", 10.0),
            ("X", "AAA", 10.0),
            ("X", "MMM", 10.0),
        ]);
        let profile = index.profile(&"X").unwrap();
        let order: Vec<&str> = profile.partners.iter().map(|p| p.partner).collect();
        assert_eq!(order, vec!["AAA", "MMM", "ZZZ"]);
        assert_eq!(profile.top_partner().unwrap().partner, "AAA");
    }

    #[test]
    fn test_zero_total_subject_excluded() {
        let index = DependencyIndex::from_flows(vec![("X", "A", 0.0), ("Y", "A", 5.0)]);
        assert!(index.profile(&"X").is_none());
        assert_eq!(index.excluded_subjects(), &["X"]);
        assert_eq!(index.len(), 1);
        assert!(index.shares().all(|s| s.share.is_finite()));
    }

    #[test]
    fn test_negative_values_ignored() {
        let index = DependencyIndex::from_flows(vec![("X", "A", -5.0), ("X", "B", 5.0)]);
        assert_relative_eq!(index.share(&"X", &"B").unwrap(), 1.0);
        assert!(index.share(&"X", &"A").is_none());
    }

    #[test]
    fn test_dependency_index_ranking() {
        let index = DependencyIndex::exports(&abc_snapshot());
        let rows = index.dependency_index();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].subject, code("B"));
        assert_relative_eq!(rows[0].index, 1.0);
        assert_eq!(rows[1].subject, code("A"));
        assert_eq!(rows[1].top_partner, code("B"));
        assert_relative_eq!(rows[1].subject_total, 150.0);
    }

    #[test]
    fn test_top_k_shorter_than_k() {
        let index = DependencyIndex::exports(&abc_snapshot());
        let top = index.profile(&code("A")).unwrap().top_k(3);
        assert_eq!(top.partners, vec![code("B"), code("C")]);
        assert_relative_eq!(top.cumulative_share, 1.0);
    }

    #[test]
    fn test_top_k_zero_rejected() {
        let index = DependencyIndex::exports(&abc_snapshot());
        assert_eq!(index.top_k(0).unwrap_err(), DependencyError::InvalidTopK(0));
    }

    #[test]
    fn test_import_orientation() {
        let index = DependencyIndex::imports(&abc_snapshot());
        let c = index.profile(&code("C")).unwrap();
        assert_relative_eq!(c.total, 80.0);
        assert_eq!(c.top_partner().unwrap().partner, code("A"));
        assert_relative_eq!(c.top_partner().unwrap().share, 50.0 / 80.0);
    }

    #[test]
    fn test_concentration_rule_default_flags() {
        // P: top-2 = 0.4 + 0.3 = 0.7 > 0.5 -> flagged
        // Q: top-2 = 0.25 + 0.25 = 0.5, top-3 = 0.75 > 0.6 -> flagged
        // R: top-2 = 0.5, top-3 = 0.5625 -> not flagged (strict)
        let index = DependencyIndex::from_flows(vec![
            ("P", "a", 40.0),
            ("P", "b", 30.0),
            ("P", "c", 30.0),
            ("Q", "a", 25.0),
            ("Q", "b", 25.0),
            ("Q", "c", 25.0),
            ("Q", "d", 25.0),
            ("R", "a", 25.0),
            ("R", "b", 25.0),
            ("R", "c", 6.25),
            ("R", "d", 6.25),
            ("R", "e", 6.25),
            ("R", "f", 6.25),
            ("R", "g", 6.25),
            ("R", "h", 6.25),
            ("R", "i", 6.25),
            ("R", "j", 6.25),
        ]);
        let flags = index.flag_concentrated(&ConcentrationRule::default());
        let subjects: Vec<&str> = flags.iter().map(|f| f.subject).collect();
        assert_eq!(subjects, vec!["P", "Q"]);
        assert_relative_eq!(flags[0].cumulative_share(3).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(flags[1].cumulative_share(2).unwrap(), 0.5);
        assert_eq!(flags[0].top_partners.len(), 3);
    }

    #[test]
    fn test_concentration_rule_validation() {
        assert_eq!(ConcentrationRule::new(vec![]), Err(DependencyError::EmptyRule));
        assert_eq!(
            ConcentrationRule::new(vec![(0, 0.5)]),
            Err(DependencyError::InvalidTopK(0))
        );
        assert_eq!(
            ConcentrationRule::new(vec![(2, 1.5)]),
            Err(DependencyError::InvalidThreshold(1.5))
        );
        assert_eq!(ConcentrationRule::new(vec![(1, 0.9)]).unwrap().max_k(), 1);
    }
}
