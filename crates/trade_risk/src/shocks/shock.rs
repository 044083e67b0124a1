//! Proportional partner shocks.

use super::tier::{RiskThresholds, RiskTier};
use crate::dependency::{DependencyIndex, PartnerShare, SubjectProfile};
use crate::error::ShockError;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Which edges a shock hits.
#[derive(Clone, Debug, PartialEq)]
pub enum ShockTarget<S, P> {
    /// Every subject's edges to any of these partners
    Partners(BTreeSet<P>),
    /// Explicit `(subject, partner)` edges
    Pairs(BTreeSet<(S, P)>),
    /// Each subject's own largest partner
    TopPartner,
}

impl<S: Ord, P: Ord> ShockTarget<S, P> {
    /// Target a single partner.
    pub fn partner(partner: impl Into<P>) -> Self {
        ShockTarget::Partners(BTreeSet::from([partner.into()]))
    }

    /// Target several partners.
    pub fn partners<I, T>(partners: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<P>,
    {
        ShockTarget::Partners(partners.into_iter().map(Into::into).collect())
    }

    fn select<'a>(&self, profile: &'a SubjectProfile<S, P>) -> Vec<&'a PartnerShare<P>>
    where
        P: Clone,
    {
        match self {
            ShockTarget::Partners(set) => profile
                .partners
                .iter()
                .filter(|p| set.contains(&p.partner))
                .collect(),
            ShockTarget::Pairs(pairs) => profile
                .partners
                .iter()
                .filter(|p| {
                    pairs
                        .iter()
                        .any(|(s, partner)| s == &profile.subject && partner == &p.partner)
                })
                .collect(),
            ShockTarget::TopPartner => profile.top_partner().into_iter().collect(),
        }
    }
}

/// A named proportional reduction on a set of edges.
#[derive(Clone, Debug, PartialEq)]
pub struct ProportionalShock<S, P> {
    name: String,
    target: ShockTarget<S, P>,
    reduction: f64,
}

impl<S, P> ProportionalShock<S, P> {
    /// Create a shock; `reduction` must lie in [0, 1].
    pub fn new(
        name: impl Into<String>,
        target: ShockTarget<S, P>,
        reduction: f64,
    ) -> Result<Self, ShockError> {
        if !(0.0..=1.0).contains(&reduction) {
            return Err(ShockError::InvalidReduction(reduction));
        }
        Ok(Self::preset(name, target, reduction))
    }

    /// Constructor for reductions known to be in range.
    pub(crate) fn preset(name: impl Into<String>, target: ShockTarget<S, P>, reduction: f64) -> Self {
        Self {
            name: name.into(),
            target,
            reduction,
        }
    }

    /// Scenario name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Targeted edges.
    pub fn target(&self) -> &ShockTarget<S, P> {
        &self.target
    }

    /// Fraction removed from each targeted edge.
    pub fn reduction(&self) -> f64 {
        self.reduction
    }
}

/// One subject's exposure to a shock.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShockExposure<S, P> {
    /// Subject key
    pub subject: S,
    /// Partners hit, largest first
    pub partners: Vec<P>,
    /// Summed pre-shock value of the hit edges
    pub edge_value: f64,
    /// `reduction * edge_value`
    pub shock_value: f64,
    /// Subject total before the shock
    pub subject_total: f64,
    /// Combined share of the hit partners
    pub affected_share: f64,
    /// `100 * shock_value / subject_total`
    pub shock_pct_of_total: f64,
}

impl<S, P> ShockExposure<S, P> {
    /// Tier of the lost fraction of the subject total.
    pub fn tier(&self, thresholds: &RiskThresholds) -> Option<RiskTier> {
        thresholds.classify(self.shock_pct_of_total / 100.0)
    }
}

/// Exposures for every subject touched by a shock.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShockReport<S, P> {
    /// Scenario name
    pub scenario: String,
    /// Applied reduction
    pub reduction: f64,
    /// Affected subjects, largest percentage loss first
    pub exposures: Vec<ShockExposure<S, P>>,
}

impl<S, P> ShockReport<S, P> {
    /// Sum of shock values across subjects.
    pub fn total_shock_value(&self) -> f64 {
        self.exposures.iter().map(|e| e.shock_value).sum()
    }

    /// Check if no subject was touched.
    pub fn is_empty(&self) -> bool {
        self.exposures.is_empty()
    }
}

/// Applies proportional shocks to a dependency index.
pub struct ShockSimulator;

impl ShockSimulator {
    /// Compute the exposure of every subject with at least one targeted edge.
    ///
    /// Subjects are processed independently. The result is ordered by
    /// percentage of total lost, descending, then by subject.
    pub fn apply<S, P>(
        index: &DependencyIndex<S, P>,
        shock: &ProportionalShock<S, P>,
    ) -> ShockReport<S, P>
    where
        S: Ord + Clone,
        P: Ord + Clone,
    {
        let mut exposures: Vec<ShockExposure<S, P>> = index
            .profiles()
            .filter_map(|profile| {
                let hit = shock.target.select(profile);
                if hit.is_empty() {
                    return None;
                }
                let edge_value: f64 = hit.iter().map(|p| p.value).sum();
                let shock_value = shock.reduction * edge_value;
                Some(ShockExposure {
                    subject: profile.subject.clone(),
                    partners: hit.iter().map(|p| p.partner.clone()).collect(),
                    edge_value,
                    shock_value,
                    subject_total: profile.total,
                    affected_share: hit.iter().map(|p| p.share).sum(),
                    shock_pct_of_total: 100.0 * shock_value / profile.total,
                })
            })
            .collect();

        exposures.sort_by(|a, b| {
            b.shock_pct_of_total
                .total_cmp(&a.shock_pct_of_total)
                .then_with(|| a.subject.cmp(&b.subject))
        });

        info!(
            scenario = %shock.name,
            reduction = shock.reduction,
            affected = exposures.len(),
            "Applied proportional shock"
        );
        debug!(unaffected = index.len() - exposures.len(), "Subjects without targeted edges");

        ShockReport {
            scenario: shock.name.clone(),
            reduction: shock.reduction,
            exposures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use trade_core::flows::FlowSnapshot;
    use trade_core::types::CountryCode;

    type Shock = ProportionalShock<CountryCode, CountryCode>;

    fn code(s: &str) -> CountryCode {
        CountryCode::new(s)
    }

    fn abc_index() -> DependencyIndex<CountryCode, CountryCode> {
        let snapshot =
            FlowSnapshot::from_flows(2023, vec![("A", "B", 100.0), ("A", "C", 50.0), ("B", "C", 30.0)]);
        DependencyIndex::exports(&snapshot)
    }

    #[test]
    fn test_pair_shock_on_a_to_b() {
        let target = ShockTarget::Pairs(BTreeSet::from([(code("A"), code("B"))]));
        let shock = Shock::new("A->B -25%", target, 0.25).unwrap();
        let report = ShockSimulator::apply(&abc_index(), &shock);

        assert_eq!(report.exposures.len(), 1);
        let a = &report.exposures[0];
        assert_eq!(a.subject, code("A"));
        assert_relative_eq!(a.shock_value, 25.0);
        assert_relative_eq!(a.shock_pct_of_total, 16.666666666666668, epsilon = 1e-9);
    }

    #[test]
    fn test_partner_shock_applies_per_subject() {
        let shock = Shock::new("C -50%", ShockTarget::partner("C"), 0.5).unwrap();
        let report = ShockSimulator::apply(&abc_index(), &shock);

        let subjects: Vec<&str> = report.exposures.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(subjects, vec!["B", "A"]);
        assert_relative_eq!(report.exposures[0].shock_pct_of_total, 50.0);
        assert_relative_eq!(report.exposures[1].shock_value, 25.0);
        assert_relative_eq!(report.total_shock_value(), 40.0);
    }

    #[test]
    fn test_top_partner_shock() {
        let shock = Shock::new("collapse", ShockTarget::TopPartner, 0.4).unwrap();
        let report = ShockSimulator::apply(&abc_index(), &shock);
        let a = report.exposures.iter().find(|e| e.subject == code("A")).unwrap();
        assert_eq!(a.partners, vec![code("B")]);
        assert_relative_eq!(a.shock_value, 40.0);
    }

    #[test]
    fn test_full_and_zero_reduction() {
        let full = Shock::new("full", ShockTarget::partner("B"), 1.0).unwrap();
        let report = ShockSimulator::apply(&abc_index(), &full);
        assert_eq!(report.exposures[0].shock_value, report.exposures[0].edge_value);

        let none = Shock::new("none", ShockTarget::partner("B"), 0.0).unwrap();
        let report = ShockSimulator::apply(&abc_index(), &none);
        assert_eq!(report.exposures[0].shock_value, 0.0);
    }

    #[test]
    fn test_invalid_reduction() {
        assert_eq!(
            Shock::new("bad", ShockTarget::TopPartner, 1.01).unwrap_err(),
            ShockError::InvalidReduction(1.01)
        );
        assert!(Shock::new("bad", ShockTarget::TopPartner, f64::NAN).is_err());
    }

    #[test]
    fn test_unknown_partner_leaves_report_empty() {
        let shock = Shock::new("none", ShockTarget::partner("ZZZ"), 0.3).unwrap();
        assert!(ShockSimulator::apply(&abc_index(), &shock).is_empty());
    }

    #[test]
    fn test_exposure_tier() {
        let shock = Shock::new("collapse", ShockTarget::TopPartner, 1.0).unwrap();
        let report = ShockSimulator::apply(&abc_index(), &shock);
        let thresholds = RiskThresholds::default();
        // B loses all of its exports, A two thirds.
        assert!(report.exposures.iter().all(|e| e.tier(&thresholds) == Some(RiskTier::Critical)));
    }
}
