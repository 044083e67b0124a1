//! Multi-partner ban scenarios.
//!
//! A ban removes a set of partners outright. For each subject, only the
//! banned partners among its top-K count, and the lost supply is attributed
//! according to an [`AttributionPolicy`].

use super::tier::{RiskThresholds, RiskTier};
use crate::dependency::{
    ConcentrationRule, DependencyIndex, PartnerShare, SubjectProfile, DEFAULT_TOP_K,
};
use crate::error::{DependencyError, ShockError};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// A named set of banned partners.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BanScenario<P: Ord> {
    name: String,
    banned: BTreeSet<P>,
}

impl<P: Ord> BanScenario<P> {
    /// Create a scenario; at least one partner must be banned.
    pub fn new<I, T>(name: impl Into<String>, banned: I) -> Result<Self, ShockError>
    where
        I: IntoIterator<Item = T>,
        T: Into<P>,
    {
        let name = name.into();
        let banned: BTreeSet<P> = banned.into_iter().map(Into::into).collect();
        if banned.is_empty() {
            return Err(ShockError::EmptyBan(name));
        }
        Ok(Self { name, banned })
    }

    /// Constructor for partner lists known to be non-empty.
    pub(crate) fn preset(name: impl Into<String>, banned: BTreeSet<P>) -> Self {
        Self {
            name: name.into(),
            banned,
        }
    }

    /// Scenario name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Banned partners.
    pub fn banned(&self) -> &BTreeSet<P> {
        &self.banned
    }
}

/// How lost supply is attributed to matched partners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AttributionPolicy {
    /// Each matched partner carries `top-K share / matched count`
    #[default]
    EqualSplitMatched,
    /// Each matched partner carries its own share
    ActualShare,
    /// Each matched partner carries `top-K share / d`
    FixedDivisor(usize),
}

impl AttributionPolicy {
    /// Lost fraction before capping.
    fn attribute<P>(&self, cumulative: f64, matched: &[&PartnerShare<P>]) -> f64 {
        let count = matched.len();
        match *self {
            AttributionPolicy::EqualSplitMatched => {
                if count == 0 {
                    0.0
                } else {
                    cumulative
                }
            }
            AttributionPolicy::ActualShare => matched.iter().map(|p| p.share).sum(),
            AttributionPolicy::FixedDivisor(d) => cumulative / d as f64 * count as f64,
        }
    }
}

/// Supply disruption for one subject.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Disruption<S, P> {
    /// Subject key
    pub subject: S,
    /// Banned partners found in the subject's top-K
    pub matched_partners: Vec<P>,
    /// Cumulative top-K share
    pub top_k_share: f64,
    /// Lost fraction, capped at 1.0
    pub disruption: f64,
    /// Severity
    pub tier: RiskTier,
}

/// Result of running one ban scenario.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BanOutcome<S, P> {
    /// Scenario name
    pub scenario: String,
    /// Subjects evaluated (after the concentration filter)
    pub evaluated: usize,
    /// Classified subjects, largest disruption first
    pub disruptions: Vec<Disruption<S, P>>,
}

impl<S, P> BanOutcome<S, P> {
    /// Subjects in the critical tier.
    pub fn critical(&self) -> impl Iterator<Item = &Disruption<S, P>> {
        self.disruptions
            .iter()
            .filter(|d| d.tier == RiskTier::Critical)
    }
}

/// Ban simulation parameters.
///
/// # Examples
///
/// ```
/// use trade_risk::shocks::{AttributionPolicy, BanSimulation};
///
/// let sim = BanSimulation::new()
///     .with_top_k(3)
///     .unwrap()
///     .with_policy(AttributionPolicy::ActualShare);
/// assert_eq!(sim.top_k(), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BanSimulation {
    top_k: usize,
    policy: AttributionPolicy,
    rule: Option<ConcentrationRule>,
    thresholds: RiskThresholds,
}

impl Default for BanSimulation {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            policy: AttributionPolicy::default(),
            rule: Some(ConcentrationRule::default()),
            thresholds: RiskThresholds::default(),
        }
    }
}

impl BanSimulation {
    /// Defaults: top-3, equal split, default concentration rule and tiers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set K for partner matching.
    pub fn with_top_k(mut self, top_k: usize) -> Result<Self, ShockError> {
        if top_k == 0 {
            return Err(DependencyError::InvalidTopK(top_k).into());
        }
        self.top_k = top_k;
        Ok(self)
    }

    /// Set the attribution policy.
    pub fn with_policy(mut self, policy: AttributionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validated variant of [`with_policy`](Self::with_policy).
    pub fn try_with_policy(self, policy: AttributionPolicy) -> Result<Self, ShockError> {
        if let AttributionPolicy::FixedDivisor(0) = policy {
            return Err(ShockError::InvalidDivisor(0));
        }
        Ok(self.with_policy(policy))
    }

    /// Only evaluate subjects flagged by `rule`.
    pub fn with_rule(mut self, rule: ConcentrationRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Evaluate every subject, flagged or not.
    pub fn all_subjects(mut self) -> Self {
        self.rule = None;
        self
    }

    /// Set tier thresholds.
    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// K for partner matching.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Attribution policy.
    pub fn policy(&self) -> AttributionPolicy {
        self.policy
    }

    /// Tier thresholds.
    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Run one scenario against `index`.
    pub fn run<S, P>(
        &self,
        index: &DependencyIndex<S, P>,
        scenario: &BanScenario<P>,
    ) -> Result<BanOutcome<S, P>, ShockError>
    where
        S: Ord + Clone,
        P: Ord + Clone,
    {
        if let AttributionPolicy::FixedDivisor(d) = self.policy {
            if d == 0 {
                return Err(ShockError::InvalidDivisor(d));
            }
            warn!(divisor = d, "Fixed-divisor attribution does not reflect actual partner shares");
        }

        let candidates: Vec<&SubjectProfile<S, P>> = index
            .profiles()
            .filter(|profile| {
                self.rule
                    .as_ref()
                    .map_or(true, |rule| rule.is_concentrated(profile))
            })
            .collect();

        let mut disruptions: Vec<Disruption<S, P>> = candidates
            .iter()
            .filter_map(|profile| self.evaluate(profile, scenario))
            .collect();

        disruptions.sort_by(|a, b| {
            b.disruption
                .total_cmp(&a.disruption)
                .then_with(|| a.subject.cmp(&b.subject))
        });

        info!(
            scenario = scenario.name(),
            evaluated = candidates.len(),
            at_risk = disruptions.len(),
            "Ran ban scenario"
        );

        Ok(BanOutcome {
            scenario: scenario.name.clone(),
            evaluated: candidates.len(),
            disruptions,
        })
    }

    fn evaluate<S, P>(
        &self,
        profile: &SubjectProfile<S, P>,
        scenario: &BanScenario<P>,
    ) -> Option<Disruption<S, P>>
    where
        S: Ord + Clone,
        P: Ord + Clone,
    {
        let top = &profile.partners[..self.top_k.min(profile.partners.len())];
        let matched: Vec<_> = top
            .iter()
            .filter(|p| scenario.banned.contains(&p.partner))
            .collect();
        if matched.is_empty() {
            return None;
        }

        let cumulative: f64 = top.iter().map(|p| p.share).sum();
        let disruption = self.policy.attribute(cumulative, &matched).min(1.0);
        let tier = self.thresholds.classify(disruption)?;
        debug!(
            matched = matched.len(),
            disruption,
            tier = tier.label(),
            "Subject disrupted"
        );

        Some(Disruption {
            subject: profile.subject.clone(),
            matched_partners: matched.iter().map(|p| p.partner.clone()).collect(),
            top_k_share: cumulative,
            disruption,
            tier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // X: a 0.5, b 0.3, c 0.2
    // Y: a..h 0.125 each (not concentrated)
    // Z: c 0.9, d 0.1
    fn index() -> DependencyIndex<&'static str, &'static str> {
        DependencyIndex::from_flows(vec![
            ("X", "a", 50.0),
            ("X", "b", 30.0),
            ("X", "c", 20.0),
            ("Y", "a", 12.5),
            ("Y", "b", 12.5),
            ("Y", "c", 12.5),
            ("Y", "d", 12.5),
            ("Y", "e", 12.5),
            ("Y", "f", 12.5),
            ("Y", "g", 12.5),
            ("Y", "h", 12.5),
            ("Z", "c", 90.0),
            ("Z", "d", 10.0),
        ])
    }

    fn ban(partners: &[&'static str]) -> BanScenario<&'static str> {
        BanScenario::new("test", partners.iter().copied()).unwrap()
    }

    #[test]
    fn test_equal_split_uses_top_k_share() {
        let outcome = BanSimulation::new().run(&index(), &ban(&["a"])).unwrap();
        assert_eq!(outcome.evaluated, 2);
        assert_eq!(outcome.disruptions.len(), 1);
        let x = &outcome.disruptions[0];
        assert_eq!(x.subject, "X");
        assert_relative_eq!(x.disruption, 1.0);
        assert_eq!(x.tier, RiskTier::Critical);
    }

    #[test]
    fn test_actual_share_policy() {
        let outcome = BanSimulation::new()
            .with_policy(AttributionPolicy::ActualShare)
            .run(&index(), &ban(&["b", "d"]))
            .unwrap();
        // X loses 0.3 (HIGH); Z loses 0.1 (unclassified).
        assert_eq!(outcome.disruptions.len(), 1);
        assert_relative_eq!(outcome.disruptions[0].disruption, 0.3);
        assert_eq!(outcome.disruptions[0].tier, RiskTier::High);
    }

    #[test]
    fn test_fixed_divisor_matches_legacy() {
        let outcome = BanSimulation::new()
            .with_policy(AttributionPolicy::FixedDivisor(3))
            .run(&index(), &ban(&["a", "c"]))
            .unwrap();
        // X: 1.0 / 3 * 2; Z: 1.0 / 3 * 1.
        let x = outcome.disruptions.iter().find(|d| d.subject == "X").unwrap();
        let z = outcome.disruptions.iter().find(|d| d.subject == "Z").unwrap();
        assert_relative_eq!(x.disruption, 2.0 / 3.0);
        assert_relative_eq!(z.disruption, 1.0 / 3.0);
        assert_eq!(z.tier, RiskTier::High);
        assert_eq!(outcome.critical().count(), 1);
    }

    #[test]
    fn test_all_subjects_includes_unflagged() {
        let outcome = BanSimulation::new()
            .all_subjects()
            .with_policy(AttributionPolicy::ActualShare)
            .run(&index(), &ban(&["a", "b"]))
            .unwrap();
        assert_eq!(outcome.evaluated, 3);
        let subjects: Vec<&str> = outcome.disruptions.iter().map(|d| d.subject).collect();
        assert_eq!(subjects, vec!["X", "Y"]);
        assert_relative_eq!(outcome.disruptions[1].disruption, 0.25);
    }

    #[test]
    fn test_partner_outside_top_k_not_matched() {
        let outcome = BanSimulation::new()
            .all_subjects()
            .with_top_k(1)
            .unwrap()
            .run(&index(), &ban(&["d"]))
            .unwrap();
        assert!(outcome.disruptions.is_empty());
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            BanScenario::<&str>::new("empty", Vec::<&str>::new()).unwrap_err(),
            ShockError::EmptyBan("empty".to_string())
        );
        assert!(BanSimulation::new().with_top_k(0).is_err());
        assert_eq!(
            BanSimulation::new()
                .try_with_policy(AttributionPolicy::FixedDivisor(0))
                .unwrap_err(),
            ShockError::InvalidDivisor(0)
        );
        let err = BanSimulation::new()
            .with_policy(AttributionPolicy::FixedDivisor(0))
            .run(&index(), &ban(&["a"]))
            .unwrap_err();
        assert_eq!(err, ShockError::InvalidDivisor(0));
    }
}
