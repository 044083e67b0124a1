//! Property tests for partner shares and proportional shocks.

use proptest::prelude::*;
use trade_core::flows::FlowSnapshot;
use trade_core::types::CountryCode;
use trade_risk::dependency::DependencyIndex;
use trade_risk::shocks::{ProportionalShock, ShockSimulator, ShockTarget};

const CODES: [&str; 6] = ["ARG", "BRA", "CHN", "DEU", "IND", "USA"];

fn flows_strategy() -> impl Strategy<Value = Vec<(&'static str, &'static str, f64)>> {
    prop::collection::vec(
        (0usize..6, 0usize..6, 0.0f64..1.0e9).prop_map(|(e, i, v)| (CODES[e], CODES[i], v)),
        1..60,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_shares_sum_to_one(flows in flows_strategy()) {
        let snapshot = FlowSnapshot::from_flows(2023, flows);
        let index = DependencyIndex::exports(&snapshot);

        for profile in index.profiles() {
            let total: f64 = profile.partners.iter().map(|p| p.share).sum();
            prop_assert!((total - 1.0).abs() <= 1e-9);
            prop_assert!(profile.partners.iter().all(|p| (0.0..=1.0).contains(&p.share)));
        }
        for subject in index.excluded_subjects() {
            prop_assert!(index.profile(subject).is_none());
        }
    }

    #[test]
    fn test_top_k_is_monotone(flows in flows_strategy()) {
        let snapshot = FlowSnapshot::from_flows(2023, flows);
        let index = DependencyIndex::imports(&snapshot);

        for profile in index.profiles() {
            let top1 = profile.top_k(1).cumulative_share;
            let top2 = profile.top_k(2).cumulative_share;
            let top3 = profile.top_k(3).cumulative_share;
            prop_assert!(top1 <= top2 + 1e-12);
            prop_assert!(top2 <= top3 + 1e-12);
            prop_assert!(top3 <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_shock_scales_with_reduction(flows in flows_strategy(), partner in 0usize..6) {
        let snapshot = FlowSnapshot::from_flows(2023, flows);
        let index = DependencyIndex::exports(&snapshot);
        let target: ShockTarget<CountryCode, CountryCode> = ShockTarget::partner(CODES[partner]);

        let zero = ProportionalShock::new("zero", target.clone(), 0.0).unwrap();
        for exposure in ShockSimulator::apply(&index, &zero).exposures {
            prop_assert_eq!(exposure.shock_value, 0.0);
            prop_assert_eq!(exposure.shock_pct_of_total, 0.0);
        }

        let full = ProportionalShock::new("full", target, 1.0).unwrap();
        for exposure in ShockSimulator::apply(&index, &full).exposures {
            prop_assert_eq!(exposure.shock_value, exposure.edge_value);
            prop_assert!(exposure.shock_pct_of_total <= 100.0 + 1e-9);
        }
    }
}
