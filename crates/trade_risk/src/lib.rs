//! # Trade Risk (L2: Analytics)
//!
//! Partner dependency indices and shock scenarios over aggregated trade flows.
//!
//! This crate provides:
//! - Partner shares, Trade Dependency Index and top-K concentration
//! - Concentration flags from configurable top-K rules
//! - Commodity keyword exposure (agricultural, labour-intensive)
//! - Proportional partner shocks and multi-partner ban scenarios
//! - Preset stress scenarios
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            trade_risk (L2)              │
//! ├─────────────────────────────────────────┤
//! │  dependency/ - Shares, TDI, top-K,      │
//! │                concentration, keywords  │
//! │  shocks/     - Proportional shocks,     │
//! │                bans, tiers, presets     │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │            trade_core (L1)              │
//! │  Records, flow snapshots, outcomes      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use trade_core::flows::FlowSnapshot;
//! use trade_core::types::CountryCode;
//! use trade_risk::dependency::DependencyIndex;
//! use trade_risk::shocks::{ProportionalShock, ShockSimulator, ShockTarget};
//!
//! let snapshot = FlowSnapshot::from_flows(
//!     2023,
//!     vec![("A", "B", 100.0), ("A", "C", 50.0), ("B", "C", 30.0)],
//! );
//! let index = DependencyIndex::exports(&snapshot);
//!
//! let a = CountryCode::new("A");
//! let top = index.profile(&a).unwrap().top_partner().unwrap();
//! assert_eq!(top.partner.as_str(), "B");
//!
//! let shock = ProportionalShock::new("B demand -25%", ShockTarget::partner("B"), 0.25).unwrap();
//! let report = ShockSimulator::apply(&index, &shock);
//! assert_eq!(report.exposures[0].shock_value, 25.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for result types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod dependency;
pub mod error;
pub mod shocks;

pub use dependency::{
    commodity_index, keyword_exposure, ConcentrationFlag, ConcentrationRule, DependencyIndex,
    DependencyShare, KeywordExposure, PartnerShare, SubjectProfile, SubjectSide,
    TopKConcentration, TradeDependency, DEFAULT_TOP_K,
};
pub use error::{DependencyError, ShockError};
pub use shocks::{
    AttributionPolicy, BanOutcome, BanScenario, BanSimulation, Disruption, PresetBanType,
    PresetShockType, ProportionalShock, RiskThresholds, RiskTier, ShockExposure, ShockReport,
    ShockSimulator, ShockTarget,
};
