//! Partner shock and ban scenario simulation.
//!
//! This module provides:
//! - Proportional shocks on named partners, explicit pairs or each
//!   subject's top partner
//! - Multi-partner ban scenarios with selectable attribution
//! - Risk tier classification
//! - Preset scenarios
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                Shock Simulator                  │
//! ├────────────────────────────────────────────────┤
//! │  ProportionalShock - Target + reduction         │
//! │  ShockSimulator    - Per-subject exposure       │
//! │  BanScenario       - Named banned partner set   │
//! │  BanSimulation     - Top-K attribution & tiers  │
//! │  Preset*Type       - Ready-made scenarios       │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! Both simulators read a [`DependencyIndex`](crate::dependency::DependencyIndex)
//! and never mutate it.

mod ban;
mod presets;
mod shock;
mod tier;

pub use ban::{AttributionPolicy, BanOutcome, BanScenario, BanSimulation, Disruption};
pub use presets::{
    PresetBanType, PresetShockType, AGRICULTURAL_KEYWORDS, LABOUR_INTENSIVE_KEYWORDS,
};
pub use shock::{ProportionalShock, ShockExposure, ShockReport, ShockSimulator, ShockTarget};
pub use tier::{RiskThresholds, RiskTier};
