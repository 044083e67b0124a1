//! Preset shock and ban scenarios.
//!
//! Provides ready-to-use scenarios for typical dependency stress tests:
//! - China export drop (25% of every edge from China)
//! - Top-partner collapse (40% of each exporter's largest market)
//! - Food-supply bans on groups of major agricultural exporters

use super::ban::BanScenario;
use super::shock::{ProportionalShock, ShockTarget};
use crate::dependency::SubjectSide;
use trade_core::types::CountryCode;

/// Commodity keywords marking agricultural trade.
pub const AGRICULTURAL_KEYWORDS: &[&str] = &[
    "food",
    "grain",
    "wheat",
    "rice",
    "corn",
    "soy",
    "meat",
    "dairy",
    "fruit",
    "vegetable",
    "sugar",
    "coffee",
    "tea",
    "fish",
    "agricultural",
    "livestock",
    "poultry",
    "beef",
    "pork",
    "milk",
    "cheese",
    "cereals",
];

/// Commodity keywords marking labour-intensive manufacturing.
pub const LABOUR_INTENSIVE_KEYWORDS: &[&str] = &[
    "textile",
    "clothing",
    "footwear",
    "furniture",
    "toy",
    "leather",
    "wood",
    "paper",
    "manufacturing",
    "assembly",
    "garment",
];

/// Types of preset proportional shocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PresetShockType {
    /// Imports from China fall 25%
    ChinaExportDrop,
    /// Each exporter loses 40% of sales to its largest market
    TopPartnerCollapse,
}

impl PresetShockType {
    /// Get all preset shocks.
    pub fn all() -> Vec<Self> {
        vec![Self::ChinaExportDrop, Self::TopPartnerCollapse]
    }

    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChinaExportDrop => "China exports -25%",
            Self::TopPartnerCollapse => "Top partner -40%",
        }
    }

    /// Get description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ChinaExportDrop => "Every importer's purchases from China decline 25%",
            Self::TopPartnerCollapse => "Demand from each exporter's largest market declines 40%",
        }
    }

    /// Which side of the flow is the shocked subject.
    pub fn subject_side(&self) -> SubjectSide {
        match self {
            Self::ChinaExportDrop => SubjectSide::Importer,
            Self::TopPartnerCollapse => SubjectSide::Exporter,
        }
    }

    /// Year the scenario prefers when the data has it.
    pub fn preferred_year(&self) -> Option<i32> {
        match self {
            Self::ChinaExportDrop => Some(2028),
            Self::TopPartnerCollapse => None,
        }
    }

    /// Build the shock.
    pub fn shock(&self) -> ProportionalShock<CountryCode, CountryCode> {
        match self {
            Self::ChinaExportDrop => {
                ProportionalShock::preset(self.name(), ShockTarget::partner("CHN"), 0.25)
            }
            Self::TopPartnerCollapse => {
                ProportionalShock::preset(self.name(), ShockTarget::TopPartner, 0.40)
            }
        }
    }
}

/// Types of preset food-supply bans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PresetBanType {
    /// USA, Russia, Ukraine and Argentina stop exporting
    MajorGrainExporters,
    /// China, India and Brazil stop exporting
    RegionalCrisis,
    /// Australia, Canada and the USA stop exporting
    ClimateEmergency,
}

impl PresetBanType {
    /// Get all preset bans.
    pub fn all() -> Vec<Self> {
        vec![
            Self::MajorGrainExporters,
            Self::RegionalCrisis,
            Self::ClimateEmergency,
        ]
    }

    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MajorGrainExporters => "Major Grain Exporters Ban",
            Self::RegionalCrisis => "Regional Crisis",
            Self::ClimateEmergency => "Climate Emergency",
        }
    }

    /// Banned exporters.
    pub fn banned(&self) -> &'static [&'static str] {
        match self {
            Self::MajorGrainExporters => &["USA", "RUS", "UKR", "ARG"],
            Self::RegionalCrisis => &["CHN", "IND", "BRA"],
            Self::ClimateEmergency => &["AUS", "CAN", "USA"],
        }
    }

    /// Build the scenario.
    pub fn scenario(&self) -> BanScenario<CountryCode> {
        BanScenario::preset(
            self.name(),
            self.banned().iter().map(|c| CountryCode::new(c)).collect(),
        )
    }
}
