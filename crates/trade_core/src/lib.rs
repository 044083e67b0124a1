//! # trade_core: Foundation Types for Bilateral Trade Analytics
//!
//! ## Layer 1 (Foundation) Role
//!
//! trade_core is the bottom layer of the tradenet workspace, providing:
//! - Country identifiers: `CountryCode` (`types::country`)
//! - Raw trade records and tables: `TradeRecord`, `TradeTable` (`types::record`)
//! - Non-fatal empty results: `Outcome`, `EmptyResultWarning` (`types::outcome`)
//! - Flow aggregation into directed edges and country totals (`flows`)
//!
//! Layer 1 has no dependencies on other tradenet crates.
//!
//! ## Usage Examples
//!
//! ```rust
//! use trade_core::flows::{FlowAggregator, YearSelector};
//! use trade_core::types::{CountryCode, TradeRecord, TradeTable};
//!
//! let table = TradeTable::new(vec![
//!     TradeRecord::new("deu", "fra", 2023, 40.0),
//!     TradeRecord::new("DEU", "FRA", 2023, 10.0),
//!     TradeRecord::new("FRA", "DEU", 2023, 30.0),
//! ]);
//!
//! let snapshot = FlowAggregator::aggregate(&table, YearSelector::Latest)
//!     .ready()
//!     .unwrap();
//!
//! // Records sharing (Importer, Exporter, Year) are summed.
//! assert_eq!(snapshot.edge_value(&"FRA".into(), &"DEU".into()), Some(50.0));
//! let fra = snapshot.country_totals(&CountryCode::new("FRA")).unwrap();
//! assert_eq!(fra.exports_total, 50.0);
//! assert_eq!(fra.imports_total, 30.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for records, edges, totals and warnings

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod flows;
pub mod types;

pub use flows::{CountryTotals, FlowAggregator, FlowSnapshot, TradeEdge, YearSelector};
pub use types::{
    CountryCode, EmptyResultWarning, FlowDirection, Outcome, TradeRecord, TradeTable,
};
