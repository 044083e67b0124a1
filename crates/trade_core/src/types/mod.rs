//! Core value types shared by every tradenet crate.
//!
//! - `CountryCode`: Normalised country identifier
//! - `TradeRecord` / `TradeTable`: Canonical pre-aggregation records
//! - `FlowDirection`: Reporter-declared flow direction
//! - `Outcome` / `EmptyResultWarning`: Explicit empty results

pub mod country;
pub mod outcome;
pub mod record;

pub use country::CountryCode;
pub use outcome::{EmptyResultWarning, Outcome};
pub use record::{FlowDirection, TradeRecord, TradeTable};
