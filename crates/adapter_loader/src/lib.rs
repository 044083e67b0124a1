//! # adapter_loader (A: Adapter Layer)
//!
//! Turns raw trade files with arbitrary column names into a canonical
//! [`TradeTable`](trade_core::types::TradeTable).
//!
//! ## Pipeline
//!
//! ```text
//! CSV bytes ──► headers ──► SchemaConfig::resolve ──► ResolvedSchema
//!                rows   ──► ResolvedSchema::parse_row ──► TradeRecord
//!                                        │
//!                                        └─► NormalizationReport (dropped rows)
//! ```
//!
//! Column resolution is a pure function over the header row: each role has an
//! ordered list of candidate substrings, matched case-insensitively. A missing
//! required role is a fatal [`SchemaError`]; unparsable cells only drop their
//! row.
//!
//! ## Example
//!
//! ```
//! use adapter_loader::{CsvTradeReader, TableNormalizer};
//!
//! let data = "reporterISO,partnerISO,refYear,primaryValue\n\
//!             usa,CHN,2023,100\n\
//!             USA,MEX,2023,n/a\n";
//!
//! let reader = CsvTradeReader::new(TableNormalizer::default());
//! let normalized = reader.read(data.as_bytes()).unwrap();
//!
//! assert_eq!(normalized.table.len(), 1);
//! assert_eq!(normalized.report.invalid_value, 1);
//! assert_eq!(normalized.table.records()[0].importer.as_str(), "USA");
//! ```

#![deny(missing_docs)]

mod error;
mod normalizer;
mod reader;
mod schema;

pub use error::{LoaderError, SchemaError};
pub use normalizer::{NormalizationReport, NormalizedTable, TableNormalizer};
pub use reader::CsvTradeReader;
pub use schema::{
    resolve_column, ColumnRole, ResolvedColumn, ResolvedSchema, RoleCandidates, SchemaConfig,
};
