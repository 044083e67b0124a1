//! Loader error types.

use crate::schema::ColumnRole;
use thiserror::Error;

/// A required canonical column could not be located in the header row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No header matched any candidate for a required role.
    #[error("No column for {role}: tried {candidates:?} against headers {headers:?}")]
    MissingColumn {
        /// Role that failed to resolve
        role: ColumnRole,
        /// Candidate substrings that were tried, in order
        candidates: Vec<String>,
        /// Header row as read
        headers: Vec<String>,
    },

    /// The schema configuration has no entry for a required role.
    #[error("Schema configuration has no candidates for {0}")]
    UnconfiguredRole(ColumnRole),

    /// The input has no header row.
    #[error("Input has no header row")]
    EmptyHeader,
}

/// Errors from reading a trade file.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The file could not be opened.
    #[error("Cannot open {path}: {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Header row did not satisfy the schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
