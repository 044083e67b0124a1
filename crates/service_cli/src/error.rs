//! Error types for the tradenet CLI.

use crate::config::ConfigError;
use adapter_loader::LoaderError;
use thiserror::Error;
use trade_network::GraphStateError;
use trade_risk::{DependencyError, ShockError};

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Trade file could not be loaded
    #[error("Loading error: {0}")]
    Loader(#[from] LoaderError),

    /// Dependency parameters rejected
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    /// Shock or ban parameters rejected
    #[error(transparent)]
    Shock(#[from] ShockError),

    /// Graph operation failed
    #[error(transparent)]
    Graph(#[from] GraphStateError),

    /// Command needs a trade file
    #[error("No input file given; pass --input <CSV>")]
    MissingInput,

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialisation error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result alias for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CliError::invalid_argument("unknown partner");
        assert_eq!(err.to_string(), "Invalid argument: unknown partner");
        assert_eq!(
            CliError::MissingInput.to_string(),
            "No input file given; pass --input <CSV>"
        );
    }

    #[test]
    fn test_library_errors_convert() {
        let err: CliError = GraphStateError::EmptyGraph.into();
        assert!(matches!(err, CliError::Graph(GraphStateError::EmptyGraph)));

        let err: CliError = ConfigError::Validation(vec!["a".into(), "b".into()]).into();
        assert_eq!(err.to_string(), "Configuration error: Validation errors: a; b");
    }
}
