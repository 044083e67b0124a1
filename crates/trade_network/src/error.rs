//! # Graph State Errors
//!
//! Errors raised when a graph operation does not fit the current graph.

use thiserror::Error;
use trade_core::types::CountryCode;

/// Error type for trade graph mutation and selection.
///
/// # Example
///
/// ```rust
/// use trade_network::GraphStateError;
///
/// let err = GraphStateError::NodeNotFound("USA".into());
/// assert_eq!(err.to_string(), "Node 'USA' not found in trade graph");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphStateError {
    /// The requested node is not in the graph.
    #[error("Node '{0}' not found in trade graph")]
    NodeNotFound(CountryCode),

    /// The graph has no nodes.
    #[error("Trade graph is empty")]
    EmptyGraph,

    /// Progressive removal asked for more nodes than exist.
    #[error("Cannot remove {requested} nodes from a graph with {available}")]
    RemovalExceedsNodes {
        /// Nodes requested for removal
        requested: usize,
        /// Nodes in the graph
        available: usize,
    },

    /// Top-N selection must keep at least one node.
    #[error("Invalid top-N: {0} (must be at least 1)")]
    InvalidTopN(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphStateError::RemovalExceedsNodes {
            requested: 5,
            available: 3,
        };
        assert_eq!(err.to_string(), "Cannot remove 5 nodes from a graph with 3");
        assert_eq!(GraphStateError::EmptyGraph.to_string(), "Trade graph is empty");
    }

    #[test]
    fn test_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(GraphStateError::InvalidTopN(0));
        assert!(err.to_string().contains("top-N"));
    }
}
