//! # Network View
//!
//! Plot-ready node and link lists for force-directed layouts.
//!
//! ## D3.js Compatibility
//!
//! - `NetworkView.edges` is serialised as `links`
//! - Link endpoints are country codes, matching node `id`s

use crate::centrality::CentralityTable;
use crate::graph::TradeGraph;
use crate::selection::NodeSelection;

/// Node size is total trade in this unit.
const SIZE_UNIT: f64 = 1e9;

/// Number of most central nodes that carry a label.
pub const DEFAULT_LABELLED: usize = 10;

/// A plotted country.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ViewNode {
    /// Country code
    pub id: String,
    /// Total trade (exports plus imports)
    pub total_trade: f64,
    /// Marker size, total trade in billions
    pub size: f64,
    /// Betweenness, used as the colour value
    pub betweenness: f64,
    /// Sum of incident edge values
    pub weighted_degree: f64,
    /// Whether the node is among the most central and gets a label
    pub labelled: bool,
}

/// A plotted trade flow.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ViewLink {
    /// Exporter code
    pub source: String,
    /// Importer code
    pub target: String,
    /// Trade value
    pub value: f64,
}

/// Complete network for external plotting.
///
/// # Example JSON Output
///
/// ```json
/// {
///   "nodes": [{"id": "USA", "size": 5.2, "betweenness": 0.31, ...}],
///   "links": [{"source": "USA", "target": "MEX", "value": 2.6e11}]
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NetworkView {
    /// Nodes, in graph order
    pub nodes: Vec<ViewNode>,

    /// Directed flows (serialised as "links" for D3.js)
    #[cfg_attr(feature = "serde", serde(rename = "links"))]
    pub edges: Vec<ViewLink>,
}

impl NetworkView {
    /// Assemble a view from a graph, its centrality and the node selection.
    ///
    /// The `labelled` most central nodes are flagged for labelling.
    pub fn build(
        graph: &TradeGraph,
        centrality: &CentralityTable,
        selection: &NodeSelection,
        labelled: usize,
    ) -> Self {
        let labelled: Vec<&str> = centrality
            .top(labelled)
            .iter()
            .map(|r| r.country.as_str())
            .collect();

        let nodes = graph
            .nodes()
            .map(|country| {
                let total_trade = selection.total_trade(country).unwrap_or(0.0);
                let scores = centrality.get(country);
                ViewNode {
                    id: country.to_string(),
                    total_trade,
                    size: total_trade / SIZE_UNIT,
                    betweenness: scores.map_or(0.0, |r| r.betweenness),
                    weighted_degree: scores.map_or(0.0, |r| r.weighted_degree),
                    labelled: labelled.contains(&country.as_str()),
                }
            })
            .collect();

        let edges = graph
            .edges()
            .map(|e| ViewLink {
                source: graph.country(e.source).to_string(),
                target: graph.country(e.target).to_string(),
                value: e.weight,
            })
            .collect();

        Self { nodes, edges }
    }

    /// Find a node by its id.
    pub fn find_node(&self, id: &str) -> Option<&ViewNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
