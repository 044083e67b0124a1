//! # Trade Network (L2: Analytics)
//!
//! Directed weighted trade graphs, centrality and structural fragility.
//!
//! This crate provides:
//! - Top-N node selection by total trade
//! - `TradeGraph`: exporter -> importer graph weighted by trade value
//! - Weighted betweenness (Brandes with Dijkstra) and weighted degree
//! - Single and progressive node-removal fragility analysis
//! - D3-compatible network views for external plotting
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           trade_network (L2)            │
//! ├─────────────────────────────────────────┤
//! │  selection  - Top-N by total trade      │
//! │  graph      - Nodes, edges, components  │
//! │  centrality - Betweenness, degree       │
//! │  fragility  - Node removal impact       │
//! │  view       - nodes / links output      │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │            trade_core (L1)              │
//! │  Flow snapshots and country totals      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use trade_core::flows::FlowSnapshot;
//! use trade_network::{CentralityEngine, FragilityAnalyzer, NodeSelection, TradeGraph};
//!
//! let snapshot = FlowSnapshot::from_flows(
//!     2023,
//!     vec![("A", "HUB", 5.0), ("HUB", "B", 5.0), ("HUB", "C", 5.0)],
//! );
//! let selection = NodeSelection::top_n_by_total_trade(&snapshot, 25).unwrap();
//! let graph = TradeGraph::from_snapshot(&snapshot, &selection);
//!
//! let table = CentralityEngine::default().compute(&graph);
//! assert_eq!(table.most_central().unwrap().country.as_str(), "HUB");
//!
//! let impact = FragilityAnalyzer::default().remove_most_central(&graph).unwrap();
//! assert_eq!(impact.reachable_pairs_after, 0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for tables, fragility reports and views
//! - `parallel`: Run per-source shortest-path passes on rayon

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod centrality;
pub mod error;
pub mod fragility;
pub mod graph;
pub mod selection;
pub mod view;

pub use centrality::{CentralityConfig, CentralityEngine, CentralityResult, CentralityTable, EdgeCost};
pub use error::GraphStateError;
pub use fragility::{CentralityDelta, FragilityAnalyzer, ProgressiveFragility, RemovalImpact};
pub use graph::{TradeGraph, WeightedEdge};
pub use selection::{NodeSelection, DEFAULT_TOP_N};
pub use view::{NetworkView, ViewLink, ViewNode, DEFAULT_LABELLED};
