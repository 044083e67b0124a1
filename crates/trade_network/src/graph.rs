//! # Directed Trade Graph
//!
//! Exporter -> importer graph over a node subset, weighted by trade value,
//! stored in a `petgraph` [`DiGraph`].
//!
//! Nodes are inserted sorted by country code, so a node's petgraph index is
//! also its rank by code and every traversal visits them in a fixed order.

use crate::error::GraphStateError;
use crate::selection::NodeSelection;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet};
use trade_core::flows::FlowSnapshot;
use trade_core::types::CountryCode;
use tracing::{debug, info};

// =============================================================================
// WeightedEdge
// =============================================================================

/// A directed edge between two node indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedEdge {
    /// Exporter index
    pub source: usize,
    /// Importer index
    pub target: usize,
    /// Trade value, always positive
    pub weight: f64,
}

// =============================================================================
// TradeGraph
// =============================================================================

/// Directed weighted trade graph.
///
/// # Example
///
/// ```rust
/// use trade_core::flows::FlowSnapshot;
/// use trade_network::{NodeSelection, TradeGraph};
///
/// let snapshot = FlowSnapshot::from_flows(2023, vec![("A", "B", 10.0), ("B", "C", 0.0)]);
/// let graph = TradeGraph::from_snapshot(&snapshot, &NodeSelection::all(&snapshot));
///
/// // Zero-value flows are not edges; C stays as an isolated node.
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct TradeGraph {
    graph: DiGraph<CountryCode, f64>,
    index: BTreeMap<CountryCode, NodeIndex>,
}

impl TradeGraph {
    /// Build from snapshot edges whose endpoints are both selected and whose
    /// value is positive. Selected countries without edges become isolated
    /// nodes.
    pub fn from_snapshot(snapshot: &FlowSnapshot, selection: &NodeSelection) -> Self {
        let edges = snapshot
            .edges()
            .iter()
            .filter(|e| selection.contains(&e.exporter) && selection.contains(&e.importer))
            .map(|e| (e.exporter.clone(), e.importer.clone(), e.value));
        let graph = Self::from_edges(selection.ranked().iter().cloned(), edges);
        info!(
            year = snapshot.year(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Built trade graph"
        );
        graph
    }

    /// Build from explicit nodes and `(exporter, importer, value)` edges.
    ///
    /// Edge endpoints are added as nodes when missing. Non-positive or
    /// non-finite values are skipped and duplicate pairs are summed.
    pub fn from_edges<N, E>(nodes: N, edges: E) -> Self
    where
        N: IntoIterator<Item = CountryCode>,
        E: IntoIterator<Item = (CountryCode, CountryCode, f64)>,
    {
        let mut names: BTreeSet<CountryCode> = nodes.into_iter().collect();
        let mut pairs: BTreeMap<(CountryCode, CountryCode), f64> = BTreeMap::new();
        for (source, target, weight) in edges {
            if !(weight.is_finite() && weight > 0.0) {
                continue;
            }
            names.insert(source.clone());
            names.insert(target.clone());
            *pairs.entry((source, target)).or_insert(0.0) += weight;
        }

        let mut graph = DiGraph::with_capacity(names.len(), pairs.len());
        let index: BTreeMap<CountryCode, NodeIndex> = names
            .into_iter()
            .map(|c| (c.clone(), graph.add_node(c)))
            .collect();
        for ((s, t), weight) in pairs {
            if let (Some(&a), Some(&b)) = (index.get(&s), index.get(&t)) {
                graph.add_edge(a, b, weight);
            }
        }
        Self { graph, index }
    }

    fn from_graph(graph: DiGraph<CountryCode, f64>) -> Self {
        let index = graph
            .node_indices()
            .map(|idx| (graph[idx].clone(), idx))
            .collect();
        Self { graph, index }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Nodes sorted by code; positions are node indices.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &CountryCode> + '_ {
        self.graph.raw_nodes().iter().map(|n| &n.weight)
    }

    /// Country at node index `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= node_count()`.
    pub fn country(&self, idx: usize) -> &CountryCode {
        &self.graph[NodeIndex::new(idx)]
    }

    /// Index of `country`, if present.
    pub fn node_index(&self, country: &CountryCode) -> Option<usize> {
        self.index.get(country).map(|idx| idx.index())
    }

    /// Check whether `country` is a node.
    pub fn contains(&self, country: &CountryCode) -> bool {
        self.index.contains_key(country)
    }

    /// All edges, ordered by (exporter, importer) code.
    pub fn edges(&self) -> impl Iterator<Item = WeightedEdge> + '_ {
        self.graph.edge_references().map(|e| WeightedEdge {
            source: e.source().index(),
            target: e.target().index(),
            weight: *e.weight(),
        })
    }

    /// Value of the edge `source -> target`, if any.
    pub fn edge_weight(&self, source: &CountryCode, target: &CountryCode) -> Option<f64> {
        let s = *self.index.get(source)?;
        let t = *self.index.get(target)?;
        self.graph
            .find_edge(s, t)
            .and_then(|e| self.graph.edge_weight(e))
            .copied()
    }

    /// Outgoing `(target, weight)` pairs of node `idx`.
    pub fn successors(&self, idx: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.graph
            .edges_directed(NodeIndex::new(idx), Direction::Outgoing)
            .map(|e| (e.target().index(), *e.weight()))
    }

    /// Incoming `(source, weight)` pairs of node `idx`.
    pub fn predecessors(&self, idx: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.graph
            .edges_directed(NodeIndex::new(idx), Direction::Incoming)
            .map(|e| (e.source().index(), *e.weight()))
    }

    /// Sum of incoming and outgoing edge weights of node `idx`.
    pub fn weighted_degree_at(&self, idx: usize) -> f64 {
        let out: f64 = self.successors(idx).map(|(_, w)| w).sum();
        let inc: f64 = self.predecessors(idx).map(|(_, w)| w).sum();
        out + inc
    }

    /// Sum of incoming and outgoing edge weights of `country`.
    pub fn weighted_degree(&self, country: &CountryCode) -> Option<f64> {
        self.node_index(country).map(|idx| self.weighted_degree_at(idx))
    }

    /// Copy of the graph without `country` and its incident edges.
    ///
    /// Remaining nodes keep their relative order, so indices stay dense and
    /// sorted by code.
    pub fn without_node(&self, country: &CountryCode) -> Result<Self, GraphStateError> {
        if self.is_empty() {
            return Err(GraphStateError::EmptyGraph);
        }
        let removed = *self
            .index
            .get(country)
            .ok_or_else(|| GraphStateError::NodeNotFound(country.clone()))?;

        let graph = self.graph.filter_map(
            |idx, c| (idx != removed).then(|| c.clone()),
            |_, &weight| Some(weight),
        );
        Ok(Self::from_graph(graph))
    }

    /// Remove `country` and its incident edges.
    pub fn remove_node(&mut self, country: &CountryCode) -> Result<(), GraphStateError> {
        let next = self.without_node(country)?;
        debug!(
            node = %country,
            edges_removed = self.edge_count() - next.edge_count(),
            "Removed node from trade graph"
        );
        *self = next;
        Ok(())
    }

    /// Weakly connected components.
    ///
    /// Each component lists its countries sorted by code. Components are
    /// ordered by size descending, then by their first country.
    pub fn weakly_connected_components(&self) -> Vec<Vec<CountryCode>> {
        let mut sets = UnionFind::new(self.node_count());
        for edge in self.graph.edge_references() {
            sets.union(edge.source().index(), edge.target().index());
        }

        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (idx, root) in sets.into_labeling().into_iter().enumerate() {
            groups.entry(root).or_default().push(idx);
        }

        // Members are pushed in index order, which is code order.
        let mut groups: Vec<Vec<usize>> = groups.into_values().collect();
        groups.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
        groups
            .into_iter()
            .map(|g| g.into_iter().map(|i| self.country(i).clone()).collect())
            .collect()
    }

    /// Largest weakly connected component, or empty for an empty graph.
    pub fn largest_component(&self) -> Vec<CountryCode> {
        self.weakly_connected_components()
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    /// Ordered pairs `(u, v)`, `u != v`, in the same weak component.
    pub fn reachable_pairs(&self) -> usize {
        self.weakly_connected_components()
            .iter()
            .map(|c| c.len() * (c.len() - 1))
            .sum()
    }
}

impl PartialEq for TradeGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes().eq(other.nodes()) && self.edges().eq(other.edges())
    }
}
