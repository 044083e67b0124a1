//! Network command implementation
//!
//! Builds the trade graph of the largest traders, ranks them by betweenness
//! and measures what breaks when the most central one is removed.

use super::{year_selector, Context};
use crate::report;
use crate::Result;
use clap::ValueEnum;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use trade_core::flows::FlowSnapshot;
use trade_core::types::CountryCode;
use trade_network::{
    CentralityEngine, CentralityTable, EdgeCost, FragilityAnalyzer, NetworkView, NodeSelection,
    ProgressiveFragility, RemovalImpact, TradeGraph,
};
use tracing::info;

/// Edge cost override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Cost {
    /// `1 / value`: strong links are short
    InverseValue,
    /// Raw value as distance
    Value,
}

impl From<Cost> for EdgeCost {
    fn from(cost: Cost) -> Self {
        match cost {
            Cost::InverseValue => EdgeCost::InverseValue,
            Cost::Value => EdgeCost::Value,
        }
    }
}

/// Network command arguments.
#[derive(Debug, Clone, Default)]
pub struct NetworkArgs {
    /// Countries kept, overriding the configuration
    pub top_n: Option<usize>,
    /// Year override
    pub year: Option<i32>,
    /// Remove this country instead of the most central one
    pub remove: Option<String>,
    /// Also remove this many top countries one after another
    pub progressive: Option<usize>,
    /// Edge cost override
    pub edge_cost: Option<Cost>,
    /// Write the plot-ready view to this file
    pub view: Option<PathBuf>,
}

/// Everything the network command reports.
#[derive(Debug, Serialize)]
pub struct NetworkOutput {
    /// Aggregated year
    pub year: i32,
    /// Countries in the graph
    pub nodes: usize,
    /// Directed edges in the graph
    pub edges: usize,
    /// Betweenness and weighted degree ranking
    pub centrality: CentralityTable,
    /// Single removal
    pub removal: RemovalImpact,
    /// Sequential removals, when requested
    pub progressive: Option<ProgressiveFragility>,
}

/// Graph, centrality and fragility for one snapshot.
pub fn analyse(
    ctx: &Context,
    args: &NetworkArgs,
    snapshot: &FlowSnapshot,
) -> Result<(NetworkOutput, NetworkView)> {
    let network = &ctx.config.network;
    let selection =
        NodeSelection::top_n_by_total_trade(snapshot, args.top_n.unwrap_or(network.top_n))?;
    let graph = TradeGraph::from_snapshot(snapshot, &selection);

    let mut config = network.centrality();
    if let Some(cost) = args.edge_cost {
        config.edge_cost = cost.into();
    }
    let engine = CentralityEngine::new(config);
    let centrality = engine.compute(&graph);

    let analyzer = FragilityAnalyzer::new(engine);
    let removal = match &args.remove {
        Some(country) => analyzer.remove_country(&graph, &CountryCode::new(country))?,
        None => analyzer.remove_most_central(&graph)?,
    };
    let progressive = args
        .progressive
        .map(|k| analyzer.progressive(&graph, k))
        .transpose()?;

    let view = NetworkView::build(&graph, &centrality, &selection, network.labelled);
    let output = NetworkOutput {
        year: snapshot.year(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        centrality,
        removal,
        progressive,
    };
    Ok((output, view))
}

/// Run the network command
pub fn run(ctx: &Context, args: &NetworkArgs) -> Result<()> {
    let table = ctx.table()?;
    let Some(snapshot) = ctx.snapshot(&table, year_selector(args.year))? else {
        return Ok(());
    };

    let (output, view) = analyse(ctx, args, &snapshot)?;
    info!(
        year = output.year,
        nodes = output.nodes,
        edges = output.edges,
        removed = %output.removal.removed,
        "Network analysis complete"
    );

    if let Some(path) = &args.view {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &view)?;
        writer.flush()?;
        info!(path = %path.display(), "Wrote network view");
    }

    report::emit(ctx.format, &output, |out| {
        writeln!(
            out,
            "Trade network {}: {} countries, {} flows",
            output.year, output.nodes, output.edges
        )?;
        report::write_centrality(out, &output.centrality, ctx.limit)?;
        report::write_removal(out, &output.removal, ctx.limit)?;
        if let Some(progressive) = &output.progressive {
            report::write_progressive(out, progressive)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::report::OutputFormat;
    use trade_network::GraphStateError;

    fn ctx() -> Context {
        Context {
            config: AnalysisConfig::default(),
            format: OutputFormat::Table,
            input: None,
            limit: 10,
        }
    }

    fn hub() -> FlowSnapshot {
        FlowSnapshot::from_flows(
            2023,
            vec![
                ("A", "HUB", 5.0),
                ("HUB", "B", 5.0),
                ("HUB", "C", 5.0),
                ("C", "A", 1.0),
            ],
        )
    }

    #[test]
    fn test_hub_is_removed_first() {
        let (output, view) = analyse(&ctx(), &NetworkArgs::default(), &hub()).unwrap();
        assert_eq!(output.nodes, 4);
        assert_eq!(output.edges, 4);
        assert_eq!(output.removal.removed.as_str(), "HUB");
        assert_eq!(output.removal.newly_disconnected.len(), 1);
        assert!(output.progressive.is_none());
        assert_eq!(view.nodes.len(), 4);
        assert!(view.find_node("HUB").unwrap().labelled);
    }

    #[test]
    fn test_named_removal_and_progressive() {
        let args = NetworkArgs {
            remove: Some("c".to_string()),
            progressive: Some(2),
            top_n: Some(3),
            ..Default::default()
        };
        let (output, _) = analyse(&ctx(), &args, &hub()).unwrap();
        assert_eq!(output.nodes, 3);
        assert_eq!(output.removal.removed.as_str(), "C");
        assert_eq!(output.progressive.unwrap().steps.len(), 2);
    }

    #[test]
    fn test_unknown_country_fails() {
        let args = NetworkArgs {
            remove: Some("ZZZ".to_string()),
            ..Default::default()
        };
        let err = analyse(&ctx(), &args, &hub()).unwrap_err();
        assert!(matches!(
            err,
            crate::CliError::Graph(GraphStateError::NodeNotFound(_))
        ));
    }
}
