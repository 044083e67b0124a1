//! Criterion benchmarks for trade_network centrality and fragility.
//!
//! Benchmarks cover:
//! - Weighted betweenness on dense graphs of varying size
//! - Progressive removal of the most central nodes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trade_core::types::CountryCode;
use trade_network::{CentralityEngine, FragilityAnalyzer, TradeGraph};

/// Deterministic dense graph with uneven weights.
fn synthetic_graph(n: usize) -> TradeGraph {
    let codes: Vec<CountryCode> = (0..n).map(|i| CountryCode::new(format!("C{:03}", i))).collect();
    let mut edges = Vec::new();
    for (i, source) in codes.iter().enumerate() {
        for (j, target) in codes.iter().enumerate() {
            if i != j && (i * 7 + j * 13) % 5 != 0 {
                let weight = 1.0 + ((i * 31 + j * 17) % 97) as f64;
                edges.push((source.clone(), target.clone(), weight));
            }
        }
    }
    TradeGraph::from_edges(codes, edges)
}

fn bench_betweenness(c: &mut Criterion) {
    let mut group = c.benchmark_group("betweenness");
    let engine = CentralityEngine::default();
    for n in [25usize, 50, 100] {
        let graph = synthetic_graph(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &graph, |b, graph| {
            b.iter(|| engine.compute(black_box(graph)))
        });
    }
    group.finish();
}

fn bench_progressive(c: &mut Criterion) {
    let graph = synthetic_graph(25);
    let analyzer = FragilityAnalyzer::default();
    c.bench_function("progressive_top5_n25", |b| {
        b.iter(|| analyzer.progressive(black_box(&graph), 5))
    });
}

criterion_group!(benches, bench_betweenness, bench_progressive);
criterion_main!(benches);
