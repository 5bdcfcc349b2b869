use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use stepgraph_layout::graphlib::Graph;
use stepgraph_layout::{LayoutGraph, NodeLabel, layout, rank};

/// A binary recursion tree (the shape of a naive `fib`) plus extra forward edges so several
/// nodes have more than one parent.
fn build_call_tree(depth: u32, extra_every: usize) -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new();
    let mut next_id = 0usize;
    let mut frontier: Vec<String> = vec!["n0".to_string()];
    g.set_node("n0", NodeLabel::sized(120.0, 40.0));

    for _ in 0..depth {
        let mut next: Vec<String> = Vec::with_capacity(frontier.len() * 2);
        for parent in &frontier {
            for _ in 0..2 {
                next_id += 1;
                let id = format!("n{next_id}");
                g.set_node(id.clone(), NodeLabel::sized(120.0, 40.0));
                g.set_edge(parent.clone(), id.clone());
                next.push(id);
            }
        }
        frontier = next;
    }

    let ids = g.node_ids();
    for (i, id) in ids.iter().enumerate().step_by(extra_every.max(1)) {
        if let Some(target) = ids.get(i * 2 + 3) {
            g.set_edge(id.clone(), target.clone());
        }
    }
    g
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    group.measurement_time(Duration::from_secs(5));

    for (name, depth) in [("tree_d6", 6u32), ("tree_d9", 9u32), ("tree_d11", 11u32)] {
        let g = build_call_tree(depth, 7);
        group.bench_with_input(BenchmarkId::new("rank::rank", name), &g, |b, g| {
            b.iter_batched(
                || g.clone(),
                |mut g| {
                    let _ = rank::rank(black_box(&mut g));
                    black_box(g.node_count());
                },
                BatchSize::LargeInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("layout", name), &g, |b, g| {
            b.iter_batched(
                || g.clone(),
                |mut g| {
                    let _ = layout(black_box(&mut g));
                    black_box(g.node_count());
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
