//! Bridge between [`TraceGraph`] and `stepgraph-layout`.
//!
//! Every call builds a new layout graph from the given nodes and edges, so the result depends
//! only on its inputs: laying out the same graph twice gives the same positions.

use crate::config::LayoutConfig;
use crate::{Edge, Node, NodeId, TraceGraph};
use indexmap::IndexMap;
use stepgraph_layout::{GraphLabel, LayoutError, LayoutGraph, NodeLabel, Point, RankDir};

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOutcome {
    pub nodes: IndexMap<NodeId, Node>,
    /// Present when ranking failed and nodes were placed on the fallback grid.
    pub error: Option<LayoutError>,
}

/// Assigns `rank` and `position` to every node; ids and order are unchanged.
///
/// Only structural edges (call / adjacency) constrain ranks. Return edges run against the
/// hierarchy and are drawn over the finished layout.
pub fn layout(
    nodes: &IndexMap<NodeId, Node>,
    edges: &[Edge],
    direction: RankDir,
    config: &LayoutConfig,
) -> LayoutOutcome {
    let start = std::time::Instant::now();

    let mut g: LayoutGraph = LayoutGraph::new();
    g.set_graph(GraphLabel {
        rankdir: direction,
        nodesep: config.node_sep,
        ranksep: config.rank_sep,
        marginx: config.margin_x,
        marginy: config.margin_y,
    });
    for id in nodes.keys() {
        g.set_node(
            id.clone(),
            NodeLabel::sized(config.node_width, config.node_height),
        );
    }
    for e in edges.iter().filter(|e| e.kind.is_structural()) {
        if e.source == e.target || !g.has_node(&e.source) || !g.has_node(&e.target) {
            continue;
        }
        g.set_edge(e.source.clone(), e.target.clone());
    }

    let error = stepgraph_layout::layout_or_grid(&mut g);

    let mut out = nodes.clone();
    for (id, node) in out.iter_mut() {
        let Some(label) = g.node(id) else {
            continue;
        };
        node.rank = label.rank.unwrap_or(0);
        node.position = label.point().unwrap_or_default();
    }

    tracing::debug!(
        nodes = out.len(),
        direction = %direction,
        fallback = error.is_some(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "laid out trace graph"
    );
    LayoutOutcome { nodes: out, error }
}

/// Lays out `graph` with the configured direction.
pub fn layout_graph(graph: TraceGraph, config: &LayoutConfig) -> TraceGraph {
    layout_graph_with_direction(graph, config.direction, config)
}

pub fn layout_graph_with_direction(
    mut graph: TraceGraph,
    direction: RankDir,
    config: &LayoutConfig,
) -> TraceGraph {
    let outcome = layout(&graph.nodes, &graph.edges, direction, config);
    graph.nodes = outcome.nodes;
    graph.layout_error = outcome.error;
    graph
}

/// Top-left and bottom-right corners covering every node box.
pub fn bounds(graph: &TraceGraph, config: &LayoutConfig) -> Option<(Point, Point)> {
    let mut it = graph.nodes.values();
    let first = it.next()?;
    let (hw, hh) = (config.node_width / 2.0, config.node_height / 2.0);
    let mut min = Point {
        x: first.position.x - hw,
        y: first.position.y - hh,
    };
    let mut max = Point {
        x: first.position.x + hw,
        y: first.position.y + hh,
    };
    for n in it {
        min.x = min.x.min(n.position.x - hw);
        min.y = min.y.min(n.position.y - hh);
        max.x = max.x.max(n.position.x + hw);
        max.y = max.y.max(n.position.y + hh);
    }
    Some((min, max))
}
