//! GraphBuilder: derives nodes and edges from an ingested [`Trace`].

use crate::{
    CallTrace, DagTrace, Edge, EdgeKind, EngineConfig, EventKind, Node, RawStep, Trace,
    TraceGraph, TraceKind, TraversalTrace, display_value,
};
use rustc_hash::FxHashMap;

/// Builds a fresh [`TraceGraph`] per call. Positions are left at the origin; see
/// [`crate::layout`].
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder<'a> {
    config: &'a EngineConfig,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, trace: &Trace) -> TraceGraph {
        let graph = match trace {
            Trace::Calls(t) => self.build_calls(t),
            Trace::Dag(t) => self.build_dag(t),
            Trace::Traversal(t) => self.build_traversal(t),
        };
        tracing::debug!(
            kind = trace.kind().as_str(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "built trace graph"
        );
        graph
    }

    /// One node per `call`; the matching `return` fills in the return value. Call edges point
    /// parent -> child, return edges child -> parent.
    fn build_calls(&self, trace: &CallTrace) -> TraceGraph {
        let mut graph = TraceGraph::new(TraceKind::Calls);

        for (index, step) in trace.steps.iter().enumerate() {
            let Some(id) = step.node_id.as_deref() else {
                continue;
            };
            match step.raw.event {
                EventKind::Call => {
                    if graph.nodes.contains_key(id) {
                        continue;
                    }
                    let node = Node::new(
                        id.to_string(),
                        call_label(&step.raw),
                        self.config.style_class(step.raw.depth),
                        index,
                    );
                    graph.nodes.insert(id.to_string(), node);
                    if let Some(parent) = step.parent_id.as_deref() {
                        graph
                            .edges
                            .push(Edge::new(EdgeKind::Call, parent, id, index).with_label("call"));
                    }
                }
                EventKind::Return => {
                    if let Some(node) = graph.nodes.get_mut(id) {
                        node.returned_at = Some(index);
                        if let Some(value) = &step.raw.value {
                            node.label = format!("{} => {}", node.call_label, display_value(value));
                            node.return_value = Some(value.clone());
                        }
                    }
                    if let Some(parent) = step.parent_id.as_deref() {
                        let label = match &step.raw.value {
                            Some(value) => format!("return {}", display_value(value)),
                            None => "return".to_string(),
                        };
                        graph
                            .edges
                            .push(Edge::new(EdgeKind::Return, id, parent, index).with_label(label));
                    }
                }
                _ => {}
            }
        }
        graph
    }

    /// Nodes appear at the step where they are discovered; styles follow the level.
    fn build_dag(&self, trace: &DagTrace) -> TraceGraph {
        let mut graph = TraceGraph::new(TraceKind::Dag);

        let mut discovered: FxHashMap<&str, (usize, usize)> = FxHashMap::default();
        for root in &trace.roots {
            discovered.entry(root.as_str()).or_insert((0, 0));
        }
        for (index, step) in trace.steps.iter().enumerate() {
            for child in &step.children {
                discovered
                    .entry(child.as_str())
                    .or_insert((index, step.level + 1));
            }
        }
        let processed_at: FxHashMap<&str, usize> = trace
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| (step.node.as_str(), index))
            .collect();

        for n in &trace.nodes {
            let (created_at, level) = discovered.get(n.id.as_str()).copied().unwrap_or((0, 0));
            let node = Node::new(
                n.id.clone(),
                display_value(&n.state),
                self.config.style_class(level as i64),
                created_at,
            );
            graph.nodes.insert(n.id.clone(), node);
        }
        for e in &trace.edges {
            let created_at = processed_at.get(e.source.as_str()).copied().unwrap_or(0);
            graph.edges.push(Edge::new(
                EdgeKind::Adjacency,
                &e.source,
                &e.target,
                created_at,
            ));
        }
        graph
    }

    /// The static structure; per-step visited flags drive highlighting instead.
    fn build_traversal(&self, trace: &TraversalTrace) -> TraceGraph {
        let mut graph = TraceGraph::new(TraceKind::Traversal);
        let style = self.config.style_class(0);
        for v in &trace.vertices {
            graph
                .nodes
                .insert(v.clone(), Node::new(v.clone(), v.clone(), style.clone(), 0));
        }
        for e in &trace.edges {
            graph
                .edges
                .push(Edge::new(EdgeKind::Adjacency, &e.source, &e.target, 0));
        }
        graph
    }
}

/// `func(a=1, b=[2,3])`
pub fn call_label(step: &RawStep) -> String {
    let args: Vec<String> = step
        .args
        .iter()
        .map(|(k, v)| format!("{k}={}", display_value(v)))
        .collect();
    format!("{}({})", step.func, args.join(", "))
}
