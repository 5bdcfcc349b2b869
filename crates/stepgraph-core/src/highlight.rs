//! HighlightResolver: which nodes and edge are active at a playback step.
//!
//! [`resolve`] is a pure function of the trace and the step index. Renderers recompute the full
//! highlight on every step change (including non-sequential jumps) rather than patching the
//! previous one.

use crate::{CallTrace, DagTrace, EdgeKind, EventKind, NodeId, Trace, TraversalTrace, edge_id};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeStyle {
    Active,
    Visited,
    Default,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub active_node_ids: BTreeSet<NodeId>,
    pub active_edge_id: Option<String>,
    /// The single node the step is "about", if any.
    pub primary_node_id: Option<NodeId>,
    /// Nodes already dealt with (visited vertices, processed DAG nodes).
    pub visited_node_ids: BTreeSet<NodeId>,
}

impl Highlight {
    pub fn style_of(&self, node_id: &str) -> NodeStyle {
        if self.active_node_ids.contains(node_id) {
            NodeStyle::Active
        } else if self.visited_node_ids.contains(node_id) {
            NodeStyle::Visited
        } else {
            NodeStyle::Default
        }
    }

    pub fn is_edge_active(&self, edge_id: &str) -> bool {
        self.active_edge_id.as_deref() == Some(edge_id)
    }
}

/// Out-of-range indices resolve to an empty highlight.
pub fn resolve(trace: &Trace, step_index: usize) -> Highlight {
    match trace {
        Trace::Calls(t) => resolve_calls(t, step_index),
        Trace::Dag(t) => resolve_dag(t, step_index),
        Trace::Traversal(t) => resolve_traversal(t, step_index),
    }
}

fn resolve_calls(trace: &CallTrace, step_index: usize) -> Highlight {
    let mut out = Highlight::default();
    let Some(step) = trace.steps.get(step_index) else {
        return out;
    };
    let Some(node) = step.node_id.as_ref() else {
        return out;
    };
    out.active_node_ids.insert(node.clone());
    out.primary_node_id = Some(node.clone());
    out.active_edge_id = match (step.raw.event, step.parent_id.as_deref()) {
        (EventKind::Call, Some(parent)) => Some(edge_id(EdgeKind::Call, parent, node)),
        (EventKind::Return, Some(parent)) => Some(edge_id(EdgeKind::Return, node, parent)),
        _ => None,
    };
    out
}

/// The frontier node plus every child discovered while processing it.
fn resolve_dag(trace: &DagTrace, step_index: usize) -> Highlight {
    let mut out = Highlight::default();
    let Some(step) = trace.steps.get(step_index) else {
        return out;
    };
    out.active_node_ids.insert(step.node.clone());
    out.active_node_ids.extend(step.children.iter().cloned());
    out.primary_node_id = Some(step.node.clone());
    out.visited_node_ids = trace.steps[..step_index]
        .iter()
        .map(|s| s.node.clone())
        .collect();
    out
}

/// Newly visited vertices (compared with the previous step) are active; the first of them is
/// primary, and the active edge is the first edge reaching it from an already-visited vertex.
fn resolve_traversal(trace: &TraversalTrace, step_index: usize) -> Highlight {
    let mut out = Highlight::default();
    let Some(step) = trace.steps.get(step_index) else {
        return out;
    };
    let previous: Option<&[bool]> = step_index
        .checked_sub(1)
        .and_then(|ix| trace.steps.get(ix))
        .map(|s| s.visited.as_slice());
    let was_visited = |ix: usize| previous.and_then(|p| p.get(ix)).copied().unwrap_or(false);

    for (ix, (id, visited)) in trace.vertices.iter().zip(&step.visited).enumerate() {
        if !*visited {
            continue;
        }
        out.visited_node_ids.insert(id.clone());
        if !was_visited(ix) {
            out.active_node_ids.insert(id.clone());
            if out.primary_node_id.is_none() {
                out.primary_node_id = Some(id.clone());
            }
        }
    }

    if let Some(primary) = out.primary_node_id.as_deref() {
        let visited_before = |id: &str| {
            trace
                .vertices
                .iter()
                .position(|v| v == id)
                .is_some_and(&was_visited)
        };
        out.active_edge_id = trace
            .edges
            .iter()
            .find(|e| {
                (e.target == primary && visited_before(&e.source))
                    || (e.source == primary && visited_before(&e.target))
            })
            .map(|e| edge_id(EdgeKind::Adjacency, &e.source, &e.target));
    }
    out
}
