use super::{id_of, record};
use crate::{DagEdge, DagNode, DagStep, DagTrace, Error, NodeId, Result, TraceFormatError};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use stepgraph_layout::graphlib::{Graph, alg};

/// A pre-structured node/edge table (e.g. a merge-sort divide/merge tree).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDag {
    #[serde(default)]
    pub nodes: Vec<Value>,
    #[serde(default)]
    pub edges: Vec<Value>,
    #[serde(default, alias = "sorted")]
    pub sorted_array: Option<Value>,
    #[serde(default)]
    pub final_state: Option<Value>,
}

pub(crate) fn parse_dag(value: &Value) -> Result<DagTrace> {
    let raw: RawDag = serde_json::from_value(value.clone()).map_err(|err| Error::InvalidPayload {
        kind: "dag",
        message: err.to_string(),
    })?;
    Ok(ingest_dag(&raw))
}

/// Validates the table and derives the level-propagation steps.
///
/// Invalid entries (unknown endpoints, duplicates, self-loops) are dropped and recorded. Nodes
/// that cannot be reached from any in-degree-0 root are recorded as unreachable and get no step.
pub fn ingest_dag(raw: &RawDag) -> DagTrace {
    let mut errors: Vec<TraceFormatError> = Vec::new();
    let mut g: Graph<(), (), ()> = Graph::new();

    let mut nodes: Vec<DagNode> = Vec::with_capacity(raw.nodes.len());
    for (index, item) in raw.nodes.iter().enumerate() {
        let Some(id) = item.get("id").and_then(id_of) else {
            record(
                &mut errors,
                TraceFormatError::MalformedStep {
                    index,
                    message: "node without a string or numeric `id`".to_string(),
                },
            );
            continue;
        };
        if g.has_node(&id) {
            record(&mut errors, TraceFormatError::DuplicateNode { id });
            continue;
        }
        let state = item
            .get("state")
            .or_else(|| item.get("value"))
            .cloned()
            .unwrap_or(Value::Null);
        g.set_node(id.clone(), ());
        nodes.push(DagNode { id, state });
    }

    let mut edges: Vec<DagEdge> = Vec::with_capacity(raw.edges.len());
    for (edge, item) in raw.edges.iter().enumerate() {
        let Some((source, target)) = edge_endpoints(item) else {
            record(
                &mut errors,
                TraceFormatError::MalformedStep {
                    index: edge,
                    message: "edge without `source`/`target`".to_string(),
                },
            );
            continue;
        };
        if let Some(id) = [&source, &target].into_iter().find(|id| !g.has_node(id)) {
            record(
                &mut errors,
                TraceFormatError::UnknownEndpoint {
                    edge,
                    id: id.clone(),
                },
            );
            continue;
        }
        if source == target {
            record(&mut errors, TraceFormatError::SelfLoop { id: source });
            continue;
        }
        if g.has_edge(&source, &target) {
            record(
                &mut errors,
                TraceFormatError::DuplicateEdge {
                    from: source,
                    to: target,
                },
            );
            continue;
        }
        g.set_edge(source.clone(), target.clone());
        edges.push(DagEdge { source, target });
    }

    for id in alg::unreachable_from_sources(&g) {
        record(&mut errors, TraceFormatError::Unreachable { id });
    }

    let roots: Vec<NodeId> = g.sources().into_iter().map(str::to_string).collect();
    let steps = level_steps(&g, &roots);

    DagTrace {
        nodes,
        edges,
        roots,
        steps,
        final_state: raw.final_state.clone().or_else(|| raw.sorted_array.clone()),
        errors,
    }
}

/// Breadth-first level propagation from the roots: each node is processed once, and its step
/// lists every child discovered through it.
fn level_steps(g: &Graph<(), (), ()>, roots: &[NodeId]) -> Vec<DagStep> {
    let mut queued: FxHashSet<&str> = FxHashSet::default();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    for r in roots {
        if queued.insert(r.as_str()) {
            queue.push_back((r.as_str(), 0));
        }
    }

    let mut steps: Vec<DagStep> = Vec::with_capacity(g.node_count());
    while let Some((v, level)) = queue.pop_front() {
        let children: Vec<&str> = g.successors(v);
        for &w in &children {
            if queued.insert(w) {
                queue.push_back((w, level + 1));
            }
        }
        steps.push(DagStep {
            node: v.to_string(),
            children: children.into_iter().map(str::to_string).collect(),
            level,
        });
    }
    steps
}

fn edge_endpoints(item: &Value) -> Option<(String, String)> {
    match item {
        Value::Object(map) => {
            let source = map.get("source").or_else(|| map.get("from")).and_then(id_of)?;
            let target = map.get("target").or_else(|| map.get("to")).and_then(id_of)?;
            Some((source, target))
        }
        Value::Array(pair) if pair.len() == 2 => Some((id_of(&pair[0])?, id_of(&pair[1])?)),
        _ => None,
    }
}
