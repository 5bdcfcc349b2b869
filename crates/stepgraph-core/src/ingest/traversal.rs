use super::{id_of, record};
use crate::{
    DagEdge, Error, NodeId, Result, TraceFormatError, TraversalStep, TraversalTrace,
};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use serde_json::Value;

/// One BFS/DFS snapshot over a graph, tree or linked list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTraversalStep {
    pub adjacency_list: IndexMap<String, Vec<Value>>,
    /// Parallel to the vertex order; `"V"` (or `true`) marks a visited vertex.
    #[serde(default)]
    pub visited: Vec<Value>,
    #[serde(default)]
    pub queue: Option<Vec<Value>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

pub(crate) fn parse_traversal(value: &Value) -> Result<TraversalTrace> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => {
            return Err(Error::InvalidPayload {
                kind: "traversal",
                message: "traversal stream must be an array of snapshots".to_string(),
            });
        }
    };

    let mut errors: Vec<TraceFormatError> = Vec::new();
    let mut raw: Vec<RawTraversalStep> = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawTraversalStep>(item.clone()) {
            Ok(step) => raw.push(step),
            Err(err) => record(
                &mut errors,
                TraceFormatError::MalformedStep {
                    index,
                    message: err.to_string(),
                },
            ),
        }
    }

    let mut trace = ingest_traversal(&raw);
    errors.append(&mut trace.errors);
    trace.errors = errors;
    Ok(trace)
}

/// Builds the static vertex/edge sets and per-step visited flags.
///
/// Vertices are the union of all adjacency-list keys and neighbours in first-seen order; the
/// `visited` array of each step is read against that order. Symmetric neighbour pairs (undirected
/// graphs) become a single edge, in the direction first seen.
pub fn ingest_traversal(raw: &[RawTraversalStep]) -> TraversalTrace {
    let mut errors: Vec<TraceFormatError> = Vec::new();
    let mut vertices: IndexSet<NodeId> = IndexSet::new();
    let mut edge_set: IndexSet<(NodeId, NodeId)> = IndexSet::new();
    let mut self_loops: IndexSet<NodeId> = IndexSet::new();

    for step in raw {
        for key in step.adjacency_list.keys() {
            vertices.insert(key.clone());
        }
    }
    for step in raw {
        for (v, neighbours) in &step.adjacency_list {
            for w in neighbours.iter().filter_map(id_of) {
                vertices.insert(w.clone());
                if *v == w {
                    if self_loops.insert(w.clone()) {
                        record(&mut errors, TraceFormatError::SelfLoop { id: w });
                    }
                    continue;
                }
                if edge_set.contains(&(w.clone(), v.clone())) {
                    continue;
                }
                edge_set.insert((v.clone(), w));
            }
        }
    }

    let mut steps: Vec<TraversalStep> = Vec::with_capacity(raw.len());
    for (index, step) in raw.iter().enumerate() {
        if step.visited.len() > vertices.len() {
            record(
                &mut errors,
                TraceFormatError::InconsistentTraversal {
                    step: index,
                    message: format!(
                        "{} visited flags for {} vertices",
                        step.visited.len(),
                        vertices.len()
                    ),
                },
            );
        }
        let mut visited: Vec<bool> = step.visited.iter().map(is_visited_flag).collect();
        visited.resize(vertices.len(), false);
        steps.push(TraversalStep {
            visited,
            queue: step.queue.clone().unwrap_or_default(),
            description: step.description.clone(),
            line: step.line,
        });
    }

    TraversalTrace {
        vertices: vertices.into_iter().collect(),
        edges: edge_set
            .into_iter()
            .map(|(source, target)| DagEdge { source, target })
            .collect(),
        steps,
        errors,
    }
}

fn is_visited_flag(value: &Value) -> bool {
    match value {
        Value::String(s) => s.eq_ignore_ascii_case("v"),
        Value::Bool(b) => *b,
        _ => false,
    }
}
