//! Trace and graph data model.

use crate::TraceFormatError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use stepgraph_layout::LayoutError;

pub use stepgraph_layout::Point;

pub type NodeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum EventKind {
    Call,
    Return,
    Compare,
    Swap,
    Divide,
    Merge,
}

impl EventKind {
    /// Events that neither open nor close a frame.
    pub fn is_annotation(self) -> bool {
        !matches!(self, Self::Call | Self::Return)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Return => "return",
            Self::Compare => "compare",
            Self::Swap => "swap",
            Self::Divide => "divide",
            Self::Merge => "merge",
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(Self::Call),
            "return" => Ok(Self::Return),
            "compare" => Ok(Self::Compare),
            "swap" => Ok(Self::Swap),
            "divide" => Ok(Self::Divide),
            "merge" => Ok(Self::Merge),
            other => Err(format!("unknown event `{other}`")),
        }
    }
}

impl TryFrom<String> for EventKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event as produced by the instrumented program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStep {
    pub event: EventKind,
    pub func: String,
    #[serde(default)]
    pub depth: i64,
    #[serde(default)]
    pub args: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Source line executing at this event (drives the editor highlight).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl RawStep {
    pub fn new(event: EventKind, func: impl Into<String>, depth: i64) -> Self {
        Self {
            event,
            func: func.into(),
            depth,
            args: IndexMap::new(),
            value: None,
            note: None,
            line: None,
        }
    }

    pub fn call(func: impl Into<String>, depth: i64) -> Self {
        Self::new(EventKind::Call, func, depth)
    }

    pub fn ret(func: impl Into<String>, depth: i64, value: Value) -> Self {
        Self {
            value: Some(value),
            ..Self::new(EventKind::Return, func, depth)
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: Value) -> Self {
        self.args.insert(name.into(), value);
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

/// An ingested step: the raw event plus the frame it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(flatten)]
    pub raw: RawStep,
    /// The frame node this step refers to: the pushed node for `call`, the popped node for
    /// `return`, and the open frame for every other event.
    pub node_id: Option<NodeId>,
    pub parent_id: Option<NodeId>,
}

impl Step {
    pub fn event(&self) -> EventKind {
        self.raw.event
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTrace {
    pub steps: Vec<Step>,
    pub errors: Vec<TraceFormatError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DagNode {
    pub id: NodeId,
    pub state: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DagEdge {
    pub source: NodeId,
    pub target: NodeId,
}

/// One level-propagation step: `node` is taken off the frontier and its children discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DagStep {
    pub node: NodeId,
    pub children: Vec<NodeId>,
    pub level: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DagTrace {
    pub nodes: Vec<DagNode>,
    pub edges: Vec<DagEdge>,
    /// In-degree-0 nodes, the starting frontier.
    pub roots: Vec<NodeId>,
    pub steps: Vec<DagStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_state: Option<Value>,
    pub errors: Vec<TraceFormatError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalStep {
    /// Parallel to [`TraversalTrace::vertices`].
    pub visited: Vec<bool>,
    pub queue: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalTrace {
    pub vertices: Vec<NodeId>,
    pub edges: Vec<DagEdge>,
    pub steps: Vec<TraversalStep>,
    pub errors: Vec<TraceFormatError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TraceKind {
    Calls,
    Dag,
    Traversal,
}

impl TraceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calls => "calls",
            Self::Dag => "dag",
            Self::Traversal => "traversal",
        }
    }
}

/// An immutable, ingested trace. A new execution run produces a new `Trace`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Trace {
    Calls(CallTrace),
    Dag(DagTrace),
    Traversal(TraversalTrace),
}

impl Default for Trace {
    fn default() -> Self {
        Self::Calls(CallTrace::default())
    }
}

impl Trace {
    pub fn kind(&self) -> TraceKind {
        match self {
            Self::Calls(_) => TraceKind::Calls,
            Self::Dag(_) => TraceKind::Dag,
            Self::Traversal(_) => TraceKind::Traversal,
        }
    }

    /// Number of playback steps.
    pub fn len(&self) -> usize {
        match self {
            Self::Calls(t) => t.steps.len(),
            Self::Dag(t) => t.steps.len(),
            Self::Traversal(t) => t.steps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn errors(&self) -> &[TraceFormatError] {
        match self {
            Self::Calls(t) => &t.errors,
            Self::Dag(t) => &t.errors,
            Self::Traversal(t) => &t.errors,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    /// Source line for the editor highlight at `index`.
    pub fn line_at(&self, index: usize) -> Option<u32> {
        match self {
            Self::Calls(t) => t.steps.get(index).and_then(|s| s.raw.line),
            Self::Dag(_) => None,
            Self::Traversal(t) => t.steps.get(index).and_then(|s| s.line),
        }
    }

    /// Key/value snapshot for the variable inspector at `index`.
    pub fn variables_at(&self, index: usize) -> IndexMap<String, Value> {
        let mut out: IndexMap<String, Value> = IndexMap::new();
        match self {
            Self::Calls(t) => {
                let Some(step) = t.steps.get(index) else {
                    return out;
                };
                for (k, v) in &step.raw.args {
                    out.insert(k.clone(), v.clone());
                }
                if step.raw.event == EventKind::Return {
                    if let Some(value) = &step.raw.value {
                        out.insert("return".to_string(), value.clone());
                    }
                }
                if let Some(note) = &step.raw.note {
                    out.insert("note".to_string(), Value::String(note.clone()));
                }
            }
            Self::Dag(t) => {
                let Some(step) = t.steps.get(index) else {
                    return out;
                };
                if let Some(node) = t.nodes.iter().find(|n| n.id == step.node) {
                    out.insert("state".to_string(), node.state.clone());
                }
                out.insert("level".to_string(), Value::from(step.level));
                if index + 1 == t.steps.len() {
                    if let Some(final_state) = &t.final_state {
                        out.insert("finalState".to_string(), final_state.clone());
                    }
                }
            }
            Self::Traversal(t) => {
                let Some(step) = t.steps.get(index) else {
                    return out;
                };
                out.insert("queue".to_string(), Value::Array(step.queue.clone()));
                let visited: Vec<Value> = t
                    .vertices
                    .iter()
                    .zip(&step.visited)
                    .filter(|(_, v)| **v)
                    .map(|(id, _)| Value::String(id.clone()))
                    .collect();
                out.insert("visited".to_string(), Value::Array(visited));
                if let Some(description) = &step.description {
                    out.insert(
                        "description".to_string(),
                        Value::String(description.clone()),
                    );
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    Call,
    Return,
    Adjacency,
}

impl EdgeKind {
    /// Structural edges define the layout hierarchy; return edges are drawn on top of it.
    pub fn is_structural(self) -> bool {
        !matches!(self, Self::Return)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Return => "return",
            Self::Adjacency => "adjacency",
        }
    }
}

/// Stable edge id shared by the graph builder and the highlight resolver.
///
/// `\` and `>` inside node ids are backslash-escaped, so the `->` separator is unambiguous.
pub fn edge_id(kind: EdgeKind, source: &str, target: &str) -> String {
    format!(
        "{}:{}->{}",
        kind.as_str(),
        escape_id(source),
        escape_id(target)
    )
}

fn escape_id(id: &str) -> Cow<'_, str> {
    if !id.contains(['\\', '>']) {
        return Cow::Borrowed(id);
    }
    let mut out = String::with_capacity(id.len() + 2);
    for ch in id.chars() {
        if matches!(ch, '\\' | '>') {
            out.push('\\');
        }
        out.push(ch);
    }
    Cow::Owned(out)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    /// Final label (after any `return` has been applied).
    pub label: String,
    #[serde(skip)]
    pub(crate) call_label: String,
    pub rank: i32,
    pub position: Point,
    pub style_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_value: Option<Value>,
    /// First step at which the node exists.
    pub created_at: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_at: Option<usize>,
}

impl Node {
    pub(crate) fn new(id: NodeId, label: String, style_class: String, created_at: usize) -> Self {
        Self {
            id,
            call_label: label.clone(),
            label,
            rank: 0,
            position: Point::default(),
            style_class,
            return_value: None,
            created_at,
            returned_at: None,
        }
    }

    /// The label as it reads at `step`: the return value only shows once it has been played.
    pub fn label_at(&self, step: usize) -> &str {
        match self.returned_at {
            Some(r) if r <= step => &self.label,
            _ => &self.call_label,
        }
    }

    pub fn is_visible_at(&self, step: usize) -> bool {
        self.created_at <= step
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub created_at: usize,
}

impl Edge {
    pub fn new(kind: EdgeKind, source: &str, target: &str, created_at: usize) -> Self {
        Self {
            id: edge_id(kind, source, target),
            source: source.to_string(),
            target: target.to_string(),
            kind,
            label: None,
            created_at,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Nodes and edges derived from one trace. Each run builds a fresh value; nothing is patched in
/// place across runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceGraph {
    pub kind: TraceKind,
    pub nodes: IndexMap<NodeId, Node>,
    pub edges: Vec<Edge>,
    /// Set when ranking failed and nodes were placed on the fallback grid.
    #[serde(skip)]
    pub layout_error: Option<LayoutError>,
}

impl TraceGraph {
    pub fn new(kind: TraceKind) -> Self {
        Self {
            kind,
            nodes: IndexMap::new(),
            edges: Vec::new(),
            layout_error: None,
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    /// Nodes that exist by `step`, in creation order.
    pub fn visible_at(&self, step: usize) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.is_visible_at(step))
    }

    pub fn used_grid_fallback(&self) -> bool {
        self.layout_error.is_some()
    }
}

/// Renders a JSON value for labels: strings without quotes, everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
