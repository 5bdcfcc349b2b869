use crate::*;
use serde_json::json;

pub(crate) fn bfs_payload() -> serde_json::Value {
    let adjacency = json!({"A": ["B", "C"], "B": ["A"], "C": ["A"]});
    json!([
        {"adjacencyList": adjacency, "visited": ["V", "_", "_"], "queue": ["A"], "line": 3},
        {"adjacencyList": adjacency, "visited": ["V", "V", "_"], "queue": ["B"], "line": 5},
        {"adjacencyList": adjacency, "visited": ["V", "V", "_"], "queue": ["B", "C"], "description": "enqueue C"}
    ])
}

#[test]
fn vertices_and_deduplicated_edges() {
    let trace = ingest(&bfs_payload(), IngestOptions::strict()).unwrap();
    let Trace::Traversal(t) = &trace else {
        panic!("expected a traversal trace");
    };
    assert_eq!(t.vertices, vec!["A", "B", "C"]);
    let edges: Vec<(&str, &str)> = t
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(edges, vec![("A", "B"), ("A", "C")]);
    assert_eq!(t.steps[1].visited, vec![true, true, false]);
}

#[test]
fn visited_flags_drive_node_styles() {
    let trace = ingest(&bfs_payload(), IngestOptions::strict()).unwrap();
    let h = highlight::resolve(&trace, 2);

    let styles: Vec<NodeStyle> = ["A", "B", "C"].iter().map(|id| h.style_of(id)).collect();
    assert_eq!(
        styles,
        vec![NodeStyle::Visited, NodeStyle::Visited, NodeStyle::Default]
    );
    assert_eq!(h.visited_node_ids.len(), 2);
}

#[test]
fn short_visited_arrays_are_padded_and_long_ones_reported() {
    let payload = json!([
        {"adjacencyList": {"1": [2], "2": []}, "visited": [true]},
        {"adjacencyList": {"1": [2], "2": []}, "visited": ["V", "V", "V"]}
    ]);
    let trace = ingest(&payload, IngestOptions::lenient()).unwrap();
    let Trace::Traversal(t) = &trace else {
        panic!("expected a traversal trace");
    };
    assert_eq!(t.steps[0].visited, vec![true, false]);
    assert_eq!(t.steps[1].visited, vec![true, true]);
    assert!(matches!(
        t.errors.as_slice(),
        [TraceFormatError::InconsistentTraversal { step: 1, .. }]
    ));
}

#[test]
fn self_loops_are_reported_once() {
    let payload = json!([
        {"adjacencyList": {"x": ["x", "y"]}, "visited": []},
        {"adjacencyList": {"x": ["x", "y"]}, "visited": ["V"]}
    ]);
    let trace = ingest(&payload, IngestOptions::lenient()).unwrap();
    assert_eq!(
        trace.errors(),
        &[TraceFormatError::SelfLoop { id: "x".to_string() }]
    );
    let graph = Engine::new().build(&trace);
    assert_eq!(graph.edges.len(), 1);
}

#[test]
fn traversal_inspector_snapshot() {
    let trace = ingest(&bfs_payload(), IngestOptions::strict()).unwrap();
    let vars = trace.variables_at(2);
    assert_eq!(vars.get("queue"), Some(&json!(["B", "C"])));
    assert_eq!(vars.get("visited"), Some(&json!(["A", "B"])));
    assert_eq!(vars.get("description"), Some(&json!("enqueue C")));
    assert_eq!(trace.line_at(1), Some(5));
    assert_eq!(trace.line_at(2), None);
}

#[test]
fn a_single_snapshot_object_is_a_one_step_trace() {
    let payload = json!({"adjacencyList": {"h": ["n1"], "n1": ["n2"]}, "visited": ["V"]});
    let trace = ingest(&payload, IngestOptions::strict()).unwrap();
    assert_eq!(trace.kind(), TraceKind::Traversal);
    assert_eq!(trace.len(), 1);
}
