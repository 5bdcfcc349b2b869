use crate::*;
use serde_json::json;

#[test]
fn detects_the_three_shapes() {
    let calls = json!([{"event": "call", "func": "f", "depth": 0}]);
    let dag = json!({"nodes": [], "edges": []});
    let traversal = json!([{"adjacencyList": {}, "visited": []}]);

    assert_eq!(detect_payload(&calls).unwrap().0, TraceKind::Calls);
    assert_eq!(detect_payload(&dag).unwrap().0, TraceKind::Dag);
    assert_eq!(detect_payload(&traversal).unwrap().0, TraceKind::Traversal);
}

#[test]
fn unwraps_envelopes_one_level_deep() {
    let wrapped = json!({"steps": [{"event": "call", "func": "f", "depth": 0}]});
    let (kind, inner) = detect_payload(&wrapped).unwrap();
    assert_eq!(kind, TraceKind::Calls);
    assert!(inner.is_array());

    let wrapped = json!({"trace": {"nodes": [{"id": "a"}]}});
    assert_eq!(detect_payload(&wrapped).unwrap().0, TraceKind::Dag);

    let nested = json!({"data": {"data": []}});
    assert!(matches!(
        detect_payload(&nested),
        Err(Error::UnsupportedPayload { .. })
    ));
}

#[test]
fn empty_array_is_an_empty_call_trace() {
    let trace = ingest(&json!([]), IngestOptions::strict()).unwrap();
    assert_eq!(trace.kind(), TraceKind::Calls);
    assert!(trace.is_empty());
}

#[test]
fn rejects_scalars_and_unknown_objects() {
    for payload in [json!(null), json!("trace"), json!(3), json!({"rows": []})] {
        let err = detect_payload(&payload).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPayload { .. }), "{payload}");
    }
}

#[test]
fn malformed_dag_tables_are_invalid_payloads() {
    let err = ingest(&json!({"nodes": 3}), IngestOptions::lenient()).unwrap_err();
    assert!(matches!(err, Error::InvalidPayload { kind: "dag", .. }));
}
