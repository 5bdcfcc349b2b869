//! Payload shape detection.
//!
//! The analysis service answers with one of three JSON shapes (call/return stream, DAG table,
//! traversal snapshots), sometimes wrapped in an envelope object. Detection only looks at the
//! top-level structure; field-level validation happens during ingestion.

use crate::{Error, Result, TraceKind};
use serde_json::Value;

const ENVELOPE_KEYS: [&str; 3] = ["steps", "trace", "data"];

/// Detects the payload kind and returns the (unwrapped) value to ingest.
pub fn detect_payload(value: &Value) -> Result<(TraceKind, &Value)> {
    detect_inner(value, 0)
}

fn detect_inner(value: &Value, depth: usize) -> Result<(TraceKind, &Value)> {
    match value {
        Value::Array(items) => {
            let is_traversal = items
                .iter()
                .find(|v| v.is_object())
                .is_some_and(|first| first.get("adjacencyList").is_some());
            if is_traversal {
                Ok((TraceKind::Traversal, value))
            } else {
                Ok((TraceKind::Calls, value))
            }
        }
        Value::Object(map) => {
            if map.contains_key("nodes") {
                return Ok((TraceKind::Dag, value));
            }
            if map.contains_key("adjacencyList") {
                return Ok((TraceKind::Traversal, value));
            }
            if depth == 0 {
                for key in ENVELOPE_KEYS {
                    if let Some(inner) = map.get(key) {
                        return detect_inner(inner, depth + 1);
                    }
                }
            }
            Err(Error::UnsupportedPayload {
                message: format!(
                    "object with keys [{}] is not a call stream, DAG table or traversal",
                    map.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
            })
        }
        other => Err(Error::UnsupportedPayload {
            message: format!("expected a JSON array or object, got {}", json_type(other)),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
