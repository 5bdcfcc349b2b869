//! TraceIngester: raw payloads to canonical [`Trace`] values.
//!
//! Ingestion is lenient by default. Problems are collected as [`TraceFormatError`]s on the trace
//! and the usable prefix (or subset) is kept, because a run that failed half-way is still worth
//! replaying. [`IngestOptions::strict`] turns the first collected problem into an error instead.

mod calls;
mod dag;
mod traversal;

pub use calls::{CallStack, ingest_calls};
pub use dag::{RawDag, ingest_dag};
pub use traversal::{RawTraversalStep, ingest_traversal};

use crate::detect::detect_payload;
use crate::{Result, Trace, TraceFormatError, TraceKind};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    pub strict: bool,
}

impl IngestOptions {
    /// Any recorded trace-format problem fails ingestion.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Record trace-format problems on the trace and keep the usable part.
    pub fn lenient() -> Self {
        Self { strict: false }
    }
}

/// Detects the payload shape and ingests it.
pub fn ingest(payload: &Value, options: IngestOptions) -> Result<Trace> {
    let (kind, value) = detect_payload(payload)?;
    let trace = match kind {
        TraceKind::Calls => Trace::Calls(calls::parse_call_stream(value)?),
        TraceKind::Dag => Trace::Dag(dag::parse_dag(value)?),
        TraceKind::Traversal => Trace::Traversal(traversal::parse_traversal(value)?),
    };

    tracing::debug!(
        kind = kind.as_str(),
        steps = trace.len(),
        errors = trace.errors().len(),
        "ingested trace"
    );

    if options.strict {
        if let Some(err) = trace.errors().first() {
            return Err(err.clone().into());
        }
    }
    Ok(trace)
}

pub(crate) fn record(errors: &mut Vec<TraceFormatError>, err: TraceFormatError) {
    tracing::warn!(error = %err, "trace format error");
    errors.push(err);
}

/// Node ids may arrive as strings or numbers.
pub(crate) fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
