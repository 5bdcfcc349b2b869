use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported trace payload: {message}")]
    UnsupportedPayload { message: String },

    #[error("Invalid trace payload ({kind}): {message}")]
    InvalidPayload { kind: &'static str, message: String },

    #[error(transparent)]
    Format(#[from] TraceFormatError),

    #[error("Invalid config: {message}")]
    Config { message: String },

    #[error("Trace JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A recoverable problem found while ingesting a trace.
///
/// Ingestion records these on the [`Trace`](crate::Trace) and keeps going; the steps that could
/// be interpreted still form a usable (partial) trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TraceFormatError {
    #[error("step {step}: `return` from `{func}` with no open call")]
    UnmatchedReturn { step: usize, func: String },

    #[error("step {index}: malformed step: {message}")]
    MalformedStep { index: usize, message: String },

    #[error("edge {edge}: unknown endpoint `{id}`")]
    UnknownEndpoint { edge: usize, id: String },

    #[error("duplicate node id `{id}`")]
    DuplicateNode { id: String },

    #[error("duplicate edge `{from}` -> `{to}`")]
    DuplicateEdge { from: String, to: String },

    #[error("self-loop on `{id}`")]
    SelfLoop { id: String },

    #[error("node `{id}` is not reachable from any root")]
    Unreachable { id: String },

    #[error("step {step}: {message}")]
    InconsistentTraversal { step: usize, message: String },
}
