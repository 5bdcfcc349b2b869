use super::record;
use crate::{CallTrace, Error, EventKind, NodeId, RawStep, Result, Step, TraceFormatError};
use serde_json::Value;

/// Open frames during ingestion. Lives only for one `ingest_calls` pass.
#[derive(Debug, Clone, Default)]
pub struct CallStack {
    frames: Vec<NodeId>,
}

impl CallStack {
    pub fn push(&mut self, id: NodeId) {
        self.frames.push(id);
    }

    pub fn pop(&mut self) -> Option<NodeId> {
        self.frames.pop()
    }

    pub fn top(&self) -> Option<&NodeId> {
        self.frames.last()
    }

    /// The frame below the top.
    pub fn parent_of_top(&self) -> Option<&NodeId> {
        self.frames.len().checked_sub(2).map(|ix| &self.frames[ix])
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Resolves frame ids for a call/return stream.
///
/// `call` pushes a fresh node id (its parent is the previous top), `return` pops one, and every
/// other event is attached to the open frame. A `return` on an empty stack is recorded as
/// [`TraceFormatError::UnmatchedReturn`]; the step is kept (without a node) and processing
/// continues.
pub fn ingest_calls(raw: impl IntoIterator<Item = RawStep>) -> CallTrace {
    ingest_indexed(raw.into_iter().enumerate(), Vec::new())
}

pub(crate) fn parse_call_stream(value: &Value) -> Result<CallTrace> {
    let Value::Array(items) = value else {
        return Err(Error::InvalidPayload {
            kind: "calls",
            message: "call stream must be a JSON array".to_string(),
        });
    };

    let mut errors: Vec<TraceFormatError> = Vec::new();
    let mut parsed: Vec<(usize, RawStep)> = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match RawStep::deserialize_from(item) {
            Ok(step) => parsed.push((index, step)),
            Err(message) => record(&mut errors, TraceFormatError::MalformedStep { index, message }),
        }
    }
    Ok(ingest_indexed(parsed, errors))
}

fn ingest_indexed(
    raw: impl IntoIterator<Item = (usize, RawStep)>,
    mut errors: Vec<TraceFormatError>,
) -> CallTrace {
    let mut stack = CallStack::default();
    let mut next_id: usize = 0;
    let mut steps: Vec<Step> = Vec::new();

    for (index, raw) in raw {
        let (node_id, parent_id) = match raw.event {
            EventKind::Call => {
                let parent = stack.top().cloned();
                let id = format!("{}#{next_id}", raw.func);
                next_id += 1;
                if raw.depth != stack.depth() as i64 {
                    tracing::debug!(
                        step = index,
                        reported = raw.depth,
                        actual = stack.depth(),
                        "call depth disagrees with the open frames"
                    );
                }
                stack.push(id.clone());
                (Some(id), parent)
            }
            EventKind::Return => match stack.pop() {
                Some(id) => (Some(id), stack.top().cloned()),
                None => {
                    record(
                        &mut errors,
                        TraceFormatError::UnmatchedReturn {
                            step: index,
                            func: raw.func.clone(),
                        },
                    );
                    (None, None)
                }
            },
            _ => (stack.top().cloned(), stack.parent_of_top().cloned()),
        };
        steps.push(Step {
            raw,
            node_id,
            parent_id,
        });
    }

    if !stack.is_empty() {
        tracing::debug!(open = stack.depth(), "trace ended with open calls");
    }

    CallTrace { steps, errors }
}

impl RawStep {
    fn deserialize_from(value: &Value) -> std::result::Result<Self, String> {
        if !value.is_object() {
            return Err("expected an object".to_string());
        }
        serde_json::from_value(value.clone()).map_err(|err| err.to_string())
    }
}
