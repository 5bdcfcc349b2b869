mod detect;
mod traversal;

use crate::*;
use serde_json::json;

/// `fib(3)` cut down to the four steps of the worked example.
pub(crate) fn fib_steps() -> Vec<RawStep> {
    vec![
        RawStep::call("fib", 0).with_arg("n", json!(3)).with_line(2),
        RawStep::call("fib", 1).with_arg("n", json!(2)).with_line(4),
        RawStep::ret("fib", 1, json!(1)).with_line(3),
        RawStep::ret("fib", 0, json!(2)).with_line(5),
    ]
}

pub(crate) fn fib_trace() -> Trace {
    Trace::Calls(ingest::ingest_calls(fib_steps()))
}
