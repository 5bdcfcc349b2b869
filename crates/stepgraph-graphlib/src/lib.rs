#![forbid(unsafe_code)]

//! Directed graph container used by `stepgraph-layout`.
//!
//! A [`Graph`] is a plain value: nodes and edges keep their insertion order, so every algorithm
//! that iterates it is deterministic. Layout builds a fresh graph per invocation instead of
//! sharing one long-lived instance.

pub mod graph;

pub use graph::{EdgeKey, Graph, alg};
