#![forbid(unsafe_code)]

//! Execution-trace model, ingestion and graph building (headless).
//!
//! A trace arrives as JSON in one of three shapes (call/return stream, DAG table, traversal
//! snapshots). [`Engine`] turns it into a canonical [`Trace`] plus a laid-out [`TraceGraph`];
//! [`highlight::resolve`] answers what is active at a given step.
//!
//! Design goals:
//! - deterministic outputs (same payload, same graph and coordinates)
//! - lenient by default: malformed parts are reported, the rest stays replayable
//! - runtime-agnostic async APIs (no specific executor required)

pub mod build;
pub mod config;
pub mod detect;
pub mod error;
pub mod highlight;
pub mod ingest;
pub mod layout;
pub mod model;

pub use build::{GraphBuilder, call_label};
pub use config::{EngineConfig, IngestConfig, LayoutConfig, PlaybackConfig};
pub use detect::detect_payload;
pub use error::{Error, Result, TraceFormatError};
pub use highlight::{Highlight, NodeStyle};
pub use ingest::{IngestOptions, ingest};
pub use layout::LayoutOutcome;
pub use model::*;
pub use stepgraph_layout::{LayoutError, RankDir};

use serde_json::Value;
use std::sync::Arc;

/// A trace and its laid-out graph, shared read-only between playback and rendering.
#[derive(Debug, Clone)]
pub struct LoadedTrace {
    pub trace: Arc<Trace>,
    pub graph: Arc<TraceGraph>,
}

impl LoadedTrace {
    pub fn highlight_at(&self, step_index: usize) -> Highlight {
        highlight::resolve(&self.trace, step_index)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ingest options implied by the engine config.
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            strict: self.config.ingest.strict,
        }
    }

    pub fn ingest(&self, payload: &Value) -> Result<Trace> {
        ingest::ingest(payload, self.ingest_options())
    }

    pub fn ingest_with(&self, payload: &Value, options: IngestOptions) -> Result<Trace> {
        ingest::ingest(payload, options)
    }

    /// Builds the graph without positions.
    pub fn build(&self, trace: &Trace) -> TraceGraph {
        GraphBuilder::new(&self.config).build(trace)
    }

    pub fn layout(&self, graph: TraceGraph) -> TraceGraph {
        layout::layout_graph(graph, &self.config.layout)
    }

    /// Ingest, build and lay out in one go.
    pub fn load_sync(&self, payload: &Value, options: IngestOptions) -> Result<LoadedTrace> {
        let trace = self.ingest_with(payload, options)?;
        let graph = self.layout(self.build(&trace));
        Ok(LoadedTrace {
            trace: Arc::new(trace),
            graph: Arc::new(graph),
        })
    }

    pub async fn load(&self, payload: &Value, options: IngestOptions) -> Result<LoadedTrace> {
        self.load_sync(payload, options)
    }

    /// Like [`Engine::load_sync`], parsing the payload from JSON text first.
    pub fn load_str_sync(&self, text: &str, options: IngestOptions) -> Result<LoadedTrace> {
        let payload: Value = serde_json::from_str(text)?;
        self.load_sync(&payload, options)
    }
}

#[cfg(test)]
mod tests;
