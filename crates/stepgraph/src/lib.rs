#![forbid(unsafe_code)]

//! `stepgraph` replays execution traces as laid-out directed graphs, headless.
//!
//! The core crate turns a payload into a [`Trace`] and a positioned [`TraceGraph`]. This crate
//! adds what a visualization page needs on top:
//!
//! - [`PlaybackController`]: first/prev/next/last/seek navigation and timed auto-play
//! - [`Session`]: owns one trace at a time, replaces it wholesale on every run, and makes sure a
//!   late response from an older run can never overwrite a newer trace
//!
//! Rendering is out of scope; consumers read node positions, edge ids and [`Highlight`]s.

pub use stepgraph_core::*;

pub mod playback;
pub mod session;

pub use playback::{ListenerId, PlaybackController, PlaybackMode, PlaybackState, StepChanged};
pub use session::{
    FetchError, FetchOutcome, FetchStatus, PendingFetch, Session, SessionError, TraceService,
};
