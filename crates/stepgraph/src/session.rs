//! One visualization session: the current trace, its graph and its playback state.
//!
//! Every run replaces the trace wholesale. Fetches are tagged with a generation number; starting a
//! new fetch aborts the previous one, and [`Session::complete_fetch`] drops any outcome whose
//! generation is no longer current, so a slow response from an older run can never overwrite a
//! newer trace.

use crate::playback::PlaybackController;
use futures::future::{AbortHandle, AbortRegistration, Abortable};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use stepgraph_core::{Engine, EngineConfig, Highlight, LoadedTrace, Trace, TraceGraph};

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("fetch cancelled by a newer run")]
    Cancelled,

    #[error("trace service error: {message}")]
    Service { message: String },
}

impl FetchError {
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("nothing to run: the editor is empty")]
    NothingToRun,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to load trace: {0}")]
    Load(#[from] stepgraph_core::Error),
}

/// The external execution/analysis service.
pub trait TraceService {
    /// Runs `code` and returns the raw trace payload.
    fn fetch(&self, code: &str) -> impl Future<Output = std::result::Result<Value, FetchError>>;
}

/// A started fetch. Dropping it without running has no effect on the session.
#[derive(Debug)]
pub struct PendingFetch {
    generation: u64,
    handle: AbortHandle,
    registration: AbortRegistration,
}

impl PendingFetch {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_aborted()
    }

    /// Drives `fetch` until it finishes or the session aborts it.
    pub async fn run<F>(self, fetch: F) -> FetchOutcome
    where
        F: Future<Output = std::result::Result<Value, FetchError>>,
    {
        let result = match Abortable::new(fetch, self.registration).await {
            Ok(result) => result,
            Err(_aborted) => Err(FetchError::Cancelled),
        };
        FetchOutcome {
            generation: self.generation,
            result,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub generation: u64,
    pub result: std::result::Result<Value, FetchError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// The payload replaced the current trace.
    Installed,
    /// A newer fetch was started; the outcome was dropped.
    Stale,
    Cancelled,
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    handle: AbortHandle,
}

#[derive(Debug, Default)]
pub struct Session {
    engine: Engine,
    loaded: Option<LoadedTrace>,
    controller: PlaybackController,
    code: String,
    generation: u64,
    in_flight: Option<InFlight>,
}

impl Session {
    pub fn new(engine: Engine) -> Self {
        let controller = PlaybackController::new(engine.config().playback.clone());
        Self {
            engine,
            loaded: None,
            controller,
            code: String::new(),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(Engine::new().with_config(config))
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn loaded(&self) -> Option<&LoadedTrace> {
        self.loaded.as_ref()
    }

    pub fn trace(&self) -> Option<&Arc<Trace>> {
        self.loaded.as_ref().map(|l| &l.trace)
    }

    pub fn graph(&self) -> Option<&Arc<TraceGraph>> {
        self.loaded.as_ref().map(|l| &l.graph)
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    pub fn highlight(&self) -> Highlight {
        self.controller.highlight()
    }

    /// Advances the auto-play timer; see [`PlaybackController::tick`].
    pub fn tick(&mut self, elapsed: Duration) -> usize {
        self.controller.tick(elapsed)
    }

    /// Ingests, builds and lays out `payload`, then replaces the current trace and playback
    /// state. On error the previous trace stays in place.
    ///
    /// A direct load supersedes any fetch in flight: it is aborted and its outcome will come back
    /// [`FetchStatus::Stale`].
    pub fn load_payload(&mut self, payload: &Value) -> Result<&LoadedTrace> {
        self.cancel_fetch();
        self.generation += 1;
        self.install(payload)
    }

    fn install(&mut self, payload: &Value) -> Result<&LoadedTrace> {
        let loaded = self
            .engine
            .load_sync(payload, self.engine.ingest_options())?;
        if loaded.trace.has_errors() {
            tracing::warn!(
                errors = loaded.trace.errors().len(),
                "trace loaded with format errors"
            );
        }
        self.controller.load(loaded.trace.clone());
        Ok(self.loaded.insert(loaded))
    }

    /// Called by the host whenever the editor content changes.
    pub fn on_content_changed(&mut self, code: &str) {
        self.code.clear();
        self.code.push_str(code);
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn can_run(&self) -> bool {
        !self.code.trim().is_empty()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts a new fetch generation, aborting the one in flight.
    pub fn begin_fetch(&mut self) -> PendingFetch {
        self.cancel_fetch();
        self.generation += 1;
        let (handle, registration) = AbortHandle::new_pair();
        self.in_flight = Some(InFlight {
            generation: self.generation,
            handle: handle.clone(),
        });
        tracing::debug!(generation = self.generation, "fetch started");
        PendingFetch {
            generation: self.generation,
            handle,
            registration,
        }
    }

    pub fn cancel_fetch(&mut self) -> bool {
        let Some(prev) = self.in_flight.take() else {
            return false;
        };
        prev.handle.abort();
        tracing::debug!(generation = prev.generation, "fetch cancelled");
        true
    }

    /// Starts a run of the current editor content against `service`.
    ///
    /// The returned future does not borrow the session; await it and hand the outcome to
    /// [`Session::complete_fetch`].
    pub fn run<'s, S>(
        &mut self,
        service: &'s S,
    ) -> Result<impl Future<Output = FetchOutcome> + use<'s, S>>
    where
        S: TraceService,
    {
        if !self.can_run() {
            return Err(SessionError::NothingToRun);
        }
        let pending = self.begin_fetch();
        let code = self.code.clone();
        Ok(async move { pending.run(service.fetch(&code)).await })
    }

    /// Installs a fetch result if it belongs to the current generation.
    ///
    /// Stale and cancelled outcomes are dropped. A failed fetch, or a payload that does not
    /// load, is returned as an error and leaves the previous trace untouched.
    pub fn complete_fetch(&mut self, outcome: FetchOutcome) -> Result<FetchStatus> {
        if outcome.generation != self.generation {
            tracing::warn!(
                generation = outcome.generation,
                current = self.generation,
                "dropping stale fetch response"
            );
            return Ok(FetchStatus::Stale);
        }
        if self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == outcome.generation)
        {
            self.in_flight = None;
        }
        match outcome.result {
            Ok(payload) => {
                self.install(&payload)?;
                Ok(FetchStatus::Installed)
            }
            Err(FetchError::Cancelled) => Ok(FetchStatus::Cancelled),
            Err(err) => Err(err.into()),
        }
    }
}
