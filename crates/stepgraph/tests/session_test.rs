use futures::channel::oneshot;
use futures::executor::block_on;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use stepgraph::{
    EngineConfig, FetchError, FetchOutcome, FetchStatus, PlaybackMode, Session, SessionError,
    TraceKind, TraceService,
};

type Reply = Result<Value, FetchError>;

/// Hands out one pre-registered reply per code string; the test decides when each arrives.
#[derive(Default)]
struct ScriptedService {
    replies: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
}

impl ScriptedService {
    fn expect(&self, code: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().insert(code.to_string(), rx);
        tx
    }
}

impl TraceService for ScriptedService {
    fn fetch(&self, code: &str) -> impl Future<Output = Reply> {
        let rx = self.replies.lock().unwrap().remove(code);
        async move {
            match rx {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(FetchError::service("reply dropped"))),
                None => Err(FetchError::service("unexpected code")),
            }
        }
    }
}

fn calls_payload(func: &str) -> Value {
    json!([
        {"event": "call", "func": func, "depth": 0},
        {"event": "return", "func": func, "depth": 0, "value": 1}
    ])
}

fn dag_payload() -> Value {
    json!({"nodes": [{"id": "a"}, {"id": "b"}], "edges": [["a", "b"]]})
}

fn root_label(session: &Session) -> String {
    let graph = session.graph().unwrap();
    graph.nodes.values().next().unwrap().label.clone()
}

#[test]
fn newer_run_wins_over_a_late_stale_response() {
    let service = ScriptedService::default();
    let slow = service.expect("slow()");
    let fast = service.expect("fast()");

    let mut session = Session::default();
    session.on_content_changed("slow()");
    let first = session.run(&service).unwrap();
    session.on_content_changed("fast()");
    let second = session.run(&service).unwrap();
    assert_eq!(session.generation(), 2);

    fast.send(Ok(calls_payload("fast"))).unwrap();
    let _ = slow.send(Ok(calls_payload("slow")));

    let outcome = block_on(second);
    assert_eq!(session.complete_fetch(outcome).unwrap(), FetchStatus::Installed);
    assert_eq!(root_label(&session), "fast() => 1");

    let late = block_on(first);
    assert_eq!(late.generation, 1);
    assert_eq!(late.result, Err(FetchError::Cancelled));
    assert_eq!(session.complete_fetch(late).unwrap(), FetchStatus::Stale);
    assert_eq!(root_label(&session), "fast() => 1");
    assert!(!session.is_fetching());
}

#[test]
fn stale_success_is_dropped_even_if_not_aborted() {
    let mut session = Session::default();
    session.load_payload(&calls_payload("current")).unwrap();

    let old = session.begin_fetch();
    let _new = session.begin_fetch();
    assert!(old.is_cancelled());

    let outcome = FetchOutcome {
        generation: old.generation(),
        result: Ok(calls_payload("stale")),
    };
    assert_eq!(session.complete_fetch(outcome).unwrap(), FetchStatus::Stale);
    assert_eq!(root_label(&session), "current() => 1");
    assert!(session.is_fetching());
}

#[test]
fn direct_load_supersedes_a_fetch_in_flight() {
    let mut session = Session::default();
    let pending = session.begin_fetch();
    assert!(session.is_fetching());

    session.load_payload(&calls_payload("newer")).unwrap();
    assert!(pending.is_cancelled());
    assert!(!session.is_fetching());

    let outcome = block_on(pending.run(async { Ok(calls_payload("older")) }));
    assert_eq!(session.complete_fetch(outcome).unwrap(), FetchStatus::Stale);
    assert_eq!(root_label(&session), "newer() => 1");

    let late = FetchOutcome {
        generation: 1,
        result: Ok(calls_payload("older")),
    };
    assert_eq!(session.complete_fetch(late).unwrap(), FetchStatus::Stale);
    assert_eq!(root_label(&session), "newer() => 1");
}

#[test]
fn failed_fetch_keeps_the_previous_trace() {
    let service = ScriptedService::default();
    let reply = service.expect("boom()");

    let mut session = Session::default();
    session.load_payload(&calls_payload("ok")).unwrap();
    session.controller_mut().seek(1);

    session.on_content_changed("boom()");
    let run = session.run(&service).unwrap();
    reply.send(Err(FetchError::service("500"))).unwrap();

    let err = session.complete_fetch(block_on(run)).unwrap_err();
    assert!(matches!(err, SessionError::Fetch(FetchError::Service { .. })));
    assert_eq!(root_label(&session), "ok() => 1");
    assert_eq!(session.controller().current_step_index(), 1);
    assert!(!session.is_fetching());
}

#[test]
fn unloadable_payload_keeps_the_previous_trace() {
    let mut session = Session::default();
    session.load_payload(&dag_payload()).unwrap();

    let err = session.load_payload(&json!("not a trace")).unwrap_err();
    assert!(matches!(err, SessionError::Load(_)));
    assert_eq!(session.trace().unwrap().kind(), TraceKind::Dag);
}

#[test]
fn cancelled_fetch_reports_cancelled() {
    let mut session = Session::default();
    let pending = session.begin_fetch();
    assert!(session.cancel_fetch());
    assert!(!session.cancel_fetch());

    let outcome = block_on(pending.run(futures::future::pending::<Reply>()));
    assert_eq!(
        session.complete_fetch(outcome).unwrap(),
        FetchStatus::Cancelled
    );
    assert!(session.trace().is_none());
}

#[test]
fn run_requires_editor_content() {
    let service = ScriptedService::default();
    let mut session = Session::default();
    assert!(!session.can_run());
    session.on_content_changed("   \n");
    assert!(!session.can_run());
    assert!(matches!(
        session.run(&service),
        Err(SessionError::NothingToRun)
    ));

    session.on_content_changed("print(1)");
    assert!(session.can_run());
    assert_eq!(session.code(), "print(1)");
}

#[test]
fn loading_replaces_trace_and_playback_state_wholesale() {
    let mut session = Session::default();
    session.load_payload(&calls_payload("a")).unwrap();
    session.controller_mut().set_speed(2.0);
    session.controller_mut().play(500);
    session.tick(Duration::from_millis(250));
    assert_eq!(session.controller().mode(), PlaybackMode::Finished);

    let before = session.graph().unwrap().clone();
    session.load_payload(&dag_payload()).unwrap();
    let state = session.controller().state();
    assert_eq!(state.current_step_index, 0);
    assert_eq!(state.mode, PlaybackMode::Ready);
    assert_eq!(state.speed_multiplier, 1.0);
    assert_eq!(before.nodes.len(), 1);
    assert_eq!(session.graph().unwrap().nodes.len(), 2);
    assert_eq!(
        session.highlight().primary_node_id.as_deref(),
        Some("a")
    );
}

#[test]
fn session_config_flows_into_layout_and_playback() {
    let config = EngineConfig::from_overrides(&json!({
        "layout": {"direction": "LR"},
        "playback": {"intervalMs": 200}
    }))
    .unwrap();
    let mut session = Session::with_config(config);
    session.load_payload(&dag_payload()).unwrap();

    let graph = session.graph().unwrap();
    assert!(graph.nodes["b"].position.x > graph.nodes["a"].position.x);

    assert!(session.controller_mut().toggle());
    assert_eq!(
        session.controller().tick_period(),
        Some(Duration::from_millis(200))
    );
}
