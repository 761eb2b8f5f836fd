use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::coordinator::{CoordinatorMsg, CoordinatorRef, SpecRun, TestRunTree};
use crate::error::SinkError;
use crate::events::{
    BeginSpec, EndSpec, EndTestRun, NodeLog, NodeOutcome, RunnerLog, SinkEvent, SpecId,
};
use crate::exit_code::ExitCode;
use crate::reporting::Report;

type FactoryResult = anyhow::Result<CoordinatorRef>;

#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }
}

struct RecordingBase {
    journal: Journal,
    exit_code: ExitCode,
}

#[async_trait]
impl BaseSink for RecordingBase {
    async fn handle_event(&mut self, event: &SinkEvent) {
        self.journal.push(format!("event:{}", event.kind()));
    }

    fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    async fn terminate(&mut self, tree: Option<&TestRunTree>) {
        let what = if tree.is_some() { "tree" } else { "none" };
        self.journal.push(format!("terminate:{what}"));
    }
}

struct RecordingReport {
    journal: Journal,
    specs: Option<mpsc::UnboundedSender<String>>,
}

#[async_trait]
impl Report for RecordingReport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn report(&self, tree: &TestRunTree) {
        self.journal.push(format!("report:{:?}", tree.passed));
    }

    async fn on_spec_complete(&self, spec: &SpecRun) {
        self.journal.push(format!("spec:{}", spec.spec));
        if let Some(tx) = &self.specs {
            let _ = tx.send(spec.spec.to_string());
        }
    }
}

/// Sink wired to a hand-driven coordinator mailbox.
struct Harness {
    handle: SinkHandle,
    coordinator: mpsc::UnboundedReceiver<CoordinatorMsg>,
    coordinator_token: Arc<Mutex<Option<CancellationToken>>>,
    journal: Journal,
}

impl Harness {
    fn spawn(cfg: SinkConfig) -> Self {
        let (coord_ref, coordinator) = CoordinatorRef::channel();
        let coordinator_token = Arc::new(Mutex::new(None));
        let slot = coordinator_token.clone();
        let journal = Journal::default();

        let handle = SinkHandle::builder(cfg, base(&journal, ExitCode::Success))
            .with_reporter(reporter(&journal, None))
            .with_coordinator_factory(move |token: CancellationToken| -> FactoryResult {
                *slot.lock().unwrap() = Some(token);
                Ok(coord_ref.clone())
            })
            .spawn()
            .unwrap();

        Self {
            handle,
            coordinator,
            coordinator_token,
            journal,
        }
    }

    async fn next(&mut self) -> CoordinatorMsg {
        self.coordinator.recv().await.expect("coordinator mailbox closed")
    }

    async fn expect_subscribe(&mut self) {
        match self.next().await {
            CoordinatorMsg::Subscribe(observer) => assert_eq!(observer.name(), "sink"),
            other => panic!("expected subscribe, got {}", other.kind()),
        }
    }

    async fn expect_record(&mut self) -> &'static str {
        match self.next().await {
            CoordinatorMsg::Record(fact) => fact.kind(),
            other => panic!("expected record, got {}", other.kind()),
        }
    }

    fn coordinator_cancelled(&self) -> bool {
        is_cancelled(&self.coordinator_token)
    }
}

fn is_cancelled(slot: &Mutex<Option<CancellationToken>>) -> bool {
    slot.lock()
        .unwrap()
        .as_ref()
        .is_some_and(CancellationToken::is_cancelled)
}

fn base(journal: &Journal, exit_code: ExitCode) -> RecordingBase {
    RecordingBase {
        journal: journal.clone(),
        exit_code,
    }
}

fn reporter(
    journal: &Journal,
    specs: Option<mpsc::UnboundedSender<String>>,
) -> Arc<RecordingReport> {
    Arc::new(RecordingReport {
        journal: journal.clone(),
        specs,
    })
}

fn null_base() -> NullSink {
    NullSink::with_exit_code(ExitCode::Success)
}

fn spec_id() -> SpecId {
    SpecId::new("ClusterSpec", "must_replicate")
}

fn run_events() -> Vec<SinkEvent> {
    vec![
        SinkEvent::SpecBegin(BeginSpec::new(spec_id(), vec![])),
        SinkEvent::NodeLog(NodeLog::new(0, "starting")),
        SinkEvent::RunnerLog(RunnerLog::new("barrier reached")),
        SinkEvent::NodeSpecPass(NodeOutcome::new(0, "ok")),
        SinkEvent::NodeSpecFail(NodeOutcome::new(1, "timeout")),
        SinkEvent::SpecEnd(EndSpec::new(spec_id())),
    ]
}

#[tokio::test]
async fn test_disabled_forwarding_behaves_like_base_sink() {
    let journal = Journal::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();

    let cfg = SinkConfig::default().without_coordinator();
    let handle = SinkHandle::builder(cfg, base(&journal, ExitCode::Success))
        .with_reporter(reporter(&journal, None))
        .with_coordinator_factory(move |_token: CancellationToken| -> FactoryResult {
            seen.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("coordinator must not be created")
        })
        .spawn()
        .unwrap();

    for event in run_events() {
        handle.publish(event).await.unwrap();
    }
    assert_eq!(handle.exit_code().await.unwrap(), ExitCode::Success);

    let done = handle.end_run(EndTestRun::new()).await.unwrap();
    assert_eq!(done.tree, None);
    assert_eq!(done.exit_code, ExitCode::Success);

    let entries = journal.entries();
    assert_eq!(entries.len(), run_events().len() + 1);
    assert_eq!(entries.last().map(String::as_str), Some("terminate:none"));
    assert!(entries.iter().all(|e| !e.starts_with("report:")));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_disabled_forwarding_is_idempotent() {
    let journal = Journal::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();

    let cfg = SinkConfig::default().without_coordinator();
    let handle = SinkHandle::builder(cfg, base(&journal, ExitCode::Failure))
        .with_coordinator_factory(move |_token: CancellationToken| -> FactoryResult {
            seen.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("coordinator must not be created")
        })
        .spawn()
        .unwrap();

    for _ in 0..2 {
        for event in run_events() {
            handle.publish(event).await.unwrap();
        }
        assert_eq!(handle.exit_code().await.unwrap(), ExitCode::Failure);
    }

    let entries = journal.entries();
    let (first, second) = entries.split_at(entries.len() / 2);
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_forwards_one_fact_per_event_in_order() {
    let mut h = Harness::spawn(SinkConfig::default());
    h.expect_subscribe().await;

    for event in run_events() {
        h.handle.publish(event).await.unwrap();
    }

    let mut kinds = Vec::new();
    for _ in 0..run_events().len() {
        kinds.push(h.expect_record().await);
    }
    assert_eq!(
        kinds,
        vec!["spec_begin", "node_log", "runner_log", "node_result", "node_result", "spec_end"]
    );

    let base_saw: Vec<String> = run_events()
        .iter()
        .map(|e| format!("event:{}", e.kind()))
        .collect();
    assert_eq!(h.journal.entries(), base_saw);
}

#[tokio::test]
async fn test_exit_code_follows_coordinator_verdict() {
    let cases = [
        (Some(true), ExitCode::Success),
        (Some(false), ExitCode::Failure),
        (None, ExitCode::Failure),
    ];

    for (passed, expected) in cases {
        let mut h = Harness::spawn(SinkConfig::default());
        h.expect_subscribe().await;

        let handle = h.handle.clone();
        let asked = tokio::spawn(async move { handle.exit_code().await });

        match h.next().await {
            CoordinatorMsg::RequestState { reply } => {
                reply.send(TestRunTree::with_passed(passed)).unwrap();
            }
            other => panic!("expected state request, got {}", other.kind()),
        }
        assert_eq!(asked.await.unwrap().unwrap(), expected, "passed = {passed:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_exit_code_timeout_reports_failure() {
    let cfg = SinkConfig {
        request_timeout: Duration::from_millis(200),
        ..SinkConfig::default()
    };
    let mut h = Harness::spawn(cfg);
    h.expect_subscribe().await;

    // Request stays queued and is never answered.
    assert_eq!(h.handle.exit_code().await.unwrap(), ExitCode::Failure);
    assert!(matches!(h.next().await, CoordinatorMsg::RequestState { .. }));
}

#[tokio::test]
async fn test_exit_code_with_coordinator_gone_reports_failure() {
    let mut h = Harness::spawn(SinkConfig::default());
    h.expect_subscribe().await;
    h.coordinator.close();

    h.handle.publish(SinkEvent::NodeLog(NodeLog::new(3, "still handled"))).await.unwrap();
    assert_eq!(h.handle.exit_code().await.unwrap(), ExitCode::Failure);
    assert_eq!(h.journal.entries(), vec!["event:node_log".to_string()]);
}

#[tokio::test]
async fn test_run_end_follows_forwarded_facts() {
    let mut h = Harness::spawn(SinkConfig::default());
    h.expect_subscribe().await;

    for event in run_events() {
        h.handle.publish(event).await.unwrap();
    }
    let handle = h.handle.clone();
    let ended = tokio::spawn(async move { handle.end_run(EndTestRun::named("run-7")).await });

    for _ in 0..run_events().len() {
        h.expect_record().await;
    }
    let final_tree = TestRunTree::with_passed(Some(true));
    match h.next().await {
        CoordinatorMsg::NotifyRunEnd { end, reply } => {
            assert_eq!(end.run.as_deref(), Some("run-7"));
            reply.send(final_tree.clone()).unwrap();
        }
        other => panic!("expected run end, got {}", other.kind()),
    }

    let done = ended.await.unwrap().unwrap();
    assert_eq!(done.tree, Some(final_tree));
    assert_eq!(done.exit_code, ExitCode::Success);

    let entries = h.journal.entries();
    let tail = &entries[entries.len() - 2..];
    assert_eq!(tail, ["report:Some(true)", "terminate:tree"]);

    h.handle.closed().await;
    assert!(h.coordinator_cancelled());
}

#[tokio::test]
async fn test_failing_run_scenario() {
    let mut h = Harness::spawn(SinkConfig::default());
    h.expect_subscribe().await;

    let events = [
        SinkEvent::SpecBegin(BeginSpec::new(spec_id(), vec![])),
        SinkEvent::NodeSpecPass(NodeOutcome::new(0, "ok")),
        SinkEvent::NodeSpecFail(NodeOutcome::new(1, "diverged")),
        SinkEvent::SpecEnd(EndSpec::new(spec_id())),
    ];
    for event in events {
        h.handle.publish(event).await.unwrap();
    }

    let handle = h.handle.clone();
    let asked = tokio::spawn(async move { handle.exit_code().await });
    assert_eq!(
        [
            h.expect_record().await,
            h.expect_record().await,
            h.expect_record().await,
            h.expect_record().await
        ],
        ["spec_begin", "node_result", "node_result", "spec_end"]
    );
    match h.next().await {
        CoordinatorMsg::RequestState { reply } => {
            reply.send(TestRunTree::with_passed(Some(false))).unwrap()
        }
        other => panic!("expected state request, got {}", other.kind()),
    }
    assert_eq!(asked.await.unwrap().unwrap().code(), 1);

    h.handle.publish(SinkEvent::RunEnd(EndTestRun::new())).await.unwrap();
    match h.next().await {
        CoordinatorMsg::NotifyRunEnd { reply, .. } => {
            reply.send(TestRunTree::with_passed(Some(false))).unwrap()
        }
        other => panic!("expected run end, got {}", other.kind()),
    }

    h.handle.closed().await;
    assert_eq!(h.journal.count("report:Some(false)"), 1);
    assert_eq!(h.journal.entries().last().map(String::as_str), Some("terminate:tree"));
    assert!(h.coordinator.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_run_end_timeout_still_reports_once() {
    let cfg = SinkConfig {
        request_timeout: Duration::from_secs(1),
        ..SinkConfig::default()
    };
    let mut h = Harness::spawn(cfg);
    h.expect_subscribe().await;

    let err = h.handle.end_run(EndTestRun::new()).await.unwrap_err();
    assert!(matches!(
        err,
        SinkError::RequestTimeout { timeout } if timeout == Duration::from_secs(1)
    ));
    assert_eq!(h.journal.entries(), vec!["report:None".to_string(), "terminate:tree".to_string()]);

    h.handle.closed().await;
    assert!(h.coordinator_cancelled());
}

#[tokio::test]
async fn test_duplicate_run_end_is_rejected() {
    let mut h = Harness::spawn(SinkConfig::default());
    h.expect_subscribe().await;

    let handle = h.handle.clone();
    let first = tokio::spawn(async move { handle.end_run(EndTestRun::new()).await });
    let reply = match h.next().await {
        CoordinatorMsg::NotifyRunEnd { reply, .. } => reply,
        other => panic!("expected run end, got {}", other.kind()),
    };

    let err = h.handle.end_run(EndTestRun::new()).await.unwrap_err();
    assert!(matches!(err, SinkError::AlreadyTerminating));

    reply.send(TestRunTree::with_passed(Some(true))).unwrap();
    assert_eq!(first.await.unwrap().unwrap().exit_code, ExitCode::Success);
    assert_eq!(h.journal.count("report:Some(true)"), 1);
    assert!(h.coordinator.try_recv().is_err());
}

#[tokio::test]
async fn test_completed_specs_reach_reporter() {
    let journal = Journal::default();
    let (specs_tx, mut specs_rx) = mpsc::unbounded_channel();

    let handle = SinkHandle::builder(SinkConfig::default(), base(&journal, ExitCode::Success))
        .with_reporter(reporter(&journal, Some(specs_tx)))
        .spawn()
        .unwrap();

    handle.spec_begin(BeginSpec::new(spec_id(), vec![])).await.unwrap();
    handle.node_spec_pass(NodeOutcome::new(0, "ok")).await.unwrap();
    handle.spec_end(EndSpec::new(spec_id())).await.unwrap();

    let completed = tokio::time::timeout(Duration::from_secs(5), specs_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(completed, "ClusterSpec.must_replicate");

    let done = handle.end_run(EndTestRun::new()).await.unwrap();
    let tree = done.tree.unwrap();
    assert_eq!(tree.passed, Some(true));
    assert_eq!(tree.specs.len(), 1);
    assert_eq!(done.exit_code, ExitCode::Success);
    assert_eq!(journal.count("spec:ClusterSpec.must_replicate"), 1);
    assert_eq!(journal.count("report:Some(true)"), 1);
}

#[tokio::test]
async fn test_factory_failure_aborts_startup() {
    let result = SinkHandle::builder(SinkConfig::default(), null_base())
        .with_coordinator_factory(|_token: CancellationToken| -> FactoryResult {
            anyhow::bail!("cluster unreachable")
        })
        .spawn();

    match result {
        Err(SinkError::Startup { error }) => assert!(error.contains("cluster unreachable")),
        other => panic!("expected startup failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_subscribe_failure_aborts_startup() {
    let (coord_ref, coordinator) = CoordinatorRef::channel();
    drop(coordinator);

    let result = SinkHandle::builder(SinkConfig::default(), null_base())
        .with_coordinator_factory(move |_token: CancellationToken| -> FactoryResult {
            Ok(coord_ref.clone())
        })
        .spawn();

    assert!(matches!(result, Err(SinkError::Startup { .. })));
}

#[test]
fn test_spawn_outside_runtime_fails() {
    let result = SinkHandle::builder(SinkConfig::default(), null_base()).spawn();
    assert!(matches!(result, Err(SinkError::Startup { .. })));
}

#[tokio::test]
async fn test_cancel_stops_sink_and_coordinator() {
    let mut h = Harness::spawn(SinkConfig::default());
    h.expect_subscribe().await;

    h.handle.cancel();
    h.handle.closed().await;

    assert!(h.handle.is_closed());
    assert!(h.coordinator_cancelled());
    let err = h.handle.send(RunnerLog::new("too late")).await.unwrap_err();
    assert!(matches!(err, SinkError::Closed));
}

#[tokio::test]
async fn test_dropping_every_handle_stops_sink_and_coordinator() {
    let mut h = Harness::spawn(SinkConfig::default());
    h.expect_subscribe().await;

    let Harness {
        handle,
        mut coordinator,
        coordinator_token,
        journal,
    } = h;
    handle.publish(SinkEvent::RunnerLog(RunnerLog::new("last words"))).await.unwrap();
    drop(handle);

    // The mailbox closes once the sink task has exited and released its coordinator.
    let mut kinds = Vec::new();
    while let Some(msg) = coordinator.recv().await {
        kinds.push(msg.kind());
    }
    assert_eq!(kinds, vec!["record"]);
    assert!(is_cancelled(&coordinator_token));
    assert_eq!(journal.entries(), vec!["event:runner_log".to_string()]);
}

#[tokio::test]
async fn test_run_end_completes_after_last_handle_dropped() {
    let mut h = Harness::spawn(SinkConfig::default());
    h.expect_subscribe().await;

    let Harness {
        handle,
        mut coordinator,
        coordinator_token,
        journal,
    } = h;
    handle.publish(SinkEvent::RunEnd(EndTestRun::new())).await.unwrap();
    drop(handle);

    match coordinator.recv().await {
        Some(CoordinatorMsg::NotifyRunEnd { reply, .. }) => {
            reply.send(TestRunTree::with_passed(Some(false))).unwrap();
        }
        other => panic!("expected run end, got {other:?}"),
    }
    assert!(coordinator.recv().await.is_none());
    assert!(is_cancelled(&coordinator_token));
    assert_eq!(
        journal.entries(),
        vec!["report:Some(false)".to_string(), "terminate:tree".to_string()]
    );
}
