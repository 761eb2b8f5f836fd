//! # multinode-sink
//!
//! **multinode-sink** is the coordinator-enabled result sink of a distributed
//! multi-node test runner.
//!
//! A sink receives every test event of a run (spec boundaries, per-node logs,
//! per-node pass/fail), performs its own base duties, and optionally forwards
//! a normalized fact per event to a coordinator that owns the aggregated run
//! state. The sink asks the coordinator for the process exit code and, at the
//! end of the run, for the final aggregate it hands to a reporting hook.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        worker-facing infrastructure (node logs, results, spec boundaries)
//!                                   │
//!                                   ▼
//!                         ┌───────────────────┐
//!                         │    SinkHandle     │  EventSink: publish / spec_begin / ...
//!                         │                   │             exit_code / end_run
//!                         └─────────┬─────────┘
//!                                   ▼  bounded mailbox (SinkConfig::mailbox_capacity)
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  CoordinatedSink (one message at a time)                          │
//! │  - BaseSink (non-forwarding duties, exit code when disabled)      │
//! │  - Report   (final aggregate + completed specs)                   │
//! │  - SinkState: Starting → Active → Terminating → Terminated        │
//! └──────┬──────────────────────────────────────────────▲─────────────┘
//!        │ Record(fact) / RequestState / NotifyRunEnd    │ FactData(spec)
//!        ▼  unbounded FIFO                               │ BeginTermination
//! ┌───────────────────────────────────┐          ┌───────┴────────┐
//! │  Coordinator (TestRunCoordinator) │──emit──► │ SubscriberSet  │
//! │  - TestRunTree aggregation        │          │ (per-sub queue)│
//! └───────────────────────────────────┘          └────────────────┘
//! ```
//!
//! ### Run end
//! ```text
//! RunEnd ──► Active → Terminating
//!        ──► NotifyRunEnd (after every fact already forwarded)
//!        ──► [continuation] BeginTermination{tree | error} ──► sink mailbox
//!        ──► Report::report(tree) ──► BaseSink::terminate(tree) ──► reply ──► Terminated
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Sink**          | Event intake, forwarding, exit code and run end.             | [`SinkHandle`], [`EventSink`], [`BaseSink`] |
//! | **Coordinator**   | Aggregation of facts into a run tree.                        | [`Coordinate`], [`TestRunCoordinator`]      |
//! | **Reporting**     | Render the final aggregate and completed specs.              | [`Report`], [`ReportFn`]                    |
//! | **Subscribers**   | Observe specs as the coordinator closes them.                | [`Subscribe`], [`SubscriberSet`]            |
//! | **Errors**        | Typed errors for startup and coordinator requests.           | [`SinkError`]                               |
//! | **Configuration** | Forwarding switch, request timeout, mailbox size.            | [`SinkConfig`]                              |
//!
//! ## Optional features
//! - `logging`: exports a simple console [`LogReporter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use multinode_sink::{
//!     BeginSpec, EndSpec, EndTestRun, EventSink, ExitCode, NodeOutcome, NullSink, ReportFn,
//!     SinkConfig, SinkHandle, SpecId,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sink = SinkHandle::builder(SinkConfig::default(), NullSink::with_exit_code(ExitCode::Success))
//!         .with_reporter(ReportFn::arc("summary", |tree| {
//!             println!("specs={} passed={:?}", tree.specs.len(), tree.passed);
//!         }))
//!         .spawn()?;
//!
//!     let spec = SpecId::new("ClusterSpec", "must_form");
//!     sink.spec_begin(BeginSpec::new(spec.clone(), vec![])).await?;
//!     sink.node_spec_pass(NodeOutcome::new(0, "ok")).await?;
//!     sink.node_spec_pass(NodeOutcome::new(1, "ok")).await?;
//!     sink.spec_end(EndSpec::new(spec)).await?;
//!
//!     assert_eq!(sink.exit_code().await?, ExitCode::Success);
//!
//!     let done = sink.end_run(EndTestRun::named("nightly")).await?;
//!     assert_eq!(done.exit_code.code(), 0);
//!     Ok(())
//! }
//! ```
mod coordinator;
mod core;
mod error;
mod events;
mod exit_code;
mod reporting;
mod subscribers;

// ---- Public re-exports ----

pub use coordinator::{
    Coordinate, CoordinatorFactory, CoordinatorRef, LogLine, NodeRun, SpecRun, TestRunCoordinator,
    TestRunTree, spawn_coordinator,
};
pub use crate::core::{
    BaseSink, EventSink, NullSink, SinkBuilder, SinkConfig, SinkHandle, SinkState, Termination,
};
pub use error::SinkError;
pub use events::{
    BeginSpec, EndSpec, EndTestRun, Fact, LogLevel, NodeLog, NodeLogFact, NodeLogFragment,
    NodeLogFragmentFact, NodeOutcome, NodeResultFact, NodeTest, RunnerLog, RunnerLogFact,
    SinkEvent, SpecId, Ticks,
};
pub use exit_code::ExitCode;
pub use reporting::{Report, ReportFn, ReportRef};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple console reporter (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use reporting::LogReporter;
