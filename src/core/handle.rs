//! # Public sink surface.
//!
//! [`EventSink`] names the operations a test runner performs on a sink;
//! [`SinkHandle`] implements them over the sink mailbox.
//!
//! ```text
//! runner ──► SinkHandle ──► [bounded mailbox] ──► CoordinatedSink
//!              publish / spec_begin / ...          (fire-and-forget)
//!              exit_code()                         (ask, reply via oneshot)
//!              end_run()                           (ask, reply after termination)
//! ```
//!
//! All send operations wait while the mailbox is full and fail with
//! [`SinkError::Closed`] once the sink has stopped.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::base::BaseSink;
use super::builder::SinkBuilder;
use super::config::SinkConfig;
use super::message::{SinkMsg, Termination};
use crate::error::SinkError;
use crate::events::{
    BeginSpec, EndSpec, EndTestRun, NodeLog, NodeLogFragment, NodeOutcome, RunnerLog, SinkEvent,
};
use crate::exit_code::ExitCode;

/// Operations a test runner performs on a sink.
///
/// The per-event methods are shorthands for [`EventSink::publish`].
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    async fn publish(&self, event: SinkEvent) -> Result<(), SinkError>;

    async fn spec_begin(&self, begin: BeginSpec) -> Result<(), SinkError> {
        self.publish(SinkEvent::SpecBegin(begin)).await
    }

    async fn spec_end(&self, end: EndSpec) -> Result<(), SinkError> {
        self.publish(SinkEvent::SpecEnd(end)).await
    }

    async fn node_log_fragment(&self, fragment: NodeLogFragment) -> Result<(), SinkError> {
        self.publish(SinkEvent::NodeLogFragment(fragment)).await
    }

    async fn node_log(&self, log: NodeLog) -> Result<(), SinkError> {
        self.publish(SinkEvent::NodeLog(log)).await
    }

    async fn runner_log(&self, log: RunnerLog) -> Result<(), SinkError> {
        self.publish(SinkEvent::RunnerLog(log)).await
    }

    async fn node_spec_pass(&self, outcome: NodeOutcome) -> Result<(), SinkError> {
        self.publish(SinkEvent::NodeSpecPass(outcome)).await
    }

    async fn node_spec_fail(&self, outcome: NodeOutcome) -> Result<(), SinkError> {
        self.publish(SinkEvent::NodeSpecFail(outcome)).await
    }

    /// Asks for the process exit code.
    async fn exit_code(&self) -> Result<ExitCode, SinkError>;

    /// Ends the run and waits until the sink has terminated.
    async fn end_run(&self, end: EndTestRun) -> Result<Termination, SinkError>;
}

/// Clonable address of a running sink.
#[derive(Clone, Debug)]
pub struct SinkHandle {
    tx: mpsc::Sender<SinkMsg>,
    token: CancellationToken,
}

impl SinkHandle {
    /// Starts building a sink around `base`.
    pub fn builder(cfg: SinkConfig, base: impl BaseSink) -> SinkBuilder {
        SinkBuilder::new(cfg, base)
    }

    pub(crate) fn new(tx: mpsc::Sender<SinkMsg>, token: CancellationToken) -> Self {
        Self { tx, token }
    }

    /// Delivers anything convertible into an event.
    pub async fn send(&self, event: impl Into<SinkEvent>) -> Result<(), SinkError> {
        self.publish(event.into()).await
    }

    /// Stops the sink (and its coordinator) without running termination.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the sink has stopped reading its mailbox.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Waits until the sink has stopped reading its mailbox.
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    async fn post(&self, msg: SinkMsg) -> Result<(), SinkError> {
        self.tx.send(msg).await.map_err(|_| SinkError::Closed)
    }
}

#[async_trait]
impl EventSink for SinkHandle {
    async fn publish(&self, event: SinkEvent) -> Result<(), SinkError> {
        self.post(SinkMsg::Event(event)).await
    }

    async fn exit_code(&self) -> Result<ExitCode, SinkError> {
        let (reply, rx) = oneshot::channel();
        self.post(SinkMsg::ExitCode { reply }).await?;
        rx.await.map_err(|_| SinkError::Closed)
    }

    async fn end_run(&self, end: EndTestRun) -> Result<Termination, SinkError> {
        let (reply, rx) = oneshot::channel();
        self.post(SinkMsg::RunEnd { end, reply }).await?;
        rx.await.map_err(|_| SinkError::Closed)?
    }
}
