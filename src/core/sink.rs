//! # CoordinatedSink: the sink protocol state machine.
//!
//! Receives every event exactly once, forwards at most one fact per event to
//! the coordinator, and answers exit-code and run-end requests without ever
//! blocking its own mailbox.
//!
//! ## Message handling
//! ```text
//! mailbox ──► handle(msg)
//!   Event(e)            → base.handle_event(e)
//!                         └─ forwarding on: coordinator.record(Fact::translate(e))
//!   ExitCode{reply}     → forwarding off: reply ← base.exit_code()
//!                         forwarding on:  request_state ─► [continuation] reply ← from_passed(tree.passed)
//!   RunEnd{end, reply}  → Active → Terminating
//!                         forwarding off: base.terminate(None), reply
//!                         forwarding on:  notify_run_end ─► [continuation] mailbox ← BeginTermination
//!   BeginTermination    → report(tree) → base.terminate(tree) → reply → Terminated
//!   FactData(spec)      → reporter.on_spec_complete(spec)
//! ```
//!
//! ## Rules
//! - Sink state is only touched inside `handle`, one message at a time.
//! - Continuations run on spawned tasks and only build a message: a reply to
//!   the requester, or `BeginTermination` pushed back onto this mailbox.
//! - Requests are enqueued on the coordinator during the sink's turn, so
//!   `NotifyRunEnd` always follows every fact forwarded before it.
//! - With forwarding off the coordinator does not exist; no branch reaches it.
//! - The sink and its observer hold only weak senders to the mailbox: once every
//!   [`SinkHandle`](crate::SinkHandle) is dropped the loop drains and stops.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::base::BaseSink;
use super::config::SinkConfig;
use super::message::{BeginTermination, Requester, SinkMsg};
use super::observer::SinkObserver;
use super::state::SinkState;
use crate::coordinator::{CoordinatorFactory, CoordinatorRef};
use crate::error::SinkError;
use crate::events::{EndTestRun, Fact, SinkEvent};
use crate::exit_code::ExitCode;
use crate::reporting::ReportRef;

/// Sink actor state. Owned by the task running [`CoordinatedSink::run`].
pub(crate) struct CoordinatedSink {
    pub(super) cfg: SinkConfig,
    pub(super) state: SinkState,
    /// Set once during startup iff forwarding is enabled.
    pub(super) coordinator: Option<CoordinatorRef>,
    pub(super) coordinator_token: CancellationToken,
    pub(super) base: Box<dyn BaseSink>,
    pub(super) reporter: ReportRef,
    pub(super) myself: mpsc::WeakSender<SinkMsg>,
}

impl CoordinatedSink {
    /// Runs the startup phase and returns an `Active` sink.
    ///
    /// With forwarding on, the coordinator is created and subscribed here;
    /// any failure aborts startup and the sink never becomes active.
    pub(crate) fn start(
        cfg: SinkConfig,
        base: Box<dyn BaseSink>,
        reporter: ReportRef,
        factory: &dyn CoordinatorFactory,
        myself: mpsc::WeakSender<SinkMsg>,
        token: &CancellationToken,
    ) -> Result<Self, SinkError> {
        let mut sink = Self {
            cfg,
            state: SinkState::Starting,
            coordinator: None,
            coordinator_token: token.child_token(),
            base,
            reporter,
            myself,
        };

        if sink.cfg.use_coordinator {
            match sink.connect(factory) {
                Ok(coordinator) => sink.coordinator = Some(coordinator),
                Err(err) => {
                    sink.coordinator_token.cancel();
                    warn!(
                        error = %err.as_message(),
                        label = err.as_label(),
                        "sink startup failed"
                    );
                    return Err(err);
                }
            }
        }

        sink.transition(SinkState::Active);
        Ok(sink)
    }

    fn connect(&self, factory: &dyn CoordinatorFactory) -> Result<CoordinatorRef, SinkError> {
        let coordinator = factory.create(self.coordinator_token.clone())?;
        coordinator
            .subscribe(Arc::new(SinkObserver::new(self.myself.clone())))
            .map_err(|err| SinkError::Startup {
                error: format!("subscribe: {err}"),
            })?;
        Ok(coordinator)
    }

    /// Drains the mailbox until terminated, cancelled, or every handle is gone.
    pub(crate) async fn run(
        mut self,
        mut mailbox: mpsc::Receiver<SinkMsg>,
        token: CancellationToken,
    ) {
        while self.state != SinkState::Terminated {
            let msg = tokio::select! {
                _ = token.cancelled() => {
                    debug!(state = %self.state, "sink cancelled");
                    break;
                }
                msg = mailbox.recv() => match msg {
                    Some(msg) => msg,
                    None => {
                        debug!(state = %self.state, "every sink handle dropped");
                        break;
                    }
                },
            };
            trace!(msg = msg.kind(), state = %self.state, "sink message");
            self.handle(msg).await;
        }

        self.coordinator_token.cancel();
        mailbox.close();
    }

    async fn handle(&mut self, msg: SinkMsg) {
        match msg {
            SinkMsg::Event(SinkEvent::RunEnd(end)) => {
                self.on_run_end(end, Requester::none()).await
            }
            SinkMsg::Event(event) => self.on_event(event).await,
            SinkMsg::RunEnd { end, reply } => {
                self.on_run_end(end, Requester::new(reply)).await
            }
            SinkMsg::ExitCode { reply } => self.on_exit_code_request(reply),
            SinkMsg::BeginTermination(msg) => self.on_begin_termination(msg).await,
            SinkMsg::FactData(spec) => self.reporter.on_spec_complete(&spec).await,
        }
    }

    /// Base duties, then at most one forwarded fact.
    async fn on_event(&mut self, event: SinkEvent) {
        self.base.handle_event(&event).await;

        let Some(coordinator) = &self.coordinator else {
            return;
        };
        let Some(fact) = Fact::translate(&event) else {
            return;
        };
        trace!(fact = fact.kind(), node = ?event.node_index(), "forwarding fact");
        if let Err(err) = coordinator.record(fact) {
            warn!(
                error = %err.as_message(),
                label = err.as_label(),
                event = event.kind(),
                "fact not forwarded"
            );
        }
    }

    fn on_exit_code_request(&self, reply: oneshot::Sender<ExitCode>) {
        let Some(coordinator) = &self.coordinator else {
            let _ = reply.send(self.base.exit_code());
            return;
        };

        let pending = coordinator.request_state(self.cfg.request_timeout());
        tokio::spawn(async move {
            let code = match pending.await {
                Ok(tree) => ExitCode::from_passed(tree.passed),
                Err(err) => {
                    warn!(
                        error = %err.as_message(),
                        label = err.as_label(),
                        "exit code unavailable; reporting failure"
                    );
                    ExitCode::Failure
                }
            };
            let _ = reply.send(code);
        });
    }

    async fn on_run_end(&mut self, end: EndTestRun, requester: Requester) {
        if self.state.is_ending() {
            warn!(state = %self.state, "duplicate run end ignored");
            requester.reply(Err(SinkError::AlreadyTerminating));
            return;
        }
        self.transition(SinkState::Terminating);

        let Some(coordinator) = self.coordinator.clone() else {
            self.terminate_without_coordinator(requester).await;
            return;
        };

        let pending = coordinator.notify_run_end(end, self.cfg.request_timeout());
        let Some(myself) = self.myself.upgrade() else {
            // No sender is left, so nothing can overtake the handoff: finish inline.
            let outcome = pending.await;
            self.on_begin_termination(BeginTermination { outcome, requester }).await;
            return;
        };
        tokio::spawn(async move {
            let outcome = pending.await;
            let msg = SinkMsg::BeginTermination(BeginTermination { outcome, requester });
            if myself.send(msg).await.is_err() {
                trace!("sink gone before termination could begin");
            }
        });
    }

    pub(super) fn transition(&mut self, next: SinkState) {
        let from = self.state;
        if self.state.advance(next) {
            debug!(from = %from, to = %next, "sink state");
        } else {
            warn!(from = %from, to = %next, "invalid sink transition ignored");
        }
    }
}
