//! # Coordinator contract and mailbox loop.
//!
//! A coordinator owns the aggregated run state. The sink depends only on
//! the four operations of [`Coordinate`]; how facts are aggregated is up to
//! the implementation ([`TestRunCoordinator`](crate::TestRunCoordinator) is
//! the built-in one).
//!
//! [`spawn_coordinator`] runs an implementation behind a mailbox:
//! ```text
//! CoordinatorRef ──► [unbounded mailbox] ──► loop {
//!                                              select! {
//!                                                token.cancelled() → stop
//!                                                msg               → dispatch(msg)
//!                                              }
//!                                            }
//! dispatch:
//!   Subscribe(o)           → subscribe(o)
//!   Record(f)              → record(f)
//!   RequestState{reply}    → reply ← state()
//!   NotifyRunEnd{e, reply} → reply ← run_end(e)
//! ```
//!
//! ## Rules
//! - One message at a time, in mailbox order.
//! - The loop stops when the token is cancelled or every reference is dropped.
//! - [`Coordinate::stop`] runs once after the loop, before the mailbox is released.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::handle::CoordinatorRef;
use super::message::CoordinatorMsg;
use super::tree::TestRunTree;
use crate::events::{EndTestRun, Fact};
use crate::subscribers::Subscribe;

/// Request/response contract every coordinator honors.
///
/// All methods run on the coordinator's own task, one at a time.
pub trait Coordinate: Send + 'static {
    /// Registers an observer of completed specs.
    fn subscribe(&mut self, observer: Arc<dyn Subscribe>);

    /// Records one fact.
    fn record(&mut self, fact: Fact);

    /// Returns a point-in-time snapshot.
    fn state(&self) -> TestRunTree;

    /// Finalizes aggregation and returns the closing snapshot.
    fn run_end(&mut self, end: EndTestRun) -> TestRunTree;

    /// Releases the coordinator once its mailbox loop has exited. Default: nothing.
    fn stop(self) -> impl Future<Output = ()> + Send
    where
        Self: Sized,
    {
        async {}
    }
}

/// Creates the coordinator a sink uses when forwarding is enabled.
///
/// Called exactly once, during sink startup. The token is cancelled when
/// the sink terminates.
pub trait CoordinatorFactory: Send + Sync + 'static {
    fn create(&self, token: CancellationToken) -> anyhow::Result<CoordinatorRef>;
}

impl<F> CoordinatorFactory for F
where
    F: Fn(CancellationToken) -> anyhow::Result<CoordinatorRef> + Send + Sync + 'static,
{
    fn create(&self, token: CancellationToken) -> anyhow::Result<CoordinatorRef> {
        (self)(token)
    }
}

/// Spawns `coordinator` on its own task and returns its address.
///
/// Must be called from within a tokio runtime.
pub fn spawn_coordinator<C: Coordinate>(
    coordinator: C,
    token: CancellationToken,
) -> CoordinatorRef {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run(coordinator, rx, token));
    CoordinatorRef::new(tx)
}

async fn run<C: Coordinate>(
    mut coordinator: C,
    mut rx: mpsc::UnboundedReceiver<CoordinatorMsg>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            msg = rx.recv() => match msg {
                Some(msg) => dispatch(&mut coordinator, msg),
                None => break,
            },
        }
    }
    coordinator.stop().await;
    drop(rx);
    debug!("coordinator stopped");
}

fn dispatch<C: Coordinate>(coordinator: &mut C, msg: CoordinatorMsg) {
    trace!(msg = msg.kind(), "coordinator message");
    match msg {
        CoordinatorMsg::Subscribe(observer) => coordinator.subscribe(observer),
        CoordinatorMsg::Record(fact) => coordinator.record(fact),
        CoordinatorMsg::RequestState { reply } => {
            if reply.send(coordinator.state()).is_err() {
                trace!("state requester went away");
            }
        }
        CoordinatorMsg::NotifyRunEnd { end, reply } => {
            if reply.send(coordinator.run_end(end)).is_err() {
                trace!("run-end requester went away");
            }
        }
    }
}
