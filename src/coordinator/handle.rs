//! # Coordinator reference: tell and ask over the coordinator mailbox.
//!
//! [`CoordinatorRef`] is the only way the sink talks to a coordinator.
//!
//! ## Message flow
//! ```text
//! record(fact)          ──► Record(fact)                 (fire-and-forget)
//! subscribe(observer)   ──► Subscribe(observer)          (fire-and-forget)
//! request_state(t)      ──► RequestState{reply}      ──► await reply ≤ t
//! notify_run_end(e, t)  ──► NotifyRunEnd{e, reply}   ──► await reply ≤ t
//! ```
//!
//! ## Rules
//! - The mailbox is an unbounded FIFO: `record` never blocks and the
//!   coordinator observes messages in send order.
//! - Requests are **enqueued when the method is called**, not when the
//!   returned future is first polled, so they keep their place relative to
//!   earlier `record` calls.
//! - Every ask is bounded: no reply within the timeout yields
//!   [`SinkError::RequestTimeout`]; a closed mailbox or dropped reply slot
//!   yields [`SinkError::CoordinatorUnavailable`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time;

use super::message::CoordinatorMsg;
use super::tree::TestRunTree;
use crate::error::SinkError;
use crate::events::{EndTestRun, Fact};
use crate::subscribers::Subscribe;

/// Clonable address of a running coordinator.
#[derive(Clone, Debug)]
pub struct CoordinatorRef {
    tx: mpsc::UnboundedSender<CoordinatorMsg>,
}

impl CoordinatorRef {
    pub(crate) fn new(tx: mpsc::UnboundedSender<CoordinatorMsg>) -> Self {
        Self { tx }
    }

    /// Creates a reference with a raw mailbox the caller drains by hand.
    #[cfg(test)]
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<CoordinatorMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Sends one fact (fire-and-forget).
    pub fn record(&self, fact: Fact) -> Result<(), SinkError> {
        self.tell(CoordinatorMsg::Record(fact))
    }

    /// Registers an observer of completed specs.
    pub fn subscribe(&self, observer: Arc<dyn Subscribe>) -> Result<(), SinkError> {
        self.tell(CoordinatorMsg::Subscribe(observer))
    }

    /// Asks for a point-in-time snapshot.
    pub fn request_state(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<TestRunTree, SinkError>> + Send + 'static {
        let (reply, rx) = oneshot::channel();
        let sent = self.tell(CoordinatorMsg::RequestState { reply }).map(|()| rx);
        await_reply(sent, timeout)
    }

    /// Asks the coordinator to close out the run and return the final snapshot.
    pub fn notify_run_end(
        &self,
        end: EndTestRun,
        timeout: Duration,
    ) -> impl Future<Output = Result<TestRunTree, SinkError>> + Send + 'static {
        let (reply, rx) = oneshot::channel();
        let sent = self
            .tell(CoordinatorMsg::NotifyRunEnd { end, reply })
            .map(|()| rx);
        await_reply(sent, timeout)
    }

    /// True once the coordinator has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn tell(&self, msg: CoordinatorMsg) -> Result<(), SinkError> {
        self.tx
            .send(msg)
            .map_err(|_| SinkError::CoordinatorUnavailable)
    }
}

/// Awaits a reply slot for at most `timeout`.
async fn await_reply(
    sent: Result<oneshot::Receiver<TestRunTree>, SinkError>,
    timeout: Duration,
) -> Result<TestRunTree, SinkError> {
    let rx = sent?;
    match time::timeout(timeout, rx).await {
        Ok(Ok(tree)) => Ok(tree),
        Ok(Err(_dropped)) => Err(SinkError::CoordinatorUnavailable),
        Err(_elapsed) => Err(SinkError::RequestTimeout { timeout }),
    }
}
