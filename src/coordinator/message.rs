use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;

use super::tree::TestRunTree;
use crate::events::{EndTestRun, Fact};
use crate::subscribers::Subscribe;

/// Messages a coordinator mailbox accepts.
pub(crate) enum CoordinatorMsg {
    /// Register an observer of completed specs.
    Subscribe(Arc<dyn Subscribe>),
    /// One-way fact.
    Record(Fact),
    /// Point-in-time snapshot.
    RequestState { reply: oneshot::Sender<TestRunTree> },
    /// Close out aggregation and return the final snapshot.
    NotifyRunEnd {
        end: EndTestRun,
        reply: oneshot::Sender<TestRunTree>,
    },
}

impl CoordinatorMsg {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            CoordinatorMsg::Subscribe(_) => "subscribe",
            CoordinatorMsg::Record(_) => "record",
            CoordinatorMsg::RequestState { .. } => "request_state",
            CoordinatorMsg::NotifyRunEnd { .. } => "notify_run_end",
        }
    }
}

impl fmt::Debug for CoordinatorMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorMsg::Subscribe(sub) => {
                f.debug_tuple("Subscribe").field(&sub.name()).finish()
            }
            CoordinatorMsg::Record(fact) => f.debug_tuple("Record").field(fact).finish(),
            CoordinatorMsg::RequestState { .. } => f.write_str("RequestState"),
            CoordinatorMsg::NotifyRunEnd { end, .. } => {
                f.debug_struct("NotifyRunEnd").field("end", end).finish()
            }
        }
    }
}
