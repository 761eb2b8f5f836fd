use tokio::sync::oneshot;

use crate::coordinator::{SpecRun, TestRunTree};
use crate::error::SinkError;
use crate::events::{EndTestRun, SinkEvent};
use crate::exit_code::ExitCode;

/// What the requester of a run end receives once the sink has terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    /// Final aggregate; `None` when forwarding is disabled.
    pub tree: Option<TestRunTree>,
    /// Exit code derived from `tree`, or the base sink's when forwarding is disabled.
    pub exit_code: ExitCode,
}

pub(crate) type TerminationReply = oneshot::Sender<Result<Termination, SinkError>>;

/// Whoever asked to end the run (possibly nobody).
#[derive(Debug, Default)]
pub(crate) struct Requester(Option<TerminationReply>);

impl Requester {
    pub(crate) fn new(reply: TerminationReply) -> Self {
        Self(Some(reply))
    }

    pub(crate) fn none() -> Self {
        Self(None)
    }

    pub(crate) fn reply(self, result: Result<Termination, SinkError>) {
        if let Some(tx) = self.0 {
            let _ = tx.send(result);
        }
    }
}

/// Internal message built by the run-end continuation.
#[derive(Debug)]
pub(crate) struct BeginTermination {
    pub(crate) outcome: Result<TestRunTree, SinkError>,
    pub(crate) requester: Requester,
}

/// Everything the sink mailbox carries.
#[derive(Debug)]
pub(crate) enum SinkMsg {
    /// Inbound event (a `RunEnd` here has no requester).
    Event(SinkEvent),
    /// Run end with a reply slot.
    RunEnd {
        end: EndTestRun,
        reply: TerminationReply,
    },
    /// Exit-code query.
    ExitCode { reply: oneshot::Sender<ExitCode> },
    /// Pushed back by the run-end continuation.
    BeginTermination(BeginTermination),
    /// Completed spec published by the coordinator.
    FactData(SpecRun),
}

impl SinkMsg {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            SinkMsg::Event(ev) => ev.kind(),
            SinkMsg::RunEnd { .. } => "run_end",
            SinkMsg::ExitCode { .. } => "exit_code_request",
            SinkMsg::BeginTermination(_) => "begin_termination",
            SinkMsg::FactData(_) => "fact_data",
        }
    }
}
