//! # Termination handoff.
//!
//! Final step of a run, on the sink's own turn:
//! ```text
//! BeginTermination{outcome, requester}
//!   ├─► Ok(tree)  → report(tree)               ─┐
//!   └─► Err(e)    → report(indeterminate tree) ─┤  (report runs exactly once either way)
//!                                               ▼
//!                                  base.terminate(Some(tree))
//!                                               ▼
//!                          requester ← Ok(Termination) | Err(e)
//!                                               ▼
//!                                          Terminated
//! ```
//!
//! With forwarding off there is nothing to report: the base sink terminates
//! directly and supplies the exit code.

use tracing::{info, warn};

use super::message::{BeginTermination, Requester, Termination};
use super::sink::CoordinatedSink;
use super::state::SinkState;
use crate::coordinator::TestRunTree;
use crate::exit_code::ExitCode;

impl CoordinatedSink {
    pub(super) async fn on_begin_termination(&mut self, msg: BeginTermination) {
        let BeginTermination { outcome, requester } = msg;
        if self.state != SinkState::Terminating {
            warn!(state = %self.state, "termination outside of run end ignored");
            return;
        }

        let (tree, result) = match outcome {
            Ok(tree) => (tree, Ok(())),
            Err(err) => {
                warn!(
                    error = %err.as_message(),
                    label = err.as_label(),
                    "final aggregate unavailable; reporting an indeterminate run"
                );
                (TestRunTree::indeterminate(), Err(err))
            }
        };

        self.reporter.report(&tree).await;
        self.base.terminate(Some(&tree)).await;

        let exit_code = ExitCode::from_passed(tree.passed);
        info!(
            reporter = self.reporter.name(),
            specs = tree.specs.len(),
            exit_code = exit_code.code(),
            "sink terminated"
        );
        self.transition(SinkState::Terminated);
        requester.reply(result.map(|()| Termination {
            tree: Some(tree),
            exit_code,
        }));
    }

    pub(super) async fn terminate_without_coordinator(&mut self, requester: Requester) {
        self.base.terminate(None).await;
        let exit_code = self.base.exit_code();
        info!(exit_code = exit_code.code(), "sink terminated without coordinator");
        self.transition(SinkState::Terminated);
        requester.reply(Ok(Termination {
            tree: None,
            exit_code,
        }));
    }
}
