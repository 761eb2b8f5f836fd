//! # Base sink: the non-forwarding half of a sink.
//!
//! The coordinator-enabled sink is built by composition: every event first
//! goes to a [`BaseSink`] (rendering, file output, whatever the concrete sink
//! does), then is optionally forwarded to the coordinator.
//!
//! The base sink also owns two answers the protocol cannot give by itself:
//! - the exit code when forwarding is disabled ([`BaseSink::exit_code`])
//! - the final shutdown step ([`BaseSink::terminate`])

use async_trait::async_trait;

use crate::coordinator::TestRunTree;
use crate::events::SinkEvent;
use crate::exit_code::ExitCode;

/// Non-forwarding duties of a sink.
///
/// Runs on the sink's own task; `&mut self` is never shared.
#[async_trait]
pub trait BaseSink: Send + 'static {
    /// Handles one inbound event. Default: nothing.
    async fn handle_event(&mut self, _event: &SinkEvent) {}

    /// Exit code reported when forwarding is disabled.
    ///
    /// No default: the value is this sink's contract to define.
    fn exit_code(&self) -> ExitCode;

    /// Final shutdown step, after the report (if any) has been rendered.
    ///
    /// `tree` is `None` when forwarding is disabled.
    async fn terminate(&mut self, _tree: Option<&TestRunTree>) {}
}

/// Base sink with no rendering duties.
#[derive(Debug, Clone, Copy)]
pub struct NullSink {
    exit_code: ExitCode,
}

impl NullSink {
    /// Creates a sink that answers `exit_code` when forwarding is disabled.
    pub fn with_exit_code(exit_code: ExitCode) -> Self {
        Self { exit_code }
    }
}

#[async_trait]
impl BaseSink for NullSink {
    fn exit_code(&self) -> ExitCode {
        self.exit_code
    }
}
