use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::base::BaseSink;
use super::config::SinkConfig;
use super::handle::SinkHandle;
use super::sink::CoordinatedSink;
use crate::coordinator::{CoordinatorFactory, CoordinatorRef, TestRunCoordinator, spawn_coordinator};
use crate::error::SinkError;
use crate::reporting::{ReportFn, ReportRef};

/// Builder for a coordinator-enabled sink.
pub struct SinkBuilder {
    cfg: SinkConfig,
    base: Box<dyn BaseSink>,
    reporter: ReportRef,
    factory: Arc<dyn CoordinatorFactory>,
    token: CancellationToken,
}

impl SinkBuilder {
    /// Creates a builder with a no-op reporter and the built-in
    /// [`TestRunCoordinator`].
    pub fn new(cfg: SinkConfig, base: impl BaseSink) -> Self {
        Self {
            cfg,
            base: Box::new(base),
            reporter: ReportFn::noop(),
            factory: Arc::new(spawn_test_run_coordinator),
            token: CancellationToken::new(),
        }
    }

    /// Sets the reporting hook invoked with the final aggregate.
    pub fn with_reporter(mut self, reporter: ReportRef) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replaces the coordinator factory.
    ///
    /// Ignored when `use_coordinator` is `false`.
    pub fn with_coordinator_factory(mut self, factory: impl CoordinatorFactory) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    /// Ties the sink's lifetime to an external token.
    ///
    /// Cancelling it stops the sink and its coordinator without termination.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Runs startup and spawns the sink.
    ///
    /// Fails with [`SinkError::Startup`] when called outside a tokio runtime
    /// or when the coordinator cannot be created; the sink is never started
    /// in either case.
    pub fn spawn(self) -> Result<SinkHandle, SinkError> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(SinkError::Startup {
                error: "no tokio runtime".to_string(),
            });
        }

        let (tx, rx) = mpsc::channel(self.cfg.mailbox_capacity_clamped());
        let sink = CoordinatedSink::start(
            self.cfg,
            self.base,
            self.reporter,
            self.factory.as_ref(),
            tx.downgrade(),
            &self.token,
        )?;

        tokio::spawn(sink.run(rx, self.token.clone()));
        Ok(SinkHandle::new(tx, self.token))
    }
}

fn spawn_test_run_coordinator(token: CancellationToken) -> anyhow::Result<CoordinatorRef> {
    Ok(spawn_coordinator(TestRunCoordinator::new(), token))
}
