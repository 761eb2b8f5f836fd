//! Error types used by the sink and coordinator.
//!
//! [`SinkError`] covers every failure the protocol layer can surface:
//! coordinator creation at startup, requests that are never answered, and
//! messages sent to a sink that has already shut down.
//!
//! The type provides helper methods (`as_label`, `as_message`) for logging.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the sink protocol.
///
/// Failures inside the coordinator's own aggregation are opaque here; only
/// the presence or absence of a valid reply matters.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum SinkError {
    /// The coordinator could not be created during startup.
    ///
    /// The sink never becomes active after this error.
    #[error("coordinator startup failed: {error}")]
    Startup {
        /// The underlying error message.
        error: String,
    },

    /// A request to the coordinator was not answered in time.
    #[error("coordinator request timed out after {timeout:?}")]
    RequestTimeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The coordinator mailbox is closed or the reply slot was dropped.
    #[error("coordinator unavailable")]
    CoordinatorUnavailable,

    /// A run end was received while the sink was already terminating.
    #[error("sink is already terminating")]
    AlreadyTerminating,

    /// The sink mailbox is closed (sink terminated or cancelled).
    #[error("sink closed")]
    Closed,
}

impl SinkError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use multinode_sink::SinkError;
    /// use std::time::Duration;
    ///
    /// let err = SinkError::RequestTimeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "coordinator_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SinkError::Startup { .. } => "sink_startup_failed",
            SinkError::RequestTimeout { .. } => "coordinator_timeout",
            SinkError::CoordinatorUnavailable => "coordinator_unavailable",
            SinkError::AlreadyTerminating => "sink_already_terminating",
            SinkError::Closed => "sink_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    ///
    /// # Example
    /// ```
    /// use multinode_sink::SinkError;
    /// use std::time::Duration;
    ///
    /// let err = SinkError::RequestTimeout { timeout: Duration::from_millis(5) };
    /// assert_eq!(err.as_message(), "no reply within 5ms");
    /// ```
    pub fn as_message(&self) -> String {
        match self {
            SinkError::Startup { error } => format!("startup: {error}"),
            SinkError::RequestTimeout { timeout } => format!("no reply within {timeout:?}"),
            SinkError::CoordinatorUnavailable => "coordinator mailbox closed".to_string(),
            SinkError::AlreadyTerminating => "duplicate run end".to_string(),
            SinkError::Closed => "sink mailbox closed".to_string(),
        }
    }

    /// Indicates whether the error came from a request that got no valid reply.
    ///
    /// # Example
    /// ```
    /// use multinode_sink::SinkError;
    ///
    /// assert!(SinkError::CoordinatorUnavailable.is_unanswered());
    /// assert!(!SinkError::Closed.is_unanswered());
    /// ```
    pub fn is_unanswered(&self) -> bool {
        matches!(
            self,
            SinkError::RequestTimeout { .. } | SinkError::CoordinatorUnavailable
        )
    }
}

impl From<anyhow::Error> for SinkError {
    fn from(err: anyhow::Error) -> Self {
        SinkError::Startup {
            error: format!("{err:#}"),
        }
    }
}
