//! # Sink configuration.
//!
//! Provides [`SinkConfig`] centralized settings for one sink instance.
//!
//! ## Clamped values
//! - `request_timeout = 0s` → 1ms (a request is always bounded and never instantly failed)
//! - `mailbox_capacity = 0` → 1

use std::time::Duration;

/// Settings for one sink.
///
/// ## Field semantics
/// - `use_coordinator`: Forward events to a coordinator (fixed for the sink's lifetime)
/// - `request_timeout`: Upper bound on each coordinator request (exit code, run end)
/// - `mailbox_capacity`: Bounded sink mailbox size; senders wait when full
///
/// ## Notes
/// All fields are public for flexibility. Prefer the accessors, which apply
/// the clamping rules above.
#[derive(Clone, Debug)]
pub struct SinkConfig {
    /// Forward events to a coordinator and ask it for exit code and final results.
    ///
    /// When `false` the coordinator is never created and the sink behaves
    /// exactly like its base sink.
    pub use_coordinator: bool,

    /// Maximum wait for a coordinator reply.
    ///
    /// On expiry:
    /// - an exit-code request is answered with `ExitCode::Failure`
    /// - a run end still runs the report and base termination; its requester
    ///   gets `SinkError::RequestTimeout`
    pub request_timeout: Duration,

    /// Capacity of the sink mailbox.
    pub mailbox_capacity: usize,
}

impl SinkConfig {
    /// Returns the request timeout, clamped to at least 1ms.
    #[inline]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout.max(Duration::from_millis(1))
    }

    /// Returns a mailbox capacity clamped to a minimum of 1.
    #[inline]
    pub fn mailbox_capacity_clamped(&self) -> usize {
        self.mailbox_capacity.max(1)
    }

    /// Same settings with forwarding disabled.
    #[inline]
    pub fn without_coordinator(mut self) -> Self {
        self.use_coordinator = false;
        self
    }
}

impl Default for SinkConfig {
    /// Default configuration:
    ///
    /// - `use_coordinator = true`
    /// - `request_timeout = 10s`
    /// - `mailbox_capacity = 1024`
    fn default() -> Self {
        Self {
            use_coordinator: true,
            request_timeout: Duration::from_secs(10),
            mailbox_capacity: 1024,
        }
    }
}
