//! # Fact-completion subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for observers that want each
//! spec record as soon as the coordinator closes it.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently of the coordinator)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and logged)
//!
//! ## Architecture
//! ```text
//! Coordinator ── SpecEnd ──► SubscriberSet ──► [bounded queue] ──► worker ──► sub.on_spec_complete()
//!                                                                       └─► panic caught → logged
//! ```
//!
//! ## Rules
//! - A slow subscriber only affects its own queue.
//! - Queue overflow drops the record **for this subscriber only**.
//! - Records are processed sequentially (FIFO) per subscriber.
//! - Subscribers never block the coordinator or each other.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use multinode_sink::{SpecRun, Subscribe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_spec_complete(&self, spec: &SpecRun) {
//!         if spec.passed == Some(false) {
//!             // bump a counter, page someone, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::coordinator::SpecRun;

/// Observer of completed specs.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes one completed spec.
    ///
    /// Called from a dedicated worker task, not in the coordinator's turn.
    async fn on_spec_complete(&self, spec: &SpecRun);

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// The runtime clamps capacity to a minimum of 1.
    ///
    /// Default: 256.
    fn queue_capacity(&self) -> usize {
        256
    }
}
