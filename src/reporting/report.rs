//! # Reporting hook invoked at sink termination.
//!
//! A [`Report`] renders results. The sink calls [`Report::report`] exactly
//! once per run end, with the aggregate returned by the coordinator, before
//! the base sink terminates. [`Report::on_spec_complete`] receives each spec
//! record as the coordinator closes it.
//!
//! The common handle type is [`ReportRef`], an `Arc<dyn Report>`.
//!
//! # Example
//! ```
//! use async_trait::async_trait;
//! use multinode_sink::{Report, TestRunTree};
//!
//! struct Summary;
//!
//! #[async_trait]
//! impl Report for Summary {
//!     fn name(&self) -> &str { "summary" }
//!
//!     async fn report(&self, tree: &TestRunTree) {
//!         let failed = tree.failed_specs().count();
//!         let _ = (failed, tree.specs.len());
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::coordinator::{SpecRun, TestRunTree};

/// Shared reporter handle.
pub type ReportRef = Arc<dyn Report>;

/// Renders the final aggregate of a run.
#[async_trait]
pub trait Report: Send + Sync + 'static {
    /// Returns a stable, human-readable reporter name.
    fn name(&self) -> &str;

    /// Renders the final aggregate. Called once per run end.
    async fn report(&self, tree: &TestRunTree);

    /// Receives one completed spec. Default: ignore.
    async fn on_spec_complete(&self, _spec: &SpecRun) {}
}
