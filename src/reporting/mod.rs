//! # Reporting strategies.
//!
//! This module provides the hook the sink hands the final aggregate to:
//! - [`Report`] - trait for rendering a finished run
//! - [`ReportFn`] - closure-backed implementation
//! - [`ReportRef`] - shared reference to a reporter (`Arc<dyn Report>`)

mod report;
mod report_fn;

#[cfg(feature = "logging")]
mod log;

pub use report::{Report, ReportRef};
pub use report_fn::ReportFn;

#[cfg(feature = "logging")]
pub use log::LogReporter;
