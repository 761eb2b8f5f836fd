//! # Function-backed reporter (`ReportFn`)
//!
//! [`ReportFn`] wraps a closure `F: Fn(&TestRunTree)` so simple reporters
//! need no dedicated type.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicI32, Ordering};
//! use std::sync::Arc;
//! use multinode_sink::{ExitCode, ReportFn, ReportRef};
//!
//! let last = Arc::new(AtomicI32::new(-1));
//! let sink = last.clone();
//! let r: ReportRef = ReportFn::arc("exit-code", move |tree| {
//!     sink.store(ExitCode::from_passed(tree.passed).code(), Ordering::SeqCst);
//! });
//!
//! assert_eq!(r.name(), "exit-code");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;

use super::report::Report;
use crate::coordinator::TestRunTree;

/// Function-backed reporter implementation.
#[derive(Debug)]
pub struct ReportFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ReportFn<F>
where
    F: Fn(&TestRunTree) + Send + Sync + 'static,
{
    /// Creates a new function-backed reporter.
    ///
    /// Prefer [`ReportFn::arc`] when you immediately need a [`ReportRef`](super::ReportRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the reporter and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl ReportFn<fn(&TestRunTree)> {
    /// Reporter that renders nothing.
    pub fn noop() -> Arc<Self> {
        fn ignore(_: &TestRunTree) {}
        Self::arc("noop", ignore as fn(&TestRunTree))
    }
}

#[async_trait]
impl<F> Report for ReportFn<F>
where
    F: Fn(&TestRunTree) + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn report(&self, tree: &TestRunTree) {
        (self.f)(tree)
    }
}
