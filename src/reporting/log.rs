//! # LogReporter - simple console renderer
//!
//! A minimal [`Report`] that prints the aggregate to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [spec] ClusterSpec.must_form passed=true nodes=3
//! [spec] ClusterSpec.must_leave passed=false nodes=3
//!   [node 1] failed: leader did not converge
//! [run] specs=2 failed=1 passed=false exit=1
//! ```

use async_trait::async_trait;

use crate::coordinator::{SpecRun, TestRunTree};
use crate::exit_code::ExitCode;
use crate::reporting::Report;

/// Console reporter.
#[derive(Default)]
pub struct LogReporter {
    /// Print each spec as soon as it closes instead of only at the end.
    pub live: bool,
}

impl LogReporter {
    /// Construct a new [`LogReporter`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a reporter that also prints specs as they complete.
    #[must_use]
    pub fn live() -> Self {
        Self { live: true }
    }

    fn print_spec(spec: &SpecRun) {
        println!(
            "[spec] {} passed={} nodes={}",
            spec.spec,
            verdict(spec.passed),
            spec.nodes.len()
        );
        for node in &spec.nodes {
            for result in node.results.iter().filter(|r| !r.passed) {
                println!("  [node {}] failed: {}", node.node_index, result.text);
            }
        }
    }
}

fn verdict(passed: Option<bool>) -> &'static str {
    match passed {
        Some(true) => "true",
        Some(false) => "false",
        None => "unknown",
    }
}

#[async_trait]
impl Report for LogReporter {
    fn name(&self) -> &str {
        "LogReporter"
    }

    async fn report(&self, tree: &TestRunTree) {
        if !self.live {
            for spec in &tree.specs {
                Self::print_spec(spec);
            }
        }
        println!(
            "[run] specs={} failed={} passed={} exit={}",
            tree.specs.len(),
            tree.failed_specs().count(),
            verdict(tree.passed),
            ExitCode::from_passed(tree.passed)
        );
    }

    async fn on_spec_complete(&self, spec: &SpecRun) {
        if self.live {
            Self::print_spec(spec);
        }
    }
}
