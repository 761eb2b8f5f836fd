//! # Built-in coordinator: aggregates facts into a [`TestRunTree`].
//!
//! ## Architecture
//! ```text
//! Record(fact) ──► TestRunCoordinator::record()
//!                     ├─► SpecBegin   → open SpecRun (node roster), close a dangling one first
//!                     ├─► NodeResult  → open spec › node.results, settle spec verdict
//!                     ├─► NodeLog*    → open spec › node.log   (runner_log if no spec open)
//!                     ├─► RunnerLog   → runner_log
//!                     └─► SpecEnd     → close spec ─► SubscriberSet::emit(&SpecRun)
//!
//! RequestState  ──► snapshot (run verdict settled on a clone)
//! NotifyRunEnd  ──► close open spec, stamp end, snapshot
//! stop          ──► drain subscriber queues
//! ```
//!
//! ## Rules
//! - At most one spec is open at a time (specs run sequentially).
//! - Node results received with no open spec are dropped with a warning.
//! - Every closed spec is published to subscribers exactly once.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use super::contract::Coordinate;
use super::tree::{LogLine, SpecRun, TestRunTree};
use crate::events::{BeginSpec, EndSpec, EndTestRun, Fact, Ticks};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Reference [`Coordinate`] implementation.
#[derive(Default)]
pub struct TestRunCoordinator {
    tree: TestRunTree,
    /// Index of the open spec in `tree.specs`.
    open: Option<usize>,
    subscribers: SubscriberSet,
}

impl TestRunCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin_spec(&mut self, begin: BeginSpec) {
        if let Some(open) = self.open {
            warn!(
                open = %self.tree.specs[open].spec,
                next = %begin.spec,
                "spec began before the previous one ended; closing it"
            );
            self.close_open_spec();
        }

        let mut spec = SpecRun::new(begin.spec, Ticks::now());
        for node in begin.nodes {
            spec.node_mut(node.node_index).role = Some(node.role);
        }
        debug!(spec = %spec.spec, nodes = spec.nodes.len(), "spec opened");
        self.tree.specs.push(spec);
        self.open = Some(self.tree.specs.len() - 1);
    }

    fn end_spec(&mut self, end: EndSpec) {
        match self.open_spec() {
            Some(spec) if spec.spec == end.spec => self.close_open_spec(),
            Some(spec) => {
                warn!(
                    open = %spec.spec,
                    ended = %end.spec,
                    "spec end does not match open spec; closing it"
                );
                self.close_open_spec();
            }
            None => warn!(spec = %end.spec, "spec end without an open spec"),
        }
    }

    fn close_open_spec(&mut self) {
        let Some(idx) = self.open.take() else {
            return;
        };
        let spec = &mut self.tree.specs[idx];
        spec.ended_at = Some(Ticks::now());
        spec.settle();
        debug!(spec = %spec.spec, passed = ?spec.passed, "spec closed");
        self.subscribers.emit(spec);
    }

    fn open_spec(&self) -> Option<&SpecRun> {
        self.open.map(|idx| &self.tree.specs[idx])
    }

    fn open_spec_mut(&mut self) -> Option<&mut SpecRun> {
        self.open.map(|idx| &mut self.tree.specs[idx])
    }

    fn node_line(&mut self, node_index: u32, line: LogLine) {
        match self.open_spec_mut() {
            Some(spec) => spec.node_mut(node_index).log.push(line),
            None => self.tree.runner_log.push(line),
        }
    }

    fn snapshot(&self) -> TestRunTree {
        let mut tree = self.tree.clone();
        tree.settle();
        tree
    }
}

impl Coordinate for TestRunCoordinator {
    fn subscribe(&mut self, observer: Arc<dyn Subscribe>) {
        debug!(subscriber = observer.name(), "subscriber added");
        self.subscribers.add(observer);
    }

    fn record(&mut self, fact: Fact) {
        self.tree.started_at.get_or_insert_with(Ticks::now);

        match fact {
            Fact::SpecBegin(begin) => self.begin_spec(begin),
            Fact::SpecEnd(end) => self.end_spec(end),
            Fact::NodeLogFragment(f) => self.node_line(
                f.node_index,
                LogLine {
                    ticks: f.ticks,
                    text: f.text,
                    node_index: Some(f.node_index),
                    source: None,
                    level: None,
                },
            ),
            Fact::NodeLog(f) => self.node_line(
                f.node_index,
                LogLine {
                    ticks: f.ticks,
                    text: f.text,
                    node_index: Some(f.node_index),
                    source: Some(f.source),
                    level: Some(f.level),
                },
            ),
            Fact::RunnerLog(f) => self.tree.runner_log.push(LogLine {
                ticks: f.ticks,
                text: f.text,
                node_index: None,
                source: Some(f.source),
                level: Some(f.level),
            }),
            Fact::NodeResult(result) => match self.open_spec_mut() {
                Some(spec) => {
                    spec.node_mut(result.node_index).results.push(result);
                    spec.settle();
                }
                None => warn!(
                    node = result.node_index,
                    "node result without an open spec; dropped"
                ),
            },
        }
    }

    fn state(&self) -> TestRunTree {
        self.snapshot()
    }

    fn run_end(&mut self, end: EndTestRun) -> TestRunTree {
        self.close_open_spec();
        self.tree.run = end.run;
        self.tree.ended_at = Some(Ticks::now());
        let tree = self.snapshot();
        debug!(specs = tree.specs.len(), passed = ?tree.passed, "run closed");
        tree
    }

    /// Waits until every subscriber has seen the specs already published.
    fn stop(self) -> impl Future<Output = ()> + Send {
        self.subscribers.shutdown()
    }
}
