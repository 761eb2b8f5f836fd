//! # Aggregated record of a distributed test run.
//!
//! [`TestRunTree`] is the snapshot a coordinator returns for `RequestState`
//! and `NotifyRunEnd`. The protocol layer only reads [`TestRunTree::passed`];
//! the rest of the record is for reporters.
//!
//! ## Shape
//! ```text
//! TestRunTree
//!  ├─ runner_log: [LogLine]
//!  └─ specs: [SpecRun]            (begin order)
//!       └─ nodes: [NodeRun]       (sorted by node_index)
//!            ├─ results: [NodeResultFact]
//!            └─ log: [LogLine]
//! ```
//!
//! ## Verdicts
//! - node: `Some(false)` if any result failed, `Some(true)` if at least one passed, else `None`
//! - spec: combines its nodes the same way
//! - run: combines its specs the same way

use std::sync::Arc;

use crate::events::{LogLevel, NodeResultFact, SpecId, Ticks};

/// One log line kept in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub ticks: Ticks,
    pub text: Arc<str>,
    /// Origin node; `None` for runner lines.
    pub node_index: Option<u32>,
    /// Log source; `None` for raw fragments.
    pub source: Option<Arc<str>>,
    /// Severity; `None` for raw fragments.
    pub level: Option<LogLevel>,
}

/// Everything recorded for one node within one spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRun {
    pub node_index: u32,
    pub role: Option<Arc<str>>,
    pub results: Vec<NodeResultFact>,
    pub log: Vec<LogLine>,
}

impl NodeRun {
    pub fn new(node_index: u32) -> Self {
        Self {
            node_index,
            role: None,
            results: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Node verdict derived from its results.
    pub fn passed(&self) -> Option<bool> {
        combine(self.results.iter().map(|r| Some(r.passed)))
    }
}

/// Everything recorded for one spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRun {
    pub spec: SpecId,
    pub started_at: Ticks,
    /// `None` while the spec is still open.
    pub ended_at: Option<Ticks>,
    pub nodes: Vec<NodeRun>,
    /// Spec verdict, kept current by the coordinator.
    pub passed: Option<bool>,
}

impl SpecRun {
    pub fn new(spec: SpecId, started_at: Ticks) -> Self {
        Self {
            spec,
            started_at,
            ended_at: None,
            nodes: Vec::new(),
            passed: None,
        }
    }

    /// Returns the node, inserting it in index order if unknown.
    pub fn node_mut(&mut self, node_index: u32) -> &mut NodeRun {
        let pos = match self.nodes.binary_search_by_key(&node_index, |n| n.node_index) {
            Ok(pos) => pos,
            Err(pos) => {
                self.nodes.insert(pos, NodeRun::new(node_index));
                pos
            }
        };
        &mut self.nodes[pos]
    }

    pub fn node(&self, node_index: u32) -> Option<&NodeRun> {
        self.nodes.iter().find(|n| n.node_index == node_index)
    }

    /// Recomputes [`SpecRun::passed`] from the nodes.
    pub fn settle(&mut self) {
        self.passed = combine(self.nodes.iter().map(NodeRun::passed));
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Aggregated state of the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestRunTree {
    /// Run identity taken from the run-end event.
    pub run: Option<Arc<str>>,
    pub started_at: Option<Ticks>,
    /// Set once the run end has been processed.
    pub ended_at: Option<Ticks>,
    pub specs: Vec<SpecRun>,
    pub runner_log: Vec<LogLine>,
    /// Overall verdict; `None` means indeterminate.
    pub passed: Option<bool>,
}

impl TestRunTree {
    /// Empty tree with no verdict.
    pub fn indeterminate() -> Self {
        Self::default()
    }

    /// Empty tree carrying only a verdict.
    pub fn with_passed(passed: Option<bool>) -> Self {
        Self {
            passed,
            ..Self::default()
        }
    }

    /// Recomputes [`TestRunTree::passed`] from the specs.
    pub fn settle(&mut self) {
        self.passed = combine(self.specs.iter().map(|s| s.passed));
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn spec(&self, id: &SpecId) -> Option<&SpecRun> {
        self.specs.iter().find(|s| &s.spec == id)
    }

    pub fn failed_specs(&self) -> impl Iterator<Item = &SpecRun> {
        self.specs.iter().filter(|s| s.passed == Some(false))
    }
}

/// Folds verdicts: any failure wins, otherwise any pass, otherwise indeterminate.
fn combine(verdicts: impl Iterator<Item = Option<bool>>) -> Option<bool> {
    let mut any_pass = false;
    for verdict in verdicts {
        match verdict {
            Some(false) => return Some(false),
            Some(true) => any_pass = true,
            None => {}
        }
    }
    any_pass.then_some(true)
}
