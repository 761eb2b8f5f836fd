//! # Coordinator-facing facts.
//!
//! [`Fact`] is the shape a [`SinkEvent`] takes once the sink forwards it:
//! same content, coordinator field layout, timestamps as [`Ticks`].
//!
//! ## Translation table
//! ```text
//! SpecBegin(e)        → Fact::SpecBegin(e)                            (unchanged)
//! SpecEnd(e)          → Fact::SpecEnd(e)                              (unchanged)
//! NodeLogFragment(e)  → NodeLogFragmentFact(ticks(e.when), text, node)
//! NodeLog(e)          → NodeLogFact(ticks(e.when), text, node, source, level)
//! RunnerLog(e)        → RunnerLogFact(ticks(e.when), text, source, level)
//! NodeSpecPass(e)     → NodeResultFact(ticks(now), text, node, passed=true)
//! NodeSpecFail(e)     → NodeResultFact(ticks(now), text, node, passed=false)
//! RunEnd(_)           → (none; sent as NotifyRunEnd request)
//! ```
//!
//! Node results are stamped when the fact is learned, not when it occurred.

use std::sync::Arc;

use super::event::{BeginSpec, EndSpec, LogLevel, SinkEvent};
use super::ticks::Ticks;

/// Raw node output chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLogFragmentFact {
    pub ticks: Ticks,
    pub text: Arc<str>,
    pub node_index: u32,
}

/// Structured node log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLogFact {
    pub ticks: Ticks,
    pub text: Arc<str>,
    pub node_index: u32,
    pub source: Arc<str>,
    pub level: LogLevel,
}

/// Runner log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerLogFact {
    pub ticks: Ticks,
    pub text: Arc<str>,
    pub source: Arc<str>,
    pub level: LogLevel,
}

/// Per-node spec verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeResultFact {
    pub ticks: Ticks,
    pub text: Arc<str>,
    pub node_index: u32,
    pub passed: bool,
}

/// Normalized record sent to the coordinator with `Record`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fact {
    SpecBegin(BeginSpec),
    SpecEnd(EndSpec),
    NodeLogFragment(NodeLogFragmentFact),
    NodeLog(NodeLogFact),
    RunnerLog(RunnerLogFact),
    NodeResult(NodeResultFact),
}

impl Fact {
    /// Translates an inbound event.
    ///
    /// Returns `None` for `RunEnd`, which travels as a request instead.
    pub fn translate(event: &SinkEvent) -> Option<Fact> {
        let fact = match event {
            SinkEvent::SpecBegin(e) => Fact::SpecBegin(e.clone()),
            SinkEvent::SpecEnd(e) => Fact::SpecEnd(e.clone()),
            SinkEvent::NodeLogFragment(e) => Fact::NodeLogFragment(NodeLogFragmentFact {
                ticks: Ticks::from(e.when),
                text: e.text.clone(),
                node_index: e.node_index,
            }),
            SinkEvent::NodeLog(e) => Fact::NodeLog(NodeLogFact {
                ticks: Ticks::from(e.when),
                text: e.text.clone(),
                node_index: e.node_index,
                source: e.source.clone(),
                level: e.level,
            }),
            SinkEvent::RunnerLog(e) => Fact::RunnerLog(RunnerLogFact {
                ticks: Ticks::from(e.when),
                text: e.text.clone(),
                source: e.source.clone(),
                level: e.level,
            }),
            SinkEvent::NodeSpecPass(e) => Fact::NodeResult(NodeResultFact {
                ticks: Ticks::now(),
                text: e.text.clone(),
                node_index: e.node_index,
                passed: true,
            }),
            SinkEvent::NodeSpecFail(e) => Fact::NodeResult(NodeResultFact {
                ticks: Ticks::now(),
                text: e.text.clone(),
                node_index: e.node_index,
                passed: false,
            }),
            SinkEvent::RunEnd(_) => return None,
        };
        Some(fact)
    }

    /// Short stable label (snake_case) for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Fact::SpecBegin(_) => "spec_begin",
            Fact::SpecEnd(_) => "spec_end",
            Fact::NodeLogFragment(_) => "node_log_fragment",
            Fact::NodeLog(_) => "node_log",
            Fact::RunnerLog(_) => "runner_log",
            Fact::NodeResult(_) => "node_result",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;
    use crate::events::{EndTestRun, NodeLog, NodeLogFragment, NodeOutcome, RunnerLog, SpecId};

    #[test]
    fn test_fragment_becomes_ticks_text_node_triple() {
        let when = UNIX_EPOCH + Duration::from_secs(2);
        let ev = SinkEvent::NodeLogFragment(NodeLogFragment::new(3, "raw").at(when));

        let Some(Fact::NodeLogFragment(f)) = Fact::translate(&ev) else {
            panic!("expected fragment fact");
        };
        assert_eq!(f.ticks, Ticks(20_000_000));
        assert_eq!(&*f.text, "raw");
        assert_eq!(f.node_index, 3);
    }

    #[test]
    fn test_node_log_keeps_source_and_level() {
        let when = UNIX_EPOCH + Duration::from_millis(1);
        let ev = SinkEvent::NodeLog(
            NodeLog::new(1, "joined")
                .at(when)
                .with_source("cluster")
                .with_level(LogLevel::Warning),
        );

        let Some(Fact::NodeLog(f)) = Fact::translate(&ev) else {
            panic!("expected node log fact");
        };
        assert_eq!(f.ticks, Ticks(10_000));
        assert_eq!(&*f.source, "cluster");
        assert_eq!(f.level, LogLevel::Warning);
        assert_eq!(f.node_index, 1);
    }

    #[test]
    fn test_runner_log_has_no_node() {
        let ev = SinkEvent::RunnerLog(RunnerLog::new("starting").with_level(LogLevel::Error));
        let Some(Fact::RunnerLog(f)) = Fact::translate(&ev) else {
            panic!("expected runner log fact");
        };
        assert_eq!(&*f.text, "starting");
        assert_eq!(f.level, LogLevel::Error);
    }

    #[test]
    fn test_node_results_are_stamped_at_translation_time() {
        let before = Ticks::now();
        let pass = Fact::translate(&SinkEvent::NodeSpecPass(NodeOutcome::new(0, "ok")));
        let fail = Fact::translate(&SinkEvent::NodeSpecFail(NodeOutcome::new(1, "boom")));
        let after = Ticks::now();

        let Some(Fact::NodeResult(p)) = pass else {
            panic!("expected node result");
        };
        let Some(Fact::NodeResult(f)) = fail else {
            panic!("expected node result");
        };
        assert!(p.passed);
        assert!(!f.passed);
        assert!(p.ticks >= before && p.ticks <= after);
        assert!(f.ticks >= p.ticks);
    }

    #[test]
    fn test_spec_boundaries_forward_unchanged() {
        let id = SpecId::new("ClusterSpec", "must_form");
        let begin = BeginSpec::new(id.clone(), vec![]);
        assert_eq!(
            Fact::translate(&SinkEvent::SpecBegin(begin.clone())),
            Some(Fact::SpecBegin(begin))
        );
        assert_eq!(
            Fact::translate(&SinkEvent::SpecEnd(EndSpec::new(id.clone()))),
            Some(Fact::SpecEnd(EndSpec::new(id)))
        );
    }

    #[test]
    fn test_run_end_is_not_a_fact() {
        assert_eq!(Fact::translate(&SinkEvent::RunEnd(EndTestRun::new())), None);
    }
}
