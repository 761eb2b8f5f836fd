//! # Inbound events delivered to the sink.
//!
//! Worker-facing infrastructure turns what the nodes report into
//! [`SinkEvent`]s. Each variant wraps an immutable value record:
//! - **Spec boundaries**: [`BeginSpec`], [`EndSpec`]
//! - **Log lines**: [`NodeLogFragment`], [`NodeLog`], [`RunnerLog`]
//! - **Node outcomes**: [`NodeOutcome`] (carried by `NodeSpecPass` / `NodeSpecFail`)
//! - **Run boundary**: [`EndTestRun`]
//!
//! Events are transient: the sink consumes each one exactly once and keeps
//! nothing.
//!
//! ## Example
//! ```rust
//! use multinode_sink::{LogLevel, NodeLog, SinkEvent};
//!
//! let ev = SinkEvent::NodeLog(
//!     NodeLog::new(2, "cluster formed")
//!         .with_source("akka://node2")
//!         .with_level(LogLevel::Info),
//! );
//! assert_eq!(ev.kind(), "node_log");
//! assert_eq!(ev.node_index(), Some(2));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one distributed spec (test class + method).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecId {
    pub class_name: Arc<str>,
    pub method_name: Arc<str>,
}

impl SpecId {
    pub fn new(class_name: impl Into<Arc<str>>, method_name: impl Into<Arc<str>>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
        }
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class_name, self.method_name)
    }
}

/// One node taking part in a spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTest {
    pub node_index: u32,
    pub role: Arc<str>,
}

impl NodeTest {
    pub fn new(node_index: u32, role: impl Into<Arc<str>>) -> Self {
        Self {
            node_index,
            role: role.into(),
        }
    }
}

/// A spec is about to run on the given nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeginSpec {
    pub spec: SpecId,
    pub nodes: Vec<NodeTest>,
}

impl BeginSpec {
    pub fn new(spec: SpecId, nodes: Vec<NodeTest>) -> Self {
        Self { spec, nodes }
    }
}

/// The current spec finished on every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndSpec {
    pub spec: SpecId,
}

impl EndSpec {
    pub fn new(spec: SpecId) -> Self {
        Self { spec }
    }
}

/// Raw, unparsed chunk of output captured from a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLogFragment {
    pub when: SystemTime,
    pub text: Arc<str>,
    pub node_index: u32,
}

impl NodeLogFragment {
    /// Creates a fragment stamped with the current time.
    pub fn new(node_index: u32, text: impl Into<Arc<str>>) -> Self {
        Self {
            when: SystemTime::now(),
            text: text.into(),
            node_index,
        }
    }

    /// Overrides the timestamp.
    #[inline]
    pub fn at(mut self, when: SystemTime) -> Self {
        self.when = when;
        self
    }
}

/// Structured log line emitted by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLog {
    pub when: SystemTime,
    pub text: Arc<str>,
    pub node_index: u32,
    pub source: Arc<str>,
    pub level: LogLevel,
}

impl NodeLog {
    /// Creates an `Info` line with an empty source, stamped with the current time.
    pub fn new(node_index: u32, text: impl Into<Arc<str>>) -> Self {
        Self {
            when: SystemTime::now(),
            text: text.into(),
            node_index,
            source: Arc::from(""),
            level: LogLevel::Info,
        }
    }

    #[inline]
    pub fn at(mut self, when: SystemTime) -> Self {
        self.when = when;
        self
    }

    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = source.into();
        self
    }

    #[inline]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}

/// Log line emitted by the runner process itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerLog {
    pub when: SystemTime,
    pub text: Arc<str>,
    pub source: Arc<str>,
    pub level: LogLevel,
}

impl RunnerLog {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            when: SystemTime::now(),
            text: text.into(),
            source: Arc::from(""),
            level: LogLevel::Info,
        }
    }

    #[inline]
    pub fn at(mut self, when: SystemTime) -> Self {
        self.when = when;
        self
    }

    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = source.into();
        self
    }

    #[inline]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}

/// A node reported the result of the current spec.
///
/// Carries no timestamp: the coordinator stamps results when it learns them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOutcome {
    pub node_index: u32,
    pub text: Arc<str>,
}

impl NodeOutcome {
    pub fn new(node_index: u32, text: impl Into<Arc<str>>) -> Self {
        Self {
            node_index,
            text: text.into(),
        }
    }
}

/// The whole run is over.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EndTestRun {
    /// Optional run identity (assembly name, session id, ...).
    pub run: Option<Arc<str>>,
}

impl EndTestRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(run: impl Into<Arc<str>>) -> Self {
        Self {
            run: Some(run.into()),
        }
    }
}

/// Every fact a sink can receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    SpecBegin(BeginSpec),
    SpecEnd(EndSpec),
    NodeLogFragment(NodeLogFragment),
    NodeLog(NodeLog),
    RunnerLog(RunnerLog),
    NodeSpecPass(NodeOutcome),
    NodeSpecFail(NodeOutcome),
    RunEnd(EndTestRun),
}

impl SinkEvent {
    /// Short stable label (snake_case) for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SinkEvent::SpecBegin(_) => "spec_begin",
            SinkEvent::SpecEnd(_) => "spec_end",
            SinkEvent::NodeLogFragment(_) => "node_log_fragment",
            SinkEvent::NodeLog(_) => "node_log",
            SinkEvent::RunnerLog(_) => "runner_log",
            SinkEvent::NodeSpecPass(_) => "node_spec_pass",
            SinkEvent::NodeSpecFail(_) => "node_spec_fail",
            SinkEvent::RunEnd(_) => "run_end",
        }
    }

    /// Origin node, for the variants that have one.
    pub fn node_index(&self) -> Option<u32> {
        match self {
            SinkEvent::NodeLogFragment(e) => Some(e.node_index),
            SinkEvent::NodeLog(e) => Some(e.node_index),
            SinkEvent::NodeSpecPass(e) | SinkEvent::NodeSpecFail(e) => Some(e.node_index),
            _ => None,
        }
    }
}

impl From<BeginSpec> for SinkEvent {
    fn from(e: BeginSpec) -> Self {
        SinkEvent::SpecBegin(e)
    }
}

impl From<EndSpec> for SinkEvent {
    fn from(e: EndSpec) -> Self {
        SinkEvent::SpecEnd(e)
    }
}

impl From<NodeLogFragment> for SinkEvent {
    fn from(e: NodeLogFragment) -> Self {
        SinkEvent::NodeLogFragment(e)
    }
}

impl From<NodeLog> for SinkEvent {
    fn from(e: NodeLog) -> Self {
        SinkEvent::NodeLog(e)
    }
}

impl From<RunnerLog> for SinkEvent {
    fn from(e: RunnerLog) -> Self {
        SinkEvent::RunnerLog(e)
    }
}

impl From<EndTestRun> for SinkEvent {
    fn from(e: EndTestRun) -> Self {
        SinkEvent::RunEnd(e)
    }
}
