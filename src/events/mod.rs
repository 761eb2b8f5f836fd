//! Sink events: inbound records and coordinator facts.
//!
//! This module groups the event **data model** shared by the sink and the
//! coordinator.
//!
//! ## Contents
//! - [`SinkEvent`] and its payload records, as delivered by worker-facing infrastructure
//! - [`Fact`] the coordinator-facing translation of an event
//! - [`Ticks`] 100ns timestamps used inside facts
//!
//! ## Quick reference
//! - **Producers**: worker-facing infrastructure (out of this crate) via
//!   [`SinkHandle`](crate::SinkHandle).
//! - **Consumers**: the sink (base duties + forwarding) and, after translation,
//!   the coordinator.

mod event;
mod fact;
mod ticks;

pub use event::{
    BeginSpec, EndSpec, EndTestRun, LogLevel, NodeLog, NodeLogFragment, NodeOutcome, NodeTest,
    RunnerLog, SinkEvent, SpecId,
};
pub use fact::{Fact, NodeLogFact, NodeLogFragmentFact, NodeResultFact, RunnerLogFact};
pub use ticks::Ticks;
