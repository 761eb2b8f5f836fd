//! Coordinator: owner of the aggregated run state.
//!
//! The sink never touches aggregate state directly. It talks to a
//! coordinator through a [`CoordinatorRef`] using four messages:
//! `Subscribe`, `Record`, `RequestState` and `NotifyRunEnd`.
//!
//! ## Contents
//! - [`Coordinate`] the request/response contract, [`spawn_coordinator`] its mailbox loop
//! - [`CoordinatorFactory`] how a sink obtains its coordinator at startup
//! - [`CoordinatorRef`] tell/ask handle with bounded waits
//! - [`TestRunCoordinator`] built-in aggregation into a [`TestRunTree`]

mod contract;
mod handle;
mod message;
mod run_coordinator;
mod tree;

pub use contract::{Coordinate, CoordinatorFactory, spawn_coordinator};
pub use handle::CoordinatorRef;
pub use run_coordinator::TestRunCoordinator;
pub use tree::{LogLine, NodeRun, SpecRun, TestRunTree};

#[cfg(test)]
pub(crate) use message::CoordinatorMsg;
