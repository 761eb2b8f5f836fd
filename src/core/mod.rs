//! Sink core: protocol state machine and its public surface.
//!
//! The public API from this module is [`SinkHandle`] (with [`EventSink`]),
//! [`SinkBuilder`], [`SinkConfig`] and the [`BaseSink`] extension point.
//!
//! Internal modules:
//! - [`sink`]: the `CoordinatedSink` actor (event forwarding, exit-code and run-end requests);
//! - [`termination`]: final report, base termination and the requester's reply;
//! - [`observer`]: coordinator subscriber that feeds completed specs back to the sink;
//! - [`message`]: sink mailbox messages;
//! - [`state`]: lifecycle states.

mod base;
mod builder;
mod config;
mod handle;
mod message;
mod observer;
mod sink;
mod state;
mod termination;

#[cfg(test)]
mod tests;

pub use base::{BaseSink, NullSink};
pub use builder::SinkBuilder;
pub use config::SinkConfig;
pub use handle::{EventSink, SinkHandle};
pub use message::Termination;
pub use state::SinkState;
