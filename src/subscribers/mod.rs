//! # Fact-completion subscribers.
//!
//! A coordinator publishes every spec it closes to its subscribers. The sink
//! registers itself here at startup; other observers may register through
//! [`CoordinatorRef::subscribe`](crate::CoordinatorRef::subscribe).
//!
//! ## Architecture
//! ```text
//! Coordinator ── SpecEnd / RunEnd ──► SubscriberSet::emit(&SpecRun)
//!                                         │
//!                                ┌────────┼─────────┐
//!                                ▼        ▼         ▼
//!                           sink mailbox  custom   ...
//!                         (FactData msg)
//! ```

mod set;
mod subscriber;

pub use set::SubscriberSet;
pub use subscriber::Subscribe;
