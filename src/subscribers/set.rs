//! # SubscriberSet: non-blocking fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each completed [`SpecRun`] to every
//! subscriber **without awaiting** their processing.
//!
//! ## What it guarantees
//! - `emit(&SpecRun)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and logged (isolation).
//!
//! ## What it does **not** guarantee
//! - No global ordering across different subscribers.
//! - No retries on per-subscriber queue overflow (records are dropped for that
//!   subscriber).
//!
//! ## Diagram
//! ```text
//!    emit(&SpecRun)
//!        │                        (Arc-clone per subscriber)
//!        ├────────────────► [queue S1] ─► worker S1 ─► on_spec_complete()
//!        ├────────────────► [queue S2] ─► worker S2 ─► on_spec_complete()
//!        └────────────────► [queue SN] ─► worker SN ─► on_spec_complete()
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{error, warn};

use super::Subscribe;
use crate::coordinator::SpecRun;

/// Per-subscriber channel with metadata
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<SpecRun>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
#[derive(Default)]
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber and spawns its worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn add(&mut self, sub: Arc<dyn Subscribe>) {
        let cap = sub.queue_capacity().max(1);
        let name = sub.name();
        let (tx, mut rx) = mpsc::channel::<Arc<SpecRun>>(cap);

        let handle = tokio::spawn(async move {
            while let Some(spec) = rx.recv().await {
                let fut = sub.on_spec_complete(spec.as_ref());
                if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                    error!(subscriber = sub.name(), panic = ?panic_err, "subscriber panicked");
                }
            }
        });

        self.channels.push(SubscriberChannel { name, sender: tx });
        self.workers.push(handle);
    }

    /// Fan-out one record to all subscribers (non-blocking).
    ///
    /// If a subscriber's queue is **full** or **closed**, the record is dropped for it
    /// and a warning is logged with the subscriber's name.
    pub fn emit(&self, spec: &SpecRun) {
        let spec = Arc::new(spec.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&spec)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(subscriber = channel.name, "dropped spec record: queue full");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!(subscriber = channel.name, "dropped spec record: worker closed");
                }
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}
