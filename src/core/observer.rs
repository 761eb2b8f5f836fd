use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::trace;

use super::message::SinkMsg;
use crate::coordinator::SpecRun;
use crate::subscribers::Subscribe;

/// Subscriber the sink registers with its coordinator at startup.
///
/// Turns each completed spec into a `FactData` message on the sink mailbox,
/// so the reporter sees it on the sink's own turn. Holds a weak sender: the
/// observer never keeps a sink alive.
pub(crate) struct SinkObserver {
    mailbox: mpsc::WeakSender<SinkMsg>,
}

impl SinkObserver {
    pub(crate) fn new(mailbox: mpsc::WeakSender<SinkMsg>) -> Self {
        Self { mailbox }
    }
}

#[async_trait]
impl Subscribe for SinkObserver {
    async fn on_spec_complete(&self, spec: &SpecRun) {
        let Some(mailbox) = self.mailbox.upgrade() else {
            trace!(spec = %spec.spec, "sink gone; spec record dropped");
            return;
        };
        if mailbox.send(SinkMsg::FactData(spec.clone())).await.is_err() {
            trace!(spec = %spec.spec, "sink gone; spec record dropped");
        }
    }

    fn name(&self) -> &'static str {
        "sink"
    }
}
