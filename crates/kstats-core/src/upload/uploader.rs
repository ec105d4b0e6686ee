use super::transport::Transport;
use crate::report::ReportStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Outcome of one flush cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub delivered: usize,
    /// Entries still queued after this cycle.
    pub remaining: usize,
    /// Whether the cycle stopped on a delivery failure.
    pub failed: bool,
}

/// Drains a [`ReportStore`] into a [`Transport`].
///
/// Delivery is at-least-once: an entry is only removed after the transport
/// confirmed it.
pub struct Uploader {
    transport: Arc<dyn Transport>,
    store: Arc<dyn ReportStore>,
    flush_lock: Mutex<()>,
}

impl Uploader {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn ReportStore>) -> Self {
        Self {
            transport,
            store,
            flush_lock: Mutex::new(()),
        }
    }

    /// Attempts delivery of every queued report in slot order.
    ///
    /// The first failure ends the cycle: later entries are not attempted.
    /// Nothing here is fatal; failures are logged and retried on the next
    /// trigger.
    pub async fn flush(&self) -> FlushSummary {
        let _guard = self.flush_lock.lock().await;

        let pending = match self.store.list_pending() {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!("[Uploader] cannot list pending reports: {}", e);
                return FlushSummary {
                    failed: true,
                    ..FlushSummary::default()
                };
            }
        };

        let total = pending.len();
        let mut summary = FlushSummary {
            remaining: total,
            ..FlushSummary::default()
        };

        for (slot, report) in pending {
            match self.transport.submit(&report).await {
                Ok(()) => {
                    summary.delivered += 1;
                    summary.remaining -= 1;
                    if let Err(e) = self.store.remove(slot) {
                        // Delivered but still on disk: it will be sent again.
                        tracing::warn!(
                            "[Uploader] delivered slot {} but could not remove it: {}",
                            slot,
                            e
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(
                        "[Uploader] delivery of slot {} failed, deferring {} report(s): {}",
                        slot,
                        summary.remaining,
                        e
                    );
                    summary.failed = true;
                    break;
                }
            }
        }

        tracing::debug!(
            "[Uploader] flush finished: delivered={}, remaining={}",
            summary.delivered,
            summary.remaining
        );
        summary
    }
}
