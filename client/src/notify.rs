use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::info;

/// User-visible transient notice about a traffic change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficNotice {
    pub reason: String,
}

/// Seam for surfacing background notifications to the user.
pub trait NotificationSink: Send + Sync {
    fn traffic_update(&self, notice: TrafficNotice);
}

/// Notices that dismiss themselves after a fixed duration, like the
/// auto-closing banner in the original UI.
pub struct TransientNotices {
    active: Arc<Mutex<Vec<(u64, TrafficNotice)>>>,
    next_id: AtomicU64,
    shown_total: AtomicU64,
    dismiss_after: Duration,
}

impl TransientNotices {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            active: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(0),
            shown_total: AtomicU64::new(0),
            dismiss_after,
        }
    }

    pub fn active(&self) -> Vec<TrafficNotice> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, notice)| notice.clone())
            .collect()
    }

    pub fn shown_total(&self) -> u64 {
        self.shown_total.load(Ordering::Relaxed)
    }
}

impl NotificationSink for TransientNotices {
    fn traffic_update(&self, notice: TrafficNotice) {
        info!(reason = %notice.reason, "traffic update notice shown");
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.shown_total.fetch_add(1, Ordering::Relaxed);
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, notice));

        let active = Arc::clone(&self.active);
        let dismiss_after = self.dismiss_after;
        tokio::spawn(async move {
            tokio::time::sleep(dismiss_after).await;
            active
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .retain(|(notice_id, _)| *notice_id != id);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{NotificationSink, TrafficNotice, TransientNotices};

    #[tokio::test(start_paused = true)]
    async fn notices_dismiss_themselves_after_the_configured_duration() {
        let notices = TransientNotices::new(Duration::from_secs(10));
        notices.traffic_update(TrafficNotice {
            reason: "Heavy traffic on segment 2".to_string(),
        });

        assert_eq!(notices.active().len(), 1);
        assert_eq!(notices.shown_total(), 1);

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(notices.active().len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(notices.active().is_empty());
        // Dismissal does not forget that the notice was shown.
        assert_eq!(notices.shown_total(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_notices_dismiss_independently() {
        let notices = TransientNotices::new(Duration::from_secs(10));
        notices.traffic_update(TrafficNotice {
            reason: "first".to_string(),
        });
        tokio::time::sleep(Duration::from_secs(5)).await;
        notices.traffic_update(TrafficNotice {
            reason: "second".to_string(),
        });

        tokio::time::sleep(Duration::from_secs(6)).await;
        let active = notices.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].reason, "second");

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(notices.active().is_empty());
    }
}
