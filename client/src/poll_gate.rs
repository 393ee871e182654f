use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Rate limiter for background traffic checks.
///
/// Timer ticks and visibility-restored events both funnel through here. The
/// watermark is claimed *before* the network request goes out, so a slow
/// response cannot let a second tick start an overlapping poll. Skipped
/// ticks are dropped, never queued.
#[derive(Debug)]
pub struct PollGate {
    last_poll_epoch_ms: AtomicU64,
    min_gap_ms: u64,
}

impl PollGate {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            last_poll_epoch_ms: AtomicU64::new(0),
            min_gap_ms: min_gap.as_millis() as u64,
        }
    }

    /// Claims the watermark if the minimum gap has elapsed. The first claim
    /// always succeeds.
    pub fn try_claim(&self, now_ms: u64) -> bool {
        let last = self.last_poll_epoch_ms.load(Ordering::Acquire);
        if last != 0 && now_ms.saturating_sub(last) < self.min_gap_ms {
            return false;
        }
        self.last_poll_epoch_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn last_poll_epoch_ms(&self) -> u64 {
        self.last_poll_epoch_ms.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::PollGate;

    #[test]
    fn first_claim_always_succeeds() {
        let gate = PollGate::new(Duration::from_secs(120));
        assert!(gate.try_claim(1_000));
        assert_eq!(gate.last_poll_epoch_ms(), 1_000);
    }

    #[test]
    fn second_claim_within_gap_is_dropped() {
        let gate = PollGate::new(Duration::from_secs(120));
        assert!(gate.try_claim(1_000));
        assert!(!gate.try_claim(1_010));
        // The failed claim must not move the watermark.
        assert_eq!(gate.last_poll_epoch_ms(), 1_000);
    }

    #[test]
    fn claim_after_gap_elapsed_succeeds() {
        let gate = PollGate::new(Duration::from_secs(120));
        assert!(gate.try_claim(1_000));
        assert!(!gate.try_claim(120_999));
        assert!(gate.try_claim(121_000));
        assert_eq!(gate.last_poll_epoch_ms(), 121_000);
    }

    #[test]
    fn zero_gap_never_drops() {
        let gate = PollGate::new(Duration::ZERO);
        assert!(gate.try_claim(1));
        assert!(gate.try_claim(1));
        assert!(gate.try_claim(2));
    }
}
