use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Debug, Default)]
pub struct SubmitStats {
    pub submitted: AtomicU64,
    pub failed: AtomicU64,
    // Documents refused locally before any request was sent
    pub rejected: AtomicU64,
    // Acquires that had to wait for the rate-limit window
    pub throttled: AtomicU64,

    pub last_submit_latency_ms: AtomicU64,
}

impl SubmitStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_throttled(&self) {
        self.throttled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_submit_latency(&self, ms: u64) {
        self.last_submit_latency_ms.store(ms, Ordering::Relaxed);
    }

    pub fn log_stats(&self) {
        let submitted = self.submitted.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let rejected = self.rejected.load(Ordering::Relaxed);
        let throttled = self.throttled.load(Ordering::Relaxed);
        let latency = self.last_submit_latency_ms.load(Ordering::Relaxed);

        info!(
            "STATS: Submitted: {} | Failed: {} | Rejected: {} | Throttled: {} | Last latency: {}ms",
            submitted, failed, rejected, throttled, latency
        );
    }
}
