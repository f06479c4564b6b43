use std::sync::atomic::{AtomicU64, Ordering};

use super::RequestOutcome;

/// Counters shared by every virtual user of a run.
///
/// Each field is updated with a single atomic operation. `Relaxed` is enough:
/// the coordinator only reads after joining every worker task, and the join
/// orders all prior updates before the read.
#[derive(Debug)]
pub struct AggregateCounters {
    successful: AtomicU64,
    errors: AtomicU64,
    success_duration_ms: AtomicU64,
    success_min_ms: AtomicU64,
    success_max_ms: AtomicU64,
}

impl Default for AggregateCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateCounters {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            successful: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            success_duration_ms: AtomicU64::new(0),
            success_min_ms: AtomicU64::new(u64::MAX),
            success_max_ms: AtomicU64::new(0),
        }
    }

    /// Counts a 2xx outcome as a success; anything else is an error.
    pub fn record(&self, outcome: &RequestOutcome) {
        if outcome.is_success() {
            self.record_success(outcome.duration_ms);
        } else {
            self.record_error();
        }
    }

    pub fn record_success(&self, duration_ms: u64) {
        self.successful.fetch_add(1, Ordering::Relaxed);
        self.success_duration_ms
            .fetch_add(duration_ms, Ordering::Relaxed);
        self.success_min_ms.fetch_min(duration_ms, Ordering::Relaxed);
        self.success_max_ms.fetch_max(duration_ms, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        let successful = self.successful.load(Ordering::Relaxed);
        let min = self.success_min_ms.load(Ordering::Relaxed);
        CounterSnapshot {
            successful,
            errors: self.errors.load(Ordering::Relaxed),
            success_duration_ms: self.success_duration_ms.load(Ordering::Relaxed),
            success_min_ms: if successful > 0 { min } else { 0 },
            success_max_ms: self.success_max_ms.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub successful: u64,
    pub errors: u64,
    pub success_duration_ms: u64,
    pub success_min_ms: u64,
    pub success_max_ms: u64,
}

impl CounterSnapshot {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.successful.saturating_add(self.errors)
    }

    #[must_use]
    pub fn success_avg_ms(&self) -> u64 {
        self.success_duration_ms
            .checked_div(self.successful)
            .unwrap_or(0)
    }
}
