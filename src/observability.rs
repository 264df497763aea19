//! Counters for the poll loop, exposed on the status server

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::mungers::MungeOutcome;

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    cycles_completed: AtomicU64,
    cycles_failed: AtomicU64,
    items_dispatched: AtomicU64,
    items_skipped: AtomicU64,
    items_failed: AtomicU64,
    lookups_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycle_completed(&self) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "cycles_completed", "Metric incremented");
    }

    pub fn cycle_failed(&self) {
        self.cycles_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "cycles_failed", "Metric incremented");
    }

    pub fn item_failed(&self) {
        self.items_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "items_failed", "Metric incremented");
    }

    /// Count a successful `munge_issue` by outcome
    pub fn record_outcome(&self, outcome: &MungeOutcome) {
        match outcome {
            MungeOutcome::Dispatched { .. } => {
                self.items_dispatched.fetch_add(1, Ordering::Relaxed);
            }
            MungeOutcome::LookupFailed => {
                self.lookups_failed.fetch_add(1, Ordering::Relaxed);
                self.items_skipped.fetch_add(1, Ordering::Relaxed);
            }
            MungeOutcome::NotAPullRequest | MungeOutcome::Merged => {
                self.items_skipped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            items_dispatched: self.items_dispatched.load(Ordering::Relaxed),
            items_skipped: self.items_skipped.load(Ordering::Relaxed),
            items_failed: self.items_failed.load(Ordering::Relaxed),
            lookups_failed: self.lookups_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub items_dispatched: u64,
    pub items_skipped: u64,
    pub items_failed: u64,
    pub lookups_failed: u64,
}
