//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use contracts::DispatchSummary;

/// Cumulative metrics for one Dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Workers currently holding a run slot
    active_workers: AtomicUsize,
    /// Total dispatch calls
    dispatch_count: AtomicU64,
    /// Total workers spawned
    worker_count: AtomicU64,
    /// Total notifications sent
    sent_count: AtomicU64,
    /// Total notifications failed (excluding cancellation)
    failure_count: AtomicU64,
    /// Total recipients cancelled
    cancelled_count: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current active worker count
    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::Relaxed)
    }

    pub(crate) fn worker_started(&self) {
        self.active_workers.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn worker_stopped(&self) {
        self.active_workers.fetch_sub(1, Ordering::Relaxed);
    }

    /// Get total dispatch calls
    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count.load(Ordering::Relaxed)
    }

    /// Get total workers spawned
    pub fn worker_count(&self) -> u64 {
        self.worker_count.load(Ordering::Relaxed)
    }

    /// Get total sent count
    pub fn sent_count(&self) -> u64 {
        self.sent_count.load(Ordering::Relaxed)
    }

    /// Get total failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Get total cancelled count
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled_count.load(Ordering::Relaxed)
    }

    /// Fold a finished dispatch into the totals
    pub(crate) fn record(&self, summary: &DispatchSummary) {
        self.dispatch_count.fetch_add(1, Ordering::Relaxed);
        self.worker_count
            .fetch_add(summary.workers as u64, Ordering::Relaxed);
        self.sent_count
            .fetch_add(summary.sent as u64, Ordering::Relaxed);
        self.failure_count
            .fetch_add(summary.failed as u64, Ordering::Relaxed);
        self.cancelled_count
            .fetch_add(summary.cancelled as u64, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            active_workers: self.active_workers(),
            dispatch_count: self.dispatch_count(),
            worker_count: self.worker_count(),
            sent_count: self.sent_count(),
            failure_count: self.failure_count(),
            cancelled_count: self.cancelled_count(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub active_workers: usize,
    pub dispatch_count: u64,
    pub worker_count: u64,
    pub sent_count: u64,
    pub failure_count: u64,
    pub cancelled_count: u64,
}
