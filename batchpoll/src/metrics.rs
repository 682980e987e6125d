//! Metrics for batched polling.
//!
//! Lightweight counters for observability

use std::sync::atomic::{ AtomicU64, Ordering };

/// Global metrics counters
pub struct Metrics {
    pub local_hits: AtomicU64,
    pub refills: AtomicU64,
    pub items_buffered: AtomicU64,
    pub empty_polls: AtomicU64,
    pub gated_polls: AtomicU64,
    pub skipped_payloads: AtomicU64,
    pub backpressure_events: AtomicU64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            local_hits: AtomicU64::new(0),
            refills: AtomicU64::new(0),
            items_buffered: AtomicU64::new(0),
            empty_polls: AtomicU64::new(0),
            gated_polls: AtomicU64::new(0),
            skipped_payloads: AtomicU64::new(0),
            backpressure_events: AtomicU64::new(0),
        }
    }

    /// Item served from the local batch without touching the ring buffer
    #[inline]
    pub fn record_local_hit(&self) {
        self.local_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_refill(&self, items: u64) {
        self.refills.fetch_add(1, Ordering::Relaxed);
        self.items_buffered.fetch_add(items, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_empty_poll(&self) {
        self.empty_polls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_gated_poll(&self) {
        self.gated_polls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_skipped_payload(&self) {
        self.skipped_payloads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_backpressure(&self) {
        self.backpressure_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            local_hits: self.local_hits.load(Ordering::Relaxed),
            refills: self.refills.load(Ordering::Relaxed),
            items_buffered: self.items_buffered.load(Ordering::Relaxed),
            empty_polls: self.empty_polls.load(Ordering::Relaxed),
            gated_polls: self.gated_polls.load(Ordering::Relaxed),
            skipped_payloads: self.skipped_payloads.load(Ordering::Relaxed),
            backpressure_events: self.backpressure_events.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.local_hits.store(0, Ordering::Relaxed);
        self.refills.store(0, Ordering::Relaxed);
        self.items_buffered.store(0, Ordering::Relaxed);
        self.empty_polls.store(0, Ordering::Relaxed);
        self.gated_polls.store(0, Ordering::Relaxed);
        self.skipped_payloads.store(0, Ordering::Relaxed);
        self.backpressure_events.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub local_hits: u64,
    pub refills: u64,
    pub items_buffered: u64,
    pub empty_polls: u64,
    pub gated_polls: u64,
    pub skipped_payloads: u64,
    pub backpressure_events: u64,
}

impl MetricsSnapshot {
    /// Average items pulled per upstream refill
    pub fn mean_batch(&self) -> f64 {
        if self.refills == 0 {
            0.0
        } else {
            self.items_buffered as f64 / self.refills as f64
        }
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hits={} refills={} buffered={} mean_batch={:.1} empty={} gated={} skipped={} backpressure={}",
            self.local_hits,
            self.refills,
            self.items_buffered,
            self.mean_batch(),
            self.empty_polls,
            self.gated_polls,
            self.skipped_payloads,
            self.backpressure_events
        )
    }
}

/// Global metrics instance
pub static METRICS: Metrics = Metrics::new();
