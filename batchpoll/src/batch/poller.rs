//! Pull-style consumer that amortizes upstream polls over a local batch.
//!
//! `poll` serves from the local `BatchStore` while it has items. Only when
//! it is empty does it make one upstream `poll`, copying every available
//! event (up to capacity) into the store, then serves the first of them.

use std::sync::Arc;

use crate::batch::{ BatchAdapter, BatchConfig, BatchStore };
use crate::disruptor::{ PayloadSource, PollSource, PollState, PollerFactory, Sequence };
use crate::error::Result;
use crate::insights;
use crate::metrics::{ Metrics, METRICS };

type Payload<S> = <<S as PollSource>::Event as PayloadSource>::Payload;

/// Single-consumer batched poller. Not thread-safe by design of its API:
/// every operation takes `&mut self`.
pub struct BatchedPoller<S> where S: PollSource, S::Event: PayloadSource {
    poller: S,
    store: BatchStore<Payload<S>>,
    metrics: &'static Metrics,
}

impl<S> BatchedPoller<S> where S: PollSource, S::Event: PayloadSource {
    /// Take a fresh poller from `ring`. Its sequence gates the producers
    /// from the moment it is handed out, before any poll can run.
    ///
    /// A `batch_size` of 0 falls back to `DEFAULT_BATCH_SIZE`.
    pub fn new<F>(ring: &F, batch_size: usize) -> Self where F: PollerFactory<Poller = S> {
        Self::from_source(ring.new_poller(), batch_size)
    }

    /// Wrap an existing poller, e.g. one created with dependents via
    /// `RingBuffer::new_poller`.
    pub fn from_source(poller: S, batch_size: usize) -> Self {
        let config = BatchConfig::new(batch_size);
        Self {
            poller,
            store: BatchStore::new(config.batch_size()),
            metrics: &METRICS,
        }
    }

    /// Record into `metrics` instead of the global `METRICS`.
    pub fn with_metrics(mut self, metrics: &'static Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Next item, or `None` if nothing is buffered and upstream had nothing
    /// ready. Never blocks; makes at most one upstream call.
    pub fn poll(&mut self) -> Result<Option<Payload<S>>> {
        let metrics = self.metrics;
        if !self.store.is_empty() {
            metrics.record_local_hit();
            return Ok(self.store.poll_message());
        }

        let mut adapter = BatchAdapter::new(&mut self.store).with_metrics(metrics);
        let state = self.poller.poll(&mut adapter)?;
        let buffered = self.store.pending();
        match state {
            PollState::Processing if buffered > 0 => {
                metrics.record_refill(buffered as u64);
                insights::record_refill(buffered);
            }
            PollState::Gating => {
                metrics.record_gated_poll();
                insights::record_empty_poll(state);
            }
            // Processing with every payload skipped buffers nothing either
            PollState::Processing | PollState::Idle => {
                metrics.record_empty_poll();
                insights::record_empty_poll(state);
            }
        }

        Ok(self.store.poll_message())
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Items buffered locally and not yet returned.
    pub fn pending(&self) -> usize {
        self.store.pending()
    }

    /// Read position of the upstream poller.
    pub fn sequence(&self) -> Arc<Sequence> {
        self.poller.sequence()
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &BatchStore<Payload<S>> {
        &self.store
    }
}
