//! Local batching for pull-style consumers.
//!
//! - `BatchStore<T>` - Fixed-capacity burst buffer with reset-on-drain
//! - `BatchAdapter` - Poll handler that fills a `BatchStore`
//! - `BatchedPoller<S>` - Drain local first, else refill once from upstream

pub mod store;
pub mod adapter;
pub mod poller;

pub use store::BatchStore;
pub use adapter::BatchAdapter;
pub use poller::BatchedPoller;

use std::sync::Arc;

use crate::constants::DEFAULT_BATCH_SIZE;
use crate::disruptor::{ EventPoller, PayloadSource, RingBuffer, RingBufferEntry };

/// Local batch sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    batch_size: usize,
}

impl BatchConfig {
    /// A `batch_size` of 0 falls back to `DEFAULT_BATCH_SIZE`.
    pub fn new(batch_size: usize) -> Self {
        let batch_size = if batch_size == 0 { DEFAULT_BATCH_SIZE } else { batch_size };
        Self { batch_size }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

/// Builder for easy batched poller creation
pub struct BatchedPollerBuilder<T: RingBufferEntry> {
    ring_buffer: Option<Arc<RingBuffer<T>>>,
    batch_size: usize,
}

impl<T: RingBufferEntry + PayloadSource> BatchedPollerBuilder<T> {
    pub fn new() -> Self {
        Self {
            ring_buffer: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_ring_buffer(mut self, rb: Arc<RingBuffer<T>>) -> Self {
        self.ring_buffer = Some(rb);
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn build(self) -> Result<BatchedPoller<EventPoller<T>>, &'static str> {
        let ring_buffer = self.ring_buffer.ok_or("Ring buffer required")?;
        Ok(BatchedPoller::new(&ring_buffer, self.batch_size))
    }
}

impl<T: RingBufferEntry + PayloadSource> Default for BatchedPollerBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disruptor::DataEvent;

    #[test]
    fn test_batch_config_clamps_zero() {
        assert_eq!(BatchConfig::new(0).batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(BatchConfig::new(1).batch_size(), 1);
        assert_eq!(BatchConfig::default().batch_size(), 20);
    }

    #[test]
    fn test_builder_requires_ring_buffer() {
        let result = BatchedPollerBuilder::<DataEvent<u8>>::new().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_creates_registered_poller() {
        let rb = Arc::new(RingBuffer::<DataEvent<u8>>::new(8).unwrap());
        let mut poller = BatchedPollerBuilder::new()
            .with_ring_buffer(rb.clone())
            .with_batch_size(4)
            .build()
            .unwrap();

        assert_eq!(poller.capacity(), 4);
        rb.try_publish_with(|e| e.set(3)).unwrap();
        assert_eq!(poller.poll().unwrap(), Some(3));
        assert_eq!(rb.minimum_gating_sequence(u64::MAX), 1);
    }
}
