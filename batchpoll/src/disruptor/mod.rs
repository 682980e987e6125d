//! Ring buffer side of the poll contract (LMAX Disruptor pattern).
//!
//! - `Sequence` - Padded cursor; consumers register theirs as gating sequences
//! - `RingBuffer<T>` - Multi-producer claim/publish over preallocated slots
//! - `EventPoller<T>` - Non-blocking pull cursor driving a `PollHandler`
//! - `DataEvent<P>` / `MessageSlot` - Slot types exposing a `PayloadSource`

pub mod sequence;
pub mod ring_buffer;
pub mod poller;
pub mod event;
pub mod message_slot;

pub use sequence::Sequence;
pub use ring_buffer::RingBuffer;
pub use poller::{ EventPoller, PollHandler, PollSource, PollState, PollerFactory };
pub use event::{ DataEvent, PayloadSource };
pub use message_slot::MessageSlot;

use crate::error::{ Result, BatchPollError };
use crate::constants::DEFAULT_RING_BUFFER_SIZE;

/// Trait for objects that can be stored in the ring buffer
pub trait RingBufferEntry: Default + Send + Sync + 'static {
    /// Get the sequence number of this entry
    fn sequence(&self) -> u64;

    /// Set the sequence number of this entry
    fn set_sequence(&mut self, seq: u64);

    /// Reset the entry to its default state
    fn reset(&mut self);
}

/// Configuration for ring buffer behavior
#[derive(Debug, Clone)]
pub struct RingBufferConfig {
    /// Size of the ring buffer (must be power of 2)
    pub size: usize,
}

impl Default for RingBufferConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_RING_BUFFER_SIZE,
        }
    }
}

impl RingBufferConfig {
    /// Create a new configuration with the specified size
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(BatchPollError::config("Ring buffer size must be greater than 0"));
        }
        if !size.is_power_of_two() {
            return Err(BatchPollError::config("Ring buffer size must be power of 2"));
        }

        Ok(Self { size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_config_creation() {
        let config = RingBufferConfig::new(1024).unwrap();
        assert_eq!(config.size, 1024);
    }

    #[test]
    fn test_ring_buffer_config_invalid_size() {
        assert!(RingBufferConfig::new(0).is_err());
        assert!(RingBufferConfig::new(1023).is_err()); // Not power of 2
    }

    #[test]
    fn test_ring_buffer_config_default() {
        let config = RingBufferConfig::default();
        assert_eq!(config.size, DEFAULT_RING_BUFFER_SIZE);
    }
}
