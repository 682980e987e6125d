//! Batchpoll Constants
//!
//! Defaults shared by the ring buffer and the batched poller.

/// Local batch capacity used when a caller asks for a zero-sized batch
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Default ring buffer size (must be power of 2)
pub const DEFAULT_RING_BUFFER_SIZE: usize = 64 * 1024; // 64K slots

/// Maximum inline payload for a single message slot (128B slot minus header)
pub const MAX_MESSAGE_DATA_SIZE: usize = 112;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_sizes_are_powers_of_two() {
        assert!(DEFAULT_RING_BUFFER_SIZE.is_power_of_two());
    }
}
