use std::sync::atomic::{ AtomicU64, Ordering };

/// Cache-line padded cursor into the ring buffer.
///
/// The value counts positions: a consumer sequence of `n` means events
/// `0..n` have been consumed and `n` is the next one to read. Producers
/// read registered consumer sequences to decide how far they may wrap, so
/// each sequence sits on its own cache line to keep one consumer's progress
/// from invalidating another's.
#[repr(align(128))]
#[derive(Debug)]
pub struct Sequence {
    value: AtomicU64,
}

impl Sequence {
    pub fn new(initial: u64) -> Self {
        Self {
            value: AtomicU64::new(initial),
        }
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Release);
    }

    /// Relaxed load for the owning thread, which is the only writer.
    #[inline]
    pub fn get_relaxed(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn compare_exchange_weak(
        &self,
        current: u64,
        new: u64,
        success: Ordering,
        failure: Ordering
    ) -> std::result::Result<u64, u64> {
        self.value.compare_exchange_weak(current, new, success, failure)
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new(0)
    }
}
