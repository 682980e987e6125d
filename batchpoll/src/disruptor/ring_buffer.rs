//! Multi-producer ring buffer with registered gating sequences.
//!
//! ## Memory Ordering (Sequence Barrier Pattern)
//!
//! - **claim_cursor**: CAS-based claiming, tells producers where to write
//! - **available[]**: Per-slot bits flipped on publish, one round parity per wrap
//! - **gating**: Consumer sequences; a producer may not claim past
//!   `min(gating) + size`, so unread slots are never overwritten
//!
//! With no gating sequence registered producers are unbounded and will lap
//! any consumer. Register a poller's sequence before it polls.

use std::cell::UnsafeCell;
use std::sync::atomic::{ AtomicU64, Ordering };
use std::sync::Arc;

use parking_lot::RwLock;

use crate::disruptor::{ RingBufferConfig, RingBufferEntry, Sequence, EventPoller };
use crate::error::Result;
use crate::insights;
use crate::metrics::METRICS;

pub struct RingBuffer<T: RingBufferEntry> {
    buffer: Box<[UnsafeCell<T>]>,
    mask: usize,
    index_shift: u32,
    claim_cursor: Sequence,
    /// Bitfield tracking published slots. Each AtomicU64 tracks 64 slots.
    /// Bits encode even/odd rounds via XOR flipping (LMAX Disruptor technique)
    available: Box<[AtomicU64]>,
    gating: RwLock<Vec<Arc<Sequence>>>,
}

impl<T: RingBufferEntry> RingBuffer<T> {
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self::with_config(RingBufferConfig::new(size)?))
    }

    pub fn with_config(config: RingBufferConfig) -> Self {
        let size = config.size;
        let buffer = (0..size)
            .map(|_| UnsafeCell::new(T::default()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        // Initialize with all 1s (nothing published yet, round 0 is even)
        let available = (0..size.div_ceil(64))
            .map(|_| AtomicU64::new(!0))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            buffer,
            mask: size - 1,
            index_shift: size.trailing_zeros(),
            claim_cursor: Sequence::new(0),
            available,
            gating: RwLock::new(Vec::new()),
        }
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Number of positions claimed by producers so far.
    pub fn cursor(&self) -> u64 {
        self.claim_cursor.get()
    }

    /// Register consumer sequences that producers must not lap.
    pub fn add_gating_sequences(&self, sequences: &[Arc<Sequence>]) {
        self.gating.write().extend(sequences.iter().cloned());
    }

    /// Unregister a consumer sequence. Returns false if it was not registered.
    pub fn remove_gating_sequence(&self, sequence: &Arc<Sequence>) -> bool {
        let mut gating = self.gating.write();
        let before = gating.len();
        gating.retain(|s| !Arc::ptr_eq(s, sequence));
        gating.len() != before
    }

    /// Slowest registered consumer, or `default` when none is registered.
    pub fn minimum_gating_sequence(&self, default: u64) -> u64 {
        self.gating
            .read()
            .iter()
            .map(|s| s.get())
            .min()
            .unwrap_or(default)
    }

    /// Create a poller starting at the current cursor.
    ///
    /// The poller's sequence is registered as a gating sequence before this
    /// returns and unregistered when the poller is dropped, so producers can
    /// never lap a slot it may still read.
    ///
    /// `dependents` are sequences of upstream consumers this poller must not
    /// overtake; empty means it only waits on producers.
    pub fn new_poller(self: &Arc<Self>, dependents: &[Arc<Sequence>]) -> EventPoller<T> {
        let sequence = Arc::new(Sequence::new(self.cursor()));
        self.gating.write().push(sequence.clone());
        // Claims that missed the registration all start at or before this
        // cursor and span at most `size`, so none can reach a slot we read
        sequence.set(self.cursor());
        EventPoller::new(Arc::clone(self), sequence, dependents.to_vec())
    }

    /// Try to claim `count` slots. Returns the first claimed sequence.
    pub fn try_claim(&self, count: usize) -> Option<u64> {
        if count == 0 {
            return None;
        }
        let size = self.buffer.len() as u64;

        loop {
            let current = self.claim_cursor.get_relaxed();
            let next = current + (count as u64);
            let min_gating = self.minimum_gating_sequence(current);

            if next.saturating_sub(min_gating) > size {
                METRICS.record_backpressure();
                insights::record_backpressure();
                return None;
            }

            match
                self.claim_cursor.compare_exchange_weak(
                    current,
                    next,
                    Ordering::AcqRel,
                    Ordering::Relaxed
                )
            {
                Ok(_) => {
                    return Some(current);
                }
                Err(_) => std::hint::spin_loop(),
            }
        }
    }

    /// Publish single event with in-place mutation.
    /// Returns the sequence number, or None if full.
    pub fn try_publish_with<F>(&self, update: F) -> Option<u64> where F: FnOnce(&mut T) {
        let seq = self.try_claim(1)?;
        // SAFETY: seq was claimed by this call and is not yet published
        let slot = unsafe { self.slot_mut(seq) };
        slot.reset();
        update(slot);
        slot.set_sequence(seq);
        self.publish(seq);
        Some(seq)
    }

    /// Publish batch with in-place mutation.
    /// Returns (start_sequence, count), or None if not enough space.
    pub fn try_publish_batch_with<F>(&self, count: usize, mut update: F) -> Option<(u64, usize)>
        where F: FnMut(&mut T, u64)
    {
        if count == 0 {
            return Some((self.cursor(), 0));
        }
        let start = self.try_claim(count)?;
        for i in 0..count {
            let seq = start + (i as u64);
            // SAFETY: the whole range was claimed by this call
            let slot = unsafe { self.slot_mut(seq) };
            slot.reset();
            update(slot, seq);
            slot.set_sequence(seq);
            self.publish(seq);
        }
        Some((start, count))
    }

    /// Publish a sequence - flips the bit to mark as published
    pub fn publish(&self, sequence: u64) {
        let (avail_idx, bit_idx) = self.calculate_indices(sequence);
        // XOR flips the bit - encoding even/odd round publication
        self.available[avail_idx].fetch_xor(1u64 << bit_idx, Ordering::Release);
    }

    pub fn is_published(&self, sequence: u64) -> bool {
        let (avail_idx, bit_idx) = self.calculate_indices(sequence);
        let bits = self.available[avail_idx].load(Ordering::Acquire);
        ((bits >> bit_idx) & 1) == self.calculate_flag(sequence)
    }

    /// First unpublished position in `[lower, upper)`, or `upper` if the whole
    /// range is published.
    pub fn highest_published(&self, lower: u64, upper: u64) -> u64 {
        (lower..upper).find(|&seq| !self.is_published(seq)).unwrap_or(upper)
    }

    /// # Safety: slot must be published and not yet released by the reader's gating sequence
    pub(crate) unsafe fn slot(&self, sequence: u64) -> &T {
        &*self.buffer[(sequence as usize) & self.mask].get()
    }

    /// # Safety: caller must hold the claim for `sequence` and not have published it
    #[allow(clippy::mut_from_ref)]
    unsafe fn slot_mut(&self, sequence: u64) -> &mut T {
        &mut *self.buffer[(sequence as usize) & self.mask].get()
    }

    fn calculate_indices(&self, sequence: u64) -> (usize, usize) {
        let slot_index = (sequence as usize) & self.mask;
        (slot_index >> 6, slot_index & 63)
    }

    /// Even (0) or odd (1) round
    fn calculate_flag(&self, sequence: u64) -> u64 {
        (sequence >> self.index_shift) & 1
    }
}

unsafe impl<T: RingBufferEntry> Send for RingBuffer<T> {}
unsafe impl<T: RingBufferEntry> Sync for RingBuffer<T> {}
