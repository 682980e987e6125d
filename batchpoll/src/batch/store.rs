//! Fixed-capacity local batch with a fill bound and a drain cursor.
//!
//! A burst of items is appended from one upstream poll, then drained one at
//! a time. When the drain cursor catches up with the fill bound both reset
//! to zero, so the same storage is reused for the next burst without
//! reallocating or shifting.

use crate::error::{ Result, BatchPollError };
use crate::insights;

pub struct BatchStore<T> {
    slots: Box<[Option<T>]>,
    fill_bound: usize,
    drain_cursor: usize,
}

impl<T> BatchStore<T> {
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "batch capacity must be greater than 0");
        Self {
            slots: (0..capacity).map(|_| None).collect::<Vec<_>>().into_boxed_slice(),
            fill_bound: 0,
            drain_cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots written since the last reset.
    pub fn fill_bound(&self) -> usize {
        self.fill_bound
    }

    /// Slots drained since the last reset.
    pub fn drain_cursor(&self) -> usize {
        self.drain_cursor
    }

    /// Items appended but not yet drained.
    pub fn pending(&self) -> usize {
        self.fill_bound - self.drain_cursor
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Append an item.
    ///
    /// Returns `Ok(true)` while there is room for another item and `Ok(false)`
    /// on the append that fills the store. Appending to a full store is a
    /// protocol violation and fails with `CapacityExceeded`.
    pub fn add_item(&mut self, item: T) -> Result<bool> {
        let capacity = self.capacity();
        if self.fill_bound >= capacity {
            insights::record_capacity_violation(capacity);
            return Err(BatchPollError::capacity_exceeded(capacity));
        }
        self.slots[self.fill_bound] = Some(item);
        self.fill_bound += 1;
        Ok(self.fill_bound < capacity)
    }

    /// Take the next item, resetting both cursors once the store is drained.
    pub fn poll_message(&mut self) -> Option<T> {
        let item = if self.drain_cursor < self.fill_bound {
            let item = self.slots[self.drain_cursor].take();
            self.drain_cursor += 1;
            item
        } else {
            None
        };

        if self.drain_cursor > 0 && self.drain_cursor >= self.fill_bound {
            self.fill_bound = 0;
            self.drain_cursor = 0;
        }
        item
    }
}

impl<T> std::fmt::Debug for BatchStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchStore")
            .field("capacity", &self.capacity())
            .field("fill_bound", &self.fill_bound)
            .field("drain_cursor", &self.drain_cursor)
            .finish()
    }
}
