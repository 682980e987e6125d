//! Ordering verification for multi-producer runs.
//!
//! Producers tag every value with their id in the top 16 bits and a
//! per-producer counter in the rest. With a single consumer each producer's
//! counter must arrive as 0, 1, 2, ... with no gaps or repeats, however the
//! producers interleave.

const PRODUCER_SHIFT: u32 = 48;
const SEQUENCE_MASK: u64 = (1 << PRODUCER_SHIFT) - 1;

/// Tag `sequence` with `producer`.
pub fn encode(producer: usize, sequence: u64) -> u64 {
    ((producer as u64) << PRODUCER_SHIFT) | (sequence & SEQUENCE_MASK)
}

pub fn decode(value: u64) -> (usize, u64) {
    ((value >> PRODUCER_SHIFT) as usize, value & SEQUENCE_MASK)
}

#[derive(Debug, Clone)]
pub struct SequenceChecker {
    next: Vec<u64>,
    received: u64,
    errors: u64,
}

impl SequenceChecker {
    pub fn new(producers: usize) -> Self {
        Self {
            next: vec![0; producers],
            received: 0,
            errors: 0,
        }
    }

    /// Check one received value. Returns false on an unknown producer or an
    /// out-of-order sequence; the checker resyncs to the value it saw.
    pub fn check(&mut self, value: u64) -> bool {
        self.received += 1;
        let (producer, sequence) = decode(value);
        let Some(next) = self.next.get_mut(producer) else {
            self.errors += 1;
            return false;
        };
        let in_order = sequence == *next;
        if !in_order {
            self.errors += 1;
        }
        *next = sequence + 1;
        in_order
    }

    /// Next sequence expected from `producer`, i.e. how many it has delivered.
    pub fn expected_next(&self, producer: usize) -> Option<u64> {
        self.next.get(producer).copied()
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// True when every producer delivered exactly `sent[i]` values in order.
    pub fn is_complete(&self, sent: &[u64]) -> bool {
        self.errors == 0 && self.next.as_slice() == sent
    }
}
