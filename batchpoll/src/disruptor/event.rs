//! Generic slot type and the defensive-copy contract.
//!
//! Slots are owned by the ring buffer and overwritten on the next lap, so a
//! consumer that keeps data beyond one handler call must copy it out.
//! `PayloadSource::copy_payload` is that copy.

use crate::disruptor::RingBufferEntry;

/// Something a handler can copy an owned payload out of.
pub trait PayloadSource {
    type Payload;

    /// Owned copy of the slot's payload, or `None` if the slot holds nothing.
    ///
    /// The result must not borrow from the slot.
    fn copy_payload(&self) -> Option<Self::Payload>;
}

/// Ring buffer slot carrying an optional value.
#[derive(Debug, Clone)]
pub struct DataEvent<P> {
    sequence: u64,
    data: Option<P>,
}

impl<P> Default for DataEvent<P> {
    fn default() -> Self {
        Self { sequence: 0, data: None }
    }
}

impl<P> DataEvent<P> {
    pub fn set(&mut self, data: P) {
        self.data = Some(data);
    }

    pub fn clear(&mut self) {
        self.data = None;
    }

    pub fn get(&self) -> Option<&P> {
        self.data.as_ref()
    }
}

impl<P: Send + Sync + 'static> RingBufferEntry for DataEvent<P> {
    fn sequence(&self) -> u64 {
        self.sequence
    }

    fn set_sequence(&mut self, seq: u64) {
        self.sequence = seq;
    }

    fn reset(&mut self) {
        self.sequence = 0;
        self.data = None;
    }
}

impl<P: Clone> PayloadSource for DataEvent<P> {
    type Payload = P;

    fn copy_payload(&self) -> Option<P> {
        self.data.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_is_independent_of_slot() {
        let mut event = DataEvent::default();
        event.set(String::from("hello"));

        let copy = event.copy_payload().unwrap();
        event.set(String::from("overwritten"));

        assert_eq!(copy, "hello");
        assert_eq!(event.get().map(String::as_str), Some("overwritten"));
    }

    #[test]
    fn test_empty_slot_copies_to_none() {
        let mut event = DataEvent::<u32>::default();
        assert!(event.copy_payload().is_none());

        event.set(1);
        event.clear();
        assert!(event.copy_payload().is_none());
    }

    #[test]
    fn test_reset_clears_payload_and_sequence() {
        let mut event = DataEvent::default();
        event.set(5u64);
        event.set_sequence(9);
        event.reset();
        assert_eq!(event.sequence(), 0);
        assert!(event.get().is_none());
    }
}
