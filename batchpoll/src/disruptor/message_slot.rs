//! 128-byte aligned byte-message slot with CRC32 checksum.
//!
//! The payload lives inline in the slot and is rewritten in place by the
//! next producer to claim it. Its `PayloadSource` copy is therefore an owned
//! `Vec<u8>`, never a slice into the slot.

use bytemuck::Zeroable;

use crate::disruptor::{ PayloadSource, RingBuffer, RingBufferEntry };
use crate::error::{ Result, BatchPollError };
use crate::constants::MAX_MESSAGE_DATA_SIZE;

/// 128-byte aligned to prevent false sharing (Apple Silicon has 128B cache lines).
#[repr(C, align(128))]
#[derive(Clone, Copy, Zeroable)]
pub struct MessageSlot {
    pub sequence: u64,
    pub data_len: u32,
    pub checksum: u32,
    pub data: [u8; MAX_MESSAGE_DATA_SIZE],
}

impl Default for MessageSlot {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl std::fmt::Debug for MessageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageSlot")
            .field("sequence", &self.sequence)
            .field("data_len", &self.data_len)
            .field("checksum", &self.checksum)
            .finish()
    }
}

impl MessageSlot {
    pub fn new(data: &[u8]) -> Result<Self> {
        let mut slot = Self::default();
        slot.set_data(data)?;
        Ok(slot)
    }

    /// Copy `data` into the slot. Data over `MAX_MESSAGE_DATA_SIZE` is
    /// rejected and the slot is left unchanged.
    pub fn set_data(&mut self, data: &[u8]) -> Result<()> {
        check_len(data)?;
        self.write(data);
        Ok(())
    }

    fn write(&mut self, data: &[u8]) {
        self.data_len = data.len() as u32;
        self.data[..data.len()].copy_from_slice(data);
        self.checksum = crc32fast::hash(data);
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..self.data_len as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.data_len == 0
    }

    pub fn verify_checksum(&self) -> bool {
        self.checksum == crc32fast::hash(self.data())
    }
}

fn check_len(data: &[u8]) -> Result<()> {
    if data.len() > MAX_MESSAGE_DATA_SIZE {
        return Err(
            BatchPollError::invalid_message(
                format!("Data too large: {} bytes (max: {})", data.len(), MAX_MESSAGE_DATA_SIZE)
            )
        );
    }
    Ok(())
}

impl RingBuffer<MessageSlot> {
    /// Publish `data` as one message.
    ///
    /// Oversized data fails with `InvalidMessage` before any slot is claimed.
    /// `Ok(None)` means the ring is full.
    pub fn try_publish_bytes(&self, data: &[u8]) -> Result<Option<u64>> {
        check_len(data)?;
        Ok(self.try_publish_with(|slot| slot.write(data)))
    }
}

impl RingBufferEntry for MessageSlot {
    fn sequence(&self) -> u64 {
        self.sequence
    }

    fn set_sequence(&mut self, seq: u64) {
        self.sequence = seq;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl PayloadSource for MessageSlot {
    type Payload = Vec<u8>;

    fn copy_payload(&self) -> Option<Vec<u8>> {
        if self.is_empty() {
            None
        } else {
            Some(self.data().to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment() {
        assert_eq!(std::mem::align_of::<MessageSlot>(), 128);
        assert_eq!(std::mem::size_of::<MessageSlot>(), 128);
    }

    #[test]
    fn test_creation() {
        let slot = MessageSlot::new(b"Hello").unwrap();
        assert_eq!(slot.data(), b"Hello");
        assert!(slot.verify_checksum());
    }

    #[test]
    fn test_too_large() {
        assert!(MessageSlot::new(&[0u8; MAX_MESSAGE_DATA_SIZE + 1]).is_err());
        assert!(MessageSlot::new(&[0u8; MAX_MESSAGE_DATA_SIZE]).is_ok());
    }

    #[test]
    fn test_set_data_rejects_oversized_without_truncating() {
        let mut slot = MessageSlot::new(b"keep").unwrap();
        let err = slot.set_data(&[1u8; 200]).unwrap_err();
        assert!(matches!(err, BatchPollError::InvalidMessage { .. }));
        assert_eq!(slot.data(), b"keep");
        assert!(slot.verify_checksum());
    }

    #[test]
    fn test_publish_bytes_rejects_before_claim() {
        let rb = RingBuffer::<MessageSlot>::new(4).unwrap();
        assert!(rb.try_publish_bytes(&[0u8; MAX_MESSAGE_DATA_SIZE + 1]).is_err());
        assert_eq!(rb.cursor(), 0);

        assert_eq!(rb.try_publish_bytes(b"ok").unwrap(), Some(0));
        assert_eq!(unsafe { rb.slot(0) }.data(), b"ok");
    }

    #[test]
    fn test_checksum_corruption() {
        let mut slot = MessageSlot::new(b"test").unwrap();
        slot.data[0] ^= 0xff;
        assert!(!slot.verify_checksum());
    }

    #[test]
    fn test_entry_trait() {
        let mut slot = MessageSlot::new(b"test").unwrap();
        slot.set_sequence(42);
        assert_eq!(slot.sequence(), 42);
        slot.reset();
        assert_eq!(slot.sequence(), 0);
        assert!(slot.is_empty());
    }

    #[test]
    fn test_copy_payload_owns_bytes() {
        let mut slot = MessageSlot::new(b"first").unwrap();
        let copy = slot.copy_payload().unwrap();
        slot.set_data(b"second").unwrap();
        assert_eq!(copy, b"first");
        assert_eq!(slot.data(), b"second");
    }

    #[test]
    fn test_empty_slot_has_no_payload() {
        assert!(MessageSlot::default().copy_payload().is_none());
    }
}
