//! Non-blocking pull cursor over a `RingBuffer` (LMAX `EventPoller` style).
//!
//! `poll` never waits: it hands every event that is already published to the
//! handler, stops early when the handler returns `false`, and reports what it
//! found as a `PollState`.

use std::sync::Arc;

use crate::disruptor::{ RingBuffer, RingBufferEntry, Sequence };
use crate::error::Result;

/// Outcome of one `poll` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// At least one event was delivered.
    Processing,
    /// Events exist past this poller but a dependent sequence has not reached them.
    Gating,
    /// Nothing new was available.
    Idle,
}

/// Callback driven by `poll` for each available event, in publish order.
///
/// Return `Ok(true)` to keep receiving events in this call, `Ok(false)` to
/// stop. An error stops the call and is returned from `poll` as-is.
pub trait PollHandler<E> {
    fn on_event(&mut self, event: &E, sequence: u64, end_of_batch: bool) -> Result<bool>;
}

impl<E, F> PollHandler<E> for F where F: FnMut(&E, u64, bool) -> Result<bool> {
    fn on_event(&mut self, event: &E, sequence: u64, end_of_batch: bool) -> Result<bool> {
        self(event, sequence, end_of_batch)
    }
}

/// Anything that can be polled with a `PollHandler`.
pub trait PollSource {
    type Event;

    fn poll<H: PollHandler<Self::Event>>(&mut self, handler: &mut H) -> Result<PollState>;

    /// Read position of this poller; producers gate on it once registered.
    fn sequence(&self) -> Arc<Sequence>;
}

/// Hands out pollers whose sequences already gate the producers.
pub trait PollerFactory {
    type Poller: PollSource;

    fn new_poller(&self) -> Self::Poller;
}

/// Single-consumer poller bound to one ring buffer.
///
/// Its sequence stays registered as a gating sequence for as long as the
/// poller lives.
pub struct EventPoller<T: RingBufferEntry> {
    ring_buffer: Arc<RingBuffer<T>>,
    sequence: Arc<Sequence>,
    dependents: Vec<Arc<Sequence>>,
}

impl<T: RingBufferEntry> EventPoller<T> {
    pub(crate) fn new(
        ring_buffer: Arc<RingBuffer<T>>,
        sequence: Arc<Sequence>,
        dependents: Vec<Arc<Sequence>>
    ) -> Self {
        Self {
            ring_buffer,
            sequence,
            dependents,
        }
    }

    pub fn sequence(&self) -> Arc<Sequence> {
        self.sequence.clone()
    }

    /// Highest position this poller may read up to (exclusive).
    fn bound(&self) -> u64 {
        let cursor = self.ring_buffer.cursor();
        self.dependents
            .iter()
            .map(|s| s.get())
            .min()
            .map_or(cursor, |min| min.min(cursor))
    }

    pub fn poll<H: PollHandler<T>>(&mut self, handler: &mut H) -> Result<PollState> {
        let next = self.sequence.get_relaxed();
        let available = self.ring_buffer.highest_published(next, self.bound());

        if next < available {
            let mut sequence = next;
            let outcome = loop {
                // SAFETY: sequence < available, so it is published, and our
                // sequence (registered by new_poller until drop) still sits
                // at or before it
                let event = unsafe { self.ring_buffer.slot(sequence) };
                match handler.on_event(event, sequence, sequence + 1 == available) {
                    Ok(more) => {
                        sequence += 1;
                        if !more || sequence == available {
                            break Ok(PollState::Processing);
                        }
                    }
                    Err(e) => {
                        break Err(e);
                    }
                }
            };
            // Release only what the handler finished with
            self.sequence.set(sequence);
            outcome
        } else if self.ring_buffer.cursor() > next {
            Ok(PollState::Gating)
        } else {
            Ok(PollState::Idle)
        }
    }
}

impl<T: RingBufferEntry> Drop for EventPoller<T> {
    fn drop(&mut self) {
        self.ring_buffer.remove_gating_sequence(&self.sequence);
    }
}

impl<T: RingBufferEntry> PollSource for EventPoller<T> {
    type Event = T;

    fn poll<H: PollHandler<T>>(&mut self, handler: &mut H) -> Result<PollState> {
        EventPoller::poll(self, handler)
    }

    fn sequence(&self) -> Arc<Sequence> {
        EventPoller::sequence(self)
    }
}

impl<T: RingBufferEntry> PollerFactory for Arc<RingBuffer<T>> {
    type Poller = EventPoller<T>;

    fn new_poller(&self) -> EventPoller<T> {
        RingBuffer::new_poller(self, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disruptor::DataEvent;
    use crate::error::BatchPollError;

    fn ring(size: usize) -> Arc<RingBuffer<DataEvent<u64>>> {
        Arc::new(RingBuffer::new(size).unwrap())
    }

    fn handler<F>(f: F) -> F where F: FnMut(&DataEvent<u64>, u64, bool) -> Result<bool> {
        f
    }

    #[test]
    fn test_idle_when_nothing_published() {
        let rb = ring(8);
        let mut poller = rb.new_poller(&[]);
        let state = poller.poll(&mut handler(|_, _, _| Ok(true))).unwrap();
        assert_eq!(state, PollState::Idle);
    }

    #[test]
    fn test_delivers_in_order_with_end_of_batch() {
        let rb = ring(8);
        let mut poller = rb.new_poller(&[]);
        rb.try_publish_batch_with(3, |e, seq| e.set(seq * 10)).unwrap();

        let mut seen = vec![];
        let state = poller
            .poll(
                &mut handler(|e, seq, end| {
                    seen.push((*e.get().unwrap(), seq, end));
                    Ok(true)
                })
            )
            .unwrap();

        assert_eq!(state, PollState::Processing);
        assert_eq!(seen, vec![(0, 0, false), (10, 1, false), (20, 2, true)]);
        assert_eq!(poller.sequence().get(), 3);
    }

    #[test]
    fn test_handler_can_stop_early() {
        let rb = ring(8);
        let mut poller = rb.new_poller(&[]);
        rb.try_publish_batch_with(5, |e, seq| e.set(seq)).unwrap();

        let mut count = 0;
        poller
            .poll(
                &mut handler(|_, _, _| {
                    count += 1;
                    Ok(count < 2)
                })
            )
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(poller.sequence().get(), 2);
    }

    #[test]
    fn test_gating_behind_dependent() {
        let rb = ring(8);
        let upstream = Arc::new(Sequence::new(0));
        let mut poller = rb.new_poller(&[upstream.clone()]);
        rb.try_publish_batch_with(2, |e, seq| e.set(seq)).unwrap();

        let state = poller.poll(&mut handler(|_, _, _| Ok(true))).unwrap();
        assert_eq!(state, PollState::Gating);

        upstream.set(1);
        let mut seen = vec![];
        let state = poller
            .poll(
                &mut handler(|_, seq, _| {
                    seen.push(seq);
                    Ok(true)
                })
            )
            .unwrap();
        assert_eq!(state, PollState::Processing);
        assert_eq!(seen, vec![0]);
    }

    #[test]
    fn test_gating_on_claimed_but_unpublished() {
        let rb = ring(8);
        let mut poller = rb.new_poller(&[]);
        rb.try_claim(1).unwrap();
        let state = poller.poll(&mut handler(|_, _, _| Ok(true))).unwrap();
        assert_eq!(state, PollState::Gating);
    }

    #[test]
    fn test_handler_error_propagates_and_keeps_position() {
        let rb = ring(8);
        let mut poller = rb.new_poller(&[]);
        rb.try_publish_batch_with(3, |e, seq| e.set(seq)).unwrap();

        let result = poller.poll(
            &mut handler(|_, seq, _| {
                if seq == 1 { Err(BatchPollError::unexpected("handler failed")) } else { Ok(true) }
            })
        );

        assert!(matches!(result, Err(BatchPollError::Unexpected { .. })));
        // Event 0 was handled, event 1 was not
        assert_eq!(poller.sequence().get(), 1);
    }

    #[test]
    fn test_new_poller_starts_at_cursor() {
        let rb = ring(8);
        rb.try_publish_batch_with(3, |e, seq| e.set(seq)).unwrap();
        let mut poller = rb.new_poller(&[]);
        assert_eq!(poller.sequence().get(), 3);
        let state = poller.poll(&mut handler(|_, _, _| Ok(true))).unwrap();
        assert_eq!(state, PollState::Idle);
    }
}
