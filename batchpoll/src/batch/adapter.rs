//! Poll handler that copies events into a `BatchStore`.

use crate::batch::BatchStore;
use crate::disruptor::{ PayloadSource, PollHandler };
use crate::error::Result;
use crate::insights;
use crate::metrics::{ Metrics, METRICS };

/// Bound to one store for the length of a single upstream `poll` call.
pub struct BatchAdapter<'a, T> {
    store: &'a mut BatchStore<T>,
    metrics: &'a Metrics,
}

impl<'a, T> BatchAdapter<'a, T> {
    pub fn new(store: &'a mut BatchStore<T>) -> Self {
        Self { store, metrics: &METRICS }
    }

    pub fn with_metrics(mut self, metrics: &'a Metrics) -> Self {
        self.metrics = metrics;
        self
    }
}

impl<E> PollHandler<E> for BatchAdapter<'_, E::Payload> where E: PayloadSource {
    fn on_event(&mut self, event: &E, sequence: u64, _end_of_batch: bool) -> Result<bool> {
        match event.copy_payload() {
            Some(item) => self.store.add_item(item),
            None => {
                // Empty slot: skip it and keep scanning
                self.metrics.record_skipped_payload();
                insights::record_skipped_payload(sequence);
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disruptor::DataEvent;

    fn event(value: Option<u32>) -> DataEvent<u32> {
        let mut event = DataEvent::default();
        if let Some(v) = value {
            event.set(v);
        }
        event
    }

    #[test]
    fn test_appends_copies_and_reports_room() {
        let mut store = BatchStore::new(2);
        let mut adapter = BatchAdapter::new(&mut store);

        assert!(adapter.on_event(&event(Some(1)), 0, false).unwrap());
        assert!(!adapter.on_event(&event(Some(2)), 1, true).unwrap());

        assert_eq!(store.poll_message(), Some(1));
        assert_eq!(store.poll_message(), Some(2));
    }

    #[test]
    fn test_skips_empty_payload_and_continues() {
        let mut store = BatchStore::new(1);
        let mut adapter = BatchAdapter::new(&mut store);

        assert!(adapter.on_event(&event(None), 0, false).unwrap());
        assert!(!adapter.on_event(&event(Some(9)), 1, true).unwrap());

        assert_eq!(store.pending(), 1);
        assert_eq!(store.poll_message(), Some(9));
    }

    #[test]
    fn test_skips_are_counted_on_given_metrics() {
        let metrics = Metrics::new();
        let mut store = BatchStore::<u32>::new(2);
        let mut adapter = BatchAdapter::new(&mut store).with_metrics(&metrics);

        adapter.on_event(&event(None), 0, false).unwrap();
        adapter.on_event(&event(None), 1, true).unwrap();
        assert_eq!(metrics.snapshot().skipped_payloads, 2);
    }

    #[test]
    fn test_event_after_full_signal_is_error() {
        let mut store = BatchStore::new(1);
        let mut adapter = BatchAdapter::new(&mut store);

        assert!(!adapter.on_event(&event(Some(1)), 0, false).unwrap());
        assert!(adapter.on_event(&event(Some(2)), 1, false).is_err());
    }
}
