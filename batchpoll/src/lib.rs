//! Batchpoll - Bounded local batching for pull-style ring buffer consumers
//!
//! Polling a disruptor ring buffer costs sequence reads, gating checks and
//! memory barriers per call. `BatchedPoller` pays that once per burst: it
//! copies every event already published (up to its batch size) into a local
//! store in a single upstream poll, then hands them out one by one.
//!
//! ```
//! use std::sync::Arc;
//! use batchpoll::{ BatchedPoller, DataEvent, RingBuffer };
//!
//! let ring = Arc::new(RingBuffer::<DataEvent<u64>>::new(1024).unwrap());
//! let mut poller = BatchedPoller::new(&ring, 20);
//!
//! for i in 0..3u64 {
//!     ring.try_publish_with(|event| event.set(i)).unwrap();
//! }
//!
//! assert_eq!(poller.poll().unwrap(), Some(0));
//! assert_eq!(poller.poll().unwrap(), Some(1));
//! assert_eq!(poller.poll().unwrap(), Some(2));
//! assert_eq!(poller.poll().unwrap(), None);
//! ```

pub mod batch;
pub mod constants;
pub mod disruptor;
pub mod error;
pub mod idle;
pub mod insights;
pub mod metrics;

// Re-export main components
pub use batch::{ BatchConfig, BatchStore, BatchedPoller, BatchedPollerBuilder };
pub use disruptor::{
    DataEvent,
    EventPoller,
    MessageSlot,
    PayloadSource,
    PollHandler,
    PollSource,
    PollState,
    PollerFactory,
    RingBuffer,
    RingBufferConfig,
    RingBufferEntry,
    Sequence,
};
pub use error::{ BatchPollError, Result };
pub use idle::{ BackoffIdle, BusySpinIdle, IdleStrategy, YieldingIdle };
pub use insights::init_tracy;
pub use metrics::{ Metrics, MetricsSnapshot, METRICS };
