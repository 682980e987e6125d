//! # batchpoll-test-support
//!
//! Testing infrastructure for batchpoll.
//!
//! ## Components
//!
//! - **StressRunner** - Multi-producer stress runs drained through a `BatchedPoller`
//! - **SequenceChecker** - Per-producer ordering and gap detection

pub mod stress;
pub mod verify;

pub use stress::{ print_summary, StressConfig, StressCounters, StressMetrics, StressRunner };
pub use verify::SequenceChecker;
