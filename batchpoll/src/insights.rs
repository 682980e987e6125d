//! Insights - Observability for batchpoll.
//!
//! Unified tracing, profiling, and logging. Zero-cost when disabled.
//!
//! # Usage
//!
//! ## Basic tracing (console output)
//! ```toml
//! batchpoll = { version = "0.1", features = ["tracing"] }
//! ```
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! ## Tracy profiler (real-time visualization)
//! ```toml
//! batchpoll = { version = "0.1", features = ["tracy"] }
//! ```
//! ```rust,ignore
//! batchpoll::init_tracy();
//! ```

use crate::disruptor::PollState;

/// Initialize Tracy profiler (call once at startup)
#[cfg(feature = "tracy")]
pub fn init_tracy() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    use tracing_subscriber::layer::SubscriberExt;
    tracing::subscriber::set_global_default(
        tracing_subscriber::registry().with(tracing_tracy::TracyLayer::default()),
    )
}

#[cfg(not(feature = "tracy"))]
pub fn init_tracy() -> Result<(), std::convert::Infallible> {
    Ok(())
}

/// Record an upstream refill of the local batch
#[cfg(feature = "tracing")]
#[inline]
pub fn record_refill(items: usize) {
    let _span = tracing::trace_span!("refill", items).entered();
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_refill(_items: usize) {}

/// Record an upstream poll that buffered nothing
#[cfg(feature = "tracing")]
#[inline]
pub fn record_empty_poll(state: PollState) {
    tracing::trace!(?state, "upstream poll returned no items");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_empty_poll(_state: PollState) {}

/// Record an event whose payload copy was empty
#[cfg(feature = "tracing")]
#[inline]
pub fn record_skipped_payload(sequence: u64) {
    tracing::debug!(sequence, "skipping event with empty payload");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_skipped_payload(_sequence: u64) {}

/// Record an append to a local batch that had already reported full
#[cfg(feature = "tracing")]
#[inline]
pub fn record_capacity_violation(capacity: usize) {
    tracing::error!(capacity, "item offered to a full local batch");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_capacity_violation(_capacity: usize) {}

/// Record backpressure (ring buffer full)
#[cfg(feature = "tracing")]
#[inline]
pub fn record_backpressure() {
    let _span = tracing::warn_span!("backpressure").entered();
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub fn record_backpressure() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insights_compile() {
        // Just verify it compiles (no-op when tracing disabled)
        record_refill(3);
        record_empty_poll(PollState::Idle);
        record_skipped_payload(7);
        record_capacity_violation(2);
        record_backpressure();
    }
}
