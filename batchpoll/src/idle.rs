//! Idle strategies for callers that spin on `BatchedPoller::poll`.
//!
//! `poll` itself never waits. A consumer loop that sees `None` decides how
//! to back off; these cover the usual trade-offs between latency and CPU.
//! `attempt` counts consecutive empty polls and should be reset to 0 by the
//! caller whenever an item arrives.

use std::thread;
use std::time::Duration;

pub trait IdleStrategy: Send + Sync {
    fn idle(&self, attempt: u32);
}

/// Busy spin - lowest latency, burns a full core while idle.
#[derive(Debug, Default, Clone, Copy)]
pub struct BusySpinIdle;

impl IdleStrategy for BusySpinIdle {
    #[inline]
    fn idle(&self, _attempt: u32) {
        std::hint::spin_loop();
    }
}

/// Spin for a while, then yield the CPU to other threads.
#[derive(Debug, Clone, Copy)]
pub struct YieldingIdle {
    spin_tries: u32,
}

impl YieldingIdle {
    pub fn new(spin_tries: u32) -> Self {
        Self { spin_tries }
    }
}

impl Default for YieldingIdle {
    fn default() -> Self {
        Self::new(100)
    }
}

impl IdleStrategy for YieldingIdle {
    fn idle(&self, attempt: u32) {
        if attempt < self.spin_tries {
            std::hint::spin_loop();
        } else {
            thread::yield_now();
        }
    }
}

/// Spin, then yield, then sleep with an exponentially growing pause capped
/// at `max_sleep`.
#[derive(Debug, Clone, Copy)]
pub struct BackoffIdle {
    spin_tries: u32,
    yield_tries: u32,
    min_sleep: Duration,
    max_sleep: Duration,
}

impl BackoffIdle {
    pub fn new(spin_tries: u32, yield_tries: u32, min_sleep: Duration, max_sleep: Duration) -> Self {
        Self {
            spin_tries,
            yield_tries,
            min_sleep,
            max_sleep: max_sleep.max(min_sleep),
        }
    }

    /// Pause `idle` would sleep for at `attempt`, if it sleeps at all.
    pub fn sleep_for(&self, attempt: u32) -> Option<Duration> {
        let sleeping_since = self.spin_tries.saturating_add(self.yield_tries);
        if attempt < sleeping_since {
            return None;
        }
        let shift = (attempt - sleeping_since).min(16);
        Some(self.min_sleep.saturating_mul(1 << shift).min(self.max_sleep))
    }
}

impl Default for BackoffIdle {
    fn default() -> Self {
        Self::new(10, 10, Duration::from_micros(1), Duration::from_millis(1))
    }
}

impl IdleStrategy for BackoffIdle {
    fn idle(&self, attempt: u32) {
        if attempt < self.spin_tries {
            std::hint::spin_loop();
        } else if let Some(pause) = self.sleep_for(attempt) {
            thread::sleep(pause);
        } else {
            thread::yield_now();
        }
    }
}
