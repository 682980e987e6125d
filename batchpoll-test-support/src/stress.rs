//! Stress testing utilities for multi-producer runs drained by a
//! `BatchedPoller`.

use std::sync::atomic::{ AtomicBool, AtomicU64, Ordering };
use std::sync::Arc;
use std::thread;
use std::time::{ Duration, Instant };

use batchpoll::{ BatchedPoller, DataEvent, IdleStrategy, RingBuffer, METRICS };
use crossbeam_channel::{ unbounded, Receiver, TryRecvError };
use rand::Rng;

use crate::verify::{ encode, SequenceChecker };

/// Configuration for stress tests
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Upper bound on run time
    pub duration: Duration,
    /// Number of producer threads
    pub producers: usize,
    /// Consumer's local batch size (0 = default)
    pub batch_size: usize,
    /// Largest burst a producer publishes at once; bursts are 1..=max_burst
    pub max_burst: usize,
    /// Ring buffer size (power of 2)
    pub ring_size: usize,
    /// Messages per producer (0 = run until `duration` elapses)
    pub messages_per_producer: u64,
    /// Print progress every interval
    pub report_interval: Duration,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(10),
            producers: 1,
            batch_size: 20,
            max_burst: 64,
            ring_size: 4096,
            messages_per_producer: 0,
            report_interval: Duration::from_secs(1),
        }
    }
}

impl StressConfig {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            duration: Duration::from_secs(duration_secs),
            ..Default::default()
        }
    }

    pub fn with_producers(mut self, n: usize) -> Self {
        self.producers = n;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_max_burst(mut self, burst: usize) -> Self {
        self.max_burst = burst;
        self
    }

    pub fn with_ring_size(mut self, size: usize) -> Self {
        self.ring_size = size;
        self
    }

    pub fn with_messages_per_producer(mut self, n: u64) -> Self {
        self.messages_per_producer = n;
        self
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }
}

/// Metrics collected during stress testing
#[derive(Debug, Clone, Default)]
pub struct StressMetrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub errors: u64,
    pub duration: Duration,
    pub peak_rate: f64,
}

impl StressMetrics {
    pub fn send_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.messages_sent as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn receive_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.messages_received as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn loss_rate(&self) -> f64 {
        if self.messages_sent > 0 {
            1.0 - (self.messages_received as f64) / (self.messages_sent as f64)
        } else {
            0.0
        }
    }
}

/// Shared counters for stress testing
pub struct StressCounters {
    pub sent: AtomicU64,
    pub received: AtomicU64,
    pub errors: AtomicU64,
    pub running: AtomicBool,
}

impl StressCounters {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_send(&self, count: usize) {
        self.sent.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_receive(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StressMetrics {
        StressMetrics {
            messages_sent: self.sent.load(Ordering::Relaxed),
            messages_received: self.received.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            ..Default::default()
        }
    }
}

impl Default for StressCounters {
    fn default() -> Self {
        Self {
            sent: AtomicU64::new(0),
            received: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            running: AtomicBool::new(true),
        }
    }
}

/// Runner for stress tests with progress reporting
pub struct StressRunner {
    config: StressConfig,
    counters: Arc<StressCounters>,
}

impl StressRunner {
    pub fn new(config: StressConfig) -> Self {
        Self {
            config,
            counters: StressCounters::new(),
        }
    }

    pub fn counters(&self) -> Arc<StressCounters> {
        self.counters.clone()
    }

    pub fn config(&self) -> &StressConfig {
        &self.config
    }

    /// Run `test_fn` while a reporter thread prints progress and stops the
    /// counters once `duration` has elapsed.
    pub fn run_with_progress<F>(&self, test_fn: F) -> StressMetrics where F: FnOnce(Arc<StressCounters>) {
        let start = Instant::now();
        let counters = self.counters.clone();
        let duration = self.config.duration;
        let report_interval = self.config.report_interval;

        let report_counters = counters.clone();
        let reporter = thread::spawn(move || {
            let mut last_sent = 0u64;
            let mut peak_rate = 0.0f64;

            while report_counters.is_running() {
                thread::sleep(report_interval);

                let current_sent = report_counters.sent.load(Ordering::Relaxed);
                let current_received = report_counters.received.load(Ordering::Relaxed);
                let errors = report_counters.errors.load(Ordering::Relaxed);

                let rate = ((current_sent - last_sent) as f64) / report_interval.as_secs_f64();
                peak_rate = peak_rate.max(rate);
                last_sent = current_sent;

                let elapsed = start.elapsed();
                eprintln!(
                    "[{:>5.1}s] sent: {:>10}, recv: {:>10}, rate: {:>8.0}/s, errors: {}",
                    elapsed.as_secs_f64(),
                    current_sent,
                    current_received,
                    rate,
                    errors
                );

                if elapsed >= duration {
                    report_counters.stop();
                    break;
                }
            }

            peak_rate
        });

        test_fn(counters.clone());

        counters.stop();
        let peak_rate = reporter.join().unwrap_or(0.0);

        let mut metrics = counters.snapshot();
        metrics.duration = start.elapsed();
        metrics.peak_rate = peak_rate;
        metrics
    }

    /// Publish from `producers` threads in random bursts and drain everything
    /// through one `BatchedPoller`, checking per-producer order.
    ///
    /// Producers stop at `messages_per_producer` or when the run times out;
    /// the consumer then drains whatever they reported sending.
    pub fn run<I>(&self, idle: I) -> StressMetrics where I: IdleStrategy + 'static {
        let config = self.config.clone();
        self.run_with_progress(move |counters| {
            let ring = match RingBuffer::<DataEvent<u64>>::new(config.ring_size) {
                Ok(ring) => Arc::new(ring),
                Err(e) => {
                    eprintln!("stress setup failed: {}", e);
                    counters.record_error();
                    return;
                }
            };
            // Gating is registered before any producer can publish
            let poller = BatchedPoller::new(&ring, config.batch_size);
            let (done_tx, done_rx) = unbounded();

            let producers: Vec<_> = (0..config.producers)
                .map(|id| {
                    let ring = ring.clone();
                    let counters = counters.clone();
                    let done_tx = done_tx.clone();
                    let max_burst = config.max_burst.clamp(1, config.ring_size.max(1));
                    let limit = config.messages_per_producer;
                    thread::spawn(move || {
                        let mut rng = rand::thread_rng();
                        let mut sent = 0u64;
                        while counters.is_running() && (limit == 0 || sent < limit) {
                            let mut burst = rng.gen_range(1..=max_burst);
                            if limit > 0 {
                                burst = burst.min((limit - sent) as usize);
                            }
                            let mut next = sent;
                            let published = ring.try_publish_batch_with(burst, |event, _seq| {
                                event.set(encode(id, next));
                                next += 1;
                            });
                            match published {
                                Some((_, count)) => {
                                    sent += count as u64;
                                    counters.record_send(count);
                                }
                                None => thread::yield_now(),
                            }
                        }
                        let _ = done_tx.send((id, sent));
                    })
                })
                .collect();
            drop(done_tx);

            let consumer = {
                let counters = counters.clone();
                let producers = config.producers;
                thread::spawn(move || consume(poller, done_rx, producers, idle, &counters))
            };

            for producer in producers {
                if producer.join().is_err() {
                    counters.record_error();
                }
            }
            if consumer.join().is_err() {
                counters.record_error();
            }
        })
    }
}

fn consume<I: IdleStrategy>(
    mut poller: BatchedPoller<batchpoll::EventPoller<DataEvent<u64>>>,
    done_rx: Receiver<(usize, u64)>,
    producers: usize,
    idle: I,
    counters: &StressCounters
) {
    let mut checker = SequenceChecker::new(producers);
    let mut sent = vec![0u64; producers];
    let mut reported = 0usize;
    let mut attempt = 0u32;

    loop {
        match poller.poll() {
            Ok(Some(value)) => {
                attempt = 0;
                counters.record_receive();
                if !checker.check(value) {
                    counters.record_error();
                }
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                eprintln!("poll failed: {}", e);
                counters.record_error();
                return;
            }
        }

        loop {
            match done_rx.try_recv() {
                Ok((id, count)) => {
                    sent[id] = count;
                    reported += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                    break;
                }
            }
        }
        if reported == producers && checker.received() == sent.iter().sum::<u64>() {
            if !checker.is_complete(&sent) {
                counters.record_error();
            }
            return;
        }

        idle.idle(attempt);
        attempt = attempt.saturating_add(1);
    }
}

/// Print a summary of stress test results
pub fn print_summary(metrics: &StressMetrics) {
    eprintln!("\n=== STRESS TEST RESULTS ===");
    eprintln!("  Duration:      {:>10.2}s", metrics.duration.as_secs_f64());
    eprintln!("  Messages Sent: {:>10}", metrics.messages_sent);
    eprintln!("  Messages Recv: {:>10}", metrics.messages_received);
    eprintln!("  Send Rate:     {:>10.0} msg/s", metrics.send_rate());
    eprintln!("  Receive Rate:  {:>10.0} msg/s", metrics.receive_rate());
    eprintln!("  Peak Rate:     {:>10.0} msg/s", metrics.peak_rate);
    eprintln!("  Loss Rate:     {:>10.4}%", metrics.loss_rate() * 100.0);
    eprintln!("  Errors:        {:>10}", metrics.errors);
    eprintln!("  Poller:        {}", METRICS.snapshot());

    if metrics.errors > 0 {
        eprintln!("\nFAILED: {} errors detected", metrics.errors);
    } else if metrics.loss_rate() > 0.0 {
        eprintln!("\nWARNING: {:.4}% message loss", metrics.loss_rate() * 100.0);
    } else {
        eprintln!("\nPASSED: no errors, no loss");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_counters() {
        let counters = StressCounters::new();

        counters.record_send(3);
        counters.record_send(2);
        counters.record_receive();

        let metrics = counters.snapshot();
        assert_eq!(metrics.messages_sent, 5);
        assert_eq!(metrics.messages_received, 1);
    }

    #[test]
    fn test_stress_metrics_rates() {
        let metrics = StressMetrics {
            messages_sent: 1000,
            messages_received: 990,
            duration: Duration::from_secs(10),
            ..Default::default()
        };

        assert!((metrics.send_rate() - 100.0).abs() < 0.1);
        assert!((metrics.receive_rate() - 99.0).abs() < 0.1);
        assert!((metrics.loss_rate() - 0.01).abs() < 0.001);
    }
}
