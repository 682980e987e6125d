//! Multi-producer stress through a single `BatchedPoller`.

use batchpoll::{ BackoffIdle, BusySpinIdle, YieldingIdle };
use batchpoll_test_support::{ print_summary, StressConfig, StressMetrics, StressRunner };
use std::time::Duration;

/// Scale message counts down for unoptimized builds.
fn scaled(release: u64) -> u64 {
    if cfg!(debug_assertions) { release / 10 } else { release }
}

fn config(producers: usize, batch_size: usize, messages: u64) -> StressConfig {
    StressConfig::new(30)
        .with_producers(producers)
        .with_batch_size(batch_size)
        .with_messages_per_producer(messages)
        .with_report_interval(Duration::from_millis(200))
}

fn assert_clean(metrics: &StressMetrics, limit: u64) {
    print_summary(metrics);
    assert_eq!(metrics.errors, 0);
    assert_eq!(metrics.messages_received, metrics.messages_sent);
    assert!(metrics.messages_sent <= limit);
    assert!(metrics.messages_sent > 0);
}

#[test]
fn test_single_producer_default_batch() {
    let messages = scaled(100_000);
    let runner = StressRunner::new(config(1, 0, messages));
    let metrics = runner.run(BusySpinIdle);
    assert_clean(&metrics, messages);
}

#[test]
fn test_multi_producer_ordering() {
    let messages = scaled(50_000);
    let runner = StressRunner::new(config(4, 20, messages).with_max_burst(32));
    let metrics = runner.run(YieldingIdle::default());
    assert_clean(&metrics, 4 * messages);
}

#[test]
fn test_small_ring_heavy_backpressure() {
    let messages = scaled(20_000);
    let runner = StressRunner::new(config(3, 8, messages).with_ring_size(16).with_max_burst(16));
    let metrics = runner.run(BackoffIdle::default());
    assert_clean(&metrics, 3 * messages);
}

#[test]
fn test_timed_run_drains_everything() {
    let cfg = StressConfig::new(1)
        .with_producers(2)
        .with_batch_size(64)
        .with_report_interval(Duration::from_millis(100));
    let metrics = StressRunner::new(cfg).run(YieldingIdle::new(10));
    print_summary(&metrics);
    assert_eq!(metrics.errors, 0);
    assert_eq!(metrics.messages_received, metrics.messages_sent);
}
