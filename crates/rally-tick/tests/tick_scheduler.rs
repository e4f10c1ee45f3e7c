//! Integration tests for the fixed-timestep tick scheduler.
//!
//! Uses `tokio::time::pause()` (via `start_paused = true`) so
//! `sleep_until` resolves instantly in virtual time and the tests are
//! deterministic.

use std::time::Duration;

use rally_tick::{TickConfig, TickScheduler};

fn config_20hz() -> TickConfig {
    TickConfig {
        tick_rate_hz: 20,
        initial_jitter_us: 0,
    }
}

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_config_is_60hz() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.tick_rate_hz, 60);
}

#[test]
fn test_with_rate_sets_duration() {
    let cfg = TickConfig::with_rate(20);
    assert_eq!(cfg.tick_duration(), Duration::from_millis(50));
}

#[test]
fn test_zero_rate_is_raised_to_one() {
    let cfg = TickConfig::with_rate(0).validated();
    assert_eq!(cfg.tick_rate_hz, 1);
    assert_eq!(cfg.tick_duration(), Duration::from_secs(1));
}

#[test]
fn test_excessive_rate_is_clamped() {
    let cfg = TickConfig::with_rate(10_000).validated();
    assert_eq!(cfg.tick_rate_hz, TickConfig::MAX_TICK_RATE_HZ);
}

// =========================================================================
// Scheduler creation and accessors
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_scheduler_initial_state() {
    let s = TickScheduler::new(config_20hz());
    assert_eq!(s.tick_count(), 0);
    assert_eq!(s.tick_rate_hz(), 20);
    assert!(!s.is_paused());
    assert_eq!(s.tick_duration(), Duration::from_millis(50));
}

// =========================================================================
// Tick firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_for_tick_fires_and_increments() {
    let mut s = TickScheduler::new(config_20hz());

    let info = s.wait_for_tick().await;
    assert_eq!(info.tick, 1);
    assert_eq!(info.dt, Duration::from_millis(50));
    assert!(!info.overrun);
    assert_eq!(info.ticks_skipped, 0);
    assert_eq!(s.tick_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_multiple_ticks_increment_monotonically() {
    let mut s = TickScheduler::new(config_20hz());

    for expected in 1..=5 {
        let info = s.wait_for_tick().await;
        assert_eq!(info.tick, expected);
    }
    assert_eq!(s.tick_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_dt_is_always_fixed() {
    let mut s = TickScheduler::new(config_20hz());

    for _ in 0..3 {
        let info = s.wait_for_tick().await;
        assert_eq!(info.dt, Duration::from_millis(50));
    }
}

// =========================================================================
// Pause / resume
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_paused_scheduler_never_ticks() {
    let mut s = TickScheduler::new(config_20hz());
    s.pause();
    assert!(s.is_paused());

    // With the scheduler paused, wait_for_tick pends forever; the
    // timeout branch must win.
    let fired = tokio::select! {
        _ = s.wait_for_tick() => true,
        _ = tokio::time::sleep(Duration::from_secs(5)) => false,
    };
    assert!(!fired, "paused scheduler must not fire");
}

#[tokio::test(start_paused = true)]
async fn test_resume_restarts_cadence_without_burst() {
    let mut s = TickScheduler::new(config_20hz());
    let _ = s.wait_for_tick().await;

    s.pause();
    tokio::time::advance(Duration::from_secs(60)).await;
    s.resume();
    assert!(!s.is_paused());

    // A minute of paused time must not replay as 1200 catch-up ticks:
    // the next tick is exactly one tick after resume.
    let info = s.wait_for_tick().await;
    assert_eq!(info.tick, 2);
    assert_eq!(info.ticks_skipped, 0);
}

#[tokio::test(start_paused = true)]
async fn test_pause_and_resume_are_idempotent() {
    let mut s = TickScheduler::new(config_20hz());
    s.pause();
    s.pause();
    assert!(s.is_paused());
    s.resume();
    s.resume();
    assert!(!s.is_paused());

    let info = s.wait_for_tick().await;
    assert_eq!(info.tick, 1);
}
