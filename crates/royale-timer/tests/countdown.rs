//! Integration tests for the countdown driver.
//!
//! Uses `start_paused = true` so Tokio's clock only moves when every task
//! is idle, which makes tick timing exact.

use std::time::Duration;

use royale_protocol::{Nonce, RoundRules};
use royale_timer::{TimerConfig, TimerDriver};

// =========================================================================
// Helpers
// =========================================================================

fn rules(nonce: &str, seconds: i64) -> RoundRules {
    RoundRules {
        prompt: "Name a fruit".into(),
        duplicates_allowed: false,
        timer_seconds: seconds,
        nonce: Nonce::new(nonce),
    }
}

fn driver() -> TimerDriver {
    TimerDriver::with_config(TimerConfig::default())
}

// =========================================================================
// Ticking
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_first_tick_is_immediate_with_full_time() {
    let mut timer = driver();
    timer.observe(&rules("r1", 30));

    let start = tokio::time::Instant::now();
    let c = timer.wait_for_tick().await;
    assert_eq!(c.tick, 1);
    assert_eq!(c.remaining, 30);
    assert_eq!(tokio::time::Instant::now(), start);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_every_half_second_and_counts_down() {
    let mut timer = driver();
    timer.observe(&rules("r1", 30));

    let readings: Vec<i64> = {
        let mut v = Vec::new();
        for _ in 0..5 {
            v.push(timer.wait_for_tick().await.remaining);
        }
        v
    };
    // t = 0, 0.5, 1.0, 1.5, 2.0 seconds
    assert_eq!(readings, vec![30, 30, 29, 29, 28]);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_runs_into_overtime() {
    let mut timer = driver();
    timer.observe(&rules("r1", 1));

    let mut last = 0;
    for _ in 0..6 {
        last = timer.wait_for_tick().await.remaining;
    }
    // Sixth tick is at t = 2.5 s.
    assert_eq!(last, -1);
}

// =========================================================================
// Restart semantics
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_identical_nonce_keeps_running_countdown() {
    let mut timer = driver();
    timer.observe(&rules("r1", 30));
    for _ in 0..3 {
        timer.wait_for_tick().await;
    }

    assert!(!timer.observe(&rules("r1", 30)));
    let c = timer.wait_for_tick().await;
    assert_eq!(c.tick, 4, "the first tick source keeps counting");
    assert_eq!(timer.restarts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_new_nonce_replaces_tick_source() {
    let mut timer = driver();
    timer.observe(&rules("r1", 30));
    for _ in 0..3 {
        timer.wait_for_tick().await;
    }

    assert!(timer.observe(&rules("r2", 10)));
    let c = timer.wait_for_tick().await;
    assert_eq!(c.tick, 1);
    assert_eq!(c.remaining, 10);

    // Exactly one tick per cadence: the next one is a full interval later.
    let before = tokio::time::Instant::now();
    timer.wait_for_tick().await;
    assert_eq!(tokio::time::Instant::now() - before, Duration::from_millis(500));
}

// =========================================================================
// Stopped driver pends forever
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_idle_driver_never_ticks() {
    let mut timer = driver();
    let result = tokio::time::timeout(Duration::from_secs(5), timer.wait_for_tick()).await;
    assert!(result.is_err(), "idle driver should pend forever");
}

#[tokio::test(start_paused = true)]
async fn test_stopped_driver_never_ticks() {
    let mut timer = driver();
    timer.observe(&rules("r1", 30));
    timer.wait_for_tick().await;
    timer.stop();

    let result = tokio::time::timeout(Duration::from_secs(5), timer.wait_for_tick()).await;
    assert!(result.is_err(), "stopped driver should pend forever");
}

#[tokio::test(start_paused = true)]
async fn test_custom_cadence() {
    let mut timer = TimerDriver::with_config(TimerConfig {
        tick_interval: Duration::from_millis(250),
    });
    timer.observe(&rules("r1", 3));

    let start = tokio::time::Instant::now();
    for _ in 0..5 {
        timer.wait_for_tick().await;
    }
    assert_eq!(tokio::time::Instant::now() - start, Duration::from_secs(1));
    assert_eq!(timer.remaining(), Some(2));
}
