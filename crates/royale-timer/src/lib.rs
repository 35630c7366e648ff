//! Round countdown driver for ChatRoyale.
//!
//! The server announces a round with a length in seconds and a nonce. The
//! [`TimerDriver`] watches the nonce: when it changes, the countdown
//! restarts from the new length; when the same rules are re-sent, nothing
//! happens.
//!
//! # Integration
//!
//! The driver sits inside the client actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         countdown = timer.wait_for_tick() => {
//!             publish(countdown.remaining);
//!         }
//!     }
//! }
//! ```

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::time::Duration;

use royale_protocol::{Nonce, RoundRules};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the countdown driver.
#[derive(Debug, Clone)]
pub struct TimerConfig {
    /// How often `remaining` is recomputed and reported. Default: 500 ms.
    pub tick_interval: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(500),
        }
    }
}

impl TimerConfig {
    /// Shortest cadence accepted.
    pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`TimerDriver::new`].
    pub fn validated(mut self) -> Self {
        if self.tick_interval < Self::MIN_TICK_INTERVAL {
            warn!(
                requested_ms = self.tick_interval.as_millis() as u64,
                min_ms = Self::MIN_TICK_INTERVAL.as_millis() as u64,
                "tick_interval below minimum, clamping"
            );
            self.tick_interval = Self::MIN_TICK_INTERVAL;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Countdown (returned to caller each tick)
// ---------------------------------------------------------------------------

/// One countdown reading, returned by [`TimerDriver::wait_for_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    /// Whole seconds left. Negative once the round runs over.
    pub remaining: i64,
    /// Ticks since the current countdown started (starts at 1).
    pub tick: u64,
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

struct Running {
    started: Instant,
    target_seconds: i64,
    ticker: Interval,
    ticks: u64,
}

/// Derives a live countdown from the round rules.
pub struct TimerDriver<K: Clock = SystemClock> {
    clock: K,
    tick_interval: Duration,
    /// Nonce of the last rules seen by [`observe`](Self::observe).
    observed: Nonce,
    running: Option<Running>,
    restarts: u64,
}

impl TimerDriver<SystemClock> {
    /// A driver on Tokio's clock.
    pub fn with_config(config: TimerConfig) -> Self {
        Self::new(config, SystemClock)
    }
}

impl<K: Clock> TimerDriver<K> {
    pub fn new(config: TimerConfig, clock: K) -> Self {
        let config = config.validated();
        Self {
            clock,
            tick_interval: config.tick_interval,
            observed: Nonce::default(),
            running: None,
            restarts: 0,
        }
    }

    /// Looks at the current rules and restarts the countdown if their nonce
    /// differs from the last one seen.
    ///
    /// Returns `true` if the countdown was (re)started. Must be called from
    /// within a Tokio runtime.
    pub fn observe(&mut self, rules: &RoundRules) -> bool {
        if rules.nonce == self.observed {
            return false;
        }
        self.observed = rules.nonce.clone();
        self.restart(rules.timer_seconds);
        true
    }

    /// Starts a countdown of `target_seconds` from now, replacing any
    /// running one.
    pub fn restart(&mut self, target_seconds: i64) {
        // The old interval is dropped here, so only one tick source exists.
        let mut ticker = time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.running = Some(Running {
            started: self.clock.now(),
            target_seconds,
            ticker,
            ticks: 0,
        });
        self.restarts += 1;
        debug!(
            target_seconds,
            nonce = %self.observed,
            restarts = self.restarts,
            "countdown started"
        );
    }

    /// Whole seconds left, or `None` when no countdown is running.
    ///
    /// `remaining = target - floor(elapsed_ms / 1000)`.
    pub fn remaining(&self) -> Option<i64> {
        let running = self.running.as_ref()?;
        let elapsed = self.clock.now().saturating_duration_since(running.started);
        let elapsed = i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX);
        // `target_seconds` comes off the wire unchecked.
        Some(running.target_seconds.saturating_sub(elapsed))
    }

    /// Waits for the next tick and returns the countdown at that moment.
    ///
    /// When no countdown is running this future pends forever, so
    /// `tokio::select!` keeps serving its other branches. The first tick
    /// after a (re)start fires immediately.
    pub async fn wait_for_tick(&mut self) -> Countdown {
        let Some(running) = self.running.as_mut() else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        running.ticker.tick().await;
        running.ticks += 1;
        let tick = running.ticks;

        let remaining = self.remaining().unwrap_or_default();
        trace!(tick, remaining, "countdown tick");
        Countdown { remaining, tick }
    }

    /// Cancels the running countdown. Idempotent.
    pub fn stop(&mut self) {
        if self.running.take().is_some() {
            debug!("countdown stopped");
        }
    }

    /// Stops and forgets the last nonce, so the next rules seen (even with
    /// the same nonce) start a fresh countdown.
    pub fn reset(&mut self) {
        self.stop();
        self.observed = Nonce::default();
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// How many times a countdown has been started.
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(nonce: &str, seconds: i64) -> RoundRules {
        RoundRules {
            prompt: "Name a fruit".into(),
            duplicates_allowed: false,
            timer_seconds: seconds,
            nonce: Nonce::new(nonce),
        }
    }

    #[test]
    fn test_config_default_is_half_second() {
        assert_eq!(TimerConfig::default().tick_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_config_validated_clamps_tiny_interval() {
        let cfg = TimerConfig {
            tick_interval: Duration::ZERO,
        }
        .validated();
        assert_eq!(cfg.tick_interval, TimerConfig::MIN_TICK_INTERVAL);
    }

    #[tokio::test]
    async fn test_default_rules_do_not_start_countdown() {
        let mut timer = TimerDriver::new(TimerConfig::default(), ManualClock::new());
        assert!(!timer.observe(&RoundRules::default()));
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), None);
    }

    #[tokio::test]
    async fn test_remaining_floors_elapsed_seconds() {
        let clock = ManualClock::new();
        let mut timer = TimerDriver::new(TimerConfig::default(), clock.clone());
        assert!(timer.observe(&rules("r1", 30)));
        assert_eq!(timer.remaining(), Some(30));

        clock.advance(Duration::from_millis(999));
        assert_eq!(timer.remaining(), Some(30));

        clock.advance(Duration::from_millis(1));
        assert_eq!(timer.remaining(), Some(29));
    }

    #[tokio::test]
    async fn test_remaining_goes_negative() {
        let clock = ManualClock::new();
        let mut timer = TimerDriver::new(TimerConfig::default(), clock.clone());
        timer.observe(&rules("r1", 2));
        clock.advance(Duration::from_secs(5));
        assert_eq!(timer.remaining(), Some(-3));
    }

    #[tokio::test]
    async fn test_remaining_saturates_at_extreme_targets() {
        let clock = ManualClock::new();
        let mut timer = TimerDriver::new(TimerConfig::default(), clock.clone());
        timer.observe(&rules("r1", i64::MIN));
        clock.advance(Duration::from_secs(1));
        assert_eq!(timer.remaining(), Some(i64::MIN));

        timer.observe(&rules("r2", i64::MAX));
        clock.advance(Duration::from_secs(3));
        assert_eq!(timer.remaining(), Some(i64::MAX - 3));
    }

    #[tokio::test]
    async fn test_same_nonce_does_not_restart() {
        let clock = ManualClock::new();
        let mut timer = TimerDriver::new(TimerConfig::default(), clock.clone());
        assert!(timer.observe(&rules("r1", 30)));
        clock.advance(Duration::from_secs(10));

        assert!(!timer.observe(&rules("r1", 30)));
        assert_eq!(timer.restarts(), 1);
        assert_eq!(timer.remaining(), Some(20));
    }

    #[tokio::test]
    async fn test_new_nonce_restarts_from_new_target() {
        let clock = ManualClock::new();
        let mut timer = TimerDriver::new(TimerConfig::default(), clock.clone());
        timer.observe(&rules("r1", 30));
        clock.advance(Duration::from_secs(10));

        assert!(timer.observe(&rules("r2", 15)));
        assert_eq!(timer.restarts(), 2);
        assert_eq!(timer.remaining(), Some(15));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut timer = TimerDriver::new(TimerConfig::default(), ManualClock::new());
        timer.stop();
        timer.observe(&rules("r1", 30));
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), None);
    }

    #[tokio::test]
    async fn test_reset_forgets_nonce() {
        let mut timer = TimerDriver::new(TimerConfig::default(), ManualClock::new());
        timer.observe(&rules("r1", 30));
        timer.reset();
        assert!(timer.observe(&rules("r1", 30)));
        assert_eq!(timer.restarts(), 2);
    }
}
