//! How long to wait before reconnecting.

use std::time::Duration;

use rand::Rng;

/// Decides the wait between a lost connection and the next attempt.
///
/// `next_delay` is called once per lost connection or failed attempt;
/// `reset` once a connection opens.
pub trait ReconnectPolicy: Send + 'static {
    fn next_delay(&mut self) -> Duration;

    fn reset(&mut self) {}
}

/// The same wait every time, forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedInterval(pub Duration);

impl Default for FixedInterval {
    fn default() -> Self {
        Self(Duration::from_secs(5))
    }
}

impl ReconnectPolicy for FixedInterval {
    fn next_delay(&mut self) -> Duration {
        self.0
    }
}

/// Doubling waits capped at `max`, each shortened by a random jitter of up
/// to `jitter` (a fraction in `0.0..=1.0`) so a crowd of viewers does not
/// reconnect in lockstep after a server restart.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    pub base: Duration,
    pub max: Duration,
    jitter: f64,
    attempt: u32,
}

impl ExponentialBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            jitter: 0.2,
            attempt: 0,
        }
    }

    /// Sets the jitter fraction. Values outside `0.0..=1.0` are clamped and
    /// NaN disables jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = if jitter.is_nan() { 0.0 } else { jitter.clamp(0.0, 1.0) };
        self
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Un-jittered delay for the current attempt.
    fn ceiling(&self) -> Duration {
        let factor = 2u32.saturating_pow(self.attempt.min(16));
        self.base.saturating_mul(factor).min(self.max)
    }
}

impl ReconnectPolicy for ExponentialBackoff {
    fn next_delay(&mut self) -> Duration {
        let ceiling = self.ceiling();
        self.attempt = self.attempt.saturating_add(1);
        if self.jitter <= 0.0 {
            return ceiling;
        }
        let cut = rand::rng().random_range(0.0..=self.jitter);
        ceiling.mul_f64(1.0 - cut)
    }

    fn reset(&mut self) {
        self.attempt = 0;
    }
}
