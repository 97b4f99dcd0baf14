//! Reconnect policy
//!
//! Capped exponential backoff between reconnect attempts, plus the bookkeeping
//! for reporting a station as degraded once per outage.

use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;

use crate::config::ReconnectConfig;

/// Build the backoff schedule for a reconnect config
pub fn build_backoff(config: &ReconnectConfig) -> ExponentialBackoff {
    let initial = Duration::from_millis(config.initial_ms.max(1));
    ExponentialBackoff {
        current_interval: initial,
        initial_interval: initial,
        max_interval: Duration::from_millis(config.max_ms.max(config.initial_ms)),
        randomization_factor: config.jitter.clamp(0.0, 1.0),
        multiplier: config.multiplier.max(1.0),
        max_elapsed_time: None,
        ..ExponentialBackoff::default()
    }
}

/// Tracks failed attempts of one outage
pub struct ReconnectPolicy {
    backoff: ExponentialBackoff,
    max_delay: Duration,
    degraded_after: u32,
    failures: u32,
}

impl ReconnectPolicy {
    pub fn new(config: &ReconnectConfig) -> Self {
        let backoff = build_backoff(config);
        let max_delay = backoff.max_interval;
        Self {
            backoff,
            max_delay,
            degraded_after: config.degraded_after,
            failures: 0,
        }
    }

    /// Delay before the next attempt
    pub fn next_delay(&mut self) -> Duration {
        self.backoff.next_backoff().unwrap_or(self.max_delay)
    }

    /// Record a failed attempt; returns `true` exactly once per outage, when
    /// the failure count reaches the degraded threshold
    pub fn record_failure(&mut self) -> bool {
        self.failures = self.failures.saturating_add(1);
        self.degraded_after > 0 && self.failures == self.degraded_after
    }

    /// Consecutive failed attempts so far
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Connection is up again; start the next outage from scratch
    pub fn reset(&mut self) {
        self.failures = 0;
        self.backoff.reset();
    }
}
