//! Failure history for one provider.
//!
//! Callers that send real traffic record failures; after `failure_threshold`
//! consecutive failures the breaker is open for `cooldown`. A successful probe
//! clears the whole history through [`CircuitBreaker::reset`].

use serde::Serialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const ENV_FAILURE_THRESHOLD: &str = "PROVIDER_PROBE_BREAKER_FAILURE_THRESHOLD";
const ENV_COOLDOWN_SECS: &str = "PROVIDER_PROBE_BREAKER_COOLDOWN_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `PROVIDER_PROBE_BREAKER_FAILURE_THRESHOLD` and
    /// `PROVIDER_PROBE_BREAKER_COOLDOWN_SECS`.
    pub fn from_env() -> Self {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`. Unparseable values are ignored; both
    /// knobs are floored at 1.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(n) = lookup(ENV_FAILURE_THRESHOLD).and_then(|s| s.trim().parse::<u32>().ok()) {
            self.failure_threshold = n.max(1);
        }
        if let Some(secs) = lookup(ENV_COOLDOWN_SECS).and_then(|s| s.trim().parse::<u64>().ok()) {
            self.cooldown = Duration::from_secs(secs.max(1));
        }
        self
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitBreakerSnapshot {
    pub consecutive_failures: u32,
    pub failure_threshold: u32,
    /// Time left in the open window, if open.
    pub open_remaining_ms: Option<u64>,
}

impl CircuitBreakerSnapshot {
    pub fn is_open(&self) -> bool {
        self.open_remaining_ms.is_some()
    }
}

#[derive(Debug, Default)]
struct FailureHistory {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    cfg: CircuitBreakerConfig,
    history: Mutex<FailureHistory>,
}

impl CircuitBreaker {
    pub fn new(cfg: CircuitBreakerConfig) -> Self {
        Self {
            cfg,
            history: Mutex::new(FailureHistory::default()),
        }
    }

    /// Count one failure. Returns `true` if the breaker is open afterwards.
    pub fn record_failure(&self) -> bool {
        let Ok(mut h) = self.history.lock() else {
            return false;
        };
        h.consecutive_failures = h.consecutive_failures.saturating_add(1);
        if h.consecutive_failures >= self.cfg.failure_threshold && h.opened_at.is_none() {
            h.opened_at = Some(Instant::now());
        }
        self.remaining(&h).is_some()
    }

    /// Forget every recorded failure and close the breaker.
    pub fn reset(&self) {
        if let Ok(mut h) = self.history.lock() {
            *h = FailureHistory::default();
        }
    }

    pub fn is_open(&self) -> bool {
        self.snapshot().is_open()
    }

    pub fn snapshot(&self) -> CircuitBreakerSnapshot {
        let (consecutive_failures, open_remaining_ms) = match self.history.lock() {
            Ok(h) => (
                h.consecutive_failures,
                self.remaining(&h).map(|d| d.as_millis() as u64),
            ),
            Err(_) => (0, None),
        };
        CircuitBreakerSnapshot {
            consecutive_failures,
            failure_threshold: self.cfg.failure_threshold,
            open_remaining_ms,
        }
    }

    fn remaining(&self, h: &FailureHistory) -> Option<Duration> {
        let opened_at = h.opened_at?;
        self.cfg
            .cooldown
            .checked_sub(opened_at.elapsed())
            .filter(|left| !left.is_zero())
    }
}
