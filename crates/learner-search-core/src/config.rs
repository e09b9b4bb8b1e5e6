//! Cache and retry policy configuration.
//!
//! One [`CachePolicyConfig`] is built at application start and injected into
//! every consumer; it is never mutated afterward. There is deliberately no
//! ambient global to reach for.
//!
//! # Environment Variable Overrides
//!
//! | Variable                          | Field                  | Default |
//! |-----------------------------------|------------------------|---------|
//! | `LEARNER_SEARCH_STALE_TIME_MS`    | `stale_time_ms`        | `60000` |
//! | `LEARNER_SEARCH_RETRY_MAX`        | `retry.max_attempts`   | `3`     |
//! | `LEARNER_SEARCH_BACKOFF_BASE_MS`  | `retry.base_delay_ms`  | `200`   |
//! | `LEARNER_SEARCH_BACKOFF_MAX_MS`   | `retry.max_delay_ms`   | `5000`  |
//! | `LEARNER_SEARCH_JITTER_PCT`       | `retry.jitter_pct`     | `0.2`   |

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FetchError, SearchError, SearchResult};

/// Retry/backoff policy for data fetches.
///
/// Only transient errors (network, timeout, 5xx) are retried, with
/// exponential backoff and bounded symmetric jitter. Permanent errors (4xx,
/// validation) surface immediately: retrying a malformed request wastes
/// request budget without changing the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Max attempts per query (including the first try). Default: 3.
    pub max_attempts: u32,
    /// Backoff after the first failure, in milliseconds. Default: 200.
    pub base_delay_ms: u64,
    /// Backoff ceiling, in milliseconds. Default: 5000.
    pub max_delay_ms: u64,
    /// Jitter fraction applied to backoff (0.0..=1.0). Default: 0.2.
    pub jitter_pct: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 5000,
            jitter_pct: 0.2,
        }
    }
}

impl RetryConfig {
    /// Whether the given failure of the given attempt should be retried.
    ///
    /// `attempt` is 1-based (the first try is attempt 1).
    #[must_use]
    pub fn should_retry(&self, attempt: u32, error: &FetchError) -> bool {
        error.is_transient() && attempt < self.max_attempts
    }

    /// Compute the backoff delay after the given failed attempt (1-based):
    /// `base * 2^(attempt-1)`, capped at the ceiling, with jitter.
    #[must_use]
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exp = 2u64.saturating_pow(attempt.saturating_sub(1));
        let base = self.base_delay_ms.saturating_mul(exp);
        let capped = Duration::from_millis(base.min(self.max_delay_ms));
        apply_jitter(capped, self.jitter_pct)
    }
}

/// Process-wide cache policy: staleness window plus retry policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicyConfig {
    /// A cached entry younger than this is served without refetching.
    /// Default: 60000 (one minute): long enough to suppress duplicate
    /// fetches from rapid page-section mounts, short enough that entitlement
    /// changes are picked up within a human-perceptible interval.
    pub stale_time_ms: u64,
    /// Retry policy applied to every fetch going through the cache.
    pub retry: RetryConfig,
}

impl Default for CachePolicyConfig {
    fn default() -> Self {
        Self {
            stale_time_ms: 60_000,
            retry: RetryConfig::default(),
        }
    }
}

impl CachePolicyConfig {
    /// Load configuration from environment variables; unset or unparseable
    /// variables fall back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(val) = std::env::var("LEARNER_SEARCH_STALE_TIME_MS")
            && let Ok(parsed) = val.parse::<u64>()
        {
            cfg.stale_time_ms = parsed;
        }

        if let Ok(val) = std::env::var("LEARNER_SEARCH_RETRY_MAX")
            && let Ok(parsed) = val.parse::<u32>()
        {
            cfg.retry.max_attempts = parsed.max(1);
        }

        if let Ok(val) = std::env::var("LEARNER_SEARCH_BACKOFF_BASE_MS")
            && let Ok(parsed) = val.parse::<u64>()
        {
            cfg.retry.base_delay_ms = parsed;
        }

        if let Ok(val) = std::env::var("LEARNER_SEARCH_BACKOFF_MAX_MS")
            && let Ok(parsed) = val.parse::<u64>()
        {
            cfg.retry.max_delay_ms = parsed.max(1);
        }

        if let Ok(val) = std::env::var("LEARNER_SEARCH_JITTER_PCT")
            && let Ok(parsed) = val.parse::<f64>()
        {
            cfg.retry.jitter_pct = parsed.clamp(0.0, 1.0);
        }

        cfg
    }

    /// The staleness window as a [`Duration`].
    #[must_use]
    pub const fn stale_time(&self) -> Duration {
        Duration::from_millis(self.stale_time_ms)
    }

    /// Validate field invariants.
    ///
    /// # Errors
    ///
    /// `SearchError::InvalidConfig` naming the offending field.
    pub fn validate(&self) -> SearchResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(SearchError::InvalidConfig {
                field: "retry.max_attempts".into(),
                value: "0".into(),
                reason: "at least the initial attempt must run".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_pct) {
            return Err(SearchError::InvalidConfig {
                field: "retry.jitter_pct".into(),
                value: self.retry.jitter_pct.to_string(),
                reason: "must be between 0.0 and 1.0".into(),
            });
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(SearchError::InvalidConfig {
                field: "retry.max_delay_ms".into(),
                value: self.retry.max_delay_ms.to_string(),
                reason: "must be at least base_delay_ms".into(),
            });
        }
        Ok(())
    }
}

/// Apply bounded symmetric jitter to a duration.
#[must_use]
pub fn apply_jitter(duration: Duration, jitter_pct: f64) -> Duration {
    if jitter_pct <= 0.0 || duration.is_zero() {
        return duration;
    }
    let unit = next_jitter_unit();
    let delta = unit.mul_add(2.0, -1.0) * jitter_pct;
    #[allow(clippy::cast_precision_loss)]
    let base_ms = duration.as_millis() as f64;
    let jittered = (base_ms * (1.0 + delta)).max(1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Duration::from_millis(jittered.round() as u64)
}

fn next_jitter_unit() -> f64 {
    static SEED: AtomicU64 = AtomicU64::new(0x9e37_79b9_7f4a_7c15);
    let mut current = SEED.load(Ordering::Relaxed);
    loop {
        let next = current
            .wrapping_mul(6_364_136_223_846_793_005_u64)
            .wrapping_add(1);
        match SEED.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => {
                // Top 53 bits give a uniform f64 in [0, 1).
                let value = next >> 11;
                #[allow(clippy::cast_precision_loss)]
                return (value as f64) / ((1_u64 << 53) as f64);
            }
            Err(actual) => current = actual,
        }
    }
}
