//! Shared query cache with staleness, retry, and error fan-out policy.
//!
//! Every data fetch in the application reads through one [`QueryCache`]
//! (constructed at startup and injected, never reached via a global), so the
//! staleness window and retry policy apply uniformly; nothing bypasses it
//! with ad hoc fetches.
//!
//! Policy per [`QueryCache::get_or_fetch`] call:
//!
//! 1. A cache entry younger than the staleness window is served
//!    unconditionally, without touching the network.
//! 2. Otherwise the fetch runs under the retry policy: transient failures
//!    back off exponentially (with jitter) up to the attempt bound; permanent
//!    failures stop immediately.
//! 3. A terminal failure is reported to the [`NotificationSink`] exactly once
//!    per failed query, never on intermediate retries, and is still returned
//!    to the caller. The cache controls how many attempts occur; it never
//!    hides an error.
//!
//! Entries are type-erased so unrelated call sites (entitlement lookups,
//! section count queries) share the one cache. The internal mutex is held
//! only for map operations, never across a fetch.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::config::CachePolicyConfig;
use crate::error::FetchError;
use crate::observe;

/// Receiver for terminal fetch failures (the toast/notification channel).
pub trait NotificationSink: Send + Sync {
    /// Called exactly once per terminally failed query.
    fn notify(&self, error: &FetchError);
}

/// Sink that records failures to the tracing stream only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, error: &FetchError) {
        tracing::error!(
            target: observe::TARGET_PREFIX,
            error = %error,
            "query failed terminally"
        );
    }
}

struct CacheEntry {
    value: Box<dyn Any + Send + Sync>,
    fetched_at: Instant,
}

/// The process-wide query cache.
pub struct QueryCache {
    config: CachePolicyConfig,
    sink: Arc<dyn NotificationSink>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QueryCache {
    /// Create a cache with the given policy and notification sink.
    #[must_use]
    pub fn new(config: CachePolicyConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            config,
            sink,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cache with default policy, reporting terminal failures to the log.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CachePolicyConfig::default(), Arc::new(LogSink))
    }

    /// The active policy.
    #[must_use]
    pub const fn config(&self) -> &CachePolicyConfig {
        &self.config
    }

    /// Number of cached entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop one entry, forcing the next read to refetch.
    pub fn invalidate(&self, key: &str) {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .remove(key);
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }

    /// Serve `key` from cache if fresh, otherwise fetch under the retry
    /// policy and cache the result.
    ///
    /// The fetch closure is called once per attempt. An entry cached under
    /// the same key with a different type is treated as stale.
    ///
    /// # Errors
    ///
    /// The terminal [`FetchError`] after the retry policy is exhausted (or
    /// immediately for permanent errors). The sink has already been notified
    /// exactly once when this returns `Err`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn get_or_fetch<T, F>(&self, key: &str, mut fetch: F) -> Result<T, FetchError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut() -> Result<T, FetchError>,
    {
        if let Some(value) = self.lookup_fresh::<T>(key) {
            tracing::debug!(target: observe::TARGET_PREFIX, key, "cache hit");
            return Ok(value);
        }

        let mut attempt: u32 = 1;
        loop {
            match fetch() {
                Ok(value) => {
                    self.store(key, value.clone());
                    return Ok(value);
                }
                Err(error) if self.config.retry.should_retry(attempt, &error) => {
                    let backoff = self.config.retry.backoff_for_attempt(attempt);
                    tracing::debug!(
                        target: observe::TARGET_PREFIX,
                        key,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %error,
                        "transient fetch failure, retrying"
                    );
                    // Suspension happens at the I/O boundary; everything else
                    // in this crate stays non-blocking.
                    std::thread::sleep(backoff);
                    attempt += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        target: observe::TARGET_PREFIX,
                        key,
                        attempt,
                        error = %error,
                        "fetch failed terminally"
                    );
                    self.sink.notify(&error);
                    return Err(error);
                }
            }
        }
    }

    fn lookup_fresh<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        let entries = self.entries.lock().expect("cache lock poisoned");
        let entry = entries.get(key)?;
        if entry.fetched_at.elapsed() >= self.config.stale_time() {
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    fn store<T: Send + Sync + 'static>(&self, key: &str, value: T) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            key.to_owned(),
            CacheEntry {
                value: Box::new(value),
                fetched_at: Instant::now(),
            },
        );
    }
}
