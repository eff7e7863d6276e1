//! Per-user fixed-window rate limiter guarding the expensive review endpoints.
//!
//! The store and the clock are injected so tests can use a fake clock and a fresh
//! store, and a shared external store can replace the in-memory one later. The
//! check-and-increment runs under one mutex, so concurrent requests on the
//! multi-threaded runtime cannot overshoot `max_requests`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window_ms: u64,
    pub max_requests: u32,
    /// Store size above which expired windows are swept.
    pub gc_threshold: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            max_requests: 5,
            gc_threshold: 1000,
        }
    }
}

/// One user's current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEntry {
    pub count: u32,
    pub reset_at_ms: u64,
}

pub trait RateLimitStore: Send {
    fn get(&self, key: &str) -> Option<WindowEntry>;
    fn set(&mut self, key: &str, entry: WindowEntry);
    /// Deletes every window that has expired at `now_ms`; returns how many.
    fn sweep(&mut self, now_ms: u64) -> usize;
    fn len(&self) -> usize;
}

#[derive(Default)]
pub struct InMemoryStore {
    windows: HashMap<String, WindowEntry>,
}

impl RateLimitStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<WindowEntry> {
        self.windows.get(key).copied()
    }

    fn set(&mut self, key: &str, entry: WindowEntry) {
        self.windows.insert(key.to_string(), entry);
    }

    fn sweep(&mut self, now_ms: u64) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, e| e.reset_at_ms > now_ms);
        before - self.windows.len()
    }

    fn len(&self) -> usize {
        self.windows.len()
    }
}

pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Milliseconds until the window resets.
    #[serde(rename = "resetIn")]
    pub reset_in_ms: u64,
}

pub struct RateLimiter {
    config: RateLimitConfig,
    store: Mutex<Box<dyn RateLimitStore>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, store: Box<dyn RateLimitStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            store: Mutex::new(store),
            clock,
        }
    }

    /// In-memory store on the system clock.
    pub fn in_memory(config: RateLimitConfig) -> Self {
        Self::new(config, Box::new(InMemoryStore::default()), Arc::new(SystemClock))
    }

    pub fn check(&self, user_id: &str) -> RateLimitDecision {
        let now = self.clock.now_ms();
        // A poisoned lock only means another check panicked; the map itself is intact.
        let mut store = self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if store.len() > self.config.gc_threshold {
            let removed = store.sweep(now);
            debug!(removed, remaining = store.len(), "rate limit store swept");
        }

        let max = self.config.max_requests;
        match store.get(user_id) {
            Some(entry) if now < entry.reset_at_ms => {
                let reset_in_ms = entry.reset_at_ms - now;
                if entry.count >= max {
                    warn!(user_id, reset_in_ms, "rate limit exceeded");
                    return RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        reset_in_ms,
                    };
                }
                let count = entry.count + 1;
                store.set(
                    user_id,
                    WindowEntry {
                        count,
                        reset_at_ms: entry.reset_at_ms,
                    },
                );
                RateLimitDecision {
                    allowed: true,
                    remaining: max - count,
                    reset_in_ms,
                }
            }
            _ => {
                store.set(
                    user_id,
                    WindowEntry {
                        count: 1,
                        reset_at_ms: now + self.config.window_ms,
                    },
                );
                RateLimitDecision {
                    allowed: max > 0,
                    remaining: max.saturating_sub(1),
                    reset_in_ms: self.config.window_ms,
                }
            }
        }
    }
}
