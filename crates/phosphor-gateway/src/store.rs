use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("counter store unavailable: {0}")]
    Unavailable(String),
}

/// Shared counters with expiry, the only state the rate limiter needs.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Add one to `key` and return the new count. A missing or expired key
    /// starts again from zero.
    async fn incr(&self, key: &str) -> Result<u64, StoreError>;

    /// Make `key` expire `ttl` from now.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy)]
struct Counter {
    count: u64,
    expires_at: Option<Instant>,
}

impl Counter {
    fn live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-process store. Increments hold the shard lock, so concurrent
/// requests for one key never lose a count.
#[derive(Debug, Default)]
pub struct MemoryStore {
    counters: DashMap<String, Counter>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired counters. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.counters.len();
        self.counters.retain(|_, c| c.live(now));
        before - self.counters.len()
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn incr(&self, key: &str) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut entry = self.counters.entry(key.to_string()).or_insert(Counter {
            count: 0,
            expires_at: None,
        });
        if !entry.live(now) {
            *entry = Counter {
                count: 0,
                expires_at: None,
            };
        }
        entry.count += 1;
        Ok(entry.count)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        if let Some(mut counter) = self.counters.get_mut(key) {
            counter.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }
}
