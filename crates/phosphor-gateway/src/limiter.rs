use crate::store::CounterStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub remaining: u32,
}

/// Fixed-window limiter: the first request of an identity opens a window
/// of `window`, and at most `limit` requests are allowed inside it.
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, limit: u32, window: Duration) -> Self {
        Self {
            store,
            limit,
            window,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count one request for `identity`. A failing store lets the request
    /// through with the full limit reported.
    pub async fn check(&self, identity: &str) -> Decision {
        let key = format!("ratelimit:{identity}");
        let count = match self.store.incr(&key).await {
            Ok(n) => n,
            Err(e) => {
                warn!(identity, "rate limit store failed, allowing: {e}");
                return Decision {
                    allowed: true,
                    remaining: self.limit,
                };
            }
        };
        if count == 1 {
            if let Err(e) = self.store.expire(&key, self.window).await {
                warn!(identity, "could not set rate limit window: {e}");
            }
        }
        let limit = u64::from(self.limit);
        Decision {
            allowed: count <= limit,
            remaining: limit.saturating_sub(count) as u32,
        }
    }
}
