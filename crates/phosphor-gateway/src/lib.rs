pub mod config;
pub mod identity;
pub mod limiter;
pub mod routes;
pub mod store;
pub mod upstream;

pub use config::GatewayConfig;
pub use limiter::{Decision, RateLimiter};
pub use routes::{router, AppState};
pub use store::{CounterStore, MemoryStore, StoreError};
pub use upstream::{Assistant, OpenAiUpstream, UpstreamError};
