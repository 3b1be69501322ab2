//! In-process read-through cache for posts.
//!
//! Entries are stored as serialized JSON with an absolute expiry and evicted least-recently-used
//! once the configured capacity is reached. Behavior is controlled via the `[cache]` section:
//!
//! ```toml
//! [cache]
//! capacity = 1000
//! ttl_seconds = 300
//! ```

mod config;
mod lock;
mod store;

pub use config::CacheConfig;
pub use store::PostCacheStore;
