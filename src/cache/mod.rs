//! # Query Result Cache
//!
//! Caches the results of expensive read queries in Redis, keyed by a
//! caller-chosen identifier or by the literal query text.
//!
//! ## Architecture
//!
//! ```text
//! QueryResultCacheEngine<D>      <- key derivation, get/store/remove/clear
//!   ├── Clock                    <- write times + expiry checks
//!   └── BackendConnector<D>      <- owns the live handle, connect/disconnect
//!         └── D: BackendDriver   <- opens a CacheStore for a ResolvedTopology
//!               └── RedisCacheStore (enum)
//!                     ├── Single(ConnectionManager)    single / ported
//!                     └── Cluster(ClusterConnection)   cluster
//! ```
//!
//! ## Design Decisions
//!
//! - **Topology resolved once**: the config tag is turned into a
//!   `ResolvedTopology` at connect; stores dispatch by enum, no vtable
//! - **Native TTL**: every write carries `PX <duration>`, so the backend
//!   reclaims stale entries without a sweeper
//! - **Key expansion**: removing identifier `X` deletes `X`, `X-count` and
//!   `X-ids` in a single `DEL`
//! - **Errors surface**: backend failures are never reported as misses
//!
//! ## Usage
//!
//! ```rust,no_run
//! use query_result_cache::cache::{
//!     CacheLookup, CacheOptions, QueryResultCache, QueryResultCacheEngine,
//! };
//! use query_result_cache::config::BackendConfig;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), query_result_cache::cache::CacheError> {
//! let cache = QueryResultCacheEngine::new(BackendConfig::single("redis://localhost:6379"));
//! cache.connect().await?;
//!
//! let lookup = CacheLookup::by_identifier("active-users");
//! match cache.get_from_cache(&lookup, None).await? {
//!     Some(entry) if !cache.is_expired(&entry) => println!("hit: {}", entry.result),
//!     _ => {
//!         let rows = json!([{ "id": 1 }]); // run the real query here
//!         let options = CacheOptions::with_identifier("active-users", rows, 5_000);
//!         cache.store_in_cache(&options, None).await?;
//!     }
//! }
//!
//! cache.remove(&["active-users".to_string()], None).await?;
//! cache.disconnect().await?;
//! # Ok(())
//! # }
//! ```

pub mod connector;
pub mod engine;
pub mod entry;
pub mod errors;
pub mod expiry;
pub mod lifecycle;
pub mod providers;
pub mod topology;
pub mod traits;

pub use connector::BackendConnector;
pub use engine::QueryResultCacheEngine;
pub use entry::{
    decode_entry, encode_entry, invalidation_keys, CacheEntry, CacheLookup, CacheOptions,
    COUNT_KEY_SUFFIX, IDS_KEY_SUFFIX,
};
pub use errors::{CacheError, CacheResult};
pub use expiry::{is_expired_at, Clock, ManualClock, SystemClock};
pub use lifecycle::{QueryResultCache, QueryRunner};
pub use providers::{RedisCacheStore, RedisDriver};
pub use topology::{redact_url, ResolvedTopology};
pub use traits::{BackendDriver, CacheStore};
