#![allow(clippy::doc_markdown)] // Allow technical terms like FLUSHDB, ConnectionManager in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Query Result Cache
//!
//! Redis-backed cache for the results of expensive read queries.
//!
//! ## Overview
//!
//! Results are stored under an explicit identifier or, failing that, the
//! literal query text, with a caller-supplied time to live. Entries can be
//! invalidated per identifier (all of its plain/count/id-list forms at once)
//! or flushed wholesale. The backend may be a single Redis node or a cluster.
//!
//! ## Module Organization
//!
//! - [`cache`] - Engine, connector, entry codec, expiry policy, Redis store
//! - [`config`] - Backend descriptors and the file/environment loader
//! - [`logging`] - Structured logging initialization
//!
//! ## Testing
//!
//! ```bash
//! cargo test                          # Unit and in-memory tests
//! cargo test --features test-services # Also against REDIS_URL
//! ```

pub mod cache;
pub mod config;
pub mod logging;

pub use cache::{
    BackendConnector, BackendDriver, CacheEntry, CacheError, CacheLookup, CacheOptions,
    CacheResult, CacheStore, Clock, ManualClock, QueryResultCache, QueryResultCacheEngine,
    QueryRunner, RedisDriver, ResolvedTopology, SystemClock,
};
pub use config::{
    BackendConfig, ClientOptions, ClusterOptions, ConfigLoader, ConfigurationError,
    NodeDescriptor, QueryCacheConfig,
};
