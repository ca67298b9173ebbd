//! Uniform query result cache contract
//!
//! The same lifecycle is shared by every query-result cache backend so the
//! execution layer can drive them interchangeably. Key-value backends ignore
//! the query runner and need no schema synchronization.

use super::entry::{CacheEntry, CacheLookup, CacheOptions};
use super::errors::CacheResult;

/// Execution context handed through every cache operation
///
/// Table-backed caches use it to run statements against their cache table;
/// key-value backends accept and ignore it.
pub trait QueryRunner: Send + Sync {}

/// Lifecycle and operations of a query result cache
pub trait QueryResultCache: Send + Sync {
    /// Open the backend connection
    fn connect(&self) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Close the backend connection; a no-op when not connected
    fn disconnect(&self) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Provision backend structures (tables etc.) if the backend needs any
    fn synchronize(
        &self,
        runner: Option<&dyn QueryRunner>,
    ) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Read a cached entry by identifier, else by query text
    ///
    /// Returns `Ok(None)` on miss, and without a backend call when the lookup
    /// has neither an identifier nor a query.
    fn get_from_cache(
        &self,
        lookup: &CacheLookup,
        runner: Option<&dyn QueryRunner>,
    ) -> impl std::future::Future<Output = CacheResult<Option<CacheEntry>>> + Send;

    /// Whether a retrieved entry is stale
    fn is_expired(&self, entry: &CacheEntry) -> bool;

    /// Store a query result; a no-op when there is nothing to key by
    fn store_in_cache(
        &self,
        options: &CacheOptions,
        runner: Option<&dyn QueryRunner>,
    ) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Invalidate every physical form of the given logical identifiers
    fn remove(
        &self,
        identifiers: &[String],
        runner: Option<&dyn QueryRunner>,
    ) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Remove every cached entry
    fn clear(
        &self,
        runner: Option<&dyn QueryRunner>,
    ) -> impl std::future::Future<Output = CacheResult<()>> + Send;
}
