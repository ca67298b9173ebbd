//! Backend store and driver traits
//!
//! A [`BackendDriver`] opens a [`CacheStore`] for a resolved topology. The
//! store is the live connection handle: cheap to clone and safe to use from
//! many tasks at once.

use super::errors::CacheResult;
use super::topology::ResolvedTopology;
use std::time::Duration;

/// Raw key-value operations the cache needs from a backend
///
/// All operations are async and return `CacheResult` for error handling.
/// Every method maps to a single network round trip.
pub trait CacheStore: Clone + Send + Sync + 'static {
    /// Get a value by key
    ///
    /// Returns `Ok(Some(value))` on hit, `Ok(None)` when the key is absent.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = CacheResult<Option<String>>> + Send;

    /// Set a value with a native millisecond expiry
    fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Delete all given keys in one command, returning how many existed
    fn delete_many(
        &self,
        keys: &[String],
    ) -> impl std::future::Future<Output = CacheResult<u64>> + Send;

    /// Remove every key in the backend namespace
    fn flush(&self) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Close the connection gracefully
    fn quit(&self) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Check if the cache backend is healthy
    fn health_check(&self) -> impl std::future::Future<Output = CacheResult<bool>> + Send;

    /// Get the name of the store implementation
    fn provider_name(&self) -> &'static str;
}

/// Opens stores for resolved topologies
pub trait BackendDriver: Send + Sync + 'static {
    type Store: CacheStore;

    /// Establish a connection for `topology`
    ///
    /// Fails with `MissingDependency` when the client for this topology is
    /// not available, and with `Connection` on network failure.
    fn open(
        &self,
        topology: &ResolvedTopology,
    ) -> impl std::future::Future<Output = CacheResult<Self::Store>> + Send;
}
