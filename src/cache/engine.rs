//! Result cache engine
//!
//! Stateless between calls: entries live only in the backend, and the live
//! connection is owned by the [`BackendConnector`]. Read-check-refresh is not
//! atomic; two callers that both miss will both store, and the last write
//! wins.

use super::connector::BackendConnector;
use super::entry::{
    decode_entry, encode_entry, invalidation_keys, CacheEntry, CacheLookup, CacheOptions,
};
use super::errors::CacheResult;
use super::expiry::{is_expired_at, Clock, SystemClock};
use super::lifecycle::{QueryResultCache, QueryRunner};
use super::providers::RedisDriver;
use super::traits::{BackendDriver, CacheStore};
use crate::config::{BackendConfig, QueryCacheConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Query result cache over a key-value backend
pub struct QueryResultCacheEngine<D: BackendDriver = RedisDriver> {
    connector: BackendConnector<D>,
    clock: Arc<dyn Clock>,
}

impl<D: BackendDriver> std::fmt::Debug for QueryResultCacheEngine<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResultCacheEngine")
            .field("connector", &self.connector)
            .field("clock", &self.clock)
            .finish()
    }
}

impl QueryResultCacheEngine<RedisDriver> {
    /// Redis-backed engine for the given topology
    pub fn new(backend: BackendConfig) -> Self {
        Self::with_driver(backend, RedisDriver)
    }

    pub fn from_config(config: &QueryCacheConfig) -> Self {
        Self::new(config.backend.clone())
    }
}

impl<D: BackendDriver> QueryResultCacheEngine<D> {
    pub fn with_driver(backend: BackendConfig, driver: D) -> Self {
        Self {
            connector: BackendConnector::new(backend, driver),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for write times and expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.connector.is_connected()
    }

    /// Ping the backend
    pub async fn health_check(&self) -> CacheResult<bool> {
        self.connector.handle()?.health_check().await
    }

    /// Name of the connected store, if any
    pub fn provider_name(&self) -> Option<&'static str> {
        self.connector
            .handle()
            .ok()
            .map(|store| store.provider_name())
    }
}

impl<D: BackendDriver> QueryResultCache for QueryResultCacheEngine<D> {
    async fn connect(&self) -> CacheResult<()> {
        self.connector.connect().await
    }

    async fn disconnect(&self) -> CacheResult<()> {
        self.connector.disconnect().await
    }

    async fn synchronize(&self, _runner: Option<&dyn QueryRunner>) -> CacheResult<()> {
        // Schema-less store, nothing to provision
        Ok(())
    }

    async fn get_from_cache(
        &self,
        lookup: &CacheLookup,
        _runner: Option<&dyn QueryRunner>,
    ) -> CacheResult<Option<CacheEntry>> {
        let Some(key) = lookup.key() else {
            return Ok(None);
        };

        let store = self.connector.handle()?;
        let raw = store.get(key).await?;
        decode_entry(key, raw.as_deref())
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        is_expired_at(entry, self.clock.now_millis())
    }

    async fn store_in_cache(
        &self,
        options: &CacheOptions,
        _runner: Option<&dyn QueryRunner>,
    ) -> CacheResult<()> {
        let Some(key) = options.key() else {
            debug!("Skipping cache store without identifier or query");
            return Ok(());
        };

        let store = self.connector.handle()?;
        let entry = options.clone().into_entry(self.clock.now_millis());
        let value = encode_entry(&entry)?;

        store
            .set_with_expiry(key, &value, Duration::from_millis(entry.duration))
            .await
    }

    async fn remove(
        &self,
        identifiers: &[String],
        _runner: Option<&dyn QueryRunner>,
    ) -> CacheResult<()> {
        if identifiers.is_empty() {
            return Ok(());
        }

        let store = self.connector.handle()?;
        let keys = invalidation_keys(identifiers);
        let deleted = store.delete_many(&keys).await?;

        debug!(
            identifiers = identifiers.len(),
            keys = keys.len(),
            deleted = deleted,
            "Invalidated cached query results"
        );
        Ok(())
    }

    /// Flushes the whole backend database, including keys this engine did
    /// not write when the keyspace is shared.
    async fn clear(&self, _runner: Option<&dyn QueryRunner>) -> CacheResult<()> {
        let store = self.connector.handle()?;
        warn!(
            topology = self.connector.topology_name(),
            "Flushing every key in the query result cache backend"
        );
        store.flush().await
    }
}
