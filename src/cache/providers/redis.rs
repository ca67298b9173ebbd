//! Redis cache store
//!
//! Single and ported topologies use `redis::aio::ConnectionManager` for async
//! multiplexed connections with automatic reconnection. Clustered topologies
//! use `redis::cluster_async::ClusterConnection` and require the
//! `cache-redis-cluster` feature.

use crate::cache::errors::{CacheError, CacheResult};
use crate::cache::topology::{redact_url, ResolvedTopology};
use crate::cache::traits::{BackendDriver, CacheStore};
use crate::config::ClientOptions;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{ConnectionInfo, FromRedisValue, IntoConnectionInfo};
use std::time::Duration;
use tracing::debug;

/// Opens Redis connections for resolved topologies
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisDriver;

impl BackendDriver for RedisDriver {
    type Store = RedisCacheStore;

    async fn open(&self, topology: &ResolvedTopology) -> CacheResult<RedisCacheStore> {
        match topology {
            ResolvedTopology::Single { .. } | ResolvedTopology::Ported { .. } => {
                open_single(topology).await
            }
            ResolvedTopology::Cluster { .. } => open_cluster(topology).await,
        }
    }
}

/// Live Redis connection handle
#[derive(Clone)]
pub enum RedisCacheStore {
    Single(ConnectionManager),
    #[cfg(feature = "cache-redis-cluster")]
    Cluster(redis::cluster_async::ClusterConnection),
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(_) => f
                .debug_tuple("RedisCacheStore::Single")
                .field(&"ConnectionManager")
                .finish(),
            #[cfg(feature = "cache-redis-cluster")]
            Self::Cluster(_) => f
                .debug_tuple("RedisCacheStore::Cluster")
                .field(&"ClusterConnection")
                .finish(),
        }
    }
}

impl RedisCacheStore {
    async fn query<T: FromRedisValue>(&self, cmd: &redis::Cmd) -> redis::RedisResult<T> {
        match self {
            Self::Single(manager) => {
                let mut conn = manager.clone();
                cmd.query_async(&mut conn).await
            }
            #[cfg(feature = "cache-redis-cluster")]
            Self::Cluster(cluster) => {
                let mut conn = cluster.clone();
                cmd.query_async(&mut conn).await
            }
        }
    }
}

impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let result: Option<String> = self
            .query(redis::cmd("GET").arg(key))
            .await
            .map_err(|e| CacheError::Backend(format!("Redis GET failed: {}", e)))?;

        if result.is_some() {
            debug!(key = key, "Cache HIT");
        } else {
            debug!(key = key, "Cache MISS");
        }

        Ok(result)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let ttl_millis = px_millis(ttl);

        self.query::<()>(
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("PX")
                .arg(ttl_millis),
        )
        .await
        .map_err(|e| CacheError::Backend(format!("Redis SET failed: {}", e)))?;

        debug!(key = key, ttl_millis = ttl_millis, "Cache SET");
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let deleted: u64 = self
            .query(redis::cmd("DEL").arg(keys))
            .await
            .map_err(|e| CacheError::Backend(format!("Redis DEL (batch) failed: {}", e)))?;

        debug!(keys = keys.len(), deleted = deleted, "Cache DEL");
        Ok(deleted)
    }

    async fn flush(&self) -> CacheResult<()> {
        self.query::<()>(&redis::cmd("FLUSHDB"))
            .await
            .map_err(|e| CacheError::Backend(format!("Redis FLUSHDB failed: {}", e)))?;

        debug!("Cache FLUSHDB");
        Ok(())
    }

    async fn quit(&self) -> CacheResult<()> {
        match self {
            Self::Single(_) => self
                .query::<()>(&redis::cmd("QUIT"))
                .await
                .map_err(|e| CacheError::Disconnect(format!("Redis QUIT failed: {}", e))),
            // Cluster node connections close when the last handle is dropped
            #[cfg(feature = "cache-redis-cluster")]
            Self::Cluster(_) => Ok(()),
        }
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let pong: String = self
            .query(&redis::cmd("PING"))
            .await
            .map_err(|e| CacheError::Backend(format!("Redis PING failed: {}", e)))?;

        Ok(pong == "PONG")
    }

    fn provider_name(&self) -> &'static str {
        match self {
            Self::Single(_) => "redis",
            #[cfg(feature = "cache-redis-cluster")]
            Self::Cluster(_) => "redis-cluster",
        }
    }
}

/// Largest `PX` sent to the server
///
/// Redis rejects expiries that overflow `i64` once added to its clock, so
/// longer TTLs are capped here (still millions of years).
pub const MAX_PX_MILLIS: u64 = i64::MAX as u64 / 2;

/// `PX` argument for a TTL: at least 1 (PX 0 is rejected), at most [`MAX_PX_MILLIS`]
pub fn px_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis())
        .unwrap_or(u64::MAX)
        .clamp(1, MAX_PX_MILLIS)
}

/// Build connection info from a URL, overlaid with explicit client options
pub fn connection_info(url: &str, options: &ClientOptions) -> CacheResult<ConnectionInfo> {
    let mut info = url.into_connection_info().map_err(|e| {
        CacheError::Configuration(format!("Invalid Redis URL '{}': {}", redact_url(url), e))
    })?;

    if let Some(database) = options.database {
        info.redis.db = database;
    }
    if let Some(username) = &options.username {
        info.redis.username = Some(username.clone());
    }
    if let Some(password) = &options.password {
        info.redis.password = Some(password.clone());
    }

    Ok(info)
}

async fn open_single(topology: &ResolvedTopology) -> CacheResult<RedisCacheStore> {
    let options = topology.client_options();
    let endpoint = topology.endpoints().into_iter().next().ok_or_else(|| {
        CacheError::Configuration("No endpoint resolved for single topology".to_string())
    })?;

    let client = redis::Client::open(connection_info(&endpoint, options)?).map_err(|e| {
        CacheError::Connection(format!("Failed to create Redis client: {}", e))
    })?;

    let mut manager_config = ConnectionManagerConfig::new();
    if let Some(ms) = options.connection_timeout_ms {
        manager_config = manager_config.set_connection_timeout(Duration::from_millis(ms));
    }
    if let Some(ms) = options.response_timeout_ms {
        manager_config = manager_config.set_response_timeout(Duration::from_millis(ms));
    }

    let manager = ConnectionManager::new_with_config(client, manager_config)
        .await
        .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {}", e)))?;

    debug!(
        url = %redact_url(&endpoint),
        topology = topology.name(),
        "Redis cache store connected"
    );

    Ok(RedisCacheStore::Single(manager))
}

#[cfg(feature = "cache-redis-cluster")]
async fn open_cluster(topology: &ResolvedTopology) -> CacheResult<RedisCacheStore> {
    let options = topology.client_options();
    let endpoints = topology.endpoints();
    let nodes = endpoints
        .iter()
        .map(|url| connection_info(url, options))
        .collect::<CacheResult<Vec<_>>>()?;

    let mut builder = redis::cluster::ClusterClientBuilder::new(nodes);
    if let Some(username) = &options.username {
        builder = builder.username(username.clone());
    }
    if let Some(password) = &options.password {
        builder = builder.password(password.clone());
    }
    if let Some(ms) = options.connection_timeout_ms {
        builder = builder.connection_timeout(Duration::from_millis(ms));
    }
    if let Some(ms) = options.response_timeout_ms {
        builder = builder.response_timeout(Duration::from_millis(ms));
    }

    let client = builder.build().map_err(|e| {
        CacheError::Connection(format!("Failed to create Redis cluster client: {}", e))
    })?;

    let connection = client.get_async_connection().await.map_err(|e| {
        CacheError::Connection(format!("Failed to connect to Redis cluster: {}", e))
    })?;

    debug!(
        startup_nodes = %topology.redacted_endpoints().join(","),
        "Redis cluster cache store connected"
    );

    Ok(RedisCacheStore::Cluster(connection))
}

#[cfg(not(feature = "cache-redis-cluster"))]
async fn open_cluster(_topology: &ResolvedTopology) -> CacheResult<RedisCacheStore> {
    Err(CacheError::MissingDependency {
        topology: "cluster",
        feature: "cache-redis-cluster",
    })
}
