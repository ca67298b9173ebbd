//! # Query Result Cache Configuration
//!
//! The cache is configured by a single [`QueryCacheConfig`] whose only required
//! part is the backend descriptor. Configuration is read from an optional TOML
//! file and then overridden from `QUERY_CACHE__*` environment variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use query_result_cache::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // QUERY_CACHE_CONFIG_PATH=config/cache.toml
//! // QUERY_CACHE__BACKEND__TYPE=ported QUERY_CACHE__BACKEND__PORT=6380
//! let config = ConfigLoader::load_from_env()?;
//! println!("cache backend: {}", config.backend.kind());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::topology::ResolvedTopology;

pub use backend::{
    BackendConfig, ClientOptions, ClusterOptions, NodeDescriptor, DEFAULT_REDIS_HOST,
    DEFAULT_REDIS_PORT,
};
pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

/// Root configuration for the query result cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryCacheConfig {
    /// Backend topology and connection options
    pub backend: BackendConfig,
}

impl QueryCacheConfig {
    pub fn new(backend: BackendConfig) -> Self {
        Self { backend }
    }

    /// Apply the same checks `connect` performs, without touching the network
    pub fn validate(&self) -> ConfigResult<()> {
        ResolvedTopology::resolve(&self.backend).map(|_| ())
    }

    /// Log current configuration with credentials masked
    pub fn log_configuration(&self) {
        match ResolvedTopology::resolve(&self.backend) {
            Ok(topology) => info!(
                topology = topology.name(),
                endpoints = %topology.redacted_endpoints().join(","),
                "Query cache configuration"
            ),
            Err(e) => info!(
                topology = self.backend.kind(),
                error = %e,
                "Query cache configuration (invalid)"
            ),
        }
    }
}
