//! Configuration Loader
//!
//! Layers an optional TOML file under `QUERY_CACHE__*` environment overrides
//! using the `config` crate, then validates the merged result.
//!
//! Environment keys use `__` as the nesting separator, e.g.
//! `QUERY_CACHE__BACKEND__TYPE=cluster`. Values are kept as text so that
//! passwords like `123456` survive; numeric fields parse text themselves.

use super::error::{ConfigResult, ConfigurationError};
use super::QueryCacheConfig;
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "QUERY_CACHE_CONFIG_PATH";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "QUERY_CACHE";

/// Loads [`QueryCacheConfig`] from file and environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load using `QUERY_CACHE_CONFIG_PATH` (if set) plus process environment
    pub fn load_from_env() -> ConfigResult<QueryCacheConfig> {
        let path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load(path.as_deref())
    }

    /// Load an optional file plus process environment
    pub fn load(path: Option<&Path>) -> ConfigResult<QueryCacheConfig> {
        Self::load_with_env(path, None)
    }

    /// Load an optional file plus an explicit environment map
    ///
    /// Passing `Some(map)` replaces the process environment as the override
    /// source, which keeps tests independent of global state.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> ConfigResult<QueryCacheConfig> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigurationError::ConfigFileNotFound {
                    path: path.to_path_buf(),
                });
            }
            debug!(path = %path.display(), "Loading query cache configuration file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .source(env),
        );

        let settings = builder
            .build()
            .map_err(|e| ConfigurationError::SourceError {
                error: e.to_string(),
            })?;

        let config: QueryCacheConfig =
            settings
                .try_deserialize()
                .map_err(|e| ConfigurationError::DeserializationError {
                    error: e.to_string(),
                })?;

        config.validate()?;
        config.log_configuration();

        Ok(config)
    }
}
