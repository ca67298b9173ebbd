//! Cache error types

use thiserror::Error;

/// Errors that can occur during cache lifecycle and cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend configuration is invalid or incomplete
    #[error("Cache configuration error: {0}")]
    Configuration(String),

    /// The client implementation for the selected topology is not compiled in
    #[error(
        "Cannot use cache because the {topology} client is not available. \
         Rebuild with the `{feature}` feature enabled."
    )]
    MissingDependency {
        topology: &'static str,
        feature: &'static str,
    },

    /// Failed to connect to cache backend
    #[error("Cache connection error: {0}")]
    Connection(String),

    /// Failed to close the cache backend connection
    #[error("Cache disconnect error: {0}")]
    Disconnect(String),

    /// Operation attempted without a live connection
    #[error("Cache is not connected; call connect() first")]
    NotConnected,

    /// Failed to serialize a cache entry before writing it
    #[error("Cache serialization error: {0}")]
    Serialization(String),

    /// A stored value could not be decoded into a cache entry
    #[error("Corrupt cache entry under key '{key}': {source}")]
    CorruptEntry {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Generic backend error
    #[error("Cache backend error: {0}")]
    Backend(String),
}

impl CacheError {
    /// Configuration and missing-driver failures will not go away on retry
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::MissingDependency { .. }
        )
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
