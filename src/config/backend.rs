//! Backend connection descriptors
//!
//! A [`BackendConfig`] is built once, validated, and then handed to the
//! connector which consumes it only at `connect` time.
//!
//! ```toml
//! [backend]
//! type = "cluster"
//!
//! [backend.options]
//! startup_nodes = [{ host = "10.0.0.1", port = 7000 }, { host = "10.0.0.2", port = 7000 }]
//!
//! [backend.options.options]
//! password = "${REDIS_PASSWORD}"
//! response_timeout_ms = 500
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Default Redis port used when a descriptor leaves it unset
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Default host used when a descriptor leaves it unset
pub const DEFAULT_REDIS_HOST: &str = "127.0.0.1";

/// Backend topology descriptor, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// One instance addressed by URL and/or client options
    Single {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<ClientOptions>,
    },

    /// One instance addressed by port (host from options, else localhost)
    Ported {
        #[serde(deserialize_with = "number_or_text")]
        port: u16,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<ClientOptions>,
    },

    /// A Redis Cluster reached through one or more startup nodes
    Cluster {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<ClusterOptions>,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Single {
            url: None,
            options: None,
        }
    }
}

impl BackendConfig {
    /// Single instance at the given URL
    pub fn single(url: impl Into<String>) -> Self {
        Self::Single {
            url: Some(url.into()),
            options: None,
        }
    }

    /// Single instance on localhost at the given port
    pub fn ported(port: u16) -> Self {
        Self::Ported {
            port,
            options: None,
        }
    }

    /// Cluster seeded from an explicit node list
    pub fn cluster(startup_nodes: Vec<NodeDescriptor>) -> Self {
        Self::Cluster {
            options: Some(ClusterOptions::Nodes(startup_nodes)),
        }
    }

    /// Name of the topology kind, as used in the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Single { .. } => "single",
            Self::Ported { .. } => "ported",
            Self::Cluster { .. } => "cluster",
        }
    }
}

/// Cluster seed description: a bare node list or `{ startup_nodes, options }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClusterOptions {
    Nodes(Vec<NodeDescriptor>),
    Structured {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        startup_nodes: Option<Vec<NodeDescriptor>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<ClientOptions>,
    },
}

/// Address of a single Redis node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port", deserialize_with = "number_or_text")]
    pub port: u16,
}

impl NodeDescriptor {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `redis://host:port` form understood by the client
    pub fn to_url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    DEFAULT_REDIS_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_REDIS_PORT
}

/// Client options forwarded to the Redis driver
///
/// Timeouts are enforced by the client, not by the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_number_or_text"
    )]
    pub port: Option<u16>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_number_or_text"
    )]
    pub database: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_number_or_text"
    )]
    pub connection_timeout_ms: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_number_or_text"
    )]
    pub response_timeout_ms: Option<u64>,
}

/// Environment overrides arrive as text; files carry real numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

impl<T> NumberOrText<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn into_number<E: serde::de::Error>(self) -> Result<T, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|e| E::custom(format!("invalid number '{text}': {e}"))),
        }
    }
}

fn number_or_text<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    NumberOrText::<T>::deserialize(deserializer)?.into_number()
}

fn optional_number_or_text<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    Option::<NumberOrText<T>>::deserialize(deserializer)?
        .map(NumberOrText::into_number)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_single_without_target() {
        assert_eq!(
            BackendConfig::default(),
            BackendConfig::Single {
                url: None,
                options: None
            }
        );
        assert_eq!(BackendConfig::default().kind(), "single");
    }

    #[test]
    fn test_deserialize_ported() {
        let config: BackendConfig = serde_json::from_value(serde_json::json!({
            "type": "ported",
            "port": 6380,
            "options": { "host": "cache.internal", "database": 2 }
        }))
        .unwrap();

        match config {
            BackendConfig::Ported { port, options } => {
                assert_eq!(port, 6380);
                let options = options.unwrap();
                assert_eq!(options.host.as_deref(), Some("cache.internal"));
                assert_eq!(options.database, Some(2));
            }
            other => panic!("expected ported config, got {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_cluster_node_list() {
        let config: BackendConfig = serde_json::from_value(serde_json::json!({
            "type": "cluster",
            "options": [{ "host": "10.0.0.1", "port": 7000 }, { "host": "10.0.0.2" }]
        }))
        .unwrap();

        assert_eq!(
            config,
            BackendConfig::cluster(vec![
                NodeDescriptor::new("10.0.0.1", 7000),
                NodeDescriptor::new("10.0.0.2", DEFAULT_REDIS_PORT),
            ])
        );
    }

    #[test]
    fn test_deserialize_cluster_structured() {
        let config: BackendConfig = serde_json::from_value(serde_json::json!({
            "type": "cluster",
            "options": {
                "startup_nodes": [{ "host": "10.0.0.1", "port": 7000 }],
                "options": { "password": "secret" }
            }
        }))
        .unwrap();

        match config {
            BackendConfig::Cluster {
                options:
                    Some(ClusterOptions::Structured {
                        startup_nodes,
                        options,
                    }),
            } => {
                assert_eq!(startup_nodes.unwrap().len(), 1);
                assert_eq!(options.unwrap().password.as_deref(), Some("secret"));
            }
            other => panic!("expected structured cluster config, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: Result<BackendConfig, _> =
            serde_json::from_value(serde_json::json!({ "type": "sentinel-ish" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_numeric_fields_accept_text() {
        let config: BackendConfig = serde_json::from_value(serde_json::json!({
            "type": "ported",
            "port": "6381",
            "options": { "database": "3", "response_timeout_ms": " 250 ", "password": "0123" }
        }))
        .unwrap();

        match config {
            BackendConfig::Ported { port, options } => {
                let options = options.unwrap();
                assert_eq!(port, 6381);
                assert_eq!(options.database, Some(3));
                assert_eq!(options.response_timeout_ms, Some(250));
                assert_eq!(options.password.as_deref(), Some("0123"));
            }
            other => panic!("expected ported config, got {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_port_is_rejected() {
        let result: Result<BackendConfig, _> =
            serde_json::from_value(serde_json::json!({ "type": "ported", "port": "six" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_node_descriptor_url() {
        assert_eq!(
            NodeDescriptor::new("10.0.0.1", 7001).to_url(),
            "redis://10.0.0.1:7001"
        );
    }
}
