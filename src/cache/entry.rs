//! Cache entries, lookups and their wire encoding
//!
//! Each logical entry is stored as one JSON string value:
//!
//! ```json
//! {"identifier":"users-active","time":1730000000000,"duration":5000,"result":[...]}
//! ```
//!
//! `query` is written instead of (or alongside) `identifier` when the entry is
//! keyed by query text.

use super::errors::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Suffix of the physical key holding a count-query variant
pub const COUNT_KEY_SUFFIX: &str = "-count";

/// Suffix of the physical key holding a paginated id-list variant
pub const IDS_KEY_SUFFIX: &str = "-ids";

/// A stored query result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Write time in milliseconds since the Unix epoch, stamped by the cache
    pub time: i64,
    /// Time to live in milliseconds
    pub duration: u64,
    #[serde(default)]
    pub result: Value,
}

impl CacheEntry {
    /// Physical key this entry is stored under
    pub fn key(&self) -> Option<&str> {
        derive_key(self.identifier.as_deref(), self.query.as_deref())
    }

    /// Millisecond timestamp after which the entry is stale
    pub fn expires_at(&self) -> i64 {
        let duration = i64::try_from(self.duration).unwrap_or(i64::MAX);
        self.time.saturating_add(duration)
    }
}

/// Input to a store operation
///
/// Carries no write time; the cache stamps it on store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Time to live in milliseconds
    pub duration: u64,
    #[serde(default)]
    pub result: Value,
}

impl CacheOptions {
    /// Options keyed by a caller-chosen identifier
    pub fn with_identifier(identifier: impl Into<String>, result: Value, duration: u64) -> Self {
        Self {
            identifier: Some(identifier.into()),
            query: None,
            duration,
            result,
        }
    }

    /// Options keyed by the literal query text
    pub fn with_query(query: impl Into<String>, result: Value, duration: u64) -> Self {
        Self {
            identifier: None,
            query: Some(query.into()),
            duration,
            result,
        }
    }

    /// Attach the query text as well, keeping an identifier as the key
    pub fn and_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn key(&self) -> Option<&str> {
        derive_key(self.identifier.as_deref(), self.query.as_deref())
    }

    /// Build the stored entry with the given write time
    pub fn into_entry(self, time: i64) -> CacheEntry {
        CacheEntry {
            identifier: self.identifier,
            query: self.query,
            time,
            duration: self.duration,
            result: self.result,
        }
    }
}

/// Input to a read operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheLookup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl CacheLookup {
    pub fn by_identifier(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            query: None,
        }
    }

    pub fn by_query(query: impl Into<String>) -> Self {
        Self {
            identifier: None,
            query: Some(query.into()),
        }
    }

    /// A lookup with nothing to key by; always a miss
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&str> {
        derive_key(self.identifier.as_deref(), self.query.as_deref())
    }
}

impl From<&CacheOptions> for CacheLookup {
    fn from(options: &CacheOptions) -> Self {
        Self {
            identifier: options.identifier.clone(),
            query: options.query.clone(),
        }
    }
}

/// Identifier first, then query text; empty strings do not count as keys
fn derive_key<'a>(identifier: Option<&'a str>, query: Option<&'a str>) -> Option<&'a str> {
    identifier
        .filter(|id| !id.is_empty())
        .or_else(|| query.filter(|q| !q.is_empty()))
}

/// Every physical key a logical identifier may be stored under
///
/// Order is stable: for each identifier the plain, count, then id-list key.
pub fn invalidation_keys<S: AsRef<str>>(identifiers: &[S]) -> Vec<String> {
    identifiers
        .iter()
        .flat_map(|id| {
            let id = id.as_ref();
            [
                id.to_string(),
                format!("{id}{COUNT_KEY_SUFFIX}"),
                format!("{id}{IDS_KEY_SUFFIX}"),
            ]
        })
        .collect()
}

/// Serialize an entry to the stored JSON string
pub fn encode_entry(entry: &CacheEntry) -> CacheResult<String> {
    serde_json::to_string(entry).map_err(|e| CacheError::Serialization(e.to_string()))
}

/// Decode a stored value; absent, empty and `null` values are misses
pub fn decode_entry(key: &str, raw: Option<&str>) -> CacheResult<Option<CacheEntry>> {
    let raw = match raw.map(str::trim) {
        None | Some("") | Some("null") => return Ok(None),
        Some(raw) => raw,
    };

    serde_json::from_str(raw)
        .map(Some)
        .map_err(|source| CacheError::CorruptEntry {
            key: key.to_string(),
            source,
        })
}
