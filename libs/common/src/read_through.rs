//! Read-through caching for "list all" queries
//!
//! A [`CachedCollection`] serves the full collection of one entity type from a
//! single cache key, falling back to the backing store on a miss and
//! repopulating the key with the configured TTL. Every mutation of the entity
//! must call [`CachedCollection::invalidate`] after the store write succeeds.
//!
//! A read that loaded the store before a concurrent write can still store its
//! snapshot after that write's invalidation. Such a stale snapshot lives at
//! most one TTL.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::{fmt, str::FromStr, sync::Arc};
use tracing::{debug, warn};

use crate::{cache::CacheStore, error::DatabaseResult};

/// Backing store for a cached collection
#[async_trait]
pub trait CollectionSource<T>: Send + Sync {
    /// Load every entity, in the order the collection should be served
    async fn fetch_all(&self) -> DatabaseResult<Vec<T>>;
}

/// Where a listing was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Cache,
    Store,
}

/// A collection together with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub provenance: Provenance,
}

/// What to do when deleting the cached snapshot fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidationPolicy {
    /// Log the failure; the stale snapshot expires with its TTL
    #[default]
    LogAndContinue,
    /// Propagate the failure to the mutating request
    Strict,
}

impl FromStr for InvalidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "log" | "log-and-continue" => Ok(InvalidationPolicy::LogAndContinue),
            "strict" => Ok(InvalidationPolicy::Strict),
            other => Err(format!("unknown invalidation policy '{}'", other)),
        }
    }
}

/// Encode a collection snapshot for storage in the cache
pub fn encode_snapshot<T: Serialize>(items: &[T]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(items)
}

/// Decode a snapshot produced by [`encode_snapshot`]
pub fn decode_snapshot<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<Vec<T>> {
    serde_json::from_slice(bytes)
}

/// Read-through cache controller for one entity collection
pub struct CachedCollection<T> {
    key: String,
    ttl_seconds: u64,
    policy: InvalidationPolicy,
    cache: Arc<dyn CacheStore>,
    source: Arc<dyn CollectionSource<T>>,
}

// Derived Clone would require `T: Clone`.
impl<T> Clone for CachedCollection<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            ttl_seconds: self.ttl_seconds,
            policy: self.policy,
            cache: Arc::clone(&self.cache),
            source: Arc::clone(&self.source),
        }
    }
}

impl<T> fmt::Debug for CachedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedCollection")
            .field("key", &self.key)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<T> CachedCollection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    /// Create a controller caching `source` under `key` for `ttl_seconds`
    pub fn new(
        key: impl Into<String>,
        ttl_seconds: u64,
        cache: Arc<dyn CacheStore>,
        source: Arc<dyn CollectionSource<T>>,
    ) -> Self {
        Self {
            key: key.into(),
            ttl_seconds,
            policy: InvalidationPolicy::default(),
            cache,
            source,
        }
    }

    /// Replace the invalidation failure policy
    pub fn with_policy(mut self, policy: InvalidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The cache key holding the snapshot
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Return the full collection, from the cache when a snapshot is present
    ///
    /// Cache failures never fail the read: an unreachable cache or an
    /// undecodable snapshot falls through to the store, and a failed
    /// repopulation is only logged. Store failures propagate.
    pub async fn list_all(&self) -> DatabaseResult<Listing<T>> {
        match self.cache.get(&self.key).await {
            Ok(Some(bytes)) => match decode_snapshot(&bytes) {
                Ok(items) => {
                    debug!("Cache hit for key '{}'", self.key);
                    return Ok(Listing {
                        items,
                        provenance: Provenance::Cache,
                    });
                }
                Err(e) => warn!("Discarding undecodable snapshot under '{}': {}", self.key, e),
            },
            Ok(None) => debug!("Cache miss for key '{}'", self.key),
            Err(e) => warn!("Cache read for '{}' failed, reading store: {}", self.key, e),
        }

        let items = self.source.fetch_all().await?;

        match encode_snapshot(&items) {
            Ok(bytes) => {
                if let Err(e) = self.cache.set(&self.key, &bytes, self.ttl_seconds).await {
                    warn!("Failed to populate cache key '{}': {}", self.key, e);
                }
            }
            Err(e) => warn!("Failed to encode snapshot for '{}': {}", self.key, e),
        }

        Ok(Listing {
            items,
            provenance: Provenance::Store,
        })
    }

    /// Drop the cached snapshot
    ///
    /// Under [`InvalidationPolicy::LogAndContinue`] this never fails.
    pub async fn invalidate(&self) -> Result<()> {
        match self.cache.delete(&self.key).await {
            Ok(()) => {
                debug!("Invalidated cache key '{}'", self.key);
                Ok(())
            }
            Err(e) => match self.policy {
                InvalidationPolicy::LogAndContinue => {
                    warn!(
                        "Failed to invalidate '{}', stale for at most {}s: {}",
                        self.key, self.ttl_seconds, e
                    );
                    Ok(())
                }
                InvalidationPolicy::Strict => Err(e.context(format!(
                    "failed to invalidate cache key '{}'",
                    self.key
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "log".parse::<InvalidationPolicy>(),
            Ok(InvalidationPolicy::LogAndContinue)
        );
        assert_eq!(
            "STRICT".parse::<InvalidationPolicy>(),
            Ok(InvalidationPolicy::Strict)
        );
        assert!("sometimes".parse::<InvalidationPolicy>().is_err());
    }

    #[test]
    fn test_empty_snapshot_is_an_empty_array() {
        let bytes = encode_snapshot::<u32>(&[]).unwrap();
        assert_eq!(bytes, b"[]");
        assert_eq!(decode_snapshot::<u32>(&bytes).unwrap(), Vec::<u32>::new());
    }
}
