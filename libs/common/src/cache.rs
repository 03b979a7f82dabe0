//! Cache backends for the catalog backend
//!
//! This module defines the [`CacheStore`] key-value interface and two
//! implementations: a Redis-backed [`RedisPool`] and an in-process
//! [`MemoryCache`]. Values are opaque byte payloads; callers own the encoding.

use anyhow::Result;
use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{sync::Mutex, time::Instant};
use tracing::info;

/// Key-value cache with per-entry expiry
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the payload stored under `key`, or `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key` for `ttl_seconds`
    async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<()>;

    /// Remove `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL. When unset the URL is assembled from
    ///   `REDIS_HOST` (default: "127.0.0.1"), `REDIS_PORT` (default: 6379) and
    ///   the optional `REDIS_PASSWORD`
    pub fn from_env() -> Result<Self> {
        if let Ok(url) = std::env::var("REDIS_URL") {
            return Ok(RedisConfig { url });
        }

        let host = std::env::var("REDIS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("REDIS_PORT")
            .unwrap_or_else(|_| "6379".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid REDIS_PORT: {}", e))?;

        let url = match std::env::var("REDIS_PASSWORD") {
            Ok(password) if !password.is_empty() => {
                format!("redis://:{}@{}:{}", password, host, port)
            }
            _ => format!("redis://{}:{}", host, port),
        };

        Ok(RedisConfig { url })
    }
}

/// Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    /// Initialize a new Redis connection pool
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized");
        Ok(RedisPool { client })
    }

    /// Get a connection from the pool
    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

#[async_trait]
impl CacheStore for RedisPool {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.get_connection().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<()> {
        let mut conn = self.get_connection().await?;
        // SETEX rejects a zero expiry
        let _: () = conn.set_ex(key, value, ttl_seconds.max(1)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn.del(key).await?;
        Ok(())
    }
}

/// In-process cache for single-node deployments
///
/// Expiry is measured on the tokio clock, so paused-time tests can advance
/// past a TTL without sleeping. A TTL too large for the clock never expires.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, (Vec<u8>, Option<Instant>)>>>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        match entries.get(key) {
            Some((value, expires_at)) if expires_at.is_none_or(|at| now < at) => {
                Ok(Some(value.clone()))
            }
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<()> {
        let expires_at = Instant::now().checked_add(Duration::from_secs(ttl_seconds));
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value.to_vec(), expires_at));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
