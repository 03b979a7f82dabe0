//! Service configuration

use anyhow::Result;
use common::read_through::InvalidationPolicy;
use std::str::FromStr;

/// Which cache backend holds the product snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Lifetime of the cached product snapshot in seconds
    pub cache_ttl_seconds: u64,
    /// What to do when snapshot invalidation fails
    pub invalidation_policy: InvalidationPolicy,
    /// Cache backend
    pub cache_backend: CacheBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cache_ttl_seconds: 60,
            invalidation_policy: InvalidationPolicy::LogAndContinue,
            cache_backend: CacheBackend::Redis,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `HOST`: Bind address (default: "0.0.0.0")
    /// - `PORT`: Listen port (default: 5000)
    /// - `CACHE_TTL_SECONDS`, falling back to `REDIS_CACHE_TTL`: snapshot TTL (default: 60)
    /// - `CACHE_INVALIDATION`: "log" or "strict" (default: "log")
    /// - `CACHE_BACKEND`: "redis" or "memory" (default: "redis")
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or(defaults.host);

        let port = match std::env::var("PORT") {
            Ok(port) => port
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT '{}': {}", port, e))?,
            Err(_) => defaults.port,
        };

        let cache_ttl_seconds = std::env::var("CACHE_TTL_SECONDS")
            .or_else(|_| std::env::var("REDIS_CACHE_TTL"))
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|ttl| *ttl > 0)
            .unwrap_or(defaults.cache_ttl_seconds);

        let invalidation_policy = match std::env::var("CACHE_INVALIDATION") {
            Ok(policy) => policy.parse().map_err(|e: String| anyhow::anyhow!(e))?,
            Err(_) => defaults.invalidation_policy,
        };

        let cache_backend = match std::env::var("CACHE_BACKEND") {
            Ok(backend) => backend.parse().map_err(|e: String| anyhow::anyhow!(e))?,
            Err(_) => defaults.cache_backend,
        };

        Ok(AppConfig {
            host,
            port,
            cache_ttl_seconds,
            invalidation_policy,
            cache_backend,
        })
    }

    /// Socket address to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
