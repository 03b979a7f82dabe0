//! Common library for the catalog backend
//!
//! This crate provides shared functionality used by the services: database
//! connectivity, cache backends, the read-through collection cache, and
//! error handling.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use common::cache::{RedisConfig, RedisPool};
//! use common::read_through::{CachedCollection, CollectionSource};
//!
//! async fn wire<T>(source: Arc<dyn CollectionSource<T>>) -> anyhow::Result<CachedCollection<T>>
//! where
//!     T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
//! {
//!     let redis = RedisPool::new(&RedisConfig::from_env()?).await?;
//!     Ok(CachedCollection::new("things:all", 60, Arc::new(redis), source))
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
pub mod read_through;
