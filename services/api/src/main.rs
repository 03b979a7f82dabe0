use std::sync::Arc;

use anyhow::Result;
use catalog_api::{
    AppState, PRODUCTS_CACHE_KEY,
    config::{AppConfig, CacheBackend},
    create_router,
    jwt::{JwtConfig, JwtService},
    models::Product,
    repositories::{ProductRepository, UserRepository},
};
use common::{
    cache::{CacheStore, MemoryCache, RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool},
    error::DatabaseError,
    read_through::CachedCollection,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting catalog API service");

    let app_config = AppConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    info!("Database migrations applied");

    let cache: Arc<dyn CacheStore> = match app_config.cache_backend {
        CacheBackend::Redis => {
            let redis_config = RedisConfig::from_env()?;
            let redis_pool = RedisPool::new(&redis_config).await?;
            match redis_pool.health_check().await {
                Ok(true) => info!("Redis connection successful"),
                // The catalog still serves from the database without a cache
                Ok(false) | Err(_) => warn!("Redis is unreachable; product reads will hit the database"),
            }
            Arc::new(redis_pool)
        }
        CacheBackend::Memory => {
            info!("Using in-process cache");
            Arc::new(MemoryCache::new())
        }
    };

    let jwt_service = JwtService::new(JwtConfig::from_env()?);

    let products = Arc::new(ProductRepository::new(pool.clone()));
    let catalog = CachedCollection::<Product>::new(
        PRODUCTS_CACHE_KEY,
        app_config.cache_ttl_seconds,
        cache,
        products.clone(),
    )
    .with_policy(app_config.invalidation_policy);

    let app_state = AppState {
        users: Arc::new(UserRepository::new(pool)),
        products,
        catalog,
        jwt_service,
    };

    // Start the web server
    let app = create_router(app_state);

    let address = app_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Catalog API service listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Catalog API service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
