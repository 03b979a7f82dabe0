//! User repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::info;

use super::UserStore;
use crate::models::{NewUser, User};

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_conflicting(
        &self,
        username: &str,
        email: &str,
        mobile: &str,
    ) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, first_name, last_name, email, mobile,
                   last_login, created_at, updated_at
            FROM users
            WHERE username = $1 OR email = $2 OR mobile = $3
            ORDER BY (username = $1) DESC, (email = $2) DESC
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(mobile)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, first_name, last_name, email, mobile,
                   last_login, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.username);

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, first_name, last_name, email, mobile)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, password_hash, first_name, last_name, email, mobile,
                      last_login, created_at, updated_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email)
        .bind(&new_user.mobile)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> DatabaseResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET last_login = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, username, password_hash, first_name, last_name, email, mobile,
                      last_login, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }
}
