//! Repositories for database operations
//!
//! Handlers depend on the [`UserStore`] and [`ProductStore`] traits; the
//! PostgreSQL implementations live in the submodules.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::DatabaseResult;

use crate::models::{NewProduct, NewUser, Product, ProductPatch, User};

pub mod product;
pub mod user;

pub use product::ProductRepository;
pub use user::UserRepository;

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user holding any of the given unique values.
    ///
    /// When several users collide, one matching on username is preferred,
    /// then one matching on email.
    async fn find_conflicting(
        &self,
        username: &str,
        email: &str,
        mobile: &str,
    ) -> DatabaseResult<Option<User>>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;

    /// Create a new user
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User>;

    /// Stamp a successful login and return the updated user
    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> DatabaseResult<User>;
}

/// Product store
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Create a new product
    async fn create(&self, new_product: &NewProduct) -> DatabaseResult<Product>;

    /// Get all products ordered by ID
    async fn find_all(&self) -> DatabaseResult<Vec<Product>>;

    /// Find a product by ID
    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Product>>;

    /// Apply a partial update, returning `None` if the product does not exist
    async fn update(&self, id: i64, patch: &ProductPatch) -> DatabaseResult<Option<Product>>;

    /// Delete a product, returning whether a row was removed
    async fn delete(&self, id: i64) -> DatabaseResult<bool>;
}
