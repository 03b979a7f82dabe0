//! Product repository for database operations

use async_trait::async_trait;
use common::{
    error::{DatabaseError, DatabaseResult},
    read_through::CollectionSource,
};
use sqlx::PgPool;

use super::ProductStore;
use crate::models::{NewProduct, Product, ProductPatch};

/// PostgreSQL-backed product repository
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn create(&self, new_product: &NewProduct) -> DatabaseResult<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, brand, price, stock, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, brand, price, stock, description, created_at, updated_at
            "#,
        )
        .bind(&new_product.name)
        .bind(&new_product.brand)
        .bind(new_product.price)
        .bind(new_product.stock)
        .bind(&new_product.description)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn find_all(&self) -> DatabaseResult<Vec<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, brand, price, stock, description, created_at, updated_at
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, brand, price, stock, description, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn update(&self, id: i64, patch: &ProductPatch) -> DatabaseResult<Option<Product>> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Connection)?;

        let current = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, brand, price, stock, description, created_at, updated_at
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from_query)?;

        // Dropping the transaction rolls it back
        let Some(mut product) = current else {
            return Ok(None);
        };
        patch.apply_to(&mut product);

        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2,
                brand = $3,
                price = $4,
                stock = $5,
                description = $6,
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, brand, price, stock, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_query)?;

        tx.commit().await.map_err(DatabaseError::from_query)?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CollectionSource<Product> for ProductRepository {
    async fn fetch_all(&self) -> DatabaseResult<Vec<Product>> {
        self.find_all().await
    }
}
