//! Product CRUD handlers
//!
//! Every mutation writes the store first and then invalidates the cached
//! product list before responding.

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Response,
};
use common::read_through::Provenance;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{NewProduct, ProductPatch},
    response::{no_data, success},
    state::AppState,
};

fn not_found() -> ApiError {
    ApiError::NotFound("Product not found".to_string())
}

/// List all products, served from the cache when possible
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Response> {
    let listing = state
        .catalog
        .list_all()
        .await
        .map_err(ApiError::internal("Failed to fetch products"))?;

    let message = match listing.provenance {
        Provenance::Cache => "Products fetched from cache",
        Provenance::Store => "Products fetched from database",
    };

    Ok(success(StatusCode::OK, message, listing.items))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> ApiResult<Response> {
    const FAILED: &str = "Failed to create product";
    let Json(new_product) = payload?;

    let product = state
        .products
        .create(&new_product)
        .await
        .map_err(ApiError::store(FAILED))?;
    state
        .catalog
        .invalidate()
        .await
        .map_err(ApiError::internal(FAILED))?;

    info!("User {} created product {}", user.id, product.id);

    Ok(success(StatusCode::CREATED, "Product created", product))
}

/// Get a product by ID
pub async fn get_product(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Response> {
    let Path(id) = id?;

    let product = state
        .products
        .find_by_id(id)
        .await
        .map_err(ApiError::internal("Failed to fetch product"))?
        .ok_or_else(not_found)?;

    Ok(success(StatusCode::OK, "Product fetched", product))
}

/// Apply a partial update to a product
pub async fn update_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult<Response> {
    const FAILED: &str = "Failed to update product";
    let Path(id) = id?;
    let Json(patch) = payload?;

    let product = state
        .products
        .update(id, &patch)
        .await
        .map_err(ApiError::store(FAILED))?
        .ok_or_else(not_found)?;
    state
        .catalog
        .invalidate()
        .await
        .map_err(ApiError::internal(FAILED))?;

    info!("User {} updated product {}", user.id, product.id);

    Ok(success(StatusCode::OK, "Product updated", product))
}

/// Delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Response> {
    const FAILED: &str = "Failed to delete product";
    let Path(id) = id?;

    let deleted = state
        .products
        .delete(id)
        .await
        .map_err(ApiError::internal(FAILED))?;
    if !deleted {
        return Err(not_found());
    }
    state
        .catalog
        .invalidate()
        .await
        .map_err(ApiError::internal(FAILED))?;

    info!("User {} deleted product {}", user.id, id);

    Ok(success(StatusCode::OK, "Product deleted", no_data()))
}
