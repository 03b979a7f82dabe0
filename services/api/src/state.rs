//! Application state shared across handlers

use std::sync::Arc;

use common::read_through::CachedCollection;

use crate::{
    jwt::JwtService,
    models::Product,
    repositories::{ProductStore, UserStore},
};

/// Cache key holding the full product list
pub const PRODUCTS_CACHE_KEY: &str = "products:all";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub catalog: CachedCollection<Product>,
    pub jwt_service: JwtService,
}
