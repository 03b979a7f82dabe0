//! Catalog API service
//!
//! User registration and login, plus product CRUD behind a bearer-token gate.
//! The product list is served through a read-through cache that every
//! product mutation invalidates.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod response;
pub mod routes;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::{AppState, PRODUCTS_CACHE_KEY};
