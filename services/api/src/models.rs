//! API models for entities and request payloads

pub mod product;
pub mod user;

pub use product::{NewProduct, Product, ProductPatch};
pub use user::{ConflictField, LoginRequest, NewUser, RegisterRequest, User, UserProfile};
