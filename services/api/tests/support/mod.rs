//! In-memory fakes and a router harness shared by the integration tests.

#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
};

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use catalog_api::{
    AppState, PRODUCTS_CACHE_KEY, create_router,
    jwt::{JwtConfig, JwtService},
    models::{NewProduct, NewUser, Product, ProductPatch, User},
    repositories::{ProductStore, UserStore},
};
use chrono::{DateTime, Utc};
use common::{
    cache::{CacheStore, MemoryCache},
    error::{DatabaseError, DatabaseResult},
    read_through::{CachedCollection, CollectionSource, InvalidationPolicy},
};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-secret";

/// Credential store backed by a vector, with the same uniqueness rules as
/// the users table.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
    pub calls: AtomicUsize,
}

impl MemoryUserStore {
    pub async fn get(&self, username: &str) -> Option<User> {
        self.users
            .lock()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_conflicting(
        &self,
        username: &str,
        email: &str,
        mobile: &str,
    ) -> DatabaseResult<Option<User>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let users = self.users.lock().await;
        let found = users
            .iter()
            .find(|u| u.username == username)
            .or_else(|| users.iter().find(|u| u.email == email))
            .or_else(|| users.iter().find(|u| u.mobile == mobile))
            .cloned();
        Ok(found)
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(username).await)
    }

    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().await;

        let constraint = if users.iter().any(|u| u.username == new_user.username) {
            Some("users_username_key")
        } else if users.iter().any(|u| u.email == new_user.email) {
            Some("users_email_key")
        } else if users.iter().any(|u| u.mobile == new_user.mobile) {
            Some("users_mobile_key")
        } else {
            None
        };
        if let Some(constraint) = constraint {
            return Err(DatabaseError::UniqueViolation {
                constraint: Some(constraint.to_string()),
            });
        }

        let now = Utc::now();
        let user = User {
            id: users.len() as i64 + 1,
            username: new_user.username.clone(),
            password_hash: new_user.password_hash.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            email: new_user.email.clone(),
            mobile: new_user.mobile.clone(),
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> DatabaseResult<User> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DatabaseError::Query(sqlx::Error::RowNotFound))?;
        user.last_login = Some(at);
        user.updated_at = at;
        Ok(user.clone())
    }
}

/// Entity store backed by a vector, enforcing the products check constraints.
#[derive(Default)]
pub struct MemoryProductStore {
    products: Mutex<Vec<Product>>,
    next_id: AtomicI64,
    pub calls: AtomicUsize,
}

impl MemoryProductStore {
    pub async fn snapshot(&self) -> Vec<Product> {
        self.products.lock().await.clone()
    }
}

fn check_constraints(price: f64, stock: i32) -> DatabaseResult<()> {
    let constraint = if price < 0.0 {
        "products_price_check"
    } else if stock < 0 {
        "products_stock_check"
    } else {
        return Ok(());
    };
    Err(DatabaseError::CheckViolation {
        constraint: Some(constraint.to_string()),
    })
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn create(&self, new_product: &NewProduct) -> DatabaseResult<Product> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        check_constraints(new_product.price, new_product.stock)?;

        let now = Utc::now();
        let product = Product {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: new_product.name.clone(),
            brand: new_product.brand.clone(),
            price: new_product.price,
            stock: new_product.stock,
            description: new_product.description.clone(),
            created_at: now,
            updated_at: now,
        };
        self.products.lock().await.push(product.clone());
        Ok(product)
    }

    async fn find_all(&self) -> DatabaseResult<Vec<Product>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot().await)
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Product>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let products = self.products.lock().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: i64, patch: &ProductPatch) -> DatabaseResult<Option<Product>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut products = self.products.lock().await;
        let Some(stored) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        let mut product = stored.clone();
        patch.apply_to(&mut product);
        check_constraints(product.price, product.stock)?;
        product.updated_at = Utc::now();
        *stored = product.clone();
        Ok(Some(product))
    }

    async fn delete(&self, id: i64) -> DatabaseResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut products = self.products.lock().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }
}

#[async_trait]
impl CollectionSource<Product> for MemoryProductStore {
    async fn fetch_all(&self) -> DatabaseResult<Vec<Product>> {
        self.find_all().await
    }
}

/// Cache that counts every call and can be told to fail deletes.
#[derive(Default)]
pub struct CountingCache {
    pub inner: MemoryCache,
    pub calls: AtomicUsize,
    pub fail_delete: AtomicBool,
}

#[async_trait]
impl CacheStore for CountingCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(anyhow!("connection reset"));
        }
        self.inner.delete(key).await
    }
}

/// Router wired to in-memory fakes
pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUserStore>,
    pub products: Arc<MemoryProductStore>,
    pub cache: Arc<CountingCache>,
    pub jwt: JwtService,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(InvalidationPolicy::LogAndContinue)
    }

    pub fn with_policy(policy: InvalidationPolicy) -> Self {
        let users = Arc::new(MemoryUserStore::default());
        let products = Arc::new(MemoryProductStore::default());
        let cache = Arc::new(CountingCache::default());
        let jwt = JwtService::new(JwtConfig {
            secret: JWT_SECRET.to_string(),
            expiry_seconds: 3600,
        });

        let catalog = CachedCollection::<Product>::new(
            PRODUCTS_CACHE_KEY,
            60,
            cache.clone(),
            products.clone(),
        )
        .with_policy(policy);

        let state = AppState {
            users: users.clone(),
            products: products.clone(),
            catalog,
            jwt_service: jwt.clone(),
        };

        Self {
            router: create_router(state),
            users,
            products,
            cache,
            jwt,
        }
    }

    /// Total store and cache calls made so far
    pub fn backend_calls(&self) -> usize {
        self.users.calls.load(Ordering::SeqCst)
            + self.products.calls.load(Ordering::SeqCst)
            + self.cache.calls.load(Ordering::SeqCst)
    }

    pub async fn cached_snapshot(&self) -> Option<Vec<u8>> {
        self.cache
            .inner
            .get(PRODUCTS_CACHE_KEY)
            .await
            .expect("memory cache never fails")
    }

    /// Send a request and return the status and body. Non-JSON bodies are
    /// returned as a JSON string.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    pub async fn register(&self, username: &str, email: &str, mobile: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": username,
                "password": "pw",
                "confirmPassword": "pw",
                "firstName": "F",
                "lastName": "L",
                "email": email,
                "mobile": mobile,
            })),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    /// Register `u1` and return a bearer token for it
    pub async fn token(&self) -> String {
        let (status, _) = self.register("u1", "u1@x.com", "5551").await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self.login("u1", "pw").await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    pub async fn create_product(&self, token: &str, name: &str, price: f64) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/products",
                Some(token),
                Some(json!({
                    "name": name,
                    "brand": "Acme",
                    "price": price,
                    "stock": 10,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body["data"].clone()
    }
}
