//! In-memory stores and request helpers for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;

use crate::{
    auth::{
        password::hash_password,
        repo::{User, UserStore},
    },
    error::StoreError,
    products::{
        dto::ProductInput,
        repo::{Product, ProductStore},
    },
    state::AppState,
};

struct Table<T> {
    next_id: i64,
    rows: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Keeps the same one-user-per-email rule as the UNIQUE constraint.
#[derive(Default)]
pub struct MemoryUserStore {
    table: Mutex<Table<User>>,
}

impl MemoryUserStore {
    pub fn len(&self) -> usize {
        self.table.lock().unwrap().rows.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let table = self.table.lock().unwrap();
        Ok(table.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut table = self.table.lock().unwrap();
        if table.rows.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: table.next_id(),
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        table.rows.push(user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct MemoryProductStore {
    table: Mutex<Table<Product>>,
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn create(&self, input: &ProductInput) -> Result<Product, StoreError> {
        let mut table = self.table.lock().unwrap();
        let now = OffsetDateTime::now_utc();
        let product = Product {
            id: table.next_id(),
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            stock: input.stock,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(product.clone());
        Ok(product)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, StoreError> {
        let table = self.table.lock().unwrap();
        Ok(table
            .rows
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let table = self.table.lock().unwrap();
        Ok(table.rows.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let table = self.table.lock().unwrap();
        Ok(table.rows.iter().find(|p| p.name == name).cloned())
    }

    async fn replace(&self, id: i64, input: &ProductInput) -> Result<Option<Product>, StoreError> {
        let mut table = self.table.lock().unwrap();
        let Some(product) = table.rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.name = input.name.clone();
        product.description = input.description.clone();
        product.price = input.price;
        product.stock = input.stock;
        product.updated_at = OffsetDateTime::now_utc();
        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut table = self.table.lock().unwrap();
        let before = table.rows.len();
        table.rows.retain(|p| p.id != id);
        Ok(table.rows.len() < before)
    }
}

/// A fake state whose user store the test can inspect directly.
pub fn fake_with_users() -> (AppState, Arc<MemoryUserStore>) {
    let base = AppState::fake();
    let users = Arc::new(MemoryUserStore::default());
    let state = AppState::from_parts(base.config, users.clone(), base.products);
    (state, users)
}

pub async fn register_user(state: &AppState, email: &str, password: &str) -> User {
    let hash = hash_password(password).expect("hash");
    state.users.create(email, &hash).await.expect("create user")
}

/// Registers `email` and returns a fresh bearer token for it.
pub async fn login_token(state: &AppState, email: &str) -> String {
    register_user(state, email, "pw").await;
    state.jwt.sign(email).expect("sign")
}

fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut b = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        b = b.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    b
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    builder(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form_request(uri: &str, body: &str) -> Request<Body> {
    builder("POST", uri, None)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    empty_request("GET", uri, token)
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    builder(method, uri, token).body(Body::empty()).unwrap()
}

pub async fn raw(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

pub async fn body_json(res: Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = raw(app, req).await;
    let status = res.status();
    (status, body_json(res).await)
}
