use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{error::StoreError, products::dto::ProductInput};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create(&self, input: &ProductInput) -> Result<Product, StoreError>;

    /// Window over all products in id order.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Product>, StoreError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError>;

    /// Overwrites every mutable field and bumps `updated_at`. `None` if absent.
    async fn replace(&self, id: i64, input: &ProductInput) -> Result<Option<Product>, StoreError>;

    /// `false` if there was nothing to delete.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgProductStore {
    db: PgPool,
}

impl PgProductStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create(&self, input: &ProductInput) -> Result<Product, StoreError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, price, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, price, stock, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .fetch_one(&self.db)
        .await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, stock, created_at, updated_at
            FROM products
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, stock, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, stock, created_at, updated_at
            FROM products
            WHERE name = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;
        Ok(product)
    }

    #[instrument(skip(self, input))]
    async fn replace(&self, id: i64, input: &ProductInput) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
               SET name = $2,
                   description = $3,
                   price = $4,
                   stock = $5,
                   updated_at = now()
             WHERE id = $1
            RETURNING id, name, description, price, stock, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .fetch_optional(&self.db)
        .await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
