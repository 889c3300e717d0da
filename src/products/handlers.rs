use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    auth::extractors::CurrentUser,
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    products::{
        dto::{Pagination, ProductInput},
        repo::Product,
    },
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(p): ApiQuery<Pagination>,
) -> Result<Json<Vec<Product>>, AppError> {
    let p = p.validate()?;
    let products = state.products.list(p.skip, p.limit).await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Product>, AppError> {
    state
        .products
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::product_not_found(id))
}

#[instrument(skip(state, user, input))]
pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<Product>, AppError> {
    let input = input.validate()?;
    let product = state.products.create(&input).await?;
    info!(product_id = product.id, user_id = user.id, "product created");
    Ok(Json(product))
}

#[instrument(skip(state, user, input))]
pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<Product>, AppError> {
    let input = input.validate()?;
    let product = state
        .products
        .replace(id, &input)
        .await?
        .ok_or(AppError::product_not_found(id))?;
    info!(product_id = id, user_id = user.id, "product replaced");
    Ok(Json(product))
}

#[instrument(skip(state, user))]
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Value>, AppError> {
    if !state.products.delete(id).await? {
        return Err(AppError::product_not_found(id));
    }
    info!(product_id = id, user_id = user.id, "product deleted");
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}
