// HTTP handlers for categories and products

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::menu::{
    Category, CreateCategory, CreateProduct, MenuQuery, Product, UpdateCategory, UpdateProduct,
};
use crate::AppState;

/// Handler for POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    payload.validate()?;
    let category = state.menu.create_category(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Handler for GET /api/categories?restaurant_id=
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.menu.list_categories(query.restaurant_id).await?))
}

/// Handler for GET /api/categories/:id
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.menu.find_category(id).await?))
}

/// Handler for PATCH /api/categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategory>,
) -> Result<Json<Category>, ApiError> {
    payload.validate()?;
    Ok(Json(state.menu.update_category(id, payload).await?))
}

/// Handler for DELETE /api/categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.menu.remove_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    payload.validate()?;
    let product = state.menu.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Handler for GET /api/products?restaurant_id=&category_id=
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .menu
        .list_products(query.restaurant_id, query.category_id)
        .await?;
    tracing::debug!("Retrieved {} products", products.len());
    Ok(Json(products))
}

/// Handler for GET /api/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.menu.find_product(id).await?))
}

/// Handler for PATCH /api/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProduct>,
) -> Result<Json<Product>, ApiError> {
    payload.validate()?;
    Ok(Json(state.menu.update_product(id, payload).await?))
}

/// Handler for DELETE /api/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.menu.remove_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
