// HTTP handlers for order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::orders::{
    CreateOrder, OrderQuery, OrderResponse, PhoneQuery, UpdateOrder, UpdateStatusRequest,
};
use crate::AppState;

/// Handler for POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrder>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    request.validate()?;
    let order = state.orders.create(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Handler for GET /api/orders
/// Optional filters: restaurant_id, status, customer_id
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    Ok(Json(state.orders.find_all(&query).await?))
}

/// Handler for GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    Ok(Json(state.orders.find_one(id).await?))
}

/// Handler for PATCH /api/orders/:id
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrder>,
) -> Result<Json<OrderResponse>, ApiError> {
    request.validate()?;
    Ok(Json(state.orders.update(id, request).await?))
}

/// Handler for PATCH /api/orders/:id/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let update = UpdateOrder {
        status: Some(request.status),
        ..Default::default()
    };
    Ok(Json(state.orders.update(id, update).await?))
}

/// Handler for DELETE /api/orders/:id
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.orders.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/orders/by-phone?phone=&restaurant_id=
pub async fn find_orders_by_phone(
    State(state): State<AppState>,
    Query(query): Query<PhoneQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state
        .orders
        .find_by_customer_phone(&query.phone, query.restaurant_id)
        .await?;
    Ok(Json(orders))
}
