// HTTP handlers for customer endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::customers::{CreateCustomer, Customer, CustomerQuery, UpdateCustomer};
use crate::error::ApiError;
use crate::AppState;

/// Handler for POST /api/customers
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomer>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    payload.validate()?;
    let customer = state.customers.create(payload).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Handler for GET /api/customers?restaurant_id=&phone=
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerQuery>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let customers = state
        .customers
        .list(query.restaurant_id, query.phone.as_deref())
        .await?;
    Ok(Json(customers))
}

/// Handler for GET /api/customers/:id
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, ApiError> {
    Ok(Json(state.customers.find_one(id).await?))
}

/// Handler for PATCH /api/customers/:id
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomer>,
) -> Result<Json<Customer>, ApiError> {
    payload.validate()?;
    Ok(Json(state.customers.update(id, payload).await?))
}

/// Handler for DELETE /api/customers/:id
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.customers.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
