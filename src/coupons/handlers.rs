// HTTP handlers for coupon endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::coupons::{
    Coupon, CouponQuery, CouponValidation, CreateCoupon, UpdateCoupon, ValidateCoupon,
};
use crate::error::ApiError;
use crate::AppState;

/// Handler for POST /api/coupons
pub async fn create_coupon(
    State(state): State<AppState>,
    Json(payload): Json<CreateCoupon>,
) -> Result<(StatusCode, Json<Coupon>), ApiError> {
    payload.validate()?;
    let coupon = state.coupons.create(payload).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// Handler for GET /api/coupons?restaurant_id=
pub async fn list_coupons(
    State(state): State<AppState>,
    Query(query): Query<CouponQuery>,
) -> Result<Json<Vec<Coupon>>, ApiError> {
    Ok(Json(state.coupons.find_all(query.restaurant_id).await?))
}

/// Handler for GET /api/coupons/:id
pub async fn get_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Coupon>, ApiError> {
    Ok(Json(state.coupons.find_one(id).await?))
}

/// Handler for PATCH /api/coupons/:id
pub async fn update_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCoupon>,
) -> Result<Json<Coupon>, ApiError> {
    payload.validate()?;
    Ok(Json(state.coupons.update(id, payload).await?))
}

/// Handler for DELETE /api/coupons/:id
pub async fn delete_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.coupons.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/coupons/validate
/// Always 200; `valid` tells whether the code applies
pub async fn validate_coupon(
    State(state): State<AppState>,
    Json(payload): Json<ValidateCoupon>,
) -> Result<Json<CouponValidation>, ApiError> {
    payload.validate()?;
    Ok(Json(state.coupons.validate(payload).await?))
}

/// Handler for POST /api/coupons/:id/redeem
pub async fn redeem_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Coupon>, ApiError> {
    Ok(Json(state.coupons.redeem(id).await?))
}
