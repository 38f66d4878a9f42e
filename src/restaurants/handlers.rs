// HTTP handlers for restaurant endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::menu::RestaurantMenu;
use crate::restaurants::{CreateRestaurant, Restaurant, UpdateRestaurant};
use crate::AppState;

/// Handler for POST /api/restaurants
pub async fn create_restaurant(
    State(state): State<AppState>,
    Json(payload): Json<CreateRestaurant>,
) -> Result<(StatusCode, Json<Restaurant>), ApiError> {
    tracing::debug!("Creating restaurant: {}", payload.name);
    payload.validate()?;

    let restaurant = state.restaurants.create(payload).await?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}

/// Handler for GET /api/restaurants
pub async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    let restaurants = state.restaurants.find_all().await?;
    tracing::debug!("Retrieved {} restaurants", restaurants.len());
    Ok(Json(restaurants))
}

/// Handler for GET /api/restaurants/:id
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Restaurant>, ApiError> {
    Ok(Json(state.restaurants.find_one(id).await?))
}

/// Handler for PATCH /api/restaurants/:id
pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRestaurant>,
) -> Result<Json<Restaurant>, ApiError> {
    payload.validate()?;
    Ok(Json(state.restaurants.update(id, payload).await?))
}

/// Handler for DELETE /api/restaurants/:id
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.restaurants.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/restaurants/:id/menu
/// Active categories with their available products
pub async fn get_restaurant_menu(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RestaurantMenu>, ApiError> {
    state.restaurants.find_one(id).await?;
    Ok(Json(state.menu.menu_for_restaurant(id).await?))
}
