// HTTP handlers binding a restaurant to a WhatsApp instance

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::restaurants::Restaurant;
use crate::whatsapp::{instance_name_for, CreatedInstance, QrCode, WhatsAppStatus};
use crate::AppState;

async fn bound_instance(state: &AppState, id: Uuid) -> Result<(Restaurant, String), ApiError> {
    let restaurant = state.restaurants.find_one(id).await?;
    let instance = restaurant
        .whatsapp_instance()
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest("Restaurant has no WhatsApp instance".to_string()))?;
    Ok((restaurant, instance))
}

/// Handler for POST /api/restaurants/:id/whatsapp
/// Creates the gateway instance and stores the binding
pub async fn create_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<CreatedInstance>), ApiError> {
    let restaurant = state.restaurants.find_one(id).await?;
    if let Some(existing) = restaurant.whatsapp_instance() {
        return Err(ApiError::Conflict {
            message: format!("Restaurant already bound to instance {}", existing),
        });
    }

    let created = state.evolution.create_instance(&instance_name_for(id)).await?;
    state
        .restaurants
        .bind_whatsapp(id, &created.instance_name, created.token.as_deref())
        .await?;

    tracing::info!("Restaurant {} bound to WhatsApp instance {}", id, created.instance_name);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for GET /api/restaurants/:id/whatsapp/qrcode
pub async fn get_qr_code(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QrCode>, ApiError> {
    let (_, instance) = bound_instance(&state, id).await?;
    Ok(Json(state.evolution.get_qr_code(&instance).await?))
}

/// Handler for GET /api/restaurants/:id/whatsapp/status
/// Also refreshes the stored connected flag
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WhatsAppStatus>, ApiError> {
    let (restaurant, instance) = bound_instance(&state, id).await?;
    let gateway_state = state.evolution.connection_state(&instance).await?;
    let connected = gateway_state == "open";

    if connected != restaurant.evolution_api_connected {
        state.restaurants.set_connected(&instance, connected).await?;
    }

    Ok(Json(WhatsAppStatus {
        instance_name: instance,
        state: gateway_state,
        connected,
    }))
}

/// Handler for DELETE /api/restaurants/:id/whatsapp
pub async fn delete_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let (_, instance) = bound_instance(&state, id).await?;

    if let Err(e) = state.evolution.logout_instance(&instance).await {
        tracing::warn!("Logout of instance {} failed: {}", instance, e);
    }
    match state.evolution.delete_instance(&instance).await {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            tracing::warn!("Instance {} was already gone from the gateway", instance);
        }
        Err(e) => return Err(e.into()),
    }

    state.restaurants.clear_whatsapp(id).await?;
    tracing::info!("Removed WhatsApp instance {} of restaurant {}", instance, id);
    Ok(StatusCode::NO_CONTENT)
}
