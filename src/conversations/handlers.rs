// HTTP handlers for the assistant: webhook, conversation history and follow-ups

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::conversations::webhook::{
    extract_incoming_text, resolve_restaurant_id, ConnectionData, WebhookEvent, WebhookPayload,
    WebhookResponse,
};
use crate::conversations::{Conversation, ConversationQuery, FollowUpReport, Message};
use crate::error::ApiError;
use crate::AppState;

/// Handler for POST /api/ai/webhook
/// Always answers 200 so the gateway does not retry; failures go in the body
pub async fn receive_webhook(State(state): State<AppState>, body: Bytes) -> Json<WebhookResponse> {
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Rejected malformed webhook payload: {}", e);
            return Json(WebhookResponse::failed(format!("Invalid payload: {}", e)));
        }
    };

    Json(process_webhook(&state, payload).await)
}

async fn process_webhook(state: &AppState, payload: WebhookPayload) -> WebhookResponse {
    match WebhookEvent::parse(&payload.event) {
        WebhookEvent::MessagesUpsert => handle_message(state, payload).await,
        WebhookEvent::ConnectionUpdate => handle_connection_update(state, payload).await,
        WebhookEvent::Other(event) => {
            tracing::debug!("Ignoring webhook event {}", event);
            WebhookResponse::ignored("unsupported_event")
        }
    }
}

async fn handle_message(state: &AppState, payload: WebhookPayload) -> WebhookResponse {
    let incoming = match extract_incoming_text(&payload.data) {
        Ok(incoming) => incoming,
        Err(reason) => return WebhookResponse::ignored(reason),
    };
    let Some(instance) = payload.instance.as_deref() else {
        return WebhookResponse::ignored("missing_instance");
    };

    let restaurant_id = match resolve_restaurant_id(&state.restaurants, instance).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to resolve restaurant for instance {}: {}", instance, e);
            return WebhookResponse::failed("Failed to process message");
        }
    };

    tracing::debug!(
        "Message from {} for restaurant {} via {}",
        incoming.phone,
        restaurant_id,
        instance
    );
    match state
        .conversations
        .handle_incoming_message(restaurant_id, &incoming.phone, &incoming.text, Some(instance))
        .await
    {
        Ok(_) => WebhookResponse::ok(),
        Err(e) => {
            tracing::error!("Failed to answer {} via {}: {}", incoming.phone, instance, e);
            WebhookResponse::failed(e.public_message())
        }
    }
}

async fn handle_connection_update(state: &AppState, payload: WebhookPayload) -> WebhookResponse {
    let data: ConnectionData = match serde_json::from_value(payload.data) {
        Ok(data) => data,
        Err(_) => return WebhookResponse::ignored("malformed_connection_update"),
    };
    let Some(instance) = payload.instance.or(data.instance) else {
        return WebhookResponse::ignored("missing_instance");
    };

    let connected = data.state == "open";
    match state.restaurants.set_connected(&instance, connected).await {
        Ok(_) => {
            tracing::info!("Instance {} is now {}", instance, data.state);
            WebhookResponse::ok()
        }
        Err(e) => {
            tracing::error!("Failed to update connection state of {}: {}", instance, e);
            WebhookResponse::failed("Failed to update connection state")
        }
    }
}

/// Handler for GET /api/conversations?restaurant_id=
pub async fn list_conversations(
    State(state): State<AppState>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    Ok(Json(state.conversations.list(query.restaurant_id).await?))
}

/// Handler for GET /api/conversations/:id/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, ApiError> {
    Ok(Json(state.conversations.messages(id).await?))
}

/// Handler for POST /api/ai/follow-ups
/// Runs a follow-up sweep right away
pub async fn run_follow_ups(State(state): State<AppState>) -> Result<Json<FollowUpReport>, ApiError> {
    let report = state
        .conversations
        .identify_abandoned_conversations()
        .await?;
    Ok(Json(report))
}
