use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::ai::{ChatMessage, ChatRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl From<MessageRole> for ChatRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => ChatRole::User,
            MessageRole::Assistant => ChatRole::Assistant,
        }
    }
}

/// WhatsApp chat between a restaurant and one phone number
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub phone_number: String,
    pub is_active: bool,
    pub last_interaction_at: DateTime<Utc>,
    pub needs_follow_up: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set on conversations for restaurants that are not registered; never persisted
    #[sqlx(skip)]
    #[serde(default)]
    pub is_temporary: bool,
}

impl Conversation {
    /// In-memory conversation used when the restaurant cannot be found
    pub fn temporary(restaurant_id: Uuid, phone_number: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            restaurant_id,
            customer_id: None,
            phone_number: phone_number.to_string(),
            is_active: true,
            last_interaction_at: now,
            needs_follow_up: false,
            created_at: now,
            updated_at: now,
            is_temporary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        ChatMessage {
            role: message.role.into(),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub restaurant_id: Uuid,
}

/// Result of one follow-up sweep
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FollowUpReport {
    pub candidates: usize,
    pub notified: usize,
    pub failed: usize,
}
