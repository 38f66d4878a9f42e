use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::conversations::{Conversation, Message, MessageRole};

/// Repository for conversations and their messages
#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_active(
        &self,
        restaurant_id: Uuid,
        phone_number: &str,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE restaurant_id = $1 AND phone_number = $2 AND is_active
            ORDER BY last_interaction_at DESC
            LIMIT 1
            "#,
        )
        .bind(restaurant_id)
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create(
        &self,
        restaurant_id: Uuid,
        customer_id: Option<Uuid>,
        phone_number: &str,
    ) -> Result<Conversation, sqlx::Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (id, restaurant_id, customer_id, phone_number)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(restaurant_id)
        .bind(customer_id)
        .bind(phone_number)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, sqlx::Error> {
        sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_restaurant(&self, restaurant_id: Uuid) -> Result<Vec<Conversation>, sqlx::Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE restaurant_id = $1
            ORDER BY last_interaction_at DESC
            "#,
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn add_message(
        &self,
        conversation_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (id, conversation_id, role, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(conversation_id)
        .bind(role)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    /// Newest `limit` messages since `since`, returned oldest first
    pub async fn recent_messages(
        &self,
        conversation_id: Uuid,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM (
                SELECT * FROM messages
                WHERE conversation_id = $1 AND created_at >= $2
                ORDER BY created_at DESC
                LIMIT $3
            ) recent
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_id)
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Records activity; `reset_follow_up` also clears the follow-up flag
    pub async fn touch(&self, id: Uuid, reset_follow_up: bool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET last_interaction_at = NOW(),
                needs_follow_up = CASE WHEN $2 THEN FALSE ELSE needs_follow_up END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(reset_follow_up)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Active conversations idle since before `cutoff` that were not followed up yet
    pub async fn find_abandoned(&self, cutoff: DateTime<Utc>) -> Result<Vec<Conversation>, sqlx::Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE is_active AND NOT needs_follow_up AND last_interaction_at < $1
            ORDER BY last_interaction_at ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
    }

    /// Sets the follow-up flag; false when another sweep already claimed it
    pub async fn mark_follow_up(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET needs_follow_up = TRUE, updated_at = NOW()
            WHERE id = $1 AND NOT needs_follow_up
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
