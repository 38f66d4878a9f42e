use crate::ai::AiError;
use crate::error::ApiError;
use crate::whatsapp::EvolutionError;

/// Failures while handling a customer conversation
#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Service(#[from] ApiError),

    #[error(transparent)]
    Completion(#[from] AiError),

    #[error(transparent)]
    Gateway(#[from] EvolutionError),

    #[error("No WhatsApp instance to reply through")]
    NoInstance,
}

impl ConversationError {
    /// Text safe to hand back to the webhook caller; details stay in the logs
    pub fn public_message(&self) -> &'static str {
        match self {
            ConversationError::Database(_) | ConversationError::Service(_) => {
                "Failed to process message"
            }
            ConversationError::Completion(_) => "Assistant is unavailable",
            ConversationError::Gateway(_) => "WhatsApp gateway is unavailable",
            ConversationError::NoInstance => "No WhatsApp instance to reply through",
        }
    }
}

impl From<ConversationError> for ApiError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::Database(e) => ApiError::DatabaseError(e),
            ConversationError::Service(e) => e,
            ConversationError::Completion(e) => e.into(),
            ConversationError::Gateway(e) => e.into(),
            ConversationError::NoInstance => {
                ApiError::BadRequest("No WhatsApp instance to reply through".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_message_hides_database_details() {
        let err = ConversationError::Database(sqlx::Error::Protocol(
            "password authentication failed for user \"restaurant\"".to_string(),
        ));
        assert!(err.to_string().contains("password"));
        assert_eq!(err.public_message(), "Failed to process message");

        let wrapped = ConversationError::Service(ApiError::InternalError("pool exhausted".into()));
        assert!(!wrapped.public_message().contains("pool"));
    }

    #[test]
    fn test_public_message_for_missing_instance() {
        assert_eq!(
            ConversationError::NoInstance.public_message(),
            "No WhatsApp instance to reply through"
        );
    }
}
