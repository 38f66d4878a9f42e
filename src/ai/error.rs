use crate::error::ApiError;

/// Failures of the chat-completion API
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("Completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Completion response had no content")]
    EmptyResponse,
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        ApiError::UpstreamError(err.to_string())
    }
}
