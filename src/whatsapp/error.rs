use reqwest::StatusCode;

use crate::error::ApiError;

/// Failures talking to the Evolution API
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error("Evolution API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Evolution API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Invalid Evolution API key header")]
    InvalidApiKey,
}

impl EvolutionError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EvolutionError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

impl From<EvolutionError> for ApiError {
    fn from(err: EvolutionError) -> Self {
        ApiError::UpstreamError(err.to_string())
    }
}
