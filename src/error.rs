use reqwest::StatusCode;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a single backend exchange.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to reach backend: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend rejected request ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("invalid backend response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Precondition(String),
}

impl ApiError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        ApiError::Precondition(msg.into())
    }

    /// True when the backend answered with 401 or 403.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ApiError::Rejected { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }
}
