/// Unified error types for MIRA
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum MiraError {
    /// No session, or an invalid one, where a session is required
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but lacking ownership or role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or malformed required field
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uniqueness violations (e.g. an email already registered)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Remote video host errors
    #[error("Video host error: {0}")]
    VideoHost(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MiraError {
    pub fn status(&self) -> StatusCode {
        match self {
            MiraError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            MiraError::Forbidden(_) => StatusCode::FORBIDDEN,
            MiraError::NotFound(_) => StatusCode::NOT_FOUND,
            MiraError::Validation(_) => StatusCode::BAD_REQUEST,
            MiraError::Conflict(_) => StatusCode::CONFLICT,
            MiraError::Database(_)
            | MiraError::VideoHost(_)
            | MiraError::Internal(_)
            | MiraError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for MiraError {
    fn from(e: reqwest::Error) -> Self {
        MiraError::VideoHost(e.to_string())
    }
}

impl From<validator::ValidationErrors> for MiraError {
    fn from(e: validator::ValidationErrors) -> Self {
        MiraError::Validation(e.to_string())
    }
}

/// Plain-text error bodies with conventional status codes
impl IntoResponse for MiraError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            MiraError::Unauthorized(_) => "Unauthorized".to_string(),
            MiraError::Forbidden(_) => "Forbidden".to_string(),
            MiraError::NotFound(_) => "Not Found".to_string(),
            MiraError::Validation(msg) | MiraError::Conflict(msg) => msg.clone(),
            _ => {
                // Don't leak details
                tracing::error!(error = %self, "request failed");
                "Internal Error".to_string()
            }
        };

        (status, body).into_response()
    }
}

/// Result type alias for MIRA operations
pub type MiraResult<T> = Result<T, MiraError>;
