use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authorization failed.")]
    AuthorizationFailed,

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Spotify API error: {0}")]
    Upstream(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Aggregation relay error: {0}")]
    Relay(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Plain text, matching what the browser sees on a bad callback
            AppError::AuthorizationFailed => {
                return (StatusCode::BAD_REQUEST, self.to_string()).into_response();
            }
            AppError::Session(ref e) => {
                tracing::error!("Session error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Session error".to_string())
            }
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::MalformedResponse(msg) => {
                tracing::error!("Malformed upstream response: {}", msg);
                (StatusCode::BAD_GATEWAY, format!("Malformed response: {}", msg))
            }
            AppError::Relay(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Storage(ref msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
