use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures surfaced to a card or an API caller.
///
/// The `Display` text is what the dashboard shows verbatim in a card's error
/// state, so keep it short and human readable.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("API error: {0}")]
    ApiStatus(u16),

    #[error("No data found for this address")]
    NoData,

    #[error("No account data found")]
    NoAccount,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::ApiStatus(_) => StatusCode::BAD_GATEWAY,
            AppError::NoData | AppError::NoAccount => StatusCode::NOT_FOUND,
            AppError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidUrl(msg) => {
                tracing::error!("Invalid URL: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::RequestError(e) => {
                tracing::error!("Request error: {:?}", e);
                StatusCode::BAD_GATEWAY
            }
            AppError::SerializationError(e) => {
                tracing::error!("Serialization error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
