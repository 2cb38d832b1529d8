//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pageflip_core::PageflipError;
use serde_json::json;

/// Error returned by request handlers
#[derive(Debug)]
pub enum ApiError {
    Core(PageflipError),
    BadRequest(String),
}

impl From<PageflipError> for ApiError {
    fn from(e: PageflipError) -> Self {
        ApiError::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Core(e) => match &e {
                PageflipError::Authentication => (StatusCode::UNAUTHORIZED, e.to_string()),
                PageflipError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
                PageflipError::Wizard(w) => (StatusCode::BAD_REQUEST, w.to_string()),
                PageflipError::NotFound => (StatusCode::NOT_FOUND, e.to_string()),
                PageflipError::Upload(_) => {
                    tracing::error!(error = %e, "Upload failed");
                    (StatusCode::BAD_GATEWAY, "Image upload failed".to_string())
                }
                PageflipError::Persistence(_) => {
                    tracing::error!(error = %e, "Request error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error".to_string(),
                    )
                }
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
