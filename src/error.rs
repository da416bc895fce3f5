use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Image fetch error: {0}")]
    ImageFetch(#[from] FetchError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Failures while turning a response body into recommendations
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
}

/// Failures of the on-disk recommendation cache
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("failed to write cache at {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("failed to read cache at {path}: {reason}")]
    ReadFailed { path: String, reason: String },
}

/// Failures while downloading image bytes
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("invalid image URL {0:?}")]
    InvalidUrl(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("image server returned status {0}")]
    Status(reqwest::StatusCode),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Decode(_) | AppError::Cache(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) | AppError::ImageFetch(_) => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
