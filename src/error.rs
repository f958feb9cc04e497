use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptchaError {
    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    #[error("Failed to fetch image: {0}")]
    Fetch(String),

    #[error("\"{0}\" is not supported as a Content-Type. Cannot extract the image.")]
    UnsupportedContentType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for CaptchaError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            CaptchaError::ImageLoad(_) => (StatusCode::UNPROCESSABLE_ENTITY, "IMAGE_LOAD_ERROR"),
            CaptchaError::Fetch(_) => (StatusCode::BAD_GATEWAY, "FETCH_ERROR"),
            CaptchaError::UnsupportedContentType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_CONTENT_TYPE")
            }
            CaptchaError::InvalidConfig(_) => (StatusCode::BAD_REQUEST, "INVALID_CONFIG"),
            CaptchaError::Corpus(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CORPUS_ERROR"),
            CaptchaError::ImageTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "IMAGE_TOO_LARGE"),
            CaptchaError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            CaptchaError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            CaptchaError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
