use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type ShortenerResult<T> = Result<T, ShortenerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortenerError {
    #[error("Invalid URL format. Must start with http:// or https://: {0}")]
    InvalidUrl(String),

    #[error("Invalid shortcode: {0}")]
    InvalidShortcode(String),

    #[error("Shortcode already in use: {0}")]
    ShortcodeTaken(String),

    #[error("Validity must be at least 1 minute, got {0}")]
    InvalidValidity(i64),

    #[error("Failed to generate a unique shortcode after {0} attempts")]
    GenerationExhausted(u32),

    #[error("URL not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ShortenerError {
    /// Short machine-readable tag used in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ShortenerError::InvalidUrl(_) => "invalid_url",
            ShortenerError::InvalidShortcode(_) => "invalid_shortcode",
            ShortenerError::ShortcodeTaken(_) => "shortcode_taken",
            ShortenerError::InvalidValidity(_) => "invalid_validity",
            ShortenerError::GenerationExhausted(_) => "generation_exhausted",
            ShortenerError::NotFound(_) => "not_found",
            ShortenerError::Configuration(_) => "configuration_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ShortenerError::InvalidUrl(_)
            | ShortenerError::InvalidShortcode(_)
            | ShortenerError::InvalidValidity(_) => StatusCode::BAD_REQUEST,
            ShortenerError::ShortcodeTaken(_) => StatusCode::CONFLICT,
            ShortenerError::GenerationExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            ShortenerError::NotFound(_) => StatusCode::NOT_FOUND,
            ShortenerError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            code,
        }
    }

    pub fn from_error(err: &ShortenerError) -> Self {
        Self::new(err.kind(), &err.to_string(), err.status_code().as_u16())
    }
}

impl IntoResponse for ShortenerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::from_error(&self))).into_response()
    }
}
