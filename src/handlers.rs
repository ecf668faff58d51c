use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

use crate::error::ShortenerError;
use crate::middleware::client_ip;
use crate::model::ClickInfo;
use crate::response::{expired_response, HealthResponse};
use crate::service::UrlShortener;

/// Shared application state
pub type SharedState = Arc<UrlShortener>;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "URL is required"))]
    pub url: String,
    /// Minutes; fractional values are truncated.
    #[validate(range(min = 1.0, message = "Validity must be at least 1 minute"))]
    pub validity: Option<f64>,
    pub shortcode: Option<String>,
}

impl CreateRequest {
    fn validity_minutes(&self) -> Option<i64> {
        self.validity.map(|minutes| minutes.trunc() as i64)
    }

    fn rejection(&self, errors: ValidationErrors) -> ShortenerError {
        if errors.field_errors().contains_key("url") {
            ShortenerError::InvalidUrl(errors.to_string())
        } else {
            ShortenerError::InvalidValidity(self.validity_minutes().unwrap_or_default())
        }
    }

    fn requested_code(&self) -> Option<&str> {
        self.shortcode.as_deref().filter(|code| !code.is_empty())
    }
}

/// Create a shortened URL
pub async fn create_short_url(
    State(state): State<SharedState>,
    Json(payload): Json<CreateRequest>,
) -> Result<impl IntoResponse, ShortenerError> {
    payload.validate().map_err(|e| payload.rejection(e))?;

    let created = state.create_short_url(
        &payload.url,
        payload.validity_minutes(),
        payload.requested_code(),
    )?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Get statistics for a shortcode
pub async fn get_statistics(
    State(state): State<SharedState>,
    Path(shortcode): Path<String>,
) -> Result<impl IntoResponse, ShortenerError> {
    let stats = state.get_statistics(&shortcode)?;

    info!(
        shortcode = %shortcode,
        clicks = stats.total_clicks,
        is_expired = stats.is_expired,
        "Retrieved statistics"
    );

    Ok(Json(stats))
}

/// Record a click and redirect to the original URL
pub async fn redirect(
    State(state): State<SharedState>,
    Path(shortcode): Path<String>,
    request: Request,
) -> Result<Response, ShortenerError> {
    let link = state
        .resolve(&shortcode)
        .ok_or_else(|| ShortenerError::NotFound(shortcode.clone()))?;

    if link.is_expired_at(state.registry().clock().now()) {
        warn!(shortcode = %shortcode, expires_at = %link.expires_at, "Redirect requested for expired shortcode");
        return Ok(expired_response());
    }

    let headers = request.headers();
    let info = ClickInfo::new(
        header_value(headers, header::REFERER),
        client_ip(headers, request.extensions()),
        header_value(headers, header::USER_AGENT),
    );

    // The link can lapse between the lookup and the click.
    if !state.record_click(&shortcode, info) {
        return Ok(expired_response());
    }

    info!(shortcode = %shortcode, original_url = %link.original_url, "Redirecting to original URL");
    Ok(Redirect::temporary(&link.original_url).into_response())
}

/// Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    Json(HealthResponse::healthy(state.total_links()))
}

fn header_value(headers: &axum::http::HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
