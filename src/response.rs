use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ErrorResponse;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub total_links: usize,
}

impl HealthResponse {
    pub fn healthy(total_links: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            total_links,
        }
    }
}

/// 410 body for links past their expiry.
pub fn expired_response() -> Response {
    let status = StatusCode::GONE;
    (
        status,
        Json(ErrorResponse::new("expired", "URL has expired", status.as_u16())),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let json = serde_json::to_value(HealthResponse::healthy(3)).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["total_links"], 3);
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_expired_response_status() {
        assert_eq!(expired_response().status(), StatusCode::GONE);
    }
}
