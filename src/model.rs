use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DIRECT_SOURCE: &str = "direct";
pub const UNKNOWN: &str = "unknown";

/// Snapshot of a shortened URL and its click history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    pub id: Uuid,
    pub original_url: String,
    pub shortcode: String,
    pub short_link: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub click_count: u64,
    pub click_log: Vec<ClickEvent>,
}

impl UrlRecord {
    /// A record stays active up to and including `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// One redirect through a short link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub location: String,
    pub user_agent: String,
}

/// Caller-supplied click metadata. Missing or empty fields fall back to sentinels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickInfo {
    pub source: Option<String>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl ClickInfo {
    pub fn new(
        source: Option<String>,
        location: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            source,
            location,
            user_agent,
        }
    }

    pub fn into_event(self, timestamp: DateTime<Utc>) -> ClickEvent {
        ClickEvent {
            timestamp,
            source: or_sentinel(self.source, DIRECT_SOURCE),
            location: or_sentinel(self.location, UNKNOWN),
            user_agent: or_sentinel(self.user_agent, UNKNOWN),
        }
    }
}

fn or_sentinel(value: Option<String>, sentinel: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| sentinel.to_string())
}

/// Response to a successful creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLink {
    pub shortcode: String,
    pub short_link: String,
    pub expiry: DateTime<Utc>,
}
