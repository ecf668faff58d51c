//! Client for the remote log collector.
//!
//! Entries are validated locally against the collector's fixed schema and
//! then posted from a spawned task. Delivery is best effort: transport errors
//! are logged at debug level and otherwise ignored.

use crate::events::{DomainEvent, RegistryObserver};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stack {
    Backend,
    Frontend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Package {
    // backend only
    Cache,
    Controller,
    CronJob,
    Db,
    Domain,
    Handler,
    Repository,
    Route,
    Service,
    // frontend only
    Api,
    Component,
    Hook,
    Page,
    State,
    Style,
    // either stack
    Auth,
    Config,
    Middleware,
    Utils,
}

impl Package {
    pub fn allowed_for(&self, stack: Stack) -> bool {
        use Package::*;
        match self {
            Auth | Config | Middleware | Utils => true,
            Cache | Controller | CronJob | Db | Domain | Handler | Repository | Route
            | Service => stack == Stack::Backend,
            Api | Component | Hook | Page | State | Style => stack == Stack::Frontend,
        }
    }
}

/// Upper bound on one delivery, connect included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Invalid package '{package:?}' for stack '{stack:?}'")]
    InvalidPackage { stack: Stack, package: Package },

    #[error("Failed to build telemetry client: {0}")]
    Client(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub stack: Stack,
    pub level: Level,
    pub package: Package,
    pub message: String,
    pub metadata: Map<String, Value>,
}

impl LogEntry {
    pub fn new(
        stack: Stack,
        level: Level,
        package: Package,
        message: impl Into<String>,
        metadata: Map<String, Value>,
    ) -> Result<Self, TelemetryError> {
        if !package.allowed_for(stack) {
            return Err(TelemetryError::InvalidPackage { stack, package });
        }

        Ok(Self {
            stack,
            level,
            package,
            message: message.into(),
            metadata,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TelemetrySink {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
}

impl TelemetrySink {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Result<Self, TelemetryError> {
        Self::with_timeout(endpoint, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TelemetryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| TelemetryError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Validates and ships one entry. Only schema violations are reported.
    pub fn log(
        &self,
        stack: Stack,
        level: Level,
        package: Package,
        message: impl Into<String>,
        metadata: Map<String, Value>,
    ) -> Result<(), TelemetryError> {
        let entry = LogEntry::new(stack, level, package, message, metadata)?;
        self.send(entry);
        Ok(())
    }

    fn send(&self, entry: LogEntry) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime available, dropping telemetry entry");
            return;
        };

        let sink = self.clone();
        runtime.spawn(async move {
            if let Err(err) = sink.deliver(&entry).await {
                debug!(error = %err, "Logging failed");
            }
        });
    }

    /// Posts one entry and waits for the collector, bounded by the client timeout.
    pub async fn deliver(&self, entry: &LogEntry) -> Result<(), reqwest::Error> {
        let mut request = self.client.post(&self.endpoint).json(entry);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            debug!(status = %response.status(), "Telemetry collector refused entry");
        }
        Ok(())
    }
}

/// Maps a domain event onto the collector's schema.
pub fn entry_for(event: &DomainEvent) -> LogEntry {
    let (level, message, metadata) = match event {
        DomainEvent::Created {
            shortcode,
            original_url,
            expires_at,
        } => (
            Level::Info,
            "Successfully created shortened URL".to_string(),
            json!({
                "shortcode": shortcode,
                "originalUrl": original_url,
                "expiresAt": expires_at.to_rfc3339(),
            }),
        ),
        DomainEvent::Clicked {
            shortcode,
            total_clicks,
        } => (
            Level::Info,
            "Click recorded successfully".to_string(),
            json!({ "shortcode": shortcode, "totalClicks": total_clicks }),
        ),
        DomainEvent::ClickDropped { shortcode, reason } => (
            Level::Warn,
            format!("Click dropped for shortcode: {shortcode}"),
            json!({ "shortcode": shortcode, "reason": reason.as_str() }),
        ),
        DomainEvent::ExpiredAccess {
            shortcode,
            expires_at,
        } => (
            Level::Warn,
            format!("Expired URL accessed: {shortcode}"),
            json!({ "shortcode": shortcode, "expiryDate": expires_at.to_rfc3339() }),
        ),
        DomainEvent::Rejected { reason } => (
            Level::Error,
            format!("URL creation failed: {reason}"),
            json!({}),
        ),
    };

    LogEntry {
        stack: Stack::Backend,
        level,
        package: Package::Service,
        message,
        metadata: match metadata {
            Value::Object(map) => map,
            _ => Map::new(),
        },
    }
}

impl RegistryObserver for TelemetrySink {
    fn on_event(&self, event: &DomainEvent) {
        self.send(entry_for(event));
    }
}
