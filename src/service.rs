use crate::clicks::ClickRecorder;
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{ShortenerError, ShortenerResult};
use crate::events::{DomainEvent, RegistryObserver};
use crate::model::{ClickInfo, CreatedLink};
use crate::registry::{LinkTarget, Registry, RegistryOptions};
use crate::stats::{StatsProjector, Statistics};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_VALIDITY_MINUTES: i64 = 30;

/// Entry point for the request layer: creation, lookup, clicks and stats.
pub struct UrlShortener {
    registry: Arc<Registry>,
    recorder: ClickRecorder,
    projector: StatsProjector,
    default_validity_minutes: i64,
}

impl UrlShortener {
    pub fn new(registry: Arc<Registry>, default_validity_minutes: i64) -> Self {
        Self {
            recorder: ClickRecorder::new(Arc::clone(&registry)),
            projector: StatsProjector::new(registry.shared_clock()),
            registry,
            default_validity_minutes,
        }
    }

    pub fn from_config(
        config: &Config,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn RegistryObserver>,
    ) -> Self {
        let options = RegistryOptions {
            base_url: config.base_url.clone(),
            shortcode_length: config.shortcode_length,
            max_generation_attempts: config.max_generation_attempts,
        };
        let registry = Arc::new(Registry::new(options, clock, observer));
        Self::new(registry, config.default_validity_minutes)
    }

    /// Creates a short link. `validity_minutes` falls back to the configured default.
    pub fn create_short_url(
        &self,
        original_url: &str,
        validity_minutes: Option<i64>,
        requested_code: Option<&str>,
    ) -> ShortenerResult<CreatedLink> {
        let validity = validity_minutes.unwrap_or(self.default_validity_minutes);
        let record = self.registry.insert(original_url, validity, requested_code)?;

        debug!(
            shortcode = %record.shortcode,
            expires_at = %record.expires_at,
            "Successfully created shortened URL"
        );

        Ok(CreatedLink {
            shortcode: record.shortcode,
            short_link: record.short_link,
            expiry: record.expires_at,
        })
    }

    pub fn get_by_shortcode(&self, code: &str) -> Option<Statistics> {
        let Some(record) = self.registry.lookup(code) else {
            warn!(shortcode = %code, "No URL found for shortcode");
            return None;
        };

        let stats = self.projector.project(&record);
        if stats.is_expired {
            self.registry.observer().on_event(&DomainEvent::ExpiredAccess {
                shortcode: stats.shortcode.clone(),
                expires_at: stats.expires_at,
            });
        }

        Some(stats)
    }

    /// Redirect-path lookup: immutable fields only, no click-log copy.
    pub fn resolve(&self, code: &str) -> Option<LinkTarget> {
        let Some(target) = self.registry.resolve(code) else {
            warn!(shortcode = %code, "No URL found for shortcode");
            return None;
        };

        if target.is_expired_at(self.registry.clock().now()) {
            self.registry.observer().on_event(&DomainEvent::ExpiredAccess {
                shortcode: target.shortcode.clone(),
                expires_at: target.expires_at,
            });
        }

        Some(target)
    }

    pub fn record_click(&self, code: &str, info: ClickInfo) -> bool {
        self.recorder.record_click(code, info)
    }

    pub fn get_statistics(&self, code: &str) -> ShortenerResult<Statistics> {
        let record = self
            .registry
            .lookup(code)
            .ok_or_else(|| ShortenerError::NotFound(code.to_string()))?;

        Ok(self.projector.project(&record))
    }

    pub fn total_links(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}
