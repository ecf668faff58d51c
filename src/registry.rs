//! Authoritative in-memory store of shortened URLs.
//!
//! Records live in a sharded map keyed by shortcode. Claiming a code goes
//! through the map's entry API, so check-and-set is a single step under the
//! owning shard's lock and two callers can never both win the same code.
//! Entries are never removed: the key set doubles as the issued-code set, and
//! an expired shortcode stays reserved for the life of the process.
//!
//! Click state sits behind a per-record mutex, so clicks on different
//! shortcodes never contend and readers only wait for one bounded append.

use crate::clock::Clock;
use crate::error::{ShortenerError, ShortenerResult};
use crate::events::{DomainEvent, RegistryObserver};
use crate::model::{ClickEvent, ClickInfo, UrlRecord};
use crate::shortcode::{ShortcodeGenerator, DEFAULT_LENGTH};
use crate::validation::{is_reserved, is_valid_url, IssuedCodes, Rejection, Validator};
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_MAX_GENERATION_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

#[derive(Debug, Clone)]
pub struct RegistryOptions {
    pub base_url: String,
    pub shortcode_length: usize,
    pub max_generation_attempts: u32,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            shortcode_length: DEFAULT_LENGTH,
            max_generation_attempts: DEFAULT_MAX_GENERATION_ATTEMPTS,
        }
    }
}

/// What a redirect needs: fields fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub shortcode: String,
    pub original_url: String,
    pub expires_at: DateTime<Utc>,
}

impl LinkTarget {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Default)]
struct ClickLedger {
    count: u64,
    log: Vec<ClickEvent>,
}

/// Stored form of a record: immutable fields plus the guarded click ledger.
#[derive(Debug)]
pub(crate) struct LinkEntry {
    id: Uuid,
    original_url: String,
    shortcode: String,
    short_link: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    clicks: Mutex<ClickLedger>,
}

impl LinkEntry {
    pub(crate) fn snapshot(&self) -> UrlRecord {
        let clicks = self.clicks.lock();
        UrlRecord {
            id: self.id,
            original_url: self.original_url.clone(),
            shortcode: self.shortcode.clone(),
            short_link: self.short_link.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
            click_count: clicks.count,
            click_log: clicks.log.clone(),
        }
    }

    /// Appends a click and bumps the counter in one critical section.
    ///
    /// Returns the new total, or `None` once the record has expired. "Now" is
    /// read under the lock so the log stays in timestamp order.
    pub(crate) fn append_if_active(&self, clock: &dyn Clock, info: ClickInfo) -> Option<u64> {
        let mut clicks = self.clicks.lock();
        let now = clock.now();
        if now > self.expires_at {
            return None;
        }

        clicks.log.push(info.into_event(now));
        clicks.count += 1;
        Some(clicks.count)
    }
}

pub struct Registry {
    links: DashMap<String, Arc<LinkEntry>>,
    generator: ShortcodeGenerator,
    max_generation_attempts: u32,
    base_url: String,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn RegistryObserver>,
}

impl Registry {
    pub fn new(
        options: RegistryOptions,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn RegistryObserver>,
    ) -> Self {
        Self {
            links: DashMap::new(),
            generator: ShortcodeGenerator::new(options.shortcode_length),
            max_generation_attempts: options.max_generation_attempts,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            clock,
            observer,
        }
    }

    /// Creates and registers a new record.
    ///
    /// With `requested_code` the code is validated and claimed as-is;
    /// otherwise random codes are tried until one is free or the attempt
    /// budget runs out.
    pub fn insert(
        &self,
        original_url: &str,
        validity_minutes: i64,
        requested_code: Option<&str>,
    ) -> ShortenerResult<UrlRecord> {
        let result = self.try_insert(original_url, validity_minutes, requested_code);

        match &result {
            Ok(record) => self.observer.on_event(&DomainEvent::Created {
                shortcode: record.shortcode.clone(),
                original_url: record.original_url.clone(),
                expires_at: record.expires_at,
            }),
            Err(err) => {
                debug!(error = %err, "URL creation failed");
                self.observer.on_event(&DomainEvent::Rejected {
                    reason: err.to_string(),
                });
            }
        }

        result
    }

    fn try_insert(
        &self,
        original_url: &str,
        validity_minutes: i64,
        requested_code: Option<&str>,
    ) -> ShortenerResult<UrlRecord> {
        debug!(
            original_url,
            validity_minutes,
            has_custom_shortcode = requested_code.is_some(),
            "Creating new shortened URL"
        );

        if !is_valid_url(original_url) {
            return Err(ShortenerError::InvalidUrl(original_url.to_string()));
        }

        if validity_minutes < 1 {
            return Err(ShortenerError::InvalidValidity(validity_minutes));
        }

        let created_at = self.clock.now();
        let expires_at = TimeDelta::try_minutes(validity_minutes)
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .ok_or(ShortenerError::InvalidValidity(validity_minutes))?;

        let entry = match requested_code {
            Some(code) => {
                Validator::validate(code, self).map_err(|rejection| match rejection {
                    Rejection::Taken => ShortenerError::ShortcodeTaken(code.to_string()),
                    other => ShortenerError::InvalidShortcode(other.message().to_string()),
                })?;

                // Another caller may have claimed it since validation.
                self.claim(code, original_url, created_at, expires_at)
                    .ok_or_else(|| ShortenerError::ShortcodeTaken(code.to_string()))?
            }
            None => self.claim_generated(original_url, created_at, expires_at)?,
        };

        Ok(entry.snapshot())
    }

    fn claim_generated(
        &self,
        original_url: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> ShortenerResult<Arc<LinkEntry>> {
        for attempt in 1..=self.max_generation_attempts {
            let candidate = self.generator.generate();
            debug!(attempt, shortcode = %candidate, "Generated candidate shortcode");

            if is_reserved(&candidate) {
                continue;
            }

            if let Some(entry) = self.claim(&candidate, original_url, created_at, expires_at) {
                return Ok(entry);
            }
        }

        Err(ShortenerError::GenerationExhausted(
            self.max_generation_attempts,
        ))
    }

    /// Registers a record under `code` unless the code was ever issued.
    fn claim(
        &self,
        code: &str,
        original_url: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Option<Arc<LinkEntry>> {
        match self.links.entry(code.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let entry = Arc::new(LinkEntry {
                    id: Uuid::new_v4(),
                    original_url: original_url.to_string(),
                    shortcode: code.to_string(),
                    short_link: self.short_link(code),
                    created_at,
                    expires_at,
                    clicks: Mutex::new(ClickLedger::default()),
                });
                slot.insert(Arc::clone(&entry));
                Some(entry)
            }
        }
    }

    /// Immutable redirect data for `code`. Never touches the click ledger.
    pub fn resolve(&self, code: &str) -> Option<LinkTarget> {
        self.entry(code).map(|entry| LinkTarget {
            shortcode: entry.shortcode.clone(),
            original_url: entry.original_url.clone(),
            expires_at: entry.expires_at,
        })
    }

    /// Returns the stored record, expired or not.
    pub fn lookup(&self, code: &str) -> Option<UrlRecord> {
        self.entry(code).map(|entry| entry.snapshot())
    }

    pub(crate) fn entry(&self, code: &str) -> Option<Arc<LinkEntry>> {
        self.links.get(code).map(|entry| Arc::clone(entry.value()))
    }

    pub fn short_link(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn shared_clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub(crate) fn observer(&self) -> &dyn RegistryObserver {
        self.observer.as_ref()
    }
}

impl IssuedCodes for Registry {
    fn is_issued(&self, code: &str) -> bool {
        self.links.contains_key(code)
    }
}
