use crate::clock::Clock;
use crate::model::{ClickEvent, UrlRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Read-only view of a record with its click aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub shortcode: String,
    pub original_url: String,
    pub short_link: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_expired: bool,
    pub total_clicks: u64,
    pub clicks_by_source: BTreeMap<String, u64>,
    pub clicks_by_location: BTreeMap<String, u64>,
    pub click_log: Vec<ClickEvent>,
}

/// Derives [`Statistics`] from records. Expiry is evaluated on every call.
#[derive(Clone)]
pub struct StatsProjector {
    clock: Arc<dyn Clock>,
}

impl StatsProjector {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn project(&self, record: &UrlRecord) -> Statistics {
        project_at(record, self.clock.now())
    }
}

pub fn project_at(record: &UrlRecord, now: DateTime<Utc>) -> Statistics {
    Statistics {
        shortcode: record.shortcode.clone(),
        original_url: record.original_url.clone(),
        short_link: record.short_link.clone(),
        created_at: record.created_at,
        expires_at: record.expires_at,
        is_expired: record.is_expired_at(now),
        total_clicks: record.click_count,
        clicks_by_source: tally(&record.click_log, |click| &click.source),
        clicks_by_location: tally(&record.click_log, |click| &click.location),
        click_log: record.click_log.clone(),
    }
}

fn tally<'a>(
    clicks: &'a [ClickEvent],
    key: impl Fn(&'a ClickEvent) -> &'a String,
) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for click in clicks {
        *counts.entry(key(click).clone()).or_insert(0) += 1;
    }
    counts
}
