//! Domain events emitted by the registry and click recorder.
//!
//! Observers run after the state change they describe has completed. Whatever
//! an observer does (I/O, failures, panics caught elsewhere) has no effect on
//! the outcome of the operation that produced the event.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    UnknownShortcode,
    Expired,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::UnknownShortcode => "unknown_shortcode",
            DropReason::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    Created {
        shortcode: String,
        original_url: String,
        expires_at: DateTime<Utc>,
    },
    Clicked {
        shortcode: String,
        total_clicks: u64,
    },
    ClickDropped {
        shortcode: String,
        reason: DropReason,
    },
    ExpiredAccess {
        shortcode: String,
        expires_at: DateTime<Utc>,
    },
    Rejected {
        reason: String,
    },
}

pub trait RegistryObserver: Send + Sync {
    fn on_event(&self, event: &DomainEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RegistryObserver for NoopObserver {
    fn on_event(&self, _event: &DomainEvent) {}
}

/// Writes every event to the local `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RegistryObserver for TracingObserver {
    fn on_event(&self, event: &DomainEvent) {
        match event {
            DomainEvent::Created {
                shortcode,
                original_url,
                expires_at,
            } => info!(
                target: "shortener::events",
                shortcode = %shortcode,
                original_url = %original_url,
                expires_at = %expires_at,
                "Short URL created"
            ),
            DomainEvent::Clicked {
                shortcode,
                total_clicks,
            } => info!(
                target: "shortener::events",
                shortcode = %shortcode,
                total_clicks,
                "Click recorded"
            ),
            DomainEvent::ClickDropped { shortcode, reason } => warn!(
                target: "shortener::events",
                shortcode = %shortcode,
                reason = reason.as_str(),
                "Click dropped"
            ),
            DomainEvent::ExpiredAccess {
                shortcode,
                expires_at,
            } => warn!(
                target: "shortener::events",
                shortcode = %shortcode,
                expires_at = %expires_at,
                "Expired URL accessed"
            ),
            DomainEvent::Rejected { reason } => warn!(
                target: "shortener::events",
                reason = %reason,
                "Request rejected"
            ),
        }
    }
}

/// Forwards each event to every inner observer in order.
#[derive(Default, Clone)]
pub struct FanoutObserver {
    observers: Vec<Arc<dyn RegistryObserver>>,
}

impl FanoutObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Arc<dyn RegistryObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl RegistryObserver for FanoutObserver {
    fn on_event(&self, event: &DomainEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

/// Keeps every event it sees. Handy in tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: parking_lot::Mutex<Vec<DomainEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }
}

impl RegistryObserver for RecordingObserver {
    fn on_event(&self, event: &DomainEvent) {
        self.events.lock().push(event.clone());
    }
}
