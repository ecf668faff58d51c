use crate::events::{DomainEvent, DropReason};
use crate::model::ClickInfo;
use crate::registry::Registry;
use std::sync::Arc;
use tracing::debug;

/// Appends click events to records and keeps their counters in step.
#[derive(Clone)]
pub struct ClickRecorder {
    registry: Arc<Registry>,
}

impl ClickRecorder {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Records one click. Unknown and expired shortcodes are dropped and
    /// reported as `false`.
    pub fn record_click(&self, code: &str, info: ClickInfo) -> bool {
        let Some(entry) = self.registry.entry(code) else {
            debug!(shortcode = %code, "Attempted to record click for non-existent shortcode");
            self.emit(DomainEvent::ClickDropped {
                shortcode: code.to_string(),
                reason: DropReason::UnknownShortcode,
            });
            return false;
        };

        match entry.append_if_active(self.registry.clock(), info) {
            Some(total_clicks) => {
                debug!(shortcode = %code, total_clicks, "Click recorded successfully");
                self.emit(DomainEvent::Clicked {
                    shortcode: code.to_string(),
                    total_clicks,
                });
                true
            }
            None => {
                debug!(shortcode = %code, "Click on expired URL");
                self.emit(DomainEvent::ClickDropped {
                    shortcode: code.to_string(),
                    reason: DropReason::Expired,
                });
                false
            }
        }
    }

    fn emit(&self, event: DomainEvent) {
        self.registry.observer().on_event(&event);
    }
}
