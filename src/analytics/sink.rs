//! Destinations for analytics records

use super::AnalyticsRecord;

/// Receives every analytics record of a session.
pub trait EventSink: Send + Sync {
    /// Handle one record; must not fail the visitor's action
    fn emit(&self, record: &AnalyticsRecord);
}

/// Writes each record as one JSON line on the `analytics` log target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingSink {
    fn emit(&self, record: &AnalyticsRecord) {
        match serde_json::to_string(record) {
            Ok(json) => tracing::info!(
                target: "analytics",
                event_type = record.event.kind(),
                record = %json,
                "Analytics event"
            ),
            Err(e) => tracing::warn!(
                target: "analytics",
                error = %e,
                event_type = record.event.kind(),
                "Failed to serialize analytics event"
            ),
        }
    }
}
