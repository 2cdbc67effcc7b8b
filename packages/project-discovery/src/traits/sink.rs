//! Observer seam for pipeline events.

use tracing::{info, warn};

use crate::events::DiscoveryEvent;

/// Receives every [`DiscoveryEvent`] the pipeline produces.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DiscoveryEvent);
}

/// Forwards events to `tracing` as structured log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: DiscoveryEvent) {
        let kind = event.kind();
        let payload = serde_json::to_string(&event).unwrap_or_default();
        if event.is_failure() {
            warn!(event = kind, payload = %payload, "discovery event");
        } else {
            info!(event = kind, payload = %payload, "discovery event");
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: DiscoveryEvent) {}
}
