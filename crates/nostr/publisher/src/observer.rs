//! Observability sink for publish attempts.
//!
//! Every lifecycle step of a publish attempt is reported to a
//! [`PublishObserver`]. The default [`TracingObserver`] turns them into
//! `tracing` events; other sinks (the [`crate::RelayLedger`], test
//! recorders) implement the same trait.

use std::time::Duration;
use tracing::{debug, info, warn};

/// Receives publish lifecycle events. All methods default to doing nothing.
pub trait PublishObserver: Send + Sync {
    /// Relay reported its transport as connected
    fn connected(&self, _relay: &str) {}

    /// Relay reported a transport error (observational only)
    fn connection_error(&self, _relay: &str, _reason: &str) {}

    /// `connect()` failed, nothing was published
    fn connect_failed(&self, _relay: &str, _reason: &str) {}

    /// Event handed to the relay
    fn published(&self, _relay: &str, _event_id: &str) {}

    /// Relay accepted the event
    fn accepted(&self, _relay: &str, _event_id: &str) {}

    /// Event observed live on the relay
    fn seen(&self, _relay: &str, _event_id: &str) {}

    /// Relay reported a failure
    fn failed(&self, _relay: &str, _event_id: &str, _reason: &str) {}

    /// No terminal notice before the deadline
    fn timed_out(&self, _relay: &str, _event_id: &str, _after: Duration) {}

    /// Relay stopped reporting without a terminal notice
    fn abandoned(&self, _relay: &str, _event_id: &str) {}

    /// Connection closed by the publisher
    fn closed(&self, _relay: &str, _event_id: &str) {}
}

/// Observer that writes structured `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PublishObserver for TracingObserver {
    fn connected(&self, relay: &str) {
        info!(relay, "Connected to relay");
    }

    fn connection_error(&self, relay: &str, reason: &str) {
        warn!(relay, reason, "Relay connection error");
    }

    fn connect_failed(&self, relay: &str, reason: &str) {
        warn!(relay, reason, "Failed to connect to relay, event not published");
    }

    fn published(&self, relay: &str, event_id: &str) {
        debug!(relay, event_id, "Event submitted");
    }

    fn accepted(&self, relay: &str, event_id: &str) {
        info!(relay, event_id, "Event accepted by relay");
    }

    fn seen(&self, relay: &str, event_id: &str) {
        info!(relay, event_id, "Event seen on relay");
    }

    fn failed(&self, relay: &str, event_id: &str, reason: &str) {
        warn!(relay, event_id, reason, "Failed to publish event");
    }

    fn timed_out(&self, relay: &str, event_id: &str, after: Duration) {
        warn!(relay, event_id, ?after, "Event not seen before deadline");
    }

    fn abandoned(&self, relay: &str, event_id: &str) {
        warn!(relay, event_id, "Relay stopped reporting on event");
    }

    fn closed(&self, relay: &str, event_id: &str) {
        debug!(relay, event_id, "Relay connection closed");
    }
}
