//! Per-relay delivery counters.

use crate::observer::PublishObserver;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Delivery counters for one relay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStatus {
    pub url: String,
    /// Last lifecycle state reported by the relay
    pub connected: bool,
    pub sent: u64,
    pub accepted: u64,
    pub seen: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub unreachable: u64,
    /// Attempts the relay client dropped without a terminal notice
    pub abandoned: u64,
    /// Transport errors reported through the lifecycle channel
    pub errors: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl RelayStatus {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    /// Every kind of failure seen on this relay
    pub fn error_count(&self) -> u64 {
        self.errors + self.failed + self.timed_out + self.unreachable + self.abandoned
    }

    /// One-line status, e.g. `⬆️ 3 ⬇️ 2 ⚠️ 1`
    pub fn summary(&self) -> String {
        format!("⬆️ {} ⬇️ {} ⚠️ {}", self.sent, self.seen, self.error_count())
    }
}

/// Observer that counts outcomes per relay and forwards every call to an
/// inner observer.
pub struct RelayLedger {
    inner: Arc<dyn PublishObserver>,
    statuses: Mutex<HashMap<String, RelayStatus>>,
}

impl RelayLedger {
    pub fn new(inner: Arc<dyn PublishObserver>) -> Self {
        Self {
            inner,
            statuses: Mutex::new(HashMap::new()),
        }
    }

    /// Status of one relay, if it has been seen
    pub fn status(&self, url: &str) -> Option<RelayStatus> {
        self.statuses.lock().get(url).cloned()
    }

    /// Status of every relay, sorted by URL
    pub fn snapshot(&self) -> Vec<RelayStatus> {
        let mut all: Vec<RelayStatus> = self.statuses.lock().values().cloned().collect();
        all.sort_by(|a, b| a.url.cmp(&b.url));
        all
    }

    fn update(&self, url: &str, f: impl FnOnce(&mut RelayStatus)) {
        let mut statuses = self.statuses.lock();
        let status = statuses
            .entry(url.to_string())
            .or_insert_with(|| RelayStatus::new(url));
        f(status);
    }
}

impl PublishObserver for RelayLedger {
    fn connected(&self, relay: &str) {
        self.update(relay, |s| s.connected = true);
        self.inner.connected(relay);
    }

    fn connection_error(&self, relay: &str, reason: &str) {
        self.update(relay, |s| {
            s.errors += 1;
            s.last_error = Some(reason.to_string());
        });
        self.inner.connection_error(relay, reason);
    }

    fn connect_failed(&self, relay: &str, reason: &str) {
        self.update(relay, |s| {
            s.connected = false;
            s.unreachable += 1;
            s.last_error = Some(reason.to_string());
        });
        self.inner.connect_failed(relay, reason);
    }

    fn published(&self, relay: &str, event_id: &str) {
        self.update(relay, |s| s.sent += 1);
        self.inner.published(relay, event_id);
    }

    fn accepted(&self, relay: &str, event_id: &str) {
        self.update(relay, |s| s.accepted += 1);
        self.inner.accepted(relay, event_id);
    }

    fn seen(&self, relay: &str, event_id: &str) {
        self.update(relay, |s| s.seen += 1);
        self.inner.seen(relay, event_id);
    }

    fn failed(&self, relay: &str, event_id: &str, reason: &str) {
        self.update(relay, |s| {
            s.failed += 1;
            s.last_error = Some(reason.to_string());
        });
        self.inner.failed(relay, event_id, reason);
    }

    fn timed_out(&self, relay: &str, event_id: &str, after: Duration) {
        self.update(relay, |s| {
            s.timed_out += 1;
            s.last_error = Some(format!("not seen after {:?}", after));
        });
        self.inner.timed_out(relay, event_id, after);
    }

    fn abandoned(&self, relay: &str, event_id: &str) {
        self.update(relay, |s| {
            s.abandoned += 1;
            s.last_error = Some("dropped without a terminal notice".to_string());
        });
        self.inner.abandoned(relay, event_id);
    }

    fn closed(&self, relay: &str, event_id: &str) {
        self.update(relay, |s| s.connected = false);
        self.inner.closed(relay, event_id);
    }
}
