//! Scripted relay and recording observer shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use nostr_publisher::{
    Publication, PublicationNotice, PublishObserver, RelayClient, RelayError, RelayLifecycle,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}

/// In-memory relay that replays a fixed script of notices.
///
/// The notice sender is kept after the script is replayed so tests can push
/// further notices, or hold the publication open forever.
pub struct ScriptedRelay {
    url: String,
    lifecycle: broadcast::Sender<RelayLifecycle>,
    connect_error: Option<RelayError>,
    connect_hangs: bool,
    after_connect: Vec<RelayLifecycle>,
    script: Vec<PublicationNotice>,
    sender: Mutex<Option<mpsc::UnboundedSender<PublicationNotice>>>,
    pub publishes: AtomicUsize,
    pub closes: AtomicUsize,
}

impl ScriptedRelay {
    pub fn new(url: &str, script: Vec<PublicationNotice>) -> Self {
        let (lifecycle, _) = broadcast::channel(16);
        Self {
            url: url.to_string(),
            lifecycle,
            connect_error: None,
            connect_hangs: false,
            after_connect: Vec::new(),
            script,
            sender: Mutex::new(None),
            publishes: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        }
    }

    /// Relay whose `connect()` fails
    pub fn unreachable(url: &str, reason: &str) -> Self {
        let mut relay = Self::new(url, Vec::new());
        relay.connect_error = Some(RelayError::Connection(reason.to_string()));
        relay
    }

    /// Relay whose `connect()` never completes
    pub fn hanging(url: &str) -> Self {
        let mut relay = Self::new(url, Vec::new());
        relay.connect_hangs = true;
        relay
    }

    /// Extra lifecycle notifications emitted once connected
    pub fn with_lifecycle(mut self, notifications: Vec<RelayLifecycle>) -> Self {
        self.after_connect = notifications;
        self
    }

    /// Push a notice for the current publication
    pub fn notify(&self, notice: PublicationNotice) -> bool {
        match self.sender.lock().unwrap().as_ref() {
            Some(tx) => tx.send(notice).is_ok(),
            None => false,
        }
    }

    /// Drop the notice sender, ending the publication
    pub fn hang_up(&self) {
        self.sender.lock().unwrap().take();
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn publish_count(&self) -> usize {
        self.publishes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelayClient for ScriptedRelay {
    type Event = String;

    fn url(&self) -> &str {
        &self.url
    }

    fn lifecycle(&self) -> broadcast::Receiver<RelayLifecycle> {
        self.lifecycle.subscribe()
    }

    async fn connect(&self) -> Result<(), RelayError> {
        if self.connect_hangs {
            std::future::pending::<()>().await;
        }
        if let Some(err) = &self.connect_error {
            let _ = self.lifecycle.send(RelayLifecycle::Error(err.to_string()));
            return Err(err.clone());
        }
        let _ = self.lifecycle.send(RelayLifecycle::Connected);
        for notification in &self.after_connect {
            let _ = self.lifecycle.send(notification.clone());
        }
        Ok(())
    }

    fn publish(&self, event: String) -> Publication {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        let (publication, tx) = Publication::channel(event);
        for notice in &self.script {
            let _ = tx.send(notice.clone());
        }
        *self.sender.lock().unwrap() = Some(tx);
        publication
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Observer that records every call as a short line
#[derive(Default)]
pub struct RecordingObserver {
    lines: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.lines().iter().filter(|l| l.starts_with(prefix)).count()
    }

    fn push(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }
}

impl PublishObserver for RecordingObserver {
    fn connected(&self, relay: &str) {
        self.push(format!("connected {relay}"));
    }

    fn connection_error(&self, relay: &str, reason: &str) {
        self.push(format!("connection_error {relay} {reason}"));
    }

    fn connect_failed(&self, relay: &str, reason: &str) {
        self.push(format!("connect_failed {relay} {reason}"));
    }

    fn published(&self, relay: &str, event_id: &str) {
        self.push(format!("published {relay} {event_id}"));
    }

    fn accepted(&self, relay: &str, event_id: &str) {
        self.push(format!("accepted {relay} {event_id}"));
    }

    fn seen(&self, relay: &str, event_id: &str) {
        self.push(format!("seen {relay} {event_id}"));
    }

    fn failed(&self, relay: &str, event_id: &str, reason: &str) {
        self.push(format!("failed {relay} {event_id} {reason}"));
    }

    fn timed_out(&self, relay: &str, event_id: &str, after: Duration) {
        self.push(format!("timed_out {relay} {event_id} {after:?}"));
    }

    fn abandoned(&self, relay: &str, event_id: &str) {
        self.push(format!("abandoned {relay} {event_id}"));
    }

    fn closed(&self, relay: &str, event_id: &str) {
        self.push(format!("closed {relay} {event_id}"));
    }
}
