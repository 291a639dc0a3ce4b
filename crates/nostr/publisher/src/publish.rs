//! Single relay publish attempt.
//!
//! One call to [`publish_event`] drives one event through one relay:
//!
//! ```text
//! Connecting --connect ok--> Connected --seen----> Delivered
//!     |                          |------failed--> Failed
//!     |                          |------deadline-> TimedOut
//!     |                          '------dropped--> Abandoned
//!     '--connect err or deadline--> Unreachable
//! ```
//!
//! `Accepted` notices are reported but do not end the attempt. Whatever ends
//! it, the relay connection is closed exactly once (except an unbounded wait
//! that never ends). `connect()` is bounded by its own deadline and ends as
//! `Unreachable` when it fails or runs out of time.

use crate::error::RelayError;
use crate::observer::PublishObserver;
use crate::relay::{Publication, PublicationNotice, RelayClient, RelayLifecycle};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::debug;

/// Default time to wait for a terminal notice
pub const DEFAULT_SEEN_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time to wait for `connect()`
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Publish attempt options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    /// Deadline for `connect()`. `None` waits as long as the relay client
    /// does.
    pub connect_timeout: Option<Duration>,
    /// Deadline for `seen`/`failed`. `None` waits forever and never closes
    /// the connection if the relay stays silent.
    pub seen_timeout: Option<Duration>,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            seen_timeout: Some(DEFAULT_SEEN_TIMEOUT),
        }
    }
}

impl PublishOptions {
    /// Wait for a terminal notice without a deadline. The connect deadline
    /// keeps its default.
    pub fn unbounded() -> Self {
        Self {
            seen_timeout: None,
            ..Default::default()
        }
    }

    /// Set the terminal notice deadline
    pub fn with_seen_timeout(mut self, seen_timeout: Duration) -> Self {
        self.seen_timeout = Some(seen_timeout);
        self
    }

    /// Set the connect deadline
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    /// Wait for `connect()` without a deadline
    pub fn without_connect_timeout(mut self) -> Self {
        self.connect_timeout = None;
        self
    }
}

/// How a publish attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Event observed live on the relay
    Delivered,
    /// Relay reported a failure
    Failed(String),
    /// No terminal notice before the deadline
    TimedOut(Duration),
    /// Could not connect; nothing was published
    Unreachable(String),
    /// Relay stopped reporting without a terminal notice
    Abandoned,
}

impl PublishOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, PublishOutcome::Delivered)
    }

    /// Short label for logs and status output
    pub fn label(&self) -> &'static str {
        match self {
            PublishOutcome::Delivered => "delivered",
            PublishOutcome::Failed(_) => "failed",
            PublishOutcome::TimedOut(_) => "timed_out",
            PublishOutcome::Unreachable(_) => "unreachable",
            PublishOutcome::Abandoned => "abandoned",
        }
    }
}

/// Closes a relay at most once, whichever path asks first
#[derive(Debug, Default)]
struct CloseOnce {
    closed: AtomicBool,
}

impl CloseOnce {
    /// Returns true if this call performed the close
    fn close<R: RelayClient>(&self, relay: &R) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        relay.close();
        true
    }
}

enum HandleState {
    Ready(PublishOutcome),
    Running(JoinHandle<PublishOutcome>),
}

/// A scheduled publish attempt.
///
/// Dropping the handle leaves the attempt running in the background;
/// [`PublishHandle::outcome`] waits for it to end.
pub struct PublishHandle {
    relay: String,
    event_id: Option<String>,
    state: HandleState,
}

impl PublishHandle {
    /// Relay URL
    pub fn relay(&self) -> &str {
        &self.relay
    }

    /// Submitted event id, `None` if the relay was unreachable
    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    /// Whether the attempt has ended
    pub fn is_finished(&self) -> bool {
        match &self.state {
            HandleState::Ready(_) => true,
            HandleState::Running(task) => task.is_finished(),
        }
    }

    /// Wait for the attempt to end
    pub async fn outcome(self) -> PublishOutcome {
        match self.state {
            HandleState::Ready(outcome) => outcome,
            HandleState::Running(task) => match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    debug!(relay = %self.relay, error = %e, "Publish task ended abnormally");
                    PublishOutcome::Abandoned
                }
            },
        }
    }
}

/// Connect to `relay`, submit `event` and follow it to a terminal notice.
///
/// Returns once the event has been submitted and its notices are being
/// watched; the terminal outcome comes later through the returned handle.
/// Failures are reported to `observer` and as a [`PublishOutcome`], never
/// as an error.
pub async fn publish_event<R: RelayClient>(
    relay: Arc<R>,
    event: R::Event,
    observer: Arc<dyn PublishObserver>,
    options: PublishOptions,
) -> PublishHandle {
    let url = relay.url().to_string();
    let watcher = LifecycleWatcher::spawn(url.clone(), relay.lifecycle(), Arc::clone(&observer));

    if let Err(e) = connect(relay.as_ref(), options.connect_timeout).await {
        let reason = e.to_string();
        observer.connect_failed(&url, &reason);
        watcher.stop().await;
        // A failed or abandoned connect may have left a half-open transport
        CloseOnce::default().close(relay.as_ref());
        return PublishHandle {
            relay: url,
            event_id: None,
            state: HandleState::Ready(PublishOutcome::Unreachable(reason)),
        };
    }

    let publication = relay.publish(event);
    let event_id = publication.event_id.clone();
    observer.published(&url, &event_id);

    let task = tokio::spawn(follow_publication(relay, publication, observer, options, watcher));

    PublishHandle {
        relay: url,
        event_id: Some(event_id),
        state: HandleState::Running(task),
    }
}

async fn connect<R: RelayClient>(relay: &R, limit: Option<Duration>) -> Result<(), RelayError> {
    let Some(limit) = limit else {
        return relay.connect().await;
    };
    match timeout(limit, relay.connect()).await {
        Ok(result) => result,
        Err(_) => Err(RelayError::Timeout(format!(
            "Connection timeout after {:?}",
            limit
        ))),
    }
}

async fn follow_publication<R: RelayClient>(
    relay: Arc<R>,
    mut publication: Publication,
    observer: Arc<dyn PublishObserver>,
    options: PublishOptions,
    watcher: LifecycleWatcher,
) -> PublishOutcome {
    let url = relay.url().to_string();
    let event_id = publication.event_id.clone();

    let outcome = match options.seen_timeout {
        Some(limit) => {
            match timeout(limit, await_terminal(&url, &mut publication, observer.as_ref())).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    observer.timed_out(&url, &event_id, limit);
                    PublishOutcome::TimedOut(limit)
                }
            }
        }
        None => await_terminal(&url, &mut publication, observer.as_ref()).await,
    };

    // Flush lifecycle notifications so they are reported before the close
    watcher.stop().await;

    let guard = CloseOnce::default();
    if guard.close(relay.as_ref()) {
        observer.closed(&url, &event_id);
    }

    // Terminal notices already queued behind the winner ask for a close too
    while let Ok(notice) = publication.notices.try_recv() {
        let terminal = matches!(notice, PublicationNotice::Seen | PublicationNotice::Failed(_));
        if terminal && !guard.close(relay.as_ref()) {
            debug!(relay = %url, event_id = %event_id, ?notice, "Ignoring notice after outcome");
        }
    }

    outcome
}

async fn await_terminal(
    url: &str,
    publication: &mut Publication,
    observer: &dyn PublishObserver,
) -> PublishOutcome {
    while let Some(notice) = publication.notices.recv().await {
        match notice {
            PublicationNotice::Accepted => observer.accepted(url, &publication.event_id),
            PublicationNotice::Seen => {
                observer.seen(url, &publication.event_id);
                return PublishOutcome::Delivered;
            }
            PublicationNotice::Failed(reason) => {
                observer.failed(url, &publication.event_id, &reason);
                return PublishOutcome::Failed(reason);
            }
        }
    }
    observer.abandoned(url, &publication.event_id);
    PublishOutcome::Abandoned
}

/// Forwards lifecycle notifications to the observer until stopped.
///
/// Buffered notifications are drained before a stop request is honored.
struct LifecycleWatcher {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl LifecycleWatcher {
    fn spawn(
        url: String,
        mut rx: broadcast::Receiver<RelayLifecycle>,
        observer: Arc<dyn PublishObserver>,
    ) -> Self {
        let (stop, mut stop_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Ok(RelayLifecycle::Connected) => observer.connected(&url),
                        Ok(RelayLifecycle::Error(reason)) => observer.connection_error(&url, &reason),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!(relay = %url, skipped, "Lifecycle notifications lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = &mut stop_rx => break,
                }
            }
        });
        Self { stop, task }
    }

    async fn stop(self) {
        let _ = self.stop.send(());
        let _ = self.task.await;
    }
}
