//! Relay collaborator contract.
//!
//! The publisher does not speak the wire protocol itself. Anything that can
//! connect to a relay, hand it an already signed event and report back what
//! happened to it implements [`RelayClient`].

use crate::error::RelayError;
use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

/// Connection lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayLifecycle {
    /// Transport established
    Connected,
    /// Transport reported an error
    Error(String),
}

/// What a relay reported about a published event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicationNotice {
    /// Relay accepted the event (OK true)
    Accepted,
    /// Event was observed live on the relay
    Seen,
    /// Relay rejected the event or the send failed
    Failed(String),
}

/// Handle for one submitted event.
///
/// Notices arrive in the order the relay produced them. The sender side
/// belongs to the relay client; when it is dropped no further notices come.
#[derive(Debug)]
pub struct Publication {
    /// Id of the submitted event
    pub event_id: String,
    /// Notices for this event
    pub notices: mpsc::UnboundedReceiver<PublicationNotice>,
}

impl Publication {
    /// Create a publication and the sender the relay client reports through
    pub fn channel(
        event_id: impl Into<String>,
    ) -> (Self, mpsc::UnboundedSender<PublicationNotice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                event_id: event_id.into(),
                notices: rx,
            },
            tx,
        )
    }
}

/// A connection to a single relay
#[async_trait]
pub trait RelayClient: Send + Sync + 'static {
    /// Signed, encoded event type this client submits
    type Event: Send + 'static;

    /// Relay URL
    fn url(&self) -> &str;

    /// Subscribe to connection lifecycle notifications
    fn lifecycle(&self) -> broadcast::Receiver<RelayLifecycle>;

    /// Establish the transport
    async fn connect(&self) -> Result<(), RelayError>;

    /// Submit an event
    fn publish(&self, event: Self::Event) -> Publication;

    /// Release the connection
    fn close(&self);
}

/// Opens a dedicated relay client for a URL
pub trait RelayFactory: Send + Sync {
    type Relay: RelayClient;

    fn open(&self, url: &str) -> Self::Relay;
}

impl<R, F> RelayFactory for F
where
    R: RelayClient,
    F: Fn(&str) -> R + Send + Sync,
{
    type Relay = R;

    fn open(&self, url: &str) -> R {
        self(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publication_channel() {
        let (mut publication, tx) = Publication::channel("abc");
        assert_eq!(publication.event_id, "abc");

        tx.send(PublicationNotice::Accepted).unwrap();
        tx.send(PublicationNotice::Failed("blocked".to_string())).unwrap();
        drop(tx);

        assert_eq!(publication.notices.recv().await, Some(PublicationNotice::Accepted));
        assert_eq!(
            publication.notices.recv().await,
            Some(PublicationNotice::Failed("blocked".to_string()))
        );
        assert_eq!(publication.notices.recv().await, None);
    }
}
