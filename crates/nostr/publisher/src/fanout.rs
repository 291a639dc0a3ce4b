//! Publishing one event to several relays.
//!
//! Each relay gets its own client from the [`RelayFactory`] and its own
//! publish attempt. Attempts share nothing but the observer, and one relay's
//! outcome never affects another's. There is no retry.

use crate::config::PublisherConfig;
use crate::error::Result;
use crate::observer::{PublishObserver, TracingObserver};
use crate::publish::{PublishOptions, PublishOutcome, publish_event};
use crate::relay::{RelayClient, RelayFactory};
use futures::future::join_all;
use std::sync::Arc;
use tracing::info;

/// Result of publishing to one relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub relay: String,
    /// `None` if the relay could not be reached
    pub event_id: Option<String>,
    pub outcome: PublishOutcome,
}

/// Publishes events to a fixed list of relays
pub struct RelayFanout<F: RelayFactory> {
    relays: Vec<String>,
    factory: F,
    observer: Arc<dyn PublishObserver>,
    options: PublishOptions,
}

impl<F: RelayFactory> RelayFanout<F> {
    /// Create a fan-out logging through `tracing` with default options
    pub fn new(relays: Vec<String>, factory: F) -> Self {
        Self {
            relays,
            factory,
            observer: Arc::new(TracingObserver),
            options: PublishOptions::default(),
        }
    }

    /// Create from a validated config
    pub fn from_config(config: &PublisherConfig, factory: F) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.relays.clone(), factory).with_options(config.options()))
    }

    pub fn with_observer(mut self, observer: Arc<dyn PublishObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_options(mut self, options: PublishOptions) -> Self {
        self.options = options;
        self
    }

    pub fn relays(&self) -> &[String] {
        &self.relays
    }

    /// Publish `event` to every relay and wait for all outcomes.
    ///
    /// Reports come back in relay order.
    pub async fn publish(&self, event: <F::Relay as RelayClient>::Event) -> Vec<DeliveryReport>
    where
        <F::Relay as RelayClient>::Event: Clone,
    {
        let attempts = self.relays.iter().map(|url| {
            let relay = Arc::new(self.factory.open(url));
            publish_event(
                relay,
                event.clone(),
                Arc::clone(&self.observer),
                self.options.clone(),
            )
        });
        let handles = join_all(attempts).await;

        let reports = join_all(handles.into_iter().map(|handle| async move {
            let relay = handle.relay().to_string();
            let event_id = handle.event_id().map(str::to_string);
            DeliveryReport {
                relay,
                event_id,
                outcome: handle.outcome().await,
            }
        }))
        .await;

        let delivered = reports.iter().filter(|r| r.outcome.is_delivered()).count();
        info!(delivered, total = reports.len(), "Event fan-out finished");
        reports
    }
}
