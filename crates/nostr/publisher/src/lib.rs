//! Publishing market events to Nostr relays.
//!
//! This crate provides:
//! - The relay collaborator contract ([`RelayClient`])
//! - A single-relay publish attempt with exactly-once close and an optional
//!   deadline ([`publish_event`])
//! - Fan-out of one event to several relays with per-relay reports
//! - A relay status ledger and a `tracing` observer
//! - JSON configuration for relays and deadlines
//!
//! Signing and wire encoding are done by the [`RelayClient`] implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use nostr_publisher::{RelayFanout, RelayLedger, TracingObserver, load_config};
//! use std::sync::Arc;
//!
//! let config = load_config("publisher.json")?;
//! let ledger = Arc::new(RelayLedger::new(Arc::new(TracingObserver)));
//! let fanout = RelayFanout::from_config(&config, |url: &str| MyRelay::new(url))?
//!     .with_observer(ledger.clone());
//!
//! for report in fanout.publish(signed_event).await {
//!     println!("{}: {}", report.relay, report.outcome.label());
//! }
//! for status in ledger.snapshot() {
//!     println!("{} {}", status.url, status.summary());
//! }
//! ```

mod config;
mod error;
mod fanout;
mod ledger;
mod observer;
mod publish;
mod relay;

pub use config::{PublisherConfig, load_config, save_config, validate_relay_url};
pub use error::{PublisherError, RelayError, Result};
pub use fanout::{DeliveryReport, RelayFanout};
pub use ledger::{RelayLedger, RelayStatus};
pub use observer::{PublishObserver, TracingObserver};
pub use publish::{
    DEFAULT_SEEN_TIMEOUT, PublishHandle, PublishOptions, PublishOutcome, publish_event,
};
pub use relay::{Publication, PublicationNotice, RelayClient, RelayFactory, RelayLifecycle};
