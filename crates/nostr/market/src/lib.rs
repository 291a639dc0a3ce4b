//! Marketplace payload normalization for Nostr relays.
//!
//! This crate turns the marketplace's stall and product records into the
//! canonical nested shape that is encoded, signed and published as event
//! content:
//! - Full market snapshots (every stall with its products, no action)
//! - Single-stall action payloads (`create`, `update`, `delete`)
//! - Inline image truncation so `data:` URIs never end up in events
//!
//! Everything here is pure and synchronous. Encoding, signing and relay I/O
//! live outside this crate.
//!
//! # Example
//!
//! ```
//! use nostr_market::{
//!     Action, MarketPayload, MarketplaceData, ProductRecord, StallRecord,
//!     build_market_snapshot, build_stall_action_payload,
//! };
//!
//! let stall = StallRecord::new("s1", "Bob's Books", "zone-eu");
//! let product = ProductRecord::new("p1", "s1", "Rust in Action")
//!     .with_price(21_000)
//!     .with_quantity(3);
//!
//! let data = MarketplaceData::new(vec![stall.clone()], vec![product]);
//! let snapshot = build_market_snapshot(&data);
//! assert_eq!(snapshot.stalls[0].products.as_ref().map(Vec::len), Some(1));
//!
//! let payload = build_stall_action_payload(&stall, Action::Delete);
//! assert_eq!(payload.action(), Some(Action::Delete));
//! let content = payload.to_content().unwrap();
//! assert!(content.contains("\"delete\""));
//! ```

mod error;
mod normalize;
mod payload;
mod records;

pub use error::{MarketError, Result};
pub use normalize::{
    INLINE_IMAGE_MAX_CHARS, INLINE_IMAGE_PREFIX, build_market_snapshot,
    build_product_action_payload, build_stall_action_payload, normalize_image,
};
pub use payload::{
    Action, CanonicalMarket, CanonicalProduct, CanonicalStall, MarketPayload,
    ProductActionPayload, StallActionPayload,
};
pub use records::{MarketplaceData, ProductRecord, StallRecord};
