//! Canonical market payloads.
//!
//! The shapes in this module are what relays end up carrying as event
//! content. Field names are part of that contract.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Intent of a payload relative to what relays already hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    #[default]
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product as it appears inside a stall payload.
///
/// `image` is lossy for inline images: a `data:` URI is cut down to its
/// first 20 characters so encoded images never travel inside events. The
/// result is a placeholder, not a usable image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub categories: String,
    /// Units available
    pub amount: u64,
    pub price: u64,
    pub image: Option<String>,
    /// Set independently of the owning stall; unset in full snapshots
    pub action: Option<Action>,
}

/// Stall with the products that belong to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalStall {
    pub id: String,
    pub name: String,
    /// Always empty: the stall record's own description is not carried over
    pub description: String,
    pub shipping: String,
    /// `None` means no product changes accompany this stall
    pub products: Option<Vec<CanonicalProduct>>,
    pub action: Option<Action>,
}

/// Root payload describing the whole market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalMarket {
    pub name: String,
    pub description: String,
    pub currency: String,
    pub action: Option<Action>,
    pub stalls: Vec<CanonicalStall>,
}

/// Incremental update for a single stall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StallActionPayload {
    pub action: Action,
    pub stalls: Vec<CanonicalStall>,
}

/// Incremental update for a single product.
///
/// No builder produces this yet, see [`crate::build_product_action_payload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductActionPayload {
    pub action: Action,
    pub stalls: Vec<CanonicalStall>,
}

/// Root payloads that can be handed to the event encoder
pub trait MarketPayload: Serialize {
    /// Action carried at the root, if any
    fn action(&self) -> Option<Action>;

    /// Render as event content (compact JSON)
    fn to_content(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl MarketPayload for CanonicalMarket {
    fn action(&self) -> Option<Action> {
        self.action
    }
}

impl MarketPayload for StallActionPayload {
    fn action(&self) -> Option<Action> {
        Some(self.action)
    }
}

impl MarketPayload for ProductActionPayload {
    fn action(&self) -> Option<Action> {
        Some(self.action)
    }
}
