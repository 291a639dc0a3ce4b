//! Marketplace records as handed over by the store.
//!
//! These mirror the rows the marketplace keeps for stalls and products. They
//! are read-only inputs: nothing in this crate mutates or persists them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A seller's storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StallRecord {
    /// Stall identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Shipping zones served by the stall, as stored
    #[serde(rename = "shippingzones", default)]
    pub shipping_zones: String,

    /// Stall description, if the store keeps one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StallRecord {
    /// Create a stall record
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        shipping_zones: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            shipping_zones: shipping_zones.into(),
            description: None,
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An item listed by exactly one stall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product identifier
    pub id: String,

    /// Owning stall id
    pub stall: String,

    /// Product display name
    pub product: String,

    #[serde(default)]
    pub description: String,

    /// Categories, as stored (comma separated)
    #[serde(default)]
    pub categories: String,

    /// Units in stock
    #[serde(default)]
    pub quantity: u64,

    /// Unit price
    #[serde(default)]
    pub price: u64,

    /// Image URL or inline `data:` URI
    #[serde(default)]
    pub image: Option<String>,
}

impl ProductRecord {
    /// Create a product record with empty description, categories and image
    pub fn new(id: impl Into<String>, stall: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stall: stall.into(),
            product: product.into(),
            description: String::new(),
            categories: String::new(),
            quantity: 0,
            price: 0,
            image: None,
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set categories
    pub fn with_categories(mut self, categories: impl Into<String>) -> Self {
        self.categories = categories.into();
        self
    }

    /// Set quantity
    pub fn with_quantity(mut self, quantity: u64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set price
    pub fn with_price(mut self, price: u64) -> Self {
        self.price = price;
        self
    }

    /// Set image
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Current marketplace state: every stall and every product.
///
/// Products are expected to reference an existing stall through
/// [`ProductRecord::stall`]; the ones that don't are left out of snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceData {
    pub stalls: Vec<StallRecord>,
    pub products: Vec<ProductRecord>,
}

impl MarketplaceData {
    pub fn new(stalls: Vec<StallRecord>, products: Vec<ProductRecord>) -> Self {
        Self { stalls, products }
    }

    /// Products of the given stall, in input order
    pub fn products_of<'a>(&'a self, stall_id: &'a str) -> impl Iterator<Item = &'a ProductRecord> {
        self.products.iter().filter(move |p| p.stall == stall_id)
    }

    /// Products whose stall is not part of this data set
    pub fn orphan_products(&self) -> Vec<&ProductRecord> {
        let known: HashSet<&str> = self.stalls.iter().map(|s| s.id.as_str()).collect();
        self.products
            .iter()
            .filter(|p| !known.contains(p.stall.as_str()))
            .collect()
    }
}
