//! Record to payload normalization.

use crate::payload::{
    Action, CanonicalMarket, CanonicalProduct, CanonicalStall, ProductActionPayload,
    StallActionPayload,
};
use crate::records::{MarketplaceData, ProductRecord, StallRecord};
use tracing::debug;

/// Prefix marking an image as an inline-encoded payload
pub const INLINE_IMAGE_PREFIX: &str = "data:";

/// Characters kept from an inline image
pub const INLINE_IMAGE_MAX_CHARS: usize = 20;

/// Apply the image policy: inline `data:` images are cut to
/// [`INLINE_IMAGE_MAX_CHARS`] characters, anything else passes through.
pub fn normalize_image(image: Option<&str>) -> Option<String> {
    let image = image?;
    if !image.starts_with(INLINE_IMAGE_PREFIX) {
        return Some(image.to_string());
    }
    let truncated = match image.char_indices().nth(INLINE_IMAGE_MAX_CHARS) {
        Some((end, _)) => &image[..end],
        None => image,
    };
    Some(truncated.to_string())
}

fn canonical_product(product: &ProductRecord, action: Option<Action>) -> CanonicalProduct {
    CanonicalProduct {
        id: product.id.clone(),
        name: product.product.clone(),
        description: product.description.clone(),
        categories: product.categories.clone(),
        amount: product.quantity,
        price: product.price,
        image: normalize_image(product.image.as_deref()),
        action,
    }
}

fn canonical_stall(
    stall: &StallRecord,
    products: Option<Vec<CanonicalProduct>>,
    action: Option<Action>,
) -> CanonicalStall {
    CanonicalStall {
        id: stall.id.clone(),
        name: stall.name.clone(),
        description: String::new(),
        shipping: stall.shipping_zones.clone(),
        products,
        action,
    }
}

/// Build the structural snapshot of the whole market.
///
/// Stalls keep their input order and each stall lists its products in input
/// order. Products pointing at an unknown stall are left out. No action is
/// set anywhere: a snapshot describes state, not a mutation.
pub fn build_market_snapshot(data: &MarketplaceData) -> CanonicalMarket {
    let stalls: Vec<CanonicalStall> = data
        .stalls
        .iter()
        .map(|stall| {
            let products = data
                .products_of(&stall.id)
                .map(|p| canonical_product(p, None))
                .collect();
            canonical_stall(stall, Some(products), None)
        })
        .collect();

    let dropped = data.orphan_products().len();
    if dropped > 0 {
        debug!(dropped, "products without a matching stall left out of snapshot");
    }

    CanonicalMarket {
        name: String::new(),
        description: String::new(),
        currency: String::new(),
        action: None,
        stalls,
    }
}

/// Wrap one stall into an action payload.
///
/// The stall carries the same action as the envelope and `products` is
/// `None`. Pass [`Action::default()`] for the usual `update`.
pub fn build_stall_action_payload(stall: &StallRecord, action: Action) -> StallActionPayload {
    StallActionPayload {
        action,
        stalls: vec![canonical_stall(stall, None, Some(action))],
    }
}

/// Product-level action payloads are not implemented; this always returns
/// `None`. There is no agreed product payload shape yet, so none is guessed.
pub fn build_product_action_payload(
    _product: &ProductRecord,
    _action: Action,
) -> Option<ProductActionPayload> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> MarketplaceData {
        MarketplaceData::new(
            vec![
                StallRecord::new("s1", "Books", "eu").with_description("used books"),
                StallRecord::new("s2", "Tea", "world"),
            ],
            vec![
                ProductRecord::new("p1", "s2", "Sencha").with_price(900),
                ProductRecord::new("p2", "s1", "Dune").with_quantity(2),
                ProductRecord::new("p3", "nope", "Lost"),
                ProductRecord::new("p4", "s2", "Matcha").with_image("https://img/matcha.png"),
                ProductRecord::new("p5", "s1", "Emma").with_categories("novel,classic"),
            ],
        )
    }

    #[test]
    fn test_snapshot_preserves_stall_and_product_order() {
        let market = build_market_snapshot(&sample());

        let stall_ids: Vec<&str> = market.stalls.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(stall_ids, vec!["s1", "s2"]);

        let ids = |i: usize| -> Vec<String> {
            market.stalls[i]
                .products
                .as_ref()
                .unwrap()
                .iter()
                .map(|p| p.id.clone())
                .collect()
        };
        assert_eq!(ids(0), vec!["p2", "p5"]);
        assert_eq!(ids(1), vec!["p1", "p4"]);
    }

    #[test]
    fn test_snapshot_drops_orphans() {
        let market = build_market_snapshot(&sample());
        let all: Vec<&CanonicalProduct> = market
            .stalls
            .iter()
            .flat_map(|s| s.products.iter().flatten())
            .collect();
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|p| p.id != "p3"));
    }

    #[test]
    fn test_snapshot_has_no_actions_or_descriptions() {
        let market = build_market_snapshot(&sample());
        assert_eq!(market.name, "");
        assert_eq!(market.description, "");
        assert_eq!(market.currency, "");
        assert_eq!(market.action, None);
        for stall in &market.stalls {
            assert_eq!(stall.description, "");
            assert_eq!(stall.action, None);
            for product in stall.products.as_ref().unwrap() {
                assert_eq!(product.action, None);
            }
        }
    }

    #[test]
    fn test_snapshot_maps_product_fields() {
        let market = build_market_snapshot(&sample());
        let dune = &market.stalls[0].products.as_ref().unwrap()[0];
        assert_eq!(dune.name, "Dune");
        assert_eq!(dune.amount, 2);
        let emma = &market.stalls[0].products.as_ref().unwrap()[1];
        assert_eq!(emma.categories, "novel,classic");
        let matcha = &market.stalls[1].products.as_ref().unwrap()[1];
        assert_eq!(matcha.image.as_deref(), Some("https://img/matcha.png"));
        assert_eq!(market.stalls[1].shipping, "world");
    }

    #[test]
    fn test_snapshot_empty_input() {
        let market = build_market_snapshot(&MarketplaceData::default());
        assert!(market.stalls.is_empty());
    }

    #[test]
    fn test_snapshot_is_deterministic() {
        let data = sample();
        assert_eq!(build_market_snapshot(&data), build_market_snapshot(&data));
    }

    #[test]
    fn test_inline_image_truncated() {
        let inline = format!("data:image/png;base64,{}", "A".repeat(4096));
        let image = normalize_image(Some(&inline)).unwrap();
        assert_eq!(image.chars().count(), INLINE_IMAGE_MAX_CHARS);
        assert_eq!(image, "data:image/png;base6");
    }

    #[test]
    fn test_short_inline_image_kept() {
        assert_eq!(normalize_image(Some("data:x")), Some("data:x".to_string()));
    }

    #[test]
    fn test_regular_image_passthrough() {
        let url = "https://example.com/a/very/long/path/to/an/image.jpeg";
        assert_eq!(normalize_image(Some(url)), Some(url.to_string()));
        // Prefix must be at the start
        let embedded = "https://x/data:image/png;base64,AAAAAAAAAAAA";
        assert_eq!(normalize_image(Some(embedded)), Some(embedded.to_string()));
        assert_eq!(normalize_image(None), None);
    }

    #[test]
    fn test_inline_image_multibyte() {
        let inline = format!("data:{}", "é".repeat(40));
        let image = normalize_image(Some(&inline)).unwrap();
        assert_eq!(image.chars().count(), INLINE_IMAGE_MAX_CHARS);
    }

    #[test]
    fn test_stall_payload_delete() {
        let stall = StallRecord::new("s1", "Books", "eu").with_description("ignored");
        let payload = build_stall_action_payload(&stall, Action::Delete);

        assert_eq!(payload.action, Action::Delete);
        assert_eq!(
            payload.stalls,
            vec![CanonicalStall {
                id: "s1".to_string(),
                name: "Books".to_string(),
                description: String::new(),
                shipping: "eu".to_string(),
                products: None,
                action: Some(Action::Delete),
            }]
        );
    }

    #[test]
    fn test_stall_payload_default_action() {
        let stall = StallRecord::new("s1", "Books", "eu");
        let payload = build_stall_action_payload(&stall, Action::default());
        assert_eq!(payload.action, Action::Update);
        assert_eq!(payload.stalls[0].action, Some(Action::Update));
    }

    #[test]
    fn test_product_payload_is_absent() {
        let product = ProductRecord::new("p1", "s1", "Dune");
        for action in [Action::Create, Action::Update, Action::Delete] {
            assert!(build_product_action_payload(&product, action).is_none());
        }
    }
}
