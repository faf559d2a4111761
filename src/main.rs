//! Shopfront demo session — a scripted stand-in for the storefront view layer.

use anyhow::Result;
use serde_json::json;
use shopfront::checkout::{build_order, Address, CheckoutDetails};
use shopfront::storage::JsonFileStorage;
use shopfront::store::CartStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = std::env::var("SHOPFRONT_CART_PATH").unwrap_or_else(|_| "shopfront-cart.json".to_string());
    tracing::info!(%path, "opening cart");
    let mut store = CartStore::open(Box::new(JsonFileStorage::new(path)));
    store.subscribe(|event| tracing::debug!(?event, "cart event"));

    store.add_to_cart(&json!({
        "productId": 101, "title": "Linen shirt", "price": "₹1,299.00", "quantity": 1,
        "selectedSize": "M",
    }));
    store.add_to_cart(&json!({
        "productId": 205, "title": "Canvas tote", "price": { "amount": 499 }, "quantity": 2,
        "selectedColor": "sand",
    }));
    store.add_to_wishlist(&json!({ "productId": 310, "title": "Wool scarf", "price": 899 }));

    let feedback = store.apply_coupon("save10");
    tracing::info!(%feedback, "coupon");

    let totals = store.totals();
    tracing::info!(
        subtotal = %totals.subtotal,
        discount = %totals.discount_amount,
        shipping = %totals.shipping,
        total = %totals.total,
        wishlist = store.saved_items().len(),
        "cart totals"
    );

    let details = CheckoutDetails {
        name: "Asha Rao".into(),
        email: "asha@example.com".into(),
        shipping_address: Address {
            street1: "14 MG Road".into(),
            street2: None,
            city: "Bengaluru".into(),
            zip: "560001".into(),
            country: "IN".into(),
        },
        coupon_code: Some("save10".into()),
    };
    let draft = build_order(&store, &details)?;
    tracing::info!(order = %draft.order_number, total = %draft.total, "order draft ready");
    Ok(())
}
