//! Checkout: validated customer details plus a cart snapshot become an order
//! draft, ready to hand to the remote order API.
//!
//! The coupon is re-evaluated here against the same rule table the cart store
//! uses, so the summary the customer confirms cannot disagree with the cart
//! page. Payment and persistence stay with the remote service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::domain::coupon;
use crate::domain::line_item::VariantAttributes;
use crate::store::{CartStore, FLAT_SHIPPING_FEE, FREE_SHIPPING_THRESHOLD};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart has not finished loading")]
    CartNotLoaded,
    #[error("cart is empty")]
    EmptyCart,
    #[error("invalid checkout details: {0}")]
    InvalidDetails(#[from] validator::ValidationErrors),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(min = 1, message = "street is required"))]
    pub street1: String,
    pub street2: Option<String>,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "postal code is required"))]
    pub zip: String,
    #[validate(length(min = 1, message = "country is required"))]
    pub country: String,
}

/// What the checkout form collects.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct CheckoutDetails {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate]
    pub shipping_address: Address,
    pub coupon_code: Option<String>,
}

/// One snapshotted order line.
#[derive(Clone, Debug, Serialize)]
pub struct OrderLine {
    pub id: String,
    pub product_id: Option<String>,
    pub title: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    #[serde(skip_serializing_if = "VariantAttributes::is_empty")]
    pub variant: VariantAttributes,
}

/// The order summary POSTed to the remote order API by the view layer.
#[derive(Clone, Debug, Serialize)]
pub struct OrderDraft {
    pub id: String,
    pub order_number: String,
    pub name: String,
    pub email: String,
    pub shipping_address: Address,
    pub lines: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub coupon: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Build an order draft from the current cart and validated details.
///
/// Fails on invalid details, a store that has not finished its initial load,
/// or an empty cart. If the details carry a coupon code it is re-evaluated;
/// otherwise the store's current discount is used as-is.
pub fn build_order(store: &CartStore, details: &CheckoutDetails) -> Result<OrderDraft, CheckoutError> {
    details.validate()?;
    if !store.is_loaded() {
        return Err(CheckoutError::CartNotLoaded);
    }
    let lines: Vec<OrderLine> = store
        .active_items()
        .into_iter()
        .map(|item| OrderLine {
            id: item.id.clone(),
            product_id: item.product_id.clone(),
            title: item.title.clone(),
            quantity: item.quantity,
            unit_price: item.price,
            line_total: item.line_total(),
            variant: item.variant.clone(),
        })
        .collect();
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let subtotal = store.subtotal();
    let (discount_rate, coupon) = match &details.coupon_code {
        Some(code) => {
            let outcome = coupon::evaluate(code, subtotal);
            (outcome.discount, outcome.code)
        }
        None => (store.discount(), store.coupon_code().map(str::to_string)),
    };
    let discount = subtotal * discount_rate;
    let shipping = if subtotal >= FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING_FEE
    };
    let total = (subtotal - discount + shipping).max(Decimal::ZERO);

    let id = Uuid::new_v4().to_string();
    let order_number = format!("ORD-{}", id[..8].to_uppercase());
    Ok(OrderDraft {
        id,
        order_number,
        name: details.name.clone(),
        email: details.email.clone(),
        shipping_address: details.shipping_address.clone(),
        lines,
        subtotal,
        discount,
        shipping,
        total,
        coupon,
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::storage::MemoryStorage;

    fn details() -> CheckoutDetails {
        CheckoutDetails {
            name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            shipping_address: Address {
                street1: "14 MG Road".into(),
                street2: None,
                city: "Bengaluru".into(),
                zip: "560001".into(),
                country: "IN".into(),
            },
            coupon_code: None,
        }
    }

    fn loaded_store() -> CartStore {
        let mut store = CartStore::open(Box::new(MemoryStorage::new()));
        store.add_to_cart(&json!({ "productId": "P1", "title": "Shirt", "price": 500, "quantity": 2 }));
        store
    }

    #[test]
    fn builds_a_draft_from_the_active_cart() {
        let store = loaded_store();
        let draft = build_order(&store, &details()).expect("draft should build");
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].line_total, Decimal::from(1000));
        assert_eq!(draft.subtotal, Decimal::from(1000));
        assert_eq!(draft.shipping, Decimal::ZERO);
        assert_eq!(draft.total, Decimal::from(1000));
        assert!(draft.order_number.starts_with("ORD-"));
    }

    #[test]
    fn checkout_coupon_uses_the_same_table_as_the_store() {
        let mut store = loaded_store();
        store.apply_coupon("SAVE10");
        let store_total = store.final_total();

        let mut d = details();
        d.coupon_code = Some("save10".into());
        let draft = build_order(&store, &d).expect("draft should build");
        assert_eq!(draft.total, store_total);
        assert_eq!(draft.coupon.as_deref(), Some("SAVE10"));
    }

    #[test]
    fn falls_back_to_the_store_discount_without_a_code() {
        let mut store = loaded_store();
        store.apply_coupon("SAVE20");
        let draft = build_order(&store, &details()).expect("draft should build");
        assert_eq!(draft.discount, Decimal::from(200));
        assert_eq!(draft.coupon.as_deref(), Some("SAVE20"));
    }

    #[test]
    fn empty_cart_is_rejected() {
        let store = CartStore::open(Box::new(MemoryStorage::new()));
        assert!(matches!(
            build_order(&store, &details()),
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[test]
    fn unloaded_store_is_rejected() {
        let store = CartStore::new(Box::new(MemoryStorage::new()));
        assert!(matches!(
            build_order(&store, &details()),
            Err(CheckoutError::CartNotLoaded)
        ));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let store = loaded_store();
        let mut d = details();
        d.email = "not-an-email".into();
        assert!(matches!(
            build_order(&store, &d),
            Err(CheckoutError::InvalidDetails(_))
        ));
    }

    #[test]
    fn missing_address_field_is_rejected() {
        let store = loaded_store();
        let mut d = details();
        d.shipping_address.city = String::new();
        assert!(matches!(
            build_order(&store, &d),
            Err(CheckoutError::InvalidDetails(_))
        ));
    }

    #[test]
    fn shipping_fee_applies_below_the_threshold() {
        let mut store = CartStore::open(Box::new(MemoryStorage::new()));
        store.add_to_cart(&json!({ "productId": "P1", "price": 300, "quantity": 1 }));
        let draft = build_order(&store, &details()).expect("draft should build");
        assert_eq!(draft.shipping, FLAT_SHIPPING_FEE);
        assert_eq!(draft.total, Decimal::from(349));
    }
}
