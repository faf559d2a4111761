//! The canonical cart line item and its normalization boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::price::{sanitize_price, sanitize_quantity};

/// Display name used when the input carries neither `title` nor `name`.
pub const DEFAULT_TITLE: &str = "Untitled item";
/// Thumbnail path used when the input carries neither `image` nor `thumbnail`.
pub const DEFAULT_IMAGE: &str = "/images/placeholder.png";

/// Typed variant attributes lifted out of the raw item shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariantAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
}

impl VariantAttributes {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.size.is_none() && self.sku.is_none() && self.vendor.is_none()
    }

    fn from_raw(raw: &Value) -> Self {
        Self {
            color: field_string(raw, &["selectedColor", "color"]),
            size: field_string(raw, &["selectedSize", "size"]),
            sku: field_string(raw, &["sku"]),
            vendor: field_string(raw, &["vendor"]),
        }
    }
}

/// One cart or wishlist entry. `active` is the sole discriminator between the
/// two; both live in the same persisted list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub title: String,
    pub image: String,
    pub price: Decimal,
    pub quantity: u32,
    pub active: bool,
    #[serde(default, skip_serializing_if = "VariantAttributes::is_empty")]
    pub variant: VariantAttributes,
    /// Original un-normalized input, kept for display of extra attributes.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub raw: Value,
}

impl LineItem {
    /// Build a canonical item from an arbitrary raw shape.
    ///
    /// Every field degrades to a safe default; this never fails.
    pub fn normalize(raw: &Value) -> Self {
        let product_id = field_string(raw, &["productId", "product_id"]);
        let id = field_string(raw, &["id"])
            .or_else(|| product_id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self {
            id,
            product_id,
            title: field_string(raw, &["title", "name"])
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            image: field_string(raw, &["image", "thumbnail"])
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            price: sanitize_price(raw.get("price")),
            quantity: sanitize_quantity(raw.get("quantity")),
            active: truthy(raw.get("active")),
            variant: VariantAttributes::from_raw(raw),
            raw: raw.clone(),
        }
    }

    /// Revive a stored record. Records already in canonical shape keep their
    /// fields (re-clamped); anything else goes back through [`Self::normalize`].
    pub fn from_stored(value: &Value) -> Self {
        match serde_json::from_value::<LineItem>(value.clone()) {
            Ok(mut item) => {
                if item.quantity == 0 {
                    item.quantity = 1;
                }
                if item.price.is_sign_negative() {
                    item.price = Decimal::ZERO;
                }
                item
            }
            Err(_) => Self::normalize(value),
        }
    }

    /// The merge/remove/update matching key: `product_id` if present, else `id`.
    pub fn identity_key(&self) -> &str {
        self.product_id.as_deref().unwrap_or(&self.id)
    }

    /// `price × quantity`.
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

fn field_string(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// JS-style truthiness; a missing or null flag means "cart entry".
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
