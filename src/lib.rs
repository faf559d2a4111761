//! Shopfront — client-side storefront cart and checkout engine.
//!
//! The cart store is the single source of truth for cart and wishlist
//! contents; every consuming view reads derived state from it and calls its
//! mutation operations. Product catalog, orders, and payment live behind
//! remote APIs and are out of scope here.
//!
//! ## Features
//! - Normalization of heterogeneous item shapes at the add boundary
//! - Merge-on-add with one active entry per identity key
//! - Durable whole-record persistence with corruption recovery
//! - Coupon rules (single authoritative table) and shipping thresholds
//! - Checkout order drafts with validated customer details
//! - Local decode of externally issued bearer tokens

pub mod auth;
pub mod checkout;
pub mod domain;
pub mod storage;
pub mod store;

pub use auth::{decode_profile, AuthError, SessionProfile};
pub use checkout::{build_order, CheckoutDetails, CheckoutError, OrderDraft};
pub use domain::coupon::{CouponFeedback, CouponOutcome, DiscountRule};
pub use domain::events::CartEvent;
pub use domain::line_item::{LineItem, VariantAttributes};
pub use storage::{CartStorage, JsonFileStorage, MemoryStorage, StorageError};
pub use store::{CartStore, CartTotals, FLAT_SHIPPING_FEE, FREE_SHIPPING_THRESHOLD};
