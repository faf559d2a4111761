//! The cart store — single source of truth for cart and wishlist contents.
//!
//! Consumers (header dropdown, cart page, checkout page) only ever read
//! derived state from here and invoke the mutation operations; none hold item
//! state of their own. Every mutation writes the full list back to durable
//! storage and notifies subscribers. No public operation returns an error:
//! anomalies are absorbed, logged, and reflected as safe defaults.

use std::fmt;

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::coupon::{self, CouponFeedback};
use crate::domain::events::CartEvent;
use crate::domain::line_item::LineItem;
use crate::storage::CartStorage;

/// Subtotal at or above which the shipping fee is waived. Shared by every
/// consumer so the progress bars and the checkout summary cannot drift.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::ONE_THOUSAND;

/// Flat shipping fee charged below the threshold.
pub const FLAT_SHIPPING_FEE: Decimal = Decimal::from_parts(49, 0, 0, false, 0);

/// Snapshot of the derived totals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CartTotals {
    pub subtotal: Decimal,
    /// Discount fraction in `[0, 1]`.
    pub discount_rate: Decimal,
    pub discount_amount: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

type Subscriber = Box<dyn FnMut(&CartEvent)>;

pub struct CartStore {
    storage: Box<dyn CartStorage>,
    items: Vec<LineItem>,
    loaded: bool,
    discount: Decimal,
    coupon_code: Option<String>,
    coupon_feedback: Option<CouponFeedback>,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items.len())
            .field("loaded", &self.loaded)
            .field("discount", &self.discount)
            .field("coupon_code", &self.coupon_code)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl CartStore {
    /// Construct without reading storage. Derived values are provisional and
    /// write-back is suppressed until [`load`](Self::load) has run once.
    pub fn new(storage: Box<dyn CartStorage>) -> Self {
        Self {
            storage,
            items: Vec::new(),
            loaded: false,
            discount: Decimal::ZERO,
            coupon_code: None,
            coupon_feedback: None,
            subscribers: Vec::new(),
        }
    }

    /// Construct and immediately run the load protocol.
    pub fn open(storage: Box<dyn CartStorage>) -> Self {
        let mut store = Self::new(storage);
        store.load();
        store
    }

    /// The load protocol: read the persisted record, degrade any corruption
    /// to an empty list, then mark the store loaded. Never fails.
    pub fn load(&mut self) {
        self.items = match self.storage.load() {
            Ok(Some(payload)) => parse_record(&payload),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%err, "cart storage read failed, starting empty");
                Vec::new()
            }
        };
        self.loaded = true;
        self.notify(CartEvent::Loaded { items: self.items.len() });
    }

    /// Handler for the external-change and force-refresh signals: re-runs the
    /// load protocol, adopting whatever another context last wrote.
    pub fn refresh(&mut self) {
        self.load();
    }

    /// Register a consumer callback, invoked after every state transition.
    pub fn subscribe(&mut self, callback: impl FnMut(&CartEvent) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Normalize and add an item as a live cart entry. A repeated add of the
    /// same identity merges into the existing entry: quantities are additive,
    /// and an existing non-zero price wins over the incoming one.
    pub fn add_to_cart(&mut self, raw: &Value) {
        let mut item = LineItem::normalize(raw);
        item.active = true;
        let key = item.identity_key().to_string();
        self.merge_or_push(item, true);
        self.persist();
        self.notify(CartEvent::ItemAdded { key });
    }

    /// Same as [`add_to_cart`](Self::add_to_cart) but as a wishlist entry.
    /// Merging is restricted to other wishlist entries; an active and an
    /// inactive entry with the same identity coexist.
    pub fn add_to_wishlist(&mut self, raw: &Value) {
        let mut item = LineItem::normalize(raw);
        item.active = false;
        let key = item.identity_key().to_string();
        self.merge_or_push(item, false);
        self.persist();
        self.notify(CartEvent::SavedForLater { key });
    }

    /// Remove every entry, active or not, matching the identity key.
    /// Removing an unknown identity is a no-op.
    pub fn remove(&mut self, key: &str) {
        let before = self.items.len();
        self.items.retain(|item| item.identity_key() != key);
        if self.items.len() == before {
            return;
        }
        self.persist();
        self.notify(CartEvent::ItemRemoved { key: key.to_string() });
    }

    /// Set the quantity on every entry matching the identity key, clamped to
    /// at least 1.
    pub fn update_quantity(&mut self, key: &str, requested: i64) {
        let quantity = u32::try_from(requested.max(1)).unwrap_or(u32::MAX);
        let mut changed = false;
        for item in self.items.iter_mut().filter(|i| i.identity_key() == key) {
            if item.quantity != quantity {
                item.quantity = quantity;
                changed = true;
            }
        }
        if !changed {
            return;
        }
        self.persist();
        self.notify(CartEvent::QuantityChanged { key: key.to_string(), quantity });
    }

    /// Remove every live cart entry; wishlist entries survive.
    pub fn clear_cart(&mut self) {
        let before = self.items.len();
        self.items.retain(|item| !item.active);
        if self.items.len() != before {
            self.persist();
        }
        self.notify(CartEvent::CartCleared);
    }

    /// Evaluate a coupon code against the current subtotal. Empty or unknown
    /// codes always reset the discount to zero; no stale discount survives a
    /// bad re-entry.
    pub fn apply_coupon(&mut self, code: &str) -> CouponFeedback {
        let outcome = coupon::evaluate(code, self.subtotal());
        self.discount = outcome.discount;
        self.coupon_code = outcome.code;
        self.coupon_feedback = Some(outcome.feedback.clone());
        self.notify(CartEvent::CouponChanged { discount: outcome.discount });
        outcome.feedback
    }

    // ------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------

    /// True once the initial read from durable storage has completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Live cart entries.
    pub fn active_items(&self) -> Vec<&LineItem> {
        self.items.iter().filter(|i| i.active).collect()
    }

    /// Wishlist entries.
    pub fn saved_items(&self) -> Vec<&LineItem> {
        self.items.iter().filter(|i| !i.active).collect()
    }

    /// Total unit count across live entries (the header badge number).
    pub fn cart_count(&self) -> u64 {
        self.items
            .iter()
            .filter(|i| i.active)
            .map(|i| u64::from(i.quantity))
            .sum()
    }

    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .filter(|i| i.active)
            .fold(Decimal::ZERO, |acc, i| acc + i.line_total())
    }

    pub fn shipping(&self) -> Decimal {
        if self.subtotal() >= FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING_FEE
        }
    }

    /// Current discount fraction in `[0, 1]`.
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    pub fn coupon_feedback(&self) -> Option<&CouponFeedback> {
        self.coupon_feedback.as_ref()
    }

    /// `max(0, subtotal × (1 − discount) + shipping)`.
    pub fn final_total(&self) -> Decimal {
        (self.subtotal() * (Decimal::ONE - self.discount) + self.shipping()).max(Decimal::ZERO)
    }

    pub fn totals(&self) -> CartTotals {
        let subtotal = self.subtotal();
        CartTotals {
            subtotal,
            discount_rate: self.discount,
            discount_amount: subtotal * self.discount,
            shipping: self.shipping(),
            total: self.final_total(),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn merge_or_push(&mut self, item: LineItem, active: bool) {
        let key = item.identity_key().to_string();
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.active == active && i.identity_key() == key)
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
            if existing.price.is_zero() && !item.price.is_zero() {
                existing.price = item.price;
            }
        } else {
            self.items.push(item);
        }
    }

    /// Full-list write-back. Suppressed before the initial load so an empty
    /// in-memory default cannot clobber a not-yet-read persisted record.
    /// Write failures leave the in-memory state authoritative for the session.
    fn persist(&mut self) {
        if !self.loaded {
            return;
        }
        let payload = match serde_json::to_string(&self.items) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%err, "cart record serialization failed, skipping write-back");
                return;
            }
        };
        match self.storage.save(&payload) {
            Ok(()) => debug!(items = self.items.len(), "cart persisted"),
            Err(err) => warn!(%err, "cart write-back failed, keeping in-memory state"),
        }
    }

    fn notify(&mut self, event: CartEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }
}

/// Parse a persisted record. Anything that is not a JSON array of objects is
/// discarded wholesale; objects are revived individually.
fn parse_record(payload: &str) -> Vec<LineItem> {
    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(err) => {
            warn!(%err, "discarding corrupted cart record");
            return Vec::new();
        }
    };
    let Some(entries) = value.as_array() else {
        warn!("cart record is not a list, discarding");
        return Vec::new();
    };
    if entries.iter().any(|entry| !entry.is_object()) {
        warn!("cart record contains non-object entries, discarding");
        return Vec::new();
    }
    entries.iter().map(LineItem::from_stored).collect()
}
