//! Notifications raised by the cart store for subscribed consumers.

use rust_decimal::Decimal;

/// Raised after every state transition of the cart store. Consumers re-read
/// derived state from the store itself; the event only says what moved.
#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    /// The load protocol finished (initial load or an external refresh).
    Loaded { items: usize },
    ItemAdded { key: String },
    SavedForLater { key: String },
    ItemRemoved { key: String },
    QuantityChanged { key: String, quantity: u32 },
    CartCleared,
    CouponChanged { discount: Decimal },
}
