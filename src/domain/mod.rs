//! Domain model: line items, price sanitization, coupon rules, cart events.

pub mod coupon;
pub mod events;
pub mod line_item;
pub mod price;

pub use coupon::{CouponFeedback, CouponOutcome, DiscountRule};
pub use events::CartEvent;
pub use line_item::{LineItem, VariantAttributes};
