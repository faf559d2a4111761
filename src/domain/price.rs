//! Sanitization of loosely-typed price and quantity input.
//!
//! Product data arrives from several remote endpoints that do not agree on a
//! shape: prices show up as plain numbers, as `{amount | value | price}`
//! objects, or as display strings with currency symbols and grouping commas.
//! Everything funnels through here before it touches a [`crate::LineItem`].

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

const CURRENCY_SYMBOLS: &[char] = &['₹', '$', '€', '£'];

/// Coerce an arbitrary JSON value into a non-negative price.
///
/// Unparseable input yields zero rather than an error. A zero result from a
/// non-null input is logged, since it usually points at an upstream data
/// defect rather than a genuinely free item.
pub fn sanitize_price(value: Option<&Value>) -> Decimal {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Decimal::ZERO;
    };
    let price = coerce_price(value)
        .unwrap_or(Decimal::ZERO)
        .max(Decimal::ZERO);
    if price.is_zero() {
        warn!(input = %value, "price sanitized to zero");
    }
    price
}

/// Coerce an arbitrary JSON value into a purchase quantity.
///
/// Numeric input is floored; anything non-numeric, zero, or negative becomes 1.
pub fn sanitize_quantity(value: Option<&Value>) -> u32 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(1.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(1.0),
        _ => 1.0,
    };
    if !n.is_finite() {
        return 1;
    }
    let floored = n.floor();
    if floored < 1.0 {
        1
    } else if floored >= u32::MAX as f64 {
        u32::MAX
    } else {
        floored as u32
    }
}

fn coerce_price(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Decimal::from(i)),
            None => n.as_f64().and_then(Decimal::from_f64),
        },
        Value::String(s) => parse_price_string(s),
        // Object-shaped prices: probe the conventional amount fields in order.
        Value::Object(map) => ["amount", "value", "price"]
            .iter()
            .find_map(|key| map.get(*key).and_then(coerce_price)),
        _ => None,
    }
}

fn parse_price_string(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_price_passes_through() {
        assert_eq!(sanitize_price(Some(&json!(499))), Decimal::from(499));
        assert_eq!(
            sanitize_price(Some(&json!(12.5))),
            Decimal::new(125, 1)
        );
    }

    #[test]
    fn currency_string_is_stripped() {
        assert_eq!(
            sanitize_price(Some(&json!("₹1,234.50"))),
            Decimal::new(123450, 2)
        );
        assert_eq!(
            sanitize_price(Some(&json!("$ 99.99"))),
            Decimal::new(9999, 2)
        );
    }

    #[test]
    fn object_price_probes_amount_then_value_then_price() {
        assert_eq!(sanitize_price(Some(&json!({"amount": 99}))), Decimal::from(99));
        assert_eq!(
            sanitize_price(Some(&json!({"value": 5, "price": 7}))),
            Decimal::from(5)
        );
        assert_eq!(
            sanitize_price(Some(&json!({"price": {"amount": 12}}))),
            Decimal::from(12)
        );
    }

    #[test]
    fn junk_price_sanitizes_to_zero() {
        assert_eq!(sanitize_price(Some(&json!("abc"))), Decimal::ZERO);
        assert_eq!(sanitize_price(Some(&json!(null))), Decimal::ZERO);
        assert_eq!(sanitize_price(Some(&json!([1, 2]))), Decimal::ZERO);
        assert_eq!(sanitize_price(None), Decimal::ZERO);
    }

    #[test]
    fn negative_price_clamps_to_zero() {
        assert_eq!(sanitize_price(Some(&json!(-5))), Decimal::ZERO);
        assert_eq!(sanitize_price(Some(&json!("-12.50"))), Decimal::ZERO);
    }

    #[test]
    fn quantity_floors_and_clamps() {
        assert_eq!(sanitize_quantity(Some(&json!(3))), 3);
        assert_eq!(sanitize_quantity(Some(&json!(2.9))), 2);
        assert_eq!(sanitize_quantity(Some(&json!("4"))), 4);
        assert_eq!(sanitize_quantity(Some(&json!(0))), 1);
        assert_eq!(sanitize_quantity(Some(&json!(-4))), 1);
        assert_eq!(sanitize_quantity(Some(&json!("abc"))), 1);
        assert_eq!(sanitize_quantity(Some(&json!(null))), 1);
        assert_eq!(sanitize_quantity(None), 1);
    }
}
