//! The coupon rule table and its evaluation.
//!
//! One table serves both the cart store and the checkout build, so the two
//! can never disagree on a code. The table is client-side and hardcoded:
//! it is a convenience, not an authority, and any discount must be
//! re-validated server-side before an order is finalized.

use std::fmt;

use rust_decimal::Decimal;

/// How a coupon reduces the order value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscountRule {
    /// Fraction of the subtotal, in `[0, 1]`.
    Percent(Decimal),
    /// Fixed amount off, capped at the subtotal.
    Flat(Decimal),
}

#[derive(Clone, Copy, Debug)]
pub struct CouponRule {
    pub code: &'static str,
    pub rule: DiscountRule,
    pub label: &'static str,
}

const fn percent(hundredths: u32) -> DiscountRule {
    DiscountRule::Percent(Decimal::from_parts(hundredths, 0, 0, false, 2))
}

const fn flat(amount: u32) -> DiscountRule {
    DiscountRule::Flat(Decimal::from_parts(amount, 0, 0, false, 0))
}

pub const COUPONS: &[CouponRule] = &[
    CouponRule { code: "SAVE10", rule: percent(10), label: "10% off your order" },
    CouponRule { code: "SAVE20", rule: percent(20), label: "20% off your order" },
    CouponRule { code: "WELCOME15", rule: percent(15), label: "15% off your first order" },
    CouponRule { code: "FLAT50", rule: flat(50), label: "₹50 off your order" },
    CouponRule { code: "FLAT100", rule: flat(100), label: "₹100 off your order" },
];

/// Look up a rule by already-normalized (trimmed, uppercased) code.
pub fn lookup(code: &str) -> Option<&'static CouponRule> {
    COUPONS.iter().find(|rule| rule.code == code)
}

/// User-facing result of a coupon entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CouponFeedback {
    Applied { code: String, label: &'static str },
    EmptyCode,
    Invalid { code: String },
}

impl fmt::Display for CouponFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied { code, label } => write!(f, "Coupon {code} applied: {label}"),
            Self::EmptyCode => write!(f, "Please enter a coupon code"),
            Self::Invalid { code } => write!(f, "Invalid coupon code: {code}"),
        }
    }
}

/// Outcome of evaluating a code against the current subtotal.
#[derive(Clone, Debug, PartialEq)]
pub struct CouponOutcome {
    /// Normalized code, present only on success.
    pub code: Option<String>,
    /// Discount fraction in `[0, 1]`. Always zero for empty/unknown codes.
    pub discount: Decimal,
    pub feedback: CouponFeedback,
}

/// Evaluate a free-text code. Flat rules translate to an equivalent fraction
/// of the given subtotal, capped at 100%; a zero subtotal discounts nothing.
pub fn evaluate(code: &str, subtotal: Decimal) -> CouponOutcome {
    let normalized = code.trim().to_uppercase();
    if normalized.is_empty() {
        return CouponOutcome {
            code: None,
            discount: Decimal::ZERO,
            feedback: CouponFeedback::EmptyCode,
        };
    }
    let Some(rule) = lookup(&normalized) else {
        return CouponOutcome {
            code: None,
            discount: Decimal::ZERO,
            feedback: CouponFeedback::Invalid { code: normalized },
        };
    };
    let discount = match rule.rule {
        DiscountRule::Percent(fraction) => fraction,
        DiscountRule::Flat(amount) => {
            if subtotal <= Decimal::ZERO {
                Decimal::ZERO
            } else {
                (amount / subtotal).min(Decimal::ONE)
            }
        }
    };
    CouponOutcome {
        code: Some(normalized.clone()),
        discount,
        feedback: CouponFeedback::Applied { code: normalized, label: rule.label },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_case_insensitive() {
        let lower = evaluate("save10", Decimal::from(100));
        let upper = evaluate("SAVE10", Decimal::from(100));
        assert_eq!(lower, upper);
        assert_eq!(lower.discount, Decimal::new(10, 2));
    }

    #[test]
    fn whitespace_is_trimmed() {
        let outcome = evaluate("  save20  ", Decimal::from(100));
        assert_eq!(outcome.code.as_deref(), Some("SAVE20"));
        assert_eq!(outcome.discount, Decimal::new(20, 2));
    }

    #[test]
    fn empty_code_yields_zero_discount() {
        let outcome = evaluate("   ", Decimal::from(100));
        assert_eq!(outcome.discount, Decimal::ZERO);
        assert_eq!(outcome.feedback, CouponFeedback::EmptyCode);
        assert!(outcome.code.is_none());
    }

    #[test]
    fn unknown_code_yields_zero_discount() {
        let outcome = evaluate("BOGUS", Decimal::from(100));
        assert_eq!(outcome.discount, Decimal::ZERO);
        assert_eq!(outcome.feedback, CouponFeedback::Invalid { code: "BOGUS".into() });
    }

    #[test]
    fn flat_rule_is_a_fraction_of_subtotal() {
        let outcome = evaluate("FLAT50", Decimal::from(500));
        assert_eq!(outcome.discount, Decimal::new(1, 1)); // 50/500
    }

    #[test]
    fn flat_rule_caps_at_full_subtotal() {
        let outcome = evaluate("FLAT50", Decimal::from(40));
        assert_eq!(outcome.discount, Decimal::ONE);
    }

    #[test]
    fn flat_rule_on_empty_subtotal_discounts_nothing() {
        let outcome = evaluate("FLAT50", Decimal::ZERO);
        assert_eq!(outcome.discount, Decimal::ZERO);
        assert!(matches!(outcome.feedback, CouponFeedback::Applied { .. }));
    }
}
