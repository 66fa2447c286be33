//! Discount Calculator
//!
//! Pure functions that turn cart lines, a delivery context, and an optional
//! bundled promotion into per-line and aggregate discounts. Uses
//! rust_decimal for precise calculations, stores as f64.
//!
//! Broken promotion data (out-of-range percentages, non-positive fixed
//! amounts) fails closed to a zero discount so it can never block a
//! checkout.

use crate::cart::{CartLine, DeliveryContext};
use rust_decimal::prelude::*;
use shared::models::{BundledPromotion, DiscountKind, Promotion};
use shared::order::DeliveryMode;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Automatic discount applied to the goods subtotal on pickup orders
pub const TAKE_AWAY_DISCOUNT_PERCENT: f64 = 10.0;

/// Flat fee charged on delivery orders
pub const DEFAULT_DELIVERY_FEE: f64 = 200.0;

/// Convert f64 to Decimal for calculation
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Discount granted to one cart line by its selected promotion
#[derive(Debug, Clone, PartialEq)]
pub struct LineDiscount {
    pub article_id: i64,
    pub promotion_id: i64,
    pub amount: f64,
}

/// Aggregate pricing for a cart
///
/// Always derived, never stored: every read is recomputed from the current
/// cart so no stale discount can survive a mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PricingResult {
    /// Sum of unit_price * quantity over all lines, before any discount
    pub original_subtotal: f64,
    /// Per-line promotion discounts actually granted
    pub line_discounts: Vec<LineDiscount>,
    /// Sum of the per-line promotion discounts
    pub promotion_discount: f64,
    /// Automatic pickup discount, computed on the original subtotal
    pub take_away_discount: f64,
    /// Bundled promotion discount, when one is selected
    pub bundled_discount: f64,
    /// promotion_discount + take_away_discount + bundled_discount
    pub total_discount: f64,
    /// Fee actually charged under the current delivery mode
    pub delivery_fee: f64,
    /// max(0, original_subtotal - total_discount) + delivery_fee
    pub final_total: f64,
}

/// Calculate the discount a promotion grants to a single line.
///
/// PERCENTAGE discounts apply to the line subtotal. FIXED_AMOUNT discounts
/// are per unit, capped so a line's discount never exceeds its own
/// subtotal. Eligibility is the caller's responsibility; the minimum
/// quantity is defensively re-checked here and returns 0 when violated.
pub fn line_discount(line: &CartLine, promotion: &Promotion) -> f64 {
    if line.quantity < promotion.minimum_quantity {
        return 0.0;
    }

    let line_subtotal = to_decimal(line.unit_price) * Decimal::from(line.quantity);
    let value = to_decimal(promotion.discount_value);

    let amount = match promotion.discount_kind {
        DiscountKind::Percentage => {
            if !(Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&value) {
                return 0.0;
            }
            line_subtotal * value / Decimal::ONE_HUNDRED
        }
        DiscountKind::FixedAmount => {
            if value <= Decimal::ZERO {
                return 0.0;
            }
            (value * Decimal::from(line.quantity)).min(line_subtotal)
        }
    };

    to_f64(amount.max(Decimal::ZERO))
}

/// Calculate the automatic take-away discount.
///
/// Applies only on pickup, always against the original subtotal so it
/// never compounds with other discounts. Recomputed on every totals
/// derivation, never cached.
pub fn take_away_discount(subtotal: f64, mode: DeliveryMode) -> f64 {
    if mode != DeliveryMode::Pickup {
        return 0.0;
    }

    let amount =
        to_decimal(subtotal) * to_decimal(TAKE_AWAY_DISCOUNT_PERCENT) / Decimal::ONE_HUNDRED;
    to_f64(amount.max(Decimal::ZERO))
}

/// Calculate the discount of a bundled promotion.
///
/// The base is the sum of the advertised article prices, each counted
/// once. The discount is pinned to that advertised composition and does
/// not track live cart quantities.
pub fn bundled_discount(bundle: &BundledPromotion) -> f64 {
    let base = bundle
        .articles
        .iter()
        .fold(Decimal::ZERO, |acc, article| {
            acc + to_decimal(article.unit_price)
        });
    if base <= Decimal::ZERO {
        return 0.0;
    }

    let value = to_decimal(bundle.discount_value);
    let amount = match bundle.discount_kind {
        DiscountKind::Percentage => {
            if !(Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&value) {
                return 0.0;
            }
            base * value / Decimal::ONE_HUNDRED
        }
        DiscountKind::FixedAmount => {
            if value <= Decimal::ZERO {
                return 0.0;
            }
            value.min(base)
        }
    };

    to_f64(amount)
}

/// Compute the aggregate pricing for a cart.
///
/// Per-line discounts count only for lines whose selected promotion is
/// eligible. The take-away discount is computed on the original subtotal,
/// not the discounted one. The goods total is clamped at zero, so the
/// final total can never drop below the delivery fee.
pub fn compute_totals(
    lines: &[CartLine],
    delivery: &DeliveryContext,
    bundle: Option<&BundledPromotion>,
) -> PricingResult {
    let mut subtotal = Decimal::ZERO;
    let mut promotion_total = Decimal::ZERO;
    let mut line_discounts = Vec::new();

    for line in lines {
        subtotal += to_decimal(line.unit_price) * Decimal::from(line.quantity);

        if let Some(promotion) = &line.selected_promotion {
            if promotion.is_eligible_for(line.article_id, line.quantity) {
                let amount = line_discount(line, promotion);
                if amount > 0.0 {
                    line_discounts.push(LineDiscount {
                        article_id: line.article_id,
                        promotion_id: promotion.id,
                        amount,
                    });
                    promotion_total += to_decimal(amount);
                }
            }
        }
    }

    let original_subtotal = to_f64(subtotal);
    let take_away = to_decimal(take_away_discount(original_subtotal, delivery.mode));
    let bundled = bundle.map(bundled_discount).map(to_decimal).unwrap_or(Decimal::ZERO);
    let total_discount = promotion_total + take_away + bundled;

    let fee = to_decimal(delivery.effective_fee());
    let final_total = (subtotal - total_discount).max(Decimal::ZERO) + fee;

    PricingResult {
        original_subtotal,
        line_discounts,
        promotion_discount: to_f64(promotion_total),
        take_away_discount: to_f64(take_away),
        bundled_discount: to_f64(bundled),
        total_discount: to_f64(total_discount),
        delivery_fee: to_f64(fee),
        final_total: to_f64(final_total),
    }
}
