//! Cart pricing
//!
//! Pure discount computation for the customer cart: per-line promotions,
//! the automatic take-away discount, and bundled promotions. No I/O and no
//! wall-clock access; promotion validity arrives pre-evaluated.

pub mod calculator;

pub use calculator::{
    DEFAULT_DELIVERY_FEE, LineDiscount, PricingResult, TAKE_AWAY_DISCOUNT_PERCENT,
    bundled_discount, compute_totals, line_discount, take_away_discount,
};
