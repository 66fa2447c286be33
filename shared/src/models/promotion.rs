//! Promotion Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Discount kind enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    Percentage,
    FixedAmount,
}

/// Per-article promotion entity
///
/// Validity windows are pre-evaluated by the catalog service:
/// `is_currently_valid` is the ground truth and the pricing core never
/// re-derives it from the date/time fields, which are carried for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub discount_kind: DiscountKind,
    /// Discount value (percentage: 15 = 15%, fixed: an amount per unit)
    pub discount_value: f64,
    /// Minimum line quantity for the promotion to attach
    pub minimum_quantity: u32,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    /// Active start time-of-day (HH:MM format, window may wrap past midnight)
    pub active_from: Option<String>,
    /// Active end time-of-day (HH:MM format)
    pub active_until: Option<String>,
    pub is_currently_valid: bool,
    /// Articles this promotion can attach to
    #[serde(default)]
    pub applicable_article_ids: Vec<i64>,
}

impl Promotion {
    /// A promotion is eligible for a line iff it is currently valid, covers
    /// the article, and the line quantity reaches the minimum.
    pub fn is_eligible_for(&self, article_id: i64, quantity: u32) -> bool {
        self.is_currently_valid
            && self.applicable_article_ids.contains(&article_id)
            && quantity >= self.minimum_quantity
    }
}
