//! Bundled Promotion Model

use super::promotion::DiscountKind;
use serde::{Deserialize, Serialize};

/// One article inside an advertised bundle, with its listed price snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleArticle {
    pub article_id: i64,
    pub name: String,
    pub unit_price: f64,
}

/// Promotion over a fixed group of articles sold as one advertised combo
///
/// Unlike a per-line [`Promotion`](super::Promotion), the discount base is
/// the sum of the listed article prices, each counted once. At most one
/// bundled promotion can be active on a cart at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundledPromotion {
    pub id: i64,
    pub name: String,
    pub discount_kind: DiscountKind,
    pub discount_value: f64,
    /// The exact advertised composition
    pub articles: Vec<BundleArticle>,
}
