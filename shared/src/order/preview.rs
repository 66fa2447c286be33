//! Cart preview DTOs
//!
//! The preview endpoint returns server-authoritative totals for a cart.
//! Server-side pricing may incorporate rules the client does not know
//! about, so a successful preview supersedes any local estimate.

use super::types::DeliveryMode;
use serde::{Deserialize, Serialize};

/// One cart line as sent to the preview endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewLineRequest {
    pub article_id: i64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_promotion_id: Option<i64>,
}

/// Request body for the cart preview endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPreviewRequest {
    pub delivery_mode: DeliveryMode,
    pub lines: Vec<PreviewLineRequest>,
}

/// Per-line detail inside a server preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewLineBreakdown {
    pub article_id: i64,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_subtotal: f64,
    pub discount: f64,
    pub promotion_name: Option<String>,
}

/// Server-computed authoritative totals for a cart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerPreview {
    pub original_subtotal: f64,
    pub total_discount: f64,
    pub discounted_subtotal: f64,
    pub delivery_fee: f64,
    pub final_total: f64,
    pub promotions_summary_text: Option<String>,
    #[serde(default)]
    pub per_line_breakdown: Vec<PreviewLineBreakdown>,
}
