//! Order creation DTOs

use super::types::DeliveryMode;
use serde::{Deserialize, Serialize};

/// One cart line as submitted for order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub article_id: i64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_promotion_id: Option<i64>,
}

/// Request body for the order creation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub client_id: i64,
    pub branch_id: i64,
    pub delivery_mode: DeliveryMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address_id: Option<i64>,
    pub lines: Vec<OrderLineRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_surname: Option<String>,
    /// When true, the backend asks the payment provider for a payment link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_payment_preference: Option<bool>,
}

/// Created order as echoed back by the order service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: String,
    /// Lifecycle status owned by the order service
    pub status: String,
    pub total: f64,
    /// Payment record created alongside the order, when any
    pub payment_id: Option<i64>,
    pub created_at: i64,
}

/// Payment setup outcome attached to a created order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub payment_link: Option<String>,
    pub error: Option<String>,
}

/// Response body for the order creation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order: OrderSummary,
    pub payment_info: Option<PaymentInfo>,
}
