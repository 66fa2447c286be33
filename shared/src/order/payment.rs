//! Payment DTOs

use serde::{Deserialize, Serialize};

/// How the buyer pays
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Collected out-of-band at delivery or pickup
    Cash,
    /// Paid through the payment provider via a payment link
    Online,
}

/// Payment lifecycle status owned by the payment service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// Request body to confirm an out-of-band cash payment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCashPaymentRequest {
    pub payment_id: i64,
}

/// Payment record as stored by the payment service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: i64,
    pub order_id: String,
    pub method: PaymentMethod,
    pub amount: f64,
    pub status: PaymentStatus,
    pub updated_at: i64,
}
