//! Common order enums

use serde::{Deserialize, Serialize};

/// How the order reaches the customer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMode {
    /// Courier delivery; the delivery fee applies
    Delivery,
    /// Customer pickup; triggers the automatic take-away discount
    Pickup,
}
