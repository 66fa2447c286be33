//! Shared types for the Comanda ordering client
//!
//! Wire data contracts exchanged with the ordering backend: promotion and
//! bundle models, cart preview DTOs, and order/payment DTOs. The backend
//! serializes struct fields in camelCase and enum variants in
//! SCREAMING_SNAKE_CASE; monetary amounts cross the wire as plain numbers.

pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Frequently used wire enums (for convenient access)
pub use order::{DeliveryMode, PaymentMethod, PaymentStatus};
