//! Cart State
//!
//! The canonical mutable cart: lines, delivery context, and the single
//! optional bundled promotion selection. All pricing reads are derived
//! fresh through the calculator; no discount amount is ever stored.

mod controller;
mod session;

pub use controller::CartController;
pub use session::{
    CartError, CartLine, CartSession, DeliveryContext, PromotionRejection,
};
