//! Comanda Client - cart pricing and checkout for the ordering backend
//!
//! The customer cart's pricing core as a library consumed by UI layers:
//! promotion catalog lookups, pure local discount computation,
//! server-reconciled preview totals with a debounced background worker,
//! and checkout submission for the cash and online payment flows.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod http;
pub mod preview;
pub mod pricing;

pub use cart::{
    CartController, CartError, CartLine, CartSession, DeliveryContext, PromotionRejection,
};
pub use catalog::PromotionCatalog;
pub use checkout::{
    CashConfirmation, CheckoutError, CheckoutOutcome, CheckoutRequest, CheckoutStage,
    CheckoutSubmitter, ValidationError,
};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, OrderingApi};
pub use preview::{PreviewHandle, PreviewReconciler, Quote, QuoteSource};
pub use pricing::{PricingResult, compute_totals};
