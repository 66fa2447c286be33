//! Promotion catalog models

mod bundle;
mod promotion;

pub use bundle::{BundleArticle, BundledPromotion};
pub use promotion::{DiscountKind, Promotion};
