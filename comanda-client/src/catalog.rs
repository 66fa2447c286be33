//! Promotion catalog accessor
//!
//! Thin read layer over the backend's promotion endpoints. Responses are
//! sanity-filtered so that entries with out-of-range discount values never
//! reach the UI or the calculator; dropping a bad entry is logged and the
//! rest of the list survives.

use std::sync::Arc;

use shared::models::{BundledPromotion, DiscountKind, Promotion};
use tracing::warn;

use crate::error::ClientResult;
use crate::http::OrderingApi;

/// Read access to article promotions and bundled promotions
#[derive(Clone)]
pub struct PromotionCatalog {
    api: Arc<dyn OrderingApi>,
}

impl PromotionCatalog {
    pub fn new(api: Arc<dyn OrderingApi>) -> Self {
        Self { api }
    }

    /// Promotions applicable to one article, for the line's selector UI
    pub async fn promotions_for_article(&self, article_id: i64) -> ClientResult<Vec<Promotion>> {
        let promotions = self.api.article_promotions(article_id).await?;
        Ok(retain_well_formed(promotions))
    }

    /// All promotions currently in their validity window
    pub async fn vigent_promotions(&self) -> ClientResult<Vec<Promotion>> {
        let promotions = self.api.vigent_promotions().await?;
        Ok(retain_well_formed(promotions))
    }

    /// All currently valid bundled promotions
    pub async fn vigent_bundles(&self) -> ClientResult<Vec<BundledPromotion>> {
        let bundles = self.api.vigent_bundles().await?;
        Ok(bundles
            .into_iter()
            .filter(|bundle| {
                if bundle.articles.is_empty() {
                    warn!(bundle_id = bundle.id, "dropping bundle with empty composition");
                    return false;
                }
                if !value_in_range(bundle.discount_kind, bundle.discount_value) {
                    warn!(
                        bundle_id = bundle.id,
                        value = bundle.discount_value,
                        "dropping bundle with out-of-range discount value"
                    );
                    return false;
                }
                true
            })
            .collect())
    }
}

fn retain_well_formed(promotions: Vec<Promotion>) -> Vec<Promotion> {
    promotions
        .into_iter()
        .filter(|promotion| {
            if value_in_range(promotion.discount_kind, promotion.discount_value) {
                true
            } else {
                warn!(
                    promotion_id = promotion.id,
                    value = promotion.discount_value,
                    "dropping promotion with out-of-range discount value"
                );
                false
            }
        })
        .collect()
}

fn value_in_range(kind: DiscountKind, value: f64) -> bool {
    match kind {
        DiscountKind::Percentage => (0.0..=100.0).contains(&value),
        DiscountKind::FixedAmount => value > 0.0,
    }
}
