//! Cart session state

use crate::pricing::{self, DEFAULT_DELIVERY_FEE, PricingResult};
use shared::models::{BundledPromotion, Promotion};
use shared::order::{CartPreviewRequest, DeliveryMode, PreviewLineRequest};
use thiserror::Error;

/// Why a promotion selection was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PromotionRejection {
    /// The catalog marked the promotion as outside its validity window
    #[error("promotion is outside its validity window")]
    NotCurrentlyValid,
    /// The promotion does not cover this article
    #[error("promotion does not cover this article")]
    ArticleNotCovered,
    /// The line quantity is below the promotion's minimum
    #[error("line quantity {have} is below the required minimum {required}")]
    BelowMinimumQuantity { required: u32, have: u32 },
}

/// Cart mutation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// No cart line exists for the article
    #[error("no cart line for article {0}")]
    LineNotFound(i64),

    /// Promotion selection rejected; the cart is left unchanged
    #[error("promotion {promotion_id} rejected for article {article_id}: {reason}")]
    IneligiblePromotion {
        article_id: i64,
        promotion_id: i64,
        reason: PromotionRejection,
    },
}

/// One article entry in the cart
#[derive(Debug, Clone)]
pub struct CartLine {
    pub article_id: i64,
    /// Display name snapshot taken at add time
    pub name: String,
    /// Unit price snapshot taken at add time; the server preview stays
    /// authoritative for current prices
    pub unit_price: f64,
    pub quantity: u32,
    pub notes: Option<String>,
    /// At most one promotion per line
    pub selected_promotion: Option<Promotion>,
}

/// Delivery datum for the cart
///
/// The fee is retained across mode switches, so toggling to pickup and
/// back restores the delivery charge unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryContext {
    pub mode: DeliveryMode,
    pub delivery_fee: f64,
}

impl DeliveryContext {
    /// Courier delivery with the given fee
    pub fn delivery(fee: f64) -> Self {
        Self {
            mode: DeliveryMode::Delivery,
            delivery_fee: fee,
        }
    }

    /// Customer pickup
    pub fn pickup() -> Self {
        Self {
            mode: DeliveryMode::Pickup,
            delivery_fee: DEFAULT_DELIVERY_FEE,
        }
    }

    /// Fee actually charged under the current mode
    pub fn effective_fee(&self) -> f64 {
        match self.mode {
            DeliveryMode::Delivery => self.delivery_fee,
            DeliveryMode::Pickup => 0.0,
        }
    }
}

impl Default for DeliveryContext {
    fn default() -> Self {
        Self::delivery(DEFAULT_DELIVERY_FEE)
    }
}

/// The canonical mutable cart
///
/// `revision` increases on every effective mutation. The preview
/// reconciler snapshots it with each request and uses it to discard
/// responses that arrive for superseded cart content.
#[derive(Debug, Clone, Default)]
pub struct CartSession {
    lines: Vec<CartLine>,
    delivery: DeliveryContext,
    bundle: Option<BundledPromotion>,
    revision: u64,
}

impl CartSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with a specific delivery context
    pub fn with_delivery(delivery: DeliveryContext) -> Self {
        Self {
            delivery,
            ..Self::default()
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn delivery(&self) -> &DeliveryContext {
        &self.delivery
    }

    pub fn bundle(&self) -> Option<&BundledPromotion> {
        self.bundle.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// Add an article, merging into an existing line by summing quantities
    pub fn add_line(
        &mut self,
        article_id: i64,
        name: impl Into<String>,
        unit_price: f64,
        quantity: u32,
    ) {
        if quantity == 0 {
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.article_id == article_id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine {
                article_id,
                name: name.into(),
                unit_price,
                quantity,
                notes: None,
                selected_promotion: None,
            });
        }
        self.bump();
    }

    /// Remove a line; removing an absent article is a no-op
    pub fn remove_line(&mut self, article_id: i64) {
        let before = self.lines.len();
        self.lines.retain(|l| l.article_id != article_id);
        if self.lines.len() != before {
            self.bump();
        }
    }

    /// Set a line's quantity; zero or negative removes the line
    pub fn set_quantity(&mut self, article_id: i64, quantity: i32) {
        if quantity <= 0 {
            self.remove_line(article_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.article_id == article_id) {
            line.quantity = quantity as u32;
            self.bump();
        }
    }

    /// Set or clear a line's free-text notes
    pub fn set_notes(&mut self, article_id: i64, notes: Option<String>) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.article_id == article_id) {
            line.notes = notes;
            self.bump();
        }
    }

    /// Select or clear a line's promotion.
    ///
    /// An ineligible selection is rejected with the precise reason and
    /// leaves the cart untouched, so the UI can surface the rejection
    /// instead of silently pricing a zero discount.
    pub fn select_promotion(
        &mut self,
        article_id: i64,
        promotion: Option<Promotion>,
    ) -> Result<(), CartError> {
        let Some(index) = self.lines.iter().position(|l| l.article_id == article_id) else {
            return Err(CartError::LineNotFound(article_id));
        };

        match promotion {
            None => {
                if self.lines[index].selected_promotion.take().is_some() {
                    self.bump();
                }
                Ok(())
            }
            Some(promotion) => {
                let quantity = self.lines[index].quantity;
                if let Some(reason) = rejection_reason(&promotion, article_id, quantity) {
                    return Err(CartError::IneligiblePromotion {
                        article_id,
                        promotion_id: promotion.id,
                        reason,
                    });
                }
                self.lines[index].selected_promotion = Some(promotion);
                self.bump();
                Ok(())
            }
        }
    }

    /// Switch the delivery mode. No discount state is stored for the mode;
    /// the take-away discount is derived on the next pricing read.
    pub fn set_delivery_mode(&mut self, mode: DeliveryMode) {
        if self.delivery.mode != mode {
            self.delivery.mode = mode;
            self.bump();
        }
    }

    /// Select a bundled promotion; a new selection replaces the prior one
    /// atomically; `None` clears it
    pub fn select_bundle(&mut self, bundle: Option<BundledPromotion>) {
        let no_change = bundle.is_none() && self.bundle.is_none();
        self.bundle = bundle;
        if !no_change {
            self.bump();
        }
    }

    /// Empty the cart after a successful submission
    pub fn clear(&mut self) {
        self.lines.clear();
        self.bundle = None;
        self.delivery.mode = DeliveryMode::Delivery;
        self.bump();
    }

    /// Derive the current pricing; always computed fresh
    pub fn pricing(&self) -> PricingResult {
        pricing::compute_totals(&self.lines, &self.delivery, self.bundle.as_ref())
    }

    /// Serialize the cart for the preview endpoint
    pub fn preview_request(&self) -> CartPreviewRequest {
        CartPreviewRequest {
            delivery_mode: self.delivery.mode,
            lines: self
                .lines
                .iter()
                .map(|line| PreviewLineRequest {
                    article_id: line.article_id,
                    quantity: line.quantity,
                    selected_promotion_id: line.selected_promotion.as_ref().map(|p| p.id),
                })
                .collect(),
        }
    }
}

fn rejection_reason(
    promotion: &Promotion,
    article_id: i64,
    quantity: u32,
) -> Option<PromotionRejection> {
    if !promotion.is_currently_valid {
        Some(PromotionRejection::NotCurrentlyValid)
    } else if !promotion.applicable_article_ids.contains(&article_id) {
        Some(PromotionRejection::ArticleNotCovered)
    } else if quantity < promotion.minimum_quantity {
        Some(PromotionRejection::BelowMinimumQuantity {
            required: promotion.minimum_quantity,
            have: quantity,
        })
    } else {
        None
    }
}
