//! Server-reconciled cart preview
//!
//! The cart prices itself locally for instant feedback, but the backend
//! holds the authoritative totals. This module keeps the two in sync: a
//! background reconciler watches the cart, debounces bursts of edits,
//! asks the server for a quote and publishes it, falling back to the
//! local estimate when the server cannot be reached.

mod reconciler;

pub use reconciler::{PreviewHandle, PreviewReconciler};

use shared::order::{PreviewLineBreakdown, ServerPreview};
use shared::util::now_millis;

use crate::pricing::PricingResult;

/// Where a quote's numbers came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSource {
    /// Authoritative totals from the backend
    Server,
    /// Local calculator output, published because the server was unreachable
    LocalEstimate,
}

/// A priced view of one cart revision
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Cart revision these numbers were computed for
    pub revision: u64,
    pub source: QuoteSource,
    pub original_subtotal: f64,
    pub total_discount: f64,
    pub delivery_fee: f64,
    pub final_total: f64,
    /// Human-readable summary of applied promotions; server quotes only
    pub promotions_summary: Option<String>,
    /// Per-line totals as the server priced them; empty on local estimates
    pub line_breakdown: Vec<PreviewLineBreakdown>,
    /// Why the server could not be asked, when this is a local estimate
    pub error: Option<String>,
    /// Unix millis at which the quote was assembled
    pub computed_at: i64,
}

impl Quote {
    /// Whether these totals are safe to present as final
    pub fn is_confirmed(&self) -> bool {
        self.source == QuoteSource::Server
    }

    pub(crate) fn from_server(revision: u64, preview: ServerPreview) -> Self {
        Self {
            revision,
            source: QuoteSource::Server,
            original_subtotal: preview.original_subtotal,
            total_discount: preview.total_discount,
            delivery_fee: preview.delivery_fee,
            final_total: preview.final_total,
            promotions_summary: preview.promotions_summary_text,
            line_breakdown: preview.per_line_breakdown,
            error: None,
            computed_at: now_millis(),
        }
    }

    pub(crate) fn from_local(revision: u64, pricing: &PricingResult, error: Option<String>) -> Self {
        Self {
            revision,
            source: QuoteSource::LocalEstimate,
            original_subtotal: pricing.original_subtotal,
            total_discount: pricing.total_discount,
            delivery_fee: pricing.delivery_fee,
            final_total: pricing.final_total,
            promotions_summary: None,
            line_breakdown: Vec::new(),
            error,
            computed_at: now_millis(),
        }
    }
}
