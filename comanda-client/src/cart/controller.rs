//! Shared-ownership cart handle

use std::sync::Arc;

use parking_lot::RwLock;
use shared::models::{BundledPromotion, Promotion};
use shared::order::{CartPreviewRequest, DeliveryMode};
use tokio::sync::watch;

use super::session::{CartError, CartLine, CartSession, DeliveryContext};
use crate::pricing::PricingResult;

/// Thread-safe handle over the single cart session.
///
/// Clones share the same underlying cart. Every effective mutation
/// publishes the new revision on a watch channel, which is what drives
/// the preview reconciler's debounce timer.
#[derive(Debug, Clone)]
pub struct CartController {
    session: Arc<RwLock<CartSession>>,
    change_tx: watch::Sender<u64>,
}

impl CartController {
    pub fn new() -> Self {
        Self::with_session(CartSession::new())
    }

    /// Wrap an existing session, e.g. one restored from disk
    pub fn with_session(session: CartSession) -> Self {
        let (change_tx, _) = watch::channel(session.revision());
        Self {
            session: Arc::new(RwLock::new(session)),
            change_tx,
        }
    }

    /// Subscribe to revision changes. The receiver starts with the
    /// current revision already marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.change_tx.subscribe()
    }

    /// Run a mutation under the write lock, notifying watchers only if
    /// the revision actually moved.
    fn mutate<T>(&self, f: impl FnOnce(&mut CartSession) -> T) -> T {
        let mut session = self.session.write();
        let before = session.revision();
        let out = f(&mut session);
        let after = session.revision();
        drop(session);
        if after != before {
            self.change_tx.send_replace(after);
        }
        out
    }

    pub fn add_line(
        &self,
        article_id: i64,
        name: impl Into<String>,
        unit_price: f64,
        quantity: u32,
    ) {
        let name = name.into();
        self.mutate(|s| s.add_line(article_id, name, unit_price, quantity));
    }

    pub fn remove_line(&self, article_id: i64) {
        self.mutate(|s| s.remove_line(article_id));
    }

    pub fn set_quantity(&self, article_id: i64, quantity: i32) {
        self.mutate(|s| s.set_quantity(article_id, quantity));
    }

    pub fn set_notes(&self, article_id: i64, notes: Option<String>) {
        self.mutate(|s| s.set_notes(article_id, notes));
    }

    pub fn select_promotion(
        &self,
        article_id: i64,
        promotion: Option<Promotion>,
    ) -> Result<(), CartError> {
        self.mutate(|s| s.select_promotion(article_id, promotion))
    }

    pub fn set_delivery_mode(&self, mode: DeliveryMode) {
        self.mutate(|s| s.set_delivery_mode(mode));
    }

    pub fn select_bundle(&self, bundle: Option<BundledPromotion>) {
        self.mutate(|s| s.select_bundle(bundle));
    }

    pub fn clear(&self) {
        self.mutate(|s| s.clear());
    }

    /// Local pricing of the current cart content
    pub fn pricing(&self) -> PricingResult {
        self.session.read().pricing()
    }

    pub fn revision(&self) -> u64 {
        self.session.read().revision()
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.session.read().lines().to_vec()
    }

    pub fn delivery(&self) -> DeliveryContext {
        *self.session.read().delivery()
    }

    pub fn bundle(&self) -> Option<BundledPromotion> {
        self.session.read().bundle().cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.session.read().is_empty()
    }

    /// Revision and serialized preview request taken under one read
    /// lock, so the pair is always mutually consistent.
    pub fn preview_snapshot(&self) -> (u64, CartPreviewRequest) {
        let session = self.session.read();
        (session.revision(), session.preview_request())
    }
}

impl Default for CartController {
    fn default() -> Self {
        Self::new()
    }
}
