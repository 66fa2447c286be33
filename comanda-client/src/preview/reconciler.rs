//! Background task that keeps the displayed quote current.
//!
//! Watches the cart's revision channel, debounces bursts of edits, and
//! reconciles against the server's preview endpoint. Responses that
//! arrive for a superseded revision are discarded so an older quote can
//! never overwrite a newer cart.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::Quote;
use crate::cart::CartController;
use crate::config::ClientConfig;
use crate::http::OrderingApi;

pub struct PreviewReconciler {
    controller: CartController,
    api: Arc<dyn OrderingApi>,
    changes: watch::Receiver<u64>,
    debounce: Duration,
    quote_tx: watch::Sender<Option<Quote>>,
    shutdown: CancellationToken,
}

/// Consumer side of the reconciler: read or await quotes, stop the task
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    quotes: watch::Receiver<Option<Quote>>,
    shutdown: CancellationToken,
}

impl PreviewHandle {
    /// Most recent quote, `None` when the cart is empty or no preview
    /// has completed yet
    pub fn latest(&self) -> Option<Quote> {
        self.quotes.borrow().clone()
    }

    /// Receiver for awaiting quote updates
    pub fn subscribe(&self) -> watch::Receiver<Option<Quote>> {
        self.quotes.clone()
    }

    /// Stop the background task
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl PreviewReconciler {
    /// Spawn the reconciler for a cart. The subscription is taken before
    /// the task starts, so mutations made right after this call are
    /// never missed.
    pub fn spawn(
        controller: CartController,
        api: Arc<dyn OrderingApi>,
        config: &ClientConfig,
    ) -> PreviewHandle {
        let (quote_tx, quote_rx) = watch::channel(None);
        let shutdown = CancellationToken::new();
        let changes = controller.subscribe();

        let reconciler = Self {
            controller,
            api,
            changes,
            debounce: Duration::from_millis(config.preview_debounce_ms),
            quote_tx,
            shutdown: shutdown.clone(),
        };
        tokio::spawn(reconciler.run());

        PreviewHandle {
            quotes: quote_rx,
            shutdown,
        }
    }

    async fn run(mut self) {
        tracing::info!("PreviewReconciler started");

        let mut debounce_deadline: Option<Instant> = None;

        loop {
            let sleep_until =
                debounce_deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("PreviewReconciler shutting down");
                    break;
                }

                _ = tokio::time::sleep_until(sleep_until), if debounce_deadline.is_some() => {
                    debounce_deadline = None;
                    self.refresh().await;
                }

                changed = self.changes.changed() => {
                    match changed {
                        Ok(()) => {
                            debounce_deadline = Some(Instant::now() + self.debounce);
                        }
                        Err(_) => {
                            tracing::info!("Cart controller dropped, PreviewReconciler stopping");
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!("PreviewReconciler stopped");
    }

    /// One reconciliation round for the cart as it stands right now
    async fn refresh(&self) {
        let (revision, request) = self.controller.preview_snapshot();

        if request.lines.is_empty() {
            tracing::debug!(revision, "Cart is empty, clearing quote");
            self.quote_tx.send_replace(None);
            return;
        }

        let request_id = Uuid::new_v4();
        tracing::debug!(
            %request_id,
            revision,
            lines = request.lines.len(),
            "Requesting server preview"
        );

        match self.api.preview_cart(&request).await {
            Ok(preview) => {
                let current = self.controller.revision();
                if current != revision {
                    tracing::debug!(
                        %request_id,
                        revision,
                        current,
                        "Discarding stale preview response"
                    );
                    return;
                }
                self.quote_tx
                    .send_replace(Some(Quote::from_server(revision, preview)));
            }
            Err(e) => {
                tracing::warn!(%request_id, "Preview request failed, using local estimate: {e}");
                if self.controller.is_empty() {
                    self.quote_tx.send_replace(None);
                    return;
                }
                let current = self.controller.revision();
                let pricing = self.controller.pricing();
                self.quote_tx.send_replace(Some(Quote::from_local(
                    current,
                    &pricing,
                    Some(e.to_string()),
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, ClientResult};
    use crate::preview::QuoteSource;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared::models::{BundledPromotion, DiscountKind, Promotion};
    use shared::order::{
        CartPreviewRequest, CreateOrderRequest, CreateOrderResponse, PaymentRecord, ServerPreview,
    };
    use tokio::sync::Semaphore;

    /// Prices every request at face value with a flat 200 fee, recording
    /// each request it serves. An optional semaphore gates responses so
    /// tests can hold a call in flight.
    struct MockPreviewApi {
        requests: Mutex<Vec<CartPreviewRequest>>,
        gate: Option<Semaphore>,
        fail: bool,
    }

    impl MockPreviewApi {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                gate: None,
                fail: false,
            }
        }

        fn gated() -> Self {
            Self {
                gate: Some(Semaphore::new(0)),
                ..Self::new()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    #[async_trait]
    impl OrderingApi for MockPreviewApi {
        async fn article_promotions(&self, _article_id: i64) -> ClientResult<Vec<Promotion>> {
            unimplemented!()
        }

        async fn vigent_promotions(&self) -> ClientResult<Vec<Promotion>> {
            unimplemented!()
        }

        async fn vigent_bundles(&self) -> ClientResult<Vec<BundledPromotion>> {
            unimplemented!()
        }

        async fn preview_cart(&self, request: &CartPreviewRequest) -> ClientResult<ServerPreview> {
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            self.requests.lock().push(request.clone());
            if self.fail {
                return Err(ClientError::Internal("connection refused".to_string()));
            }

            // subtotal stands in for whatever the cart asked: 1000 per unit
            let quantity: u32 = request.lines.iter().map(|l| l.quantity).sum();
            let subtotal = 1000.0 * quantity as f64;
            Ok(ServerPreview {
                original_subtotal: subtotal,
                total_discount: 0.0,
                discounted_subtotal: subtotal,
                delivery_fee: 200.0,
                final_total: subtotal + 200.0,
                promotions_summary_text: None,
                per_line_breakdown: vec![],
            })
        }

        async fn create_order(
            &self,
            _request: &CreateOrderRequest,
        ) -> ClientResult<CreateOrderResponse> {
            unimplemented!()
        }

        async fn confirm_cash_payment(&self, _payment_id: i64) -> ClientResult<PaymentRecord> {
            unimplemented!()
        }
    }

    fn make_promotion(id: i64, article_id: i64) -> Promotion {
        Promotion {
            id,
            name: format!("promo-{id}"),
            description: None,
            discount_kind: DiscountKind::Percentage,
            discount_value: 15.0,
            minimum_quantity: 1,
            valid_from: None,
            valid_until: None,
            active_from: None,
            active_until: None,
            is_currently_valid: true,
            applicable_article_ids: vec![article_id],
        }
    }

    async fn next_quote(quotes: &mut watch::Receiver<Option<Quote>>) -> Option<Quote> {
        quotes.changed().await.unwrap();
        quotes.borrow_and_update().clone()
    }

    // ==================== Debounce Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_coalesce_into_one_request() {
        let api = Arc::new(MockPreviewApi::new());
        let controller = CartController::new();
        let handle =
            PreviewReconciler::spawn(controller.clone(), api.clone(), &ClientConfig::default());
        let mut quotes = handle.subscribe();

        // burst of edits with no await between them
        controller.add_line(7, "Paella", 1000.0, 1);
        controller.set_quantity(7, 2);
        controller.set_quantity(7, 3);

        let quote = next_quote(&mut quotes).await.unwrap();
        assert_eq!(api.request_count(), 1);
        assert_eq!(api.requests.lock()[0].lines[0].quantity, 3);
        assert_eq!(quote.source, QuoteSource::Server);
        assert_eq!(quote.revision, 3);
        // 1000 * 3 + 200 fee
        assert_eq!(quote.final_total, 3200.0);

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_edits_each_get_a_request() {
        let api = Arc::new(MockPreviewApi::new());
        let controller = CartController::new();
        let handle =
            PreviewReconciler::spawn(controller.clone(), api.clone(), &ClientConfig::default());
        let mut quotes = handle.subscribe();

        controller.add_line(7, "Paella", 1000.0, 1);
        next_quote(&mut quotes).await.unwrap();

        controller.set_quantity(7, 2);
        let quote = next_quote(&mut quotes).await.unwrap();

        assert_eq!(api.request_count(), 2);
        assert_eq!(quote.final_total, 2200.0);

        handle.shutdown();
    }

    // ==================== Stale Response Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let api = Arc::new(MockPreviewApi::gated());
        let controller = CartController::new();
        let handle =
            PreviewReconciler::spawn(controller.clone(), api.clone(), &ClientConfig::default());
        let mut quotes = handle.subscribe();

        controller.add_line(7, "Paella", 1000.0, 1);

        // let the debounce fire; the request is now held at the gate
        tokio::time::sleep(Duration::from_millis(400)).await;

        // the cart moves on while the request is in flight
        controller.set_quantity(7, 5);

        // release the held response; it belongs to revision 1 and must
        // not be published
        api.gate.as_ref().unwrap().add_permits(1);
        // release the follow-up request for the current cart as well
        api.gate.as_ref().unwrap().add_permits(1);

        let quote = next_quote(&mut quotes).await.unwrap();
        assert_eq!(quote.revision, 2);
        assert_eq!(quote.final_total, 5200.0);
        assert_eq!(api.request_count(), 2);

        handle.shutdown();
    }

    // ==================== Fallback Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_server_failure_publishes_local_estimate() {
        let api = Arc::new(MockPreviewApi::failing());
        let controller = CartController::new();
        let handle =
            PreviewReconciler::spawn(controller.clone(), api.clone(), &ClientConfig::default());
        let mut quotes = handle.subscribe();

        controller.add_line(7, "Paella", 1000.0, 2);
        controller
            .select_promotion(7, Some(make_promotion(31, 7)))
            .unwrap();

        let quote = next_quote(&mut quotes).await.unwrap();
        assert_eq!(quote.source, QuoteSource::LocalEstimate);
        assert!(!quote.is_confirmed());
        assert!(quote.error.as_deref().unwrap().contains("connection refused"));
        // local math: 2000 - 15% (300) + 200 fee
        assert_eq!(quote.original_subtotal, 2000.0);
        assert_eq!(quote.total_discount, 300.0);
        assert_eq!(quote.final_total, 1900.0);

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_emptying_the_cart_clears_the_quote() {
        let api = Arc::new(MockPreviewApi::new());
        let controller = CartController::new();
        let handle =
            PreviewReconciler::spawn(controller.clone(), api.clone(), &ClientConfig::default());
        let mut quotes = handle.subscribe();

        controller.add_line(7, "Paella", 1000.0, 1);
        assert!(next_quote(&mut quotes).await.is_some());

        controller.remove_line(7);
        assert!(next_quote(&mut quotes).await.is_none());
        // no server round-trip for an empty cart
        assert_eq!(api.request_count(), 1);

        handle.shutdown();
    }
}
