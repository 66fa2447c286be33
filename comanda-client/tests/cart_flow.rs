// comanda-client/tests/cart_flow.rs
// End-to-end cart journeys against an in-memory backend

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use comanda_client::{
    CartController, CheckoutRequest, CheckoutStage, CheckoutSubmitter, ClientConfig, ClientResult,
    OrderingApi, PreviewReconciler, PromotionCatalog, QuoteSource,
};
use shared::models::{BundledPromotion, DiscountKind, Promotion};
use shared::order::{
    CartPreviewRequest, CreateOrderRequest, CreateOrderResponse, DeliveryMode, OrderSummary,
    PaymentInfo, PaymentMethod, PaymentRecord, PaymentStatus, ServerPreview,
};

/// Flat bonus the backend applies on top of what the client can compute
/// locally, so tests can tell a server quote from a local estimate.
const LOYALTY_BONUS: f64 = 100.0;
const DELIVERY_FEE: f64 = 200.0;

/// Backend double that prices previews with its own arithmetic and
/// accepts orders, recording everything it is asked to do.
struct InMemoryBackend {
    prices: HashMap<i64, f64>,
    promotions: Vec<Promotion>,
    orders: Mutex<Vec<CreateOrderRequest>>,
}

impl InMemoryBackend {
    fn new() -> Self {
        let mut prices = HashMap::new();
        prices.insert(7, 1000.0);
        prices.insert(9, 300.0);

        Self {
            prices,
            promotions: vec![Promotion {
                id: 31,
                name: "Paella Tuesdays".to_string(),
                description: Some("15% off when you order two".to_string()),
                discount_kind: DiscountKind::Percentage,
                discount_value: 15.0,
                minimum_quantity: 2,
                valid_from: None,
                valid_until: None,
                active_from: None,
                active_until: None,
                is_currently_valid: true,
                applicable_article_ids: vec![7],
            }],
            orders: Mutex::new(Vec::new()),
        }
    }

    fn order_count(&self) -> usize {
        self.orders.lock().len()
    }
}

#[async_trait]
impl OrderingApi for InMemoryBackend {
    async fn article_promotions(&self, article_id: i64) -> ClientResult<Vec<Promotion>> {
        Ok(self
            .promotions
            .iter()
            .filter(|p| p.applicable_article_ids.contains(&article_id))
            .cloned()
            .collect())
    }

    async fn vigent_promotions(&self) -> ClientResult<Vec<Promotion>> {
        Ok(self.promotions.clone())
    }

    async fn vigent_bundles(&self) -> ClientResult<Vec<BundledPromotion>> {
        Ok(vec![])
    }

    async fn preview_cart(&self, request: &CartPreviewRequest) -> ClientResult<ServerPreview> {
        let mut subtotal = 0.0;
        let mut discount = 0.0;

        for line in &request.lines {
            let unit_price = self.prices.get(&line.article_id).copied().unwrap_or(0.0);
            let line_subtotal = unit_price * line.quantity as f64;
            subtotal += line_subtotal;

            if let Some(promotion_id) = line.selected_promotion_id {
                if let Some(promotion) = self.promotions.iter().find(|p| p.id == promotion_id) {
                    if promotion.applicable_article_ids.contains(&line.article_id)
                        && line.quantity >= promotion.minimum_quantity
                    {
                        discount += line_subtotal * promotion.discount_value / 100.0;
                    }
                }
            }
        }

        if request.delivery_mode == DeliveryMode::Pickup {
            discount += subtotal * 0.10;
        }
        // the backend knows about the loyalty program, the client does not
        discount += LOYALTY_BONUS;

        let delivery_fee = match request.delivery_mode {
            DeliveryMode::Delivery => DELIVERY_FEE,
            DeliveryMode::Pickup => 0.0,
        };
        let discounted = (subtotal - discount).max(0.0);

        Ok(ServerPreview {
            original_subtotal: subtotal,
            total_discount: discount,
            discounted_subtotal: discounted,
            delivery_fee,
            final_total: discounted + delivery_fee,
            promotions_summary_text: Some("Promotions and loyalty bonus applied".to_string()),
            per_line_breakdown: vec![],
        })
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<CreateOrderResponse> {
        self.orders.lock().push(request.clone());
        let wants_link = request.create_payment_preference == Some(true);

        Ok(CreateOrderResponse {
            success: true,
            order: OrderSummary {
                id: format!("ord-{:04}", self.orders.lock().len()),
                status: "CREATED".to_string(),
                total: 0.0,
                payment_id: Some(77),
                created_at: shared::util::now_millis(),
            },
            payment_info: wants_link.then(|| PaymentInfo {
                payment_link: Some("https://pay.example.com/ord-0001".to_string()),
                error: None,
            }),
        })
    }

    async fn confirm_cash_payment(&self, payment_id: i64) -> ClientResult<PaymentRecord> {
        Ok(PaymentRecord {
            id: payment_id,
            order_id: "ord-0001".to_string(),
            method: PaymentMethod::Cash,
            amount: 2100.0,
            status: PaymentStatus::Approved,
            updated_at: shared::util::now_millis(),
        })
    }
}

#[tokio::test(start_paused = true)]
async fn test_server_quote_supersedes_local_estimate() {
    let backend = Arc::new(InMemoryBackend::new());
    let catalog = PromotionCatalog::new(backend.clone());
    let controller = CartController::new();
    let handle = PreviewReconciler::spawn(
        controller.clone(),
        backend.clone(),
        &ClientConfig::default(),
    );
    let mut quotes = handle.subscribe();

    // build the cart from what the catalog offers
    let offers = catalog.promotions_for_article(7).await.unwrap();
    assert_eq!(offers.len(), 1);

    controller.add_line(7, "Paella", 1000.0, 2);
    controller.add_line(9, "Flan", 300.0, 1);
    controller
        .select_promotion(7, Some(offers[0].clone()))
        .unwrap();

    // local view: 2300 - 300 promo + 200 fee
    let local = controller.pricing();
    assert_eq!(local.original_subtotal, 2300.0);
    assert_eq!(local.total_discount, 300.0);
    assert_eq!(local.final_total, 2200.0);

    // the reconciled quote carries the server's extra loyalty bonus
    quotes.changed().await.unwrap();
    let quote = quotes.borrow_and_update().clone().unwrap();
    assert_eq!(quote.source, QuoteSource::Server);
    assert!(quote.is_confirmed());
    assert_eq!(quote.total_discount, 400.0);
    assert_eq!(quote.final_total, 2100.0);
    assert!(quote.promotions_summary.is_some());

    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_online_checkout_journey() {
    let backend = Arc::new(InMemoryBackend::new());
    let controller = CartController::new();
    let handle = PreviewReconciler::spawn(
        controller.clone(),
        backend.clone(),
        &ClientConfig::default(),
    );
    let mut quotes = handle.subscribe();

    controller.add_line(7, "Paella", 1000.0, 2);
    quotes.changed().await.unwrap();

    let submitter =
        CheckoutSubmitter::new(controller.clone(), backend.clone()).with_preview(handle.clone());
    let request = CheckoutRequest::online(1, 1, "ana@example.com", "Ana", "Gómez")
        .with_delivery_address(10)
        .with_notes("ring the bell");

    let outcome = submitter.submit(&request).await.unwrap();
    assert_eq!(outcome.stage, CheckoutStage::PaymentLinkIssued);
    assert!(outcome.payment_link.is_some());
    assert_eq!(backend.order_count(), 1);

    // the submitted order carries the cart content and buyer identity
    {
        let orders = backend.orders.lock();
        assert_eq!(orders[0].lines.len(), 1);
        assert_eq!(orders[0].buyer_email.as_deref(), Some("ana@example.com"));
        assert_eq!(orders[0].notes.as_deref(), Some("ring the bell"));
        assert_eq!(orders[0].create_payment_preference, Some(true));
    }

    // the cart was cleared, so the quote drains to None
    assert!(controller.is_empty());
    quotes.changed().await.unwrap();
    assert!(quotes.borrow_and_update().is_none());

    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_cash_checkout_and_confirmation_journey() {
    let backend = Arc::new(InMemoryBackend::new());
    let controller = CartController::new();
    controller.add_line(7, "Paella", 1000.0, 2);
    controller.set_delivery_mode(DeliveryMode::Pickup);

    let submitter = CheckoutSubmitter::new(controller.clone(), backend.clone());
    let outcome = submitter
        .submit(&CheckoutRequest::cash(1, 1))
        .await
        .unwrap();

    assert_eq!(outcome.stage, CheckoutStage::CashPendingConfirmation);
    assert!(controller.is_empty());

    let payment_id = outcome.order.payment_id.unwrap();
    let confirmation = submitter.confirm_cash_payment(payment_id).await.unwrap();
    assert_eq!(confirmation.stage, CheckoutStage::CashConfirmed);
    assert_eq!(confirmation.record.status, PaymentStatus::Approved);
}

#[tokio::test(start_paused = true)]
async fn test_pickup_preview_includes_take_away_discount() {
    let backend = Arc::new(InMemoryBackend::new());
    let controller = CartController::new();
    let handle = PreviewReconciler::spawn(
        controller.clone(),
        backend.clone(),
        &ClientConfig::default(),
    );
    let mut quotes = handle.subscribe();

    controller.add_line(7, "Paella", 1000.0, 3);
    controller.set_delivery_mode(DeliveryMode::Pickup);

    quotes.changed().await.unwrap();
    let quote = quotes.borrow_and_update().clone().unwrap();

    // 3000 - 10% take-away (300) - loyalty (100), no fee on pickup
    assert_eq!(quote.original_subtotal, 3000.0);
    assert_eq!(quote.total_discount, 400.0);
    assert_eq!(quote.delivery_fee, 0.0);
    assert_eq!(quote.final_total, 2600.0);

    handle.shutdown();
}
