//! Checkout submission
//!
//! Turns the cart into exactly one order-creation request, choosing the
//! cash or online-payment flow. Validation runs before any network call;
//! the cart is only cleared once the order is safely in the hands of the
//! backend (and, for online payment, a payment link was issued).

use std::sync::Arc;

use shared::order::{
    CreateOrderRequest, DeliveryMode, OrderLineRequest, OrderSummary, PaymentMethod,
    PaymentRecord, PaymentStatus,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::cart::CartController;
use crate::error::ClientError;
use crate::http::OrderingApi;
use crate::preview::PreviewHandle;

/// Order lifecycle as driven by this client.
///
/// `Draft` and `Submitted` are transient; a successful submission lands
/// in `CashPendingConfirmation` or `PaymentLinkIssued`. `CashConfirmed`
/// is reached through [`CheckoutSubmitter::confirm_cash_payment`], and
/// `Paid` when the payment provider reports the online payment approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    Draft,
    Submitted,
    CashPendingConfirmation,
    CashConfirmed,
    PaymentLinkIssued,
    Paid,
    /// Order exists, but no payment link could be issued for it
    PaymentFailed,
}

/// Local pre-submission checks; no request is sent when one fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("delivery orders require a delivery address")]
    MissingDeliveryAddress,
    #[error("online payment requires the buyer's {0}")]
    MissingBuyerField(&'static str),
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("checkout validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// The backend answered but did not accept the order
    #[error("order was rejected: {0}")]
    Rejected(String),
}

/// Everything the order endpoint needs beyond the cart content
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub client_id: i64,
    pub branch_id: i64,
    pub payment_method: PaymentMethod,
    pub delivery_address_id: Option<i64>,
    pub notes: Option<String>,
    pub buyer_email: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_surname: Option<String>,
}

impl CheckoutRequest {
    /// Pay in person at delivery or pickup
    pub fn cash(client_id: i64, branch_id: i64) -> Self {
        Self {
            client_id,
            branch_id,
            payment_method: PaymentMethod::Cash,
            delivery_address_id: None,
            notes: None,
            buyer_email: None,
            buyer_name: None,
            buyer_surname: None,
        }
    }

    /// Pay through a payment link; buyer identity is required
    pub fn online(
        client_id: i64,
        branch_id: i64,
        email: impl Into<String>,
        name: impl Into<String>,
        surname: impl Into<String>,
    ) -> Self {
        Self {
            payment_method: PaymentMethod::Online,
            buyer_email: Some(email.into()),
            buyer_name: Some(name.into()),
            buyer_surname: Some(surname.into()),
            ..Self::cash(client_id, branch_id)
        }
    }

    pub fn with_delivery_address(mut self, address_id: i64) -> Self {
        self.delivery_address_id = Some(address_id);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Result of a successful submission
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub stage: CheckoutStage,
    pub order: OrderSummary,
    /// Where to send the buyer for online payment
    pub payment_link: Option<String>,
    /// Why no payment link exists although the order was created
    pub payment_error: Option<String>,
}

/// Result of an in-person payment confirmation
#[derive(Debug, Clone)]
pub struct CashConfirmation {
    pub stage: CheckoutStage,
    pub record: PaymentRecord,
}

/// Builds and sends the order-creation request for the cart
#[derive(Clone)]
pub struct CheckoutSubmitter {
    controller: CartController,
    api: Arc<dyn OrderingApi>,
    preview: Option<PreviewHandle>,
}

impl CheckoutSubmitter {
    pub fn new(controller: CartController, api: Arc<dyn OrderingApi>) -> Self {
        Self {
            controller,
            api,
            preview: None,
        }
    }

    /// Attach the preview handle so submission can tell whether the
    /// totals on screen were server-confirmed
    pub fn with_preview(mut self, preview: PreviewHandle) -> Self {
        self.preview = Some(preview);
        self
    }

    /// Submit the cart as an order.
    ///
    /// Cash orders clear the cart as soon as the backend accepts them.
    /// Online orders clear it only once a payment link is in hand; when
    /// link issuance fails the order exists but the cart is kept so the
    /// user can retry payment setup.
    pub async fn submit(&self, request: &CheckoutRequest) -> Result<CheckoutOutcome, CheckoutError> {
        self.validate(request)?;

        if let Some(preview) = &self.preview {
            if let Some(quote) = preview.latest() {
                if !quote.is_confirmed() {
                    warn!(
                        revision = quote.revision,
                        "Submitting order with an unconfirmed local estimate"
                    );
                }
            }
        }

        let order_request = self.build_order_request(request);
        let response = self.api.create_order(&order_request).await?;
        let shared::order::CreateOrderResponse {
            success,
            order,
            payment_info,
        } = response;

        if !success {
            return Err(CheckoutError::Rejected(
                "order creation was not acknowledged by the backend".to_string(),
            ));
        }

        match request.payment_method {
            PaymentMethod::Cash => {
                self.controller.clear();
                info!(order_id = %order.id, "Order submitted, cash payment pending confirmation");
                Ok(CheckoutOutcome {
                    stage: CheckoutStage::CashPendingConfirmation,
                    order,
                    payment_link: None,
                    payment_error: None,
                })
            }
            PaymentMethod::Online => {
                let payment_link = payment_info
                    .as_ref()
                    .and_then(|info| info.payment_link.clone());
                match payment_link {
                    Some(link) => {
                        self.controller.clear();
                        info!(order_id = %order.id, "Order submitted, payment link issued");
                        Ok(CheckoutOutcome {
                            stage: CheckoutStage::PaymentLinkIssued,
                            order,
                            payment_link: Some(link),
                            payment_error: None,
                        })
                    }
                    None => {
                        // order created but payment setup failed; keep the
                        // cart so the user can retry
                        let reason = payment_info
                            .and_then(|info| info.error)
                            .unwrap_or_else(|| "payment link was not issued".to_string());
                        warn!(order_id = %order.id, "Order created but payment setup failed: {reason}");
                        Ok(CheckoutOutcome {
                            stage: CheckoutStage::PaymentFailed,
                            order,
                            payment_link: None,
                            payment_error: Some(reason),
                        })
                    }
                }
            }
        }
    }

    /// Record that the cash for an order was collected in person
    pub async fn confirm_cash_payment(
        &self,
        payment_id: i64,
    ) -> Result<CashConfirmation, CheckoutError> {
        let record = self.api.confirm_cash_payment(payment_id).await?;
        let stage = if record.status == PaymentStatus::Approved {
            CheckoutStage::CashConfirmed
        } else {
            CheckoutStage::CashPendingConfirmation
        };
        info!(payment_id, status = ?record.status, "Cash payment confirmation processed");
        Ok(CashConfirmation { stage, record })
    }

    fn validate(&self, request: &CheckoutRequest) -> Result<(), ValidationError> {
        if self.controller.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        if self.controller.delivery().mode == DeliveryMode::Delivery
            && request.delivery_address_id.is_none()
        {
            return Err(ValidationError::MissingDeliveryAddress);
        }
        if request.payment_method == PaymentMethod::Online {
            if request.buyer_email.as_deref().is_none_or(str::is_empty) {
                return Err(ValidationError::MissingBuyerField("email"));
            }
            if request.buyer_name.as_deref().is_none_or(str::is_empty) {
                return Err(ValidationError::MissingBuyerField("name"));
            }
            if request.buyer_surname.as_deref().is_none_or(str::is_empty) {
                return Err(ValidationError::MissingBuyerField("surname"));
            }
        }
        Ok(())
    }

    fn build_order_request(&self, request: &CheckoutRequest) -> CreateOrderRequest {
        let lines = self
            .controller
            .lines()
            .into_iter()
            .map(|line| OrderLineRequest {
                article_id: line.article_id,
                quantity: line.quantity,
                notes: line.notes,
                selected_promotion_id: line.selected_promotion.map(|p| p.id),
            })
            .collect();

        CreateOrderRequest {
            client_id: request.client_id,
            branch_id: request.branch_id,
            delivery_mode: self.controller.delivery().mode,
            delivery_address_id: request.delivery_address_id,
            lines,
            notes: request.notes.clone(),
            buyer_email: request.buyer_email.clone(),
            buyer_name: request.buyer_name.clone(),
            buyer_surname: request.buyer_surname.clone(),
            create_payment_preference: match request.payment_method {
                PaymentMethod::Online => Some(true),
                PaymentMethod::Cash => None,
            },
        }
    }
}
