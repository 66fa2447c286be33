//! Order flow wire types
//!
//! Request/response shapes for the cart preview, order creation, and
//! payment confirmation endpoints.

mod checkout;
mod payment;
mod preview;
mod types;

pub use checkout::{
    CreateOrderRequest, CreateOrderResponse, OrderLineRequest, OrderSummary, PaymentInfo,
};
pub use payment::{ConfirmCashPaymentRequest, PaymentMethod, PaymentRecord, PaymentStatus};
pub use preview::{CartPreviewRequest, PreviewLineBreakdown, PreviewLineRequest, ServerPreview};
pub use types::DeliveryMode;
