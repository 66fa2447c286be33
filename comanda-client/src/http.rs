//! HTTP transport for the ordering backend API

use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::models::{BundledPromotion, Promotion};
use shared::order::{
    CartPreviewRequest, ConfirmCashPaymentRequest, CreateOrderRequest, CreateOrderResponse,
    PaymentRecord, ServerPreview,
};

/// Error body returned by the backend on non-2xx responses
#[derive(serde::Deserialize)]
struct ApiErrorResponse {
    pub code: i32,
    pub message: String,
}

/// The ordering backend surface consumed by this client
///
/// Implemented over HTTP by [`HttpClient`]; tests substitute scripted
/// implementations.
#[async_trait]
pub trait OrderingApi: Send + Sync {
    /// Promotions applicable to one article
    async fn article_promotions(&self, article_id: i64) -> ClientResult<Vec<Promotion>>;

    /// All currently vigent promotions
    async fn vigent_promotions(&self) -> ClientResult<Vec<Promotion>>;

    /// All currently vigent bundled promotions
    async fn vigent_bundles(&self) -> ClientResult<Vec<BundledPromotion>>;

    /// Server-authoritative totals for a cart
    async fn preview_cart(&self, request: &CartPreviewRequest) -> ClientResult<ServerPreview>;

    /// Create an order
    async fn create_order(&self, request: &CreateOrderRequest)
    -> ClientResult<CreateOrderResponse>;

    /// Confirm an out-of-band cash payment
    async fn confirm_cash_payment(&self, payment_id: i64) -> ClientResult<PaymentRecord>;
}

/// HTTP client for making network requests to the ordering backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.client.get(&url);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.client.put(&url).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            // Prefer the structured error body when the backend sends one
            if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&text) {
                return Err(ClientError::Api {
                    code: api_err.code,
                    message: api_err.message,
                });
            }
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl OrderingApi for HttpClient {
    async fn article_promotions(&self, article_id: i64) -> ClientResult<Vec<Promotion>> {
        self.get(&format!("api/articles/{}/promotions", article_id))
            .await
    }

    async fn vigent_promotions(&self) -> ClientResult<Vec<Promotion>> {
        self.get("api/promotions/vigent").await
    }

    async fn vigent_bundles(&self) -> ClientResult<Vec<BundledPromotion>> {
        self.get("api/promotions/bundles/vigent").await
    }

    async fn preview_cart(&self, request: &CartPreviewRequest) -> ClientResult<ServerPreview> {
        self.post("api/orders/preview", request).await
    }

    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> ClientResult<CreateOrderResponse> {
        self.post("api/orders", request).await
    }

    async fn confirm_cash_payment(&self, payment_id: i64) -> ClientResult<PaymentRecord> {
        let request = ConfirmCashPaymentRequest { payment_id };
        self.put("api/payments/confirm-cash", &request).await
    }
}
