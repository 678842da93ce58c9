//! Typed HTTP client for the DENFIT REST backend.
//!
//! Thin wrapper translating typed calls into REST requests and normalizing
//! success/error bodies into a single result-or-error shape. Non-2xx
//! responses carry a `{ "message": ... }` body which is surfaced verbatim.

use denfit_core::{Order, Product, Review, UserProfile};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use denfit_core::{CustomerDetails, ProductId, ShippingAddress};

/// Errors produced by the API layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (network failure, DNS, etc.).
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend responded with a non-2xx status.
    ///
    /// `message` is the server's error message, surfaced verbatim.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("unexpected response from server: {0}")]
    Parse(String),
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signup request body.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Successful login/signup response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Generic `{ message }` response for the password-recovery flow.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Successful password-reset response; the user is logged in afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

/// One snapshotted line of an order-creation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product: ProductId,
    pub name: String,
    pub quantity: u32,
    pub image: String,
    pub price: Decimal,
    pub size: String,
    pub color: String,
}

/// Order-creation request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
    pub shipping_address: ShippingAddress,
    pub customer: CustomerDetails,
    pub payment_method: String,
    pub total_amount: Decimal,
}

/// Review submission body.
#[derive(Debug, Clone, Serialize)]
pub struct NewReviewRequest {
    pub rating: u8,
    pub comment: String,
}

// =============================================================================
// Backend Trait
// =============================================================================

/// The backend surface the stores depend on.
///
/// [`ApiClient`] is the production implementation; tests substitute an
/// in-memory mock so the session and checkout flows run without a network.
pub trait Backend {
    /// Fetch the full product catalog.
    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>>;

    /// Exchange credentials for a bearer token and profile.
    fn login(&self, req: &LoginRequest) -> impl Future<Output = Result<AuthResponse, ApiError>>;

    /// Register a new account.
    fn signup(&self, req: &SignupRequest) -> impl Future<Output = Result<AuthResponse, ApiError>>;

    /// Request a password-reset passcode.
    fn forgot_password(&self, email: &str)
    -> impl Future<Output = Result<MessageResponse, ApiError>>;

    /// Check a passcode without consuming it.
    fn verify_passcode(
        &self,
        email: &str,
        passcode: &str,
    ) -> impl Future<Output = Result<MessageResponse, ApiError>>;

    /// Reset the password with a verified passcode.
    fn reset_password(
        &self,
        email: &str,
        passcode: &str,
        new_password: &str,
    ) -> impl Future<Output = Result<ResetResponse, ApiError>>;

    /// Create an order from a cart snapshot.
    fn create_order(
        &self,
        token: &str,
        req: &CreateOrderRequest,
    ) -> impl Future<Output = Result<Order, ApiError>>;

    /// Fetch the caller's order history, newest first.
    fn my_orders(&self, token: &str) -> impl Future<Output = Result<Vec<Order>, ApiError>>;

    /// Append a review to a product.
    fn submit_review(
        &self,
        token: &str,
        product_id: ProductId,
        req: &NewReviewRequest,
    ) -> impl Future<Output = Result<Review, ApiError>>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// HTTP client for the DENFIT backend.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for the given base URL (e.g. `"/api"` behind a
    /// proxy, or `"http://localhost:5000"` in development).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Normalize a response into the typed body or an [`ApiError`].
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if !status.is_success() {
            // Prefer the server's `{ message }` body; fall back to the
            // canonical status reason for non-JSON error pages.
            let message = match response.json::<MessageResponse>().await {
                Ok(body) => body.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("An unexpected server error occurred. Please try again.")
                    .to_owned(),
            };
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Self::handle_response(req.send().await?).await
    }

    async fn post<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, ApiError> {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Self::handle_response(req.send().await?).await
    }
}

impl Backend for ApiClient {
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("/products", None).await
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post("/auth/login", None, req).await
    }

    async fn signup(&self, req: &SignupRequest) -> Result<AuthResponse, ApiError> {
        self.post("/auth/signup", None, req).await
    }

    async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError> {
        self.post(
            "/auth/forgot-password",
            None,
            &serde_json::json!({ "email": email }),
        )
        .await
    }

    async fn verify_passcode(
        &self,
        email: &str,
        passcode: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.post(
            "/auth/verify-passcode",
            None,
            &serde_json::json!({ "email": email, "passcode": passcode }),
        )
        .await
    }

    async fn reset_password(
        &self,
        email: &str,
        passcode: &str,
        new_password: &str,
    ) -> Result<ResetResponse, ApiError> {
        self.post(
            "/auth/reset-password",
            None,
            &serde_json::json!({
                "email": email,
                "passcode": passcode,
                "newPassword": new_password,
            }),
        )
        .await
    }

    async fn create_order(
        &self,
        token: &str,
        req: &CreateOrderRequest,
    ) -> Result<Order, ApiError> {
        self.post("/orders", Some(token), req).await
    }

    async fn my_orders(&self, token: &str) -> Result<Vec<Order>, ApiError> {
        self.get("/orders/myorders", Some(token)).await
    }

    async fn submit_review(
        &self,
        token: &str,
        product_id: ProductId,
        req: &NewReviewRequest,
    ) -> Result<Review, ApiError> {
        self.post(&format!("/products/{product_id}/reviews"), Some(token), req)
            .await
    }
}
