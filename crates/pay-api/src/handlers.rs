//! # Request Handlers
//!
//! Axum request handlers for the checkout flow.

use crate::state::{AppState, ErrorStyle};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pay_core::{OrderToken, PaymentError};
use serde::Serialize;
use tracing::{error, info, instrument};

/// Body returned once a capture succeeds
pub const PURCHASE_COMPLETE: &str = "Course purchased successfully";

// =============================================================================
// Request/Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

/// A gateway failure, rendered according to the configured `ErrorStyle`
#[derive(Debug)]
pub struct ApiError {
    pub error: PaymentError,
    pub style: ErrorStyle,
}

impl ApiError {
    pub fn new(error: PaymentError, style: ErrorStyle) -> Self {
        Self { error, style }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.style {
            ErrorStyle::Plain => (StatusCode::OK, format!("Error: {}", self.error)).into_response(),
            ErrorStyle::Json => {
                let code = self.error.status_code();
                let status =
                    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(ErrorResponse::new(self.error.to_string(), code))).into_response()
            }
        }
    }
}

/// First `token` value in the return redirect's query, if any.
///
/// Repeated or unrelated parameters never reject the request.
fn first_token(params: Vec<(String, String)>) -> Option<String> {
    params
        .into_iter()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value)
}

/// `302 Found` to `location`
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn index() -> &'static str {
    "hi"
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "course-pay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create an order and send the buyer to the provider's approval page
#[instrument(skip_all, fields(provider = state.gateway.provider_name()))]
pub async fn pay(State(state): State<AppState>) -> Result<Response, ApiError> {
    let order = state.gateway.create_order().await.map_err(|e| {
        error!("Failed to create order: {}", e);
        ApiError::new(e, state.config.error_style)
    })?;

    info!(order_id = %order.order_id, "Redirecting buyer to approval page");

    Ok(found(&order.approval_url))
}

/// Capture the order the buyer just approved
#[instrument(skip_all, fields(provider = state.gateway.provider_name()))]
pub async fn complete_order(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<&'static str, ApiError> {
    let token = OrderToken::from(first_token(params));

    let receipt = state
        .gateway
        .capture_payment(token.as_str())
        .await
        .map_err(|e| {
            error!(token = %token, "Failed to capture payment: {}", e);
            ApiError::new(e, state.config.error_style)
        })?;

    info!(
        order_id = %receipt.order_id,
        status = %receipt.status,
        "Purchase completed"
    );

    Ok(PURCHASE_COMPLETE)
}

/// Buyer backed out on the provider's page
pub async fn cancel_order() -> Response {
    found("/")
}
