//! # Payment Gateway Trait
//!
//! The seam between the HTTP layer and a payment provider.
//!
//! ```text
//! browser ──/pay──────────────▶ create_order() ──▶ approval_url (302)
//! browser ◀─provider approval──
//! browser ──/complete-order───▶ capture_payment(token)
//! ```
//!
//! Implementations: PayPal. Tests substitute their own mock.

use crate::error::PaymentResult;
use crate::order::{CaptureReceipt, CheckoutOrder};
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order with the provider.
    ///
    /// # Returns
    /// A `CheckoutOrder` whose `approval_url` the buyer should be redirected to.
    async fn create_order(&self) -> PaymentResult<CheckoutOrder>;

    /// Capture funds for an approved order.
    ///
    /// # Arguments
    /// * `token` - The token the provider appended to the return URL, as received
    async fn capture_payment(&self, token: &str) -> PaymentResult<CaptureReceipt>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;

/// Where the provider sends the buyer after approval or cancellation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutUrls {
    /// Public base URL of this server (e.g., "https://courses.example.com")
    pub base_url: String,
    /// Return path after approval
    pub return_path: String,
    /// Cancel path
    pub cancel_path: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            return_path: "/complete-order".to_string(),
            cancel_path: "/cancel-order".to_string(),
        }
    }

    pub fn return_url(&self) -> String {
        format!("{}{}", self.base_url, self.return_path)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.base_url, self.cancel_path)
    }
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}
