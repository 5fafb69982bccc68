//! # Order Types
//!
//! Results of the two checkout steps: creating an order and capturing it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider-issued token correlating order creation with capture.
///
/// Opaque: it is carried from the return redirect to the capture call
/// exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderToken(String);

impl OrderToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Option<String>> for OrderToken {
    fn from(token: Option<String>) -> Self {
        Self(token.unwrap_or_default())
    }
}

impl std::fmt::Display for OrderToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Order status as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Created,
    Saved,
    Approved,
    Voided,
    Completed,
    PayerActionRequired,
    /// Status we don't model (passthrough)
    Unknown(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Saved => "SAVED",
            OrderStatus::Approved => "APPROVED",
            OrderStatus::Voided => "VOIDED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::PayerActionRequired => "PAYER_ACTION_REQUIRED",
            OrderStatus::Unknown(other) => other,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }
}

impl From<&str> for OrderStatus {
    fn from(status: &str) -> Self {
        match status {
            "CREATED" => OrderStatus::Created,
            "SAVED" => OrderStatus::Saved,
            "APPROVED" => OrderStatus::Approved,
            "VOIDED" => OrderStatus::Voided,
            "COMPLETED" => OrderStatus::Completed,
            "PAYER_ACTION_REQUIRED" => OrderStatus::PayerActionRequired,
            other => OrderStatus::Unknown(other.to_string()),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(status: String) -> Self {
        OrderStatus::from(status.as_str())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order created with the provider, awaiting buyer approval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOrder {
    /// Provider's order ID (comes back later as the `token` query parameter)
    pub order_id: String,

    /// Provider name (e.g., "paypal")
    pub provider: String,

    /// URL to redirect the buyer to for approval
    pub approval_url: String,

    /// Order status at creation time
    pub status: OrderStatus,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl CheckoutOrder {
    pub fn new(
        order_id: impl Into<String>,
        provider: impl Into<String>,
        approval_url: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            provider: provider.into(),
            approval_url: approval_url.into(),
            status: OrderStatus::Created,
            created_at: Utc::now(),
        }
    }
}

/// Outcome of a successful capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureReceipt {
    /// Provider's order ID
    pub order_id: String,

    /// Order status after capture
    pub status: OrderStatus,

    /// IDs of the individual captures
    #[serde(default)]
    pub capture_ids: Vec<String>,

    /// Payer email, when the provider returns it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_email: Option<String>,

    pub captured_at: DateTime<Utc>,
}

impl CaptureReceipt {
    pub fn new(order_id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            order_id: order_id.into(),
            status,
            capture_ids: Vec::new(),
            payer_email: None,
            captured_at: Utc::now(),
        }
    }
}
