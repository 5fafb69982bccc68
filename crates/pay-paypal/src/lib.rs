//! # pay-paypal
//!
//! PayPal gateway for course-pay.
//!
//! `PayPalGateway` implements `pay_core::PaymentGateway` on top of the
//! PayPal REST API:
//!
//! 1. `POST /v1/oauth2/token` - client-credentials access token
//! 2. `POST /v2/checkout/orders` - create order, return the `approve` link
//! 3. `POST /v2/checkout/orders/{token}/capture` - capture after approval
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_core::{PaymentGateway, Product};
//! use pay_paypal::PayPalGateway;
//!
//! // Reads PAYPAL_CLIENT_ID / PAYPAL_SECRET (and .env)
//! let gateway = PayPalGateway::from_env(Product::default())?;
//!
//! let order = gateway.create_order().await?;
//! // Redirect user to order.approval_url
//! ```

pub mod auth;
pub mod config;
mod error;
pub mod orders;

// Re-exports
pub use auth::AccessToken;
pub use config::{PayPalConfig, LIVE_API_BASE_URL, SANDBOX_API_BASE_URL};
pub use orders::PayPalGateway;
