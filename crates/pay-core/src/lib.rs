//! # pay-core
//!
//! Core types and traits for the course-pay checkout service.
//!
//! This crate provides:
//! - `PaymentGateway` trait for implementing payment providers
//! - `Product` and `Price` for the item being sold
//! - `OrderToken`, `CheckoutOrder` and `CaptureReceipt` for the checkout flow
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::PaymentGateway;
//!
//! // Create the order and send the buyer to the provider
//! let order = gateway.create_order().await?;
//! // Redirect user to order.approval_url
//!
//! // Later, on /complete-order?token=...
//! let receipt = gateway.capture_payment(&token).await?;
//! ```

pub mod error;
pub mod gateway;
pub mod order;
pub mod product;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult};
pub use gateway::{BoxedPaymentGateway, CheckoutUrls, PaymentGateway};
pub use order::{CaptureReceipt, CheckoutOrder, OrderStatus, OrderToken};
pub use product::{Currency, Price, Product};
