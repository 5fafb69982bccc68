//! # PayPal Configuration
//!
//! Configuration management for the PayPal integration.
//! Credentials are loaded from environment variables once at startup
//! and handed to `PayPalGateway::new`.

use pay_core::{CheckoutUrls, PaymentError};
use std::env;

/// Sandbox REST endpoint
pub const SANDBOX_API_BASE_URL: &str = "https://api-m.sandbox.paypal.com";

/// Live REST endpoint
pub const LIVE_API_BASE_URL: &str = "https://api-m.paypal.com";

const DEFAULT_BRAND_NAME: &str = "course-pay";

/// PayPal API configuration
#[derive(Clone)]
pub struct PayPalConfig {
    /// REST app client id
    pub client_id: String,

    /// REST app secret
    pub client_secret: String,

    /// API base URL (sandbox, live, or a mock server in tests)
    pub api_base_url: String,

    /// Return/cancel URLs sent with every order
    pub urls: CheckoutUrls,

    /// Brand name shown on the PayPal approval page
    pub brand_name: String,
}

impl PayPalConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `PAYPAL_CLIENT_ID`
    /// - `PAYPAL_SECRET`
    ///
    /// Optional:
    /// - `PAYPAL_BASE_URL` (defaults to the sandbox)
    /// - `BASE_URL` (public URL of this server, defaults to `http://localhost:3000`)
    /// - `PAYPAL_BRAND_NAME`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `var`
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, PaymentError> {
        let client_id = required_var(&var, "PAYPAL_CLIENT_ID")?;
        let client_secret = required_var(&var, "PAYPAL_SECRET")?;

        let mut config = Self::new(client_id, client_secret);

        if let Some(api_base_url) = var("PAYPAL_BASE_URL") {
            config = config.with_api_base_url(api_base_url);
        }
        if let Some(base_url) = var("BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Some(brand_name) = var("PAYPAL_BRAND_NAME") {
            config = config.with_brand_name(brand_name);
        }

        Ok(config)
    }

    /// Create config with explicit credentials (sandbox, local return URLs)
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_base_url: SANDBOX_API_BASE_URL.to_string(),
            urls: CheckoutUrls::default(),
            brand_name: DEFAULT_BRAND_NAME.to_string(),
        }
    }

    /// Check if pointed at the live environment
    pub fn is_live_mode(&self) -> bool {
        self.api_base_url.trim_end_matches('/') == LIVE_API_BASE_URL
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Builder: set the public base URL used for return/cancel redirects
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.urls = CheckoutUrls::new(base_url);
        self
    }

    /// Builder: set brand name
    pub fn with_brand_name(mut self, brand_name: impl Into<String>) -> Self {
        self.brand_name = brand_name.into();
        self
    }
}

impl std::fmt::Debug for PayPalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPalConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("api_base_url", &self.api_base_url)
            .field("urls", &self.urls)
            .field("brand_name", &self.brand_name)
            .finish()
    }
}

fn required_var(
    var: impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, PaymentError> {
    match var(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(PaymentError::Configuration(format!("{} not set", name))),
    }
}
