//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the payment gateway and server configuration. Nothing in here
//! is mutated after startup.

use pay_core::{BoxedPaymentGateway, Product};
use pay_paypal::PayPalGateway;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// How gateway failures are rendered to the browser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorStyle {
    /// Mapped status code with a JSON `{error, code}` body
    #[default]
    Json,
    /// `200 OK` with a plain `Error: <message>` body
    Plain,
}

#[derive(Debug, Error)]
#[error("unknown error style '{0}' (expected 'json' or 'plain')")]
pub struct UnknownErrorStyle(String);

impl FromStr for ErrorStyle {
    type Err = UnknownErrorStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ErrorStyle::Json),
            "plain" | "text" => Ok(ErrorStyle::Plain),
            other => Err(UnknownErrorStyle(other.to_string())),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Error rendering
    pub error_style: ErrorStyle,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from a variable lookup; unset variables fall back to defaults
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let error_style = match var("ERROR_STYLE") {
            Some(style) => style.parse()?,
            None => defaults.error_style,
        };

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            environment: var("ENVIRONMENT").unwrap_or(defaults.environment),
            error_style,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            error_style: ErrorStyle::default(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment gateway
    pub gateway: BoxedPaymentGateway,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by PayPal, configured from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let product = load_product()?;

        let gateway = PayPalGateway::from_env(product)
            .map_err(|e| anyhow::anyhow!("Failed to initialize PayPal: {}", e))?;

        Ok(Self::with_gateway(config, Arc::new(gateway)))
    }

    /// Create state around an existing gateway
    pub fn with_gateway(config: AppConfig, gateway: BoxedPaymentGateway) -> Self {
        Self { gateway, config }
    }
}

/// Load the product from config file, falling back to the default course
fn load_product() -> anyhow::Result<Product> {
    let config_paths = [
        "config/product.toml",
        "../config/product.toml",
        "../../config/product.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let product = parse_product(path, &content)?;
            tracing::info!(product = %product.name, "Loaded product from {}", path);
            return Ok(product);
        }
    }

    let product = Product::default();
    tracing::warn!(product = %product.name, "No product config found, using default product");
    Ok(product)
}

/// Parse and check a product file
fn parse_product(path: &str, content: &str) -> anyhow::Result<Product> {
    let product = Product::from_toml(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;

    if !product.price.is_chargeable() {
        anyhow::bail!(
            "Invalid price in {}: amount must be positive, got {}",
            path,
            product.price.amount
        );
    }

    Ok(product)
}
