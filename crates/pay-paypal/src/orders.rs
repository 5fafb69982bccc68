//! # PayPal Orders
//!
//! Implementation of the PayPal Orders v2 API: create an order for the
//! configured product, hand back the buyer approval link, and capture the
//! order once the buyer returns.

use crate::auth::fetch_access_token;
use crate::config::PayPalConfig;
use crate::error::{map_error_response, RawResponse, PROVIDER};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pay_core::{
    CaptureReceipt, CheckoutOrder, OrderStatus, PaymentError, PaymentGateway, PaymentResult,
    Product,
};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Link relations that carry the buyer approval URL
const APPROVAL_RELS: &[&str] = &["approve", "payer-action"];

/// PayPal checkout gateway
pub struct PayPalGateway {
    config: PayPalConfig,
    product: Product,
    client: Client,
}

impl PayPalGateway {
    /// Create a new PayPal gateway selling `product`
    pub fn new(config: PayPalConfig, product: Product) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            live = config.is_live_mode(),
            api_base_url = %config.api_base_url,
            "PayPal gateway configured"
        );

        Ok(Self {
            config,
            product,
            client,
        })
    }

    /// Create from environment variables
    pub fn from_env(product: Product) -> PaymentResult<Self> {
        let config = PayPalConfig::from_env()?;
        Self::new(config, product)
    }

    /// Build the create-order request body for the configured product
    fn build_order_request(&self) -> CreateOrderRequest {
        let price = &self.product.price;
        let money = Money {
            currency_code: price.currency.as_str().to_string(),
            value: price.to_decimal_string(),
        };

        CreateOrderRequest {
            intent: "CAPTURE",
            purchase_units: vec![PurchaseUnitRequest {
                reference_id: Uuid::new_v4().to_string(),
                items: vec![Item {
                    name: self.product.name.clone(),
                    description: self.product.description.clone(),
                    quantity: "1".to_string(),
                    unit_amount: money.clone(),
                }],
                amount: Amount {
                    currency_code: money.currency_code.clone(),
                    value: money.value.clone(),
                    breakdown: Breakdown { item_total: money },
                },
            }],
            application_context: ApplicationContext {
                return_url: self.config.urls.return_url(),
                cancel_url: self.config.urls.cancel_url(),
                shipping_preference: "NO_SHIPPING",
                user_action: "PAY_NOW",
                brand_name: self.config.brand_name.clone(),
            },
        }
    }

    /// `{base}/v2/checkout/orders/{token}/capture`, with the token as one path segment
    fn capture_url(&self, token: &str) -> PaymentResult<Url> {
        let mut url = Url::parse(&self.config.api_base_url).map_err(|e| {
            PaymentError::Configuration(format!(
                "Invalid PayPal base URL {}: {}",
                self.config.api_base_url, e
            ))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                PaymentError::Configuration(format!(
                    "PayPal base URL cannot carry a path: {}",
                    self.config.api_base_url
                ))
            })?
            .pop_if_empty()
            .extend(["v2", "checkout", "orders", token, "capture"]);

        Ok(url)
    }
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    #[instrument(skip(self), fields(product = %self.product.name))]
    async fn create_order(&self) -> PaymentResult<CheckoutOrder> {
        let token = fetch_access_token(&self.client, &self.config).await?;
        let request = self.build_order_request();

        debug!(
            amount = %request.purchase_units[0].amount.value,
            currency = %request.purchase_units[0].amount.currency_code,
            "Creating PayPal order"
        );

        let url = format!("{}/v2/checkout/orders", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", token.bearer())
            .json(&request)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let raw = RawResponse::read(response).await?;

        if !raw.status.is_success() {
            error!("PayPal API error: status={}, body={}", raw.status, raw.body);
            return Err(map_error_response(&raw, None));
        }

        let order: OrderResponse = serde_json::from_str(&raw.body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse PayPal order response: {}", e))
        })?;

        let approval_url = order
            .links
            .iter()
            .find(|link| APPROVAL_RELS.contains(&link.rel.as_str()))
            .map(|link| link.href.clone())
            .ok_or_else(|| PaymentError::MissingApprovalLink {
                order_id: order.id.clone(),
            })?;

        info!(order_id = %order.id, status = %order.status, "Created PayPal order");

        let created_at = order
            .create_time
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Ok(CheckoutOrder {
            order_id: order.id,
            provider: PROVIDER.to_string(),
            approval_url,
            status: OrderStatus::from(order.status),
            created_at,
        })
    }

    #[instrument(skip(self))]
    async fn capture_payment(&self, token: &str) -> PaymentResult<CaptureReceipt> {
        if token.is_empty() {
            return Err(PaymentError::InvalidRequest(
                "Missing order token".to_string(),
            ));
        }

        let url = self.capture_url(token)?;
        let access_token = fetch_access_token(&self.client, &self.config).await?;

        let response = self
            .client
            .post(url)
            .header("Authorization", access_token.bearer())
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let raw = RawResponse::read(response).await?;

        if !raw.status.is_success() {
            error!("PayPal API error: status={}, body={}", raw.status, raw.body);
            return Err(map_error_response(&raw, Some(token)));
        }

        let capture: CaptureResponse = serde_json::from_str(&raw.body).map_err(|e| {
            PaymentError::Serialization(format!(
                "Failed to parse PayPal capture response: {}",
                e
            ))
        })?;

        let status = OrderStatus::from(capture.status);
        if !status.is_completed() {
            warn!(order_id = %capture.id, status = %status, "Capture did not complete the order");
        }

        let mut receipt = CaptureReceipt::new(capture.id, status);
        receipt.capture_ids = capture
            .purchase_units
            .into_iter()
            .filter_map(|unit| unit.payments)
            .flat_map(|payments| payments.captures)
            .map(|c| c.id)
            .collect();
        receipt.payer_email = capture.payer.and_then(|p| p.email_address);

        info!(
            order_id = %receipt.order_id,
            captures = receipt.capture_ids.len(),
            "Captured PayPal payment"
        );

        Ok(receipt)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// PayPal API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct CreateOrderRequest {
    intent: &'static str,
    purchase_units: Vec<PurchaseUnitRequest>,
    application_context: ApplicationContext,
}

#[derive(Debug, Serialize)]
struct PurchaseUnitRequest {
    reference_id: String,
    items: Vec<Item>,
    amount: Amount,
}

#[derive(Debug, Serialize)]
struct Item {
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    quantity: String,
    unit_amount: Money,
}

#[derive(Debug, Clone, Serialize)]
struct Money {
    currency_code: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct Amount {
    currency_code: String,
    value: String,
    breakdown: Breakdown,
}

#[derive(Debug, Serialize)]
struct Breakdown {
    item_total: Money,
}

#[derive(Debug, Serialize)]
struct ApplicationContext {
    return_url: String,
    cancel_url: String,
    shipping_preference: &'static str,
    user_action: &'static str,
    brand_name: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    status: String,
    #[serde(default)]
    create_time: Option<String>,
    #[serde(default)]
    links: Vec<LinkDescription>,
}

#[derive(Debug, Deserialize)]
struct LinkDescription {
    href: String,
    rel: String,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    id: String,
    status: String,
    #[serde(default)]
    purchase_units: Vec<CapturedUnit>,
    #[serde(default)]
    payer: Option<Payer>,
}

#[derive(Debug, Deserialize)]
struct CapturedUnit {
    #[serde(default)]
    payments: Option<Payments>,
}

#[derive(Debug, Deserialize)]
struct Payments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
struct Capture {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Payer {
    #[serde(default)]
    email_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay_core::{Currency, Price};
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ORDER_ID: &str = "5O190127TN364715T";

    fn gateway_for(server: &MockServer) -> PayPalGateway {
        let config = PayPalConfig::new("client-id", "client-secret")
            .with_api_base_url(server.uri())
            .with_base_url("https://courses.example.com")
            .with_brand_name("Example Academy");
        let product = Product::new("Rust Course", Price::from_cents(10_000, Currency::USD))
            .with_description("Ownership, traits and async");

        PayPalGateway::new(config, product).unwrap()
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "test-access-token",
                "token_type": "Bearer",
                "expires_in": 32400
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_order_request_body() {
        let config = PayPalConfig::new("id", "secret").with_base_url("https://courses.example.com");
        let gateway = PayPalGateway::new(config, Product::default()).unwrap();

        let body = serde_json::to_value(gateway.build_order_request()).unwrap();

        assert_eq!(body["intent"], "CAPTURE");
        let unit = &body["purchase_units"][0];
        assert_eq!(unit["amount"]["value"], "100.00");
        assert_eq!(unit["amount"]["currency_code"], "USD");
        assert_eq!(unit["amount"]["breakdown"]["item_total"]["value"], "100.00");
        assert_eq!(unit["items"][0]["quantity"], "1");
        assert!(!unit["reference_id"].as_str().unwrap().is_empty());

        let context = &body["application_context"];
        assert_eq!(context["return_url"], "https://courses.example.com/complete-order");
        assert_eq!(context["cancel_url"], "https://courses.example.com/cancel-order");
        assert_eq!(context["shipping_preference"], "NO_SHIPPING");
        assert_eq!(context["user_action"], "PAY_NOW");
    }

    #[test]
    fn test_capture_url_encodes_token_as_segment() {
        let config = PayPalConfig::new("id", "secret").with_api_base_url("https://api.example.com");
        let gateway = PayPalGateway::new(config, Product::default()).unwrap();

        let url = gateway.capture_url(ORDER_ID).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v2/checkout/orders/5O190127TN364715T/capture"
        );

        let url = gateway.capture_url("a/b c").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v2/checkout/orders/a%2Fb%20c/capture"
        );
    }

    #[tokio::test]
    async fn test_create_order_returns_approve_link() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders"))
            .and(bearer_token("test-access-token"))
            .and(body_partial_json(json!({
                "intent": "CAPTURE",
                "application_context": {
                    "return_url": "https://courses.example.com/complete-order",
                    "brand_name": "Example Academy"
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": ORDER_ID,
                "status": "CREATED",
                "create_time": "2026-10-19T10:00:00Z",
                "links": [
                    { "href": "https://api-m.sandbox.paypal.com/v2/checkout/orders/5O190127TN364715T", "rel": "self", "method": "GET" },
                    { "href": "https://www.sandbox.paypal.com/checkoutnow?token=5O190127TN364715T", "rel": "approve", "method": "GET" },
                    { "href": "https://api-m.sandbox.paypal.com/v2/checkout/orders/5O190127TN364715T/capture", "rel": "capture", "method": "POST" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let order = gateway_for(&server).create_order().await.unwrap();

        assert_eq!(order.order_id, ORDER_ID);
        assert_eq!(order.provider, "paypal");
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(
            order.approval_url,
            "https://www.sandbox.paypal.com/checkoutnow?token=5O190127TN364715T"
        );
        assert_eq!(order.created_at.to_rfc3339(), "2026-10-19T10:00:00+00:00");
    }

    #[tokio::test]
    async fn test_create_order_without_approve_link() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": ORDER_ID,
                "status": "CREATED",
                "links": [{ "href": "https://example.com/self", "rel": "self" }]
            })))
            .mount(&server)
            .await;

        let err = gateway_for(&server).create_order().await.unwrap_err();

        match err {
            PaymentError::MissingApprovalLink { order_id } => assert_eq!(order_id, ORDER_ID),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_order_provider_failure() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "name": "INVALID_REQUEST",
                "message": "Request is not well-formed, syntactically incorrect, or violates schema.",
                "debug_id": "b3c9d1e2",
                "details": [{ "issue": "INVALID_PARAMETER_VALUE" }]
            })))
            .mount(&server)
            .await;

        let err = gateway_for(&server).create_order().await.unwrap_err();

        match err {
            PaymentError::ProviderError { message, .. } => {
                assert!(message.starts_with("INVALID_REQUEST"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_capture_payment() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders/5O190127TN364715T/capture"))
            .and(bearer_token("test-access-token"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": ORDER_ID,
                "status": "COMPLETED",
                "payer": { "email_address": "buyer@example.com" },
                "purchase_units": [{
                    "reference_id": "default",
                    "payments": {
                        "captures": [{ "id": "3C679366HH908993F", "status": "COMPLETED" }]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = gateway_for(&server).capture_payment(ORDER_ID).await.unwrap();

        assert_eq!(receipt.order_id, ORDER_ID);
        assert!(receipt.status.is_completed());
        assert_eq!(receipt.capture_ids, vec!["3C679366HH908993F".to_string()]);
        assert_eq!(receipt.payer_email.as_deref(), Some("buyer@example.com"));
    }

    #[tokio::test]
    async fn test_capture_unknown_order() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders/BOGUS/capture"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "name": "RESOURCE_NOT_FOUND",
                "message": "The specified resource does not exist.",
                "details": [{ "issue": "INVALID_RESOURCE_ID" }]
            })))
            .mount(&server)
            .await;

        let err = gateway_for(&server).capture_payment("BOGUS").await.unwrap_err();

        match err {
            PaymentError::OrderNotFound { order_id } => assert_eq!(order_id, "BOGUS"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_capture_empty_token_skips_network() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let err = gateway_for(&server).capture_payment("").await.unwrap_err();

        assert!(matches!(err, PaymentError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider() {
        let config = PayPalConfig::new("id", "secret").with_api_base_url("http://127.0.0.1:9");
        let gateway = PayPalGateway::new(config, Product::default()).unwrap();

        let err = gateway.create_order().await.unwrap_err();

        assert!(matches!(err, PaymentError::NetworkError(_)));
    }
}
