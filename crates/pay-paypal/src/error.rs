//! Mapping of PayPal error responses onto `PaymentError`.

use pay_core::PaymentError;
use reqwest::{header::RETRY_AFTER, Response, StatusCode};
use serde::Deserialize;

pub(crate) const PROVIDER: &str = "paypal";

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Issues that mean the buyer's payment did not go through
const DECLINE_ISSUES: &[&str] = &[
    "INSTRUMENT_DECLINED",
    "PAYER_ACTION_REQUIRED",
    "PAYER_CANNOT_PAY",
    "ORDER_NOT_APPROVED",
    "TRANSACTION_REFUSED",
];

/// Status, `Retry-After` and body of a finished provider call
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub retry_after: Option<u64>,
    pub body: String,
}

impl RawResponse {
    pub async fn read(response: Response) -> Result<Self, PaymentError> {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        Ok(Self {
            status,
            retry_after,
            body,
        })
    }
}

/// PayPal REST error body
#[derive(Debug, Deserialize)]
pub(crate) struct PayPalErrorResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub debug_id: Option<String>,
    #[serde(default)]
    pub details: Vec<PayPalErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PayPalErrorDetail {
    pub issue: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl PayPalErrorResponse {
    fn summary(&self) -> String {
        let mut summary = match (&self.name, &self.message) {
            (Some(name), Some(message)) => format!("{}: {}", name, message),
            (Some(name), None) => name.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => "unknown error".to_string(),
        };
        if let Some(detail) = self.details.first() {
            summary.push_str(&format!(" [{}]", detail.issue));
        }
        if let Some(debug_id) = &self.debug_id {
            summary.push_str(&format!(" (debug_id {})", debug_id));
        }
        summary
    }

    fn decline_reason(&self) -> Option<String> {
        self.details
            .iter()
            .find(|d| DECLINE_ISSUES.contains(&d.issue.as_str()))
            .map(|d| match &d.description {
                Some(description) => format!("{}: {}", d.issue, description),
                None => d.issue.clone(),
            })
    }
}

/// Turn a non-success Orders API response into a typed error
pub(crate) fn map_error_response(raw: &RawResponse, order_id: Option<&str>) -> PaymentError {
    let parsed = serde_json::from_str::<PayPalErrorResponse>(&raw.body).ok();

    if raw.status == StatusCode::TOO_MANY_REQUESTS {
        return PaymentError::RateLimited {
            provider: PROVIDER.to_string(),
            retry_after_secs: raw.retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        };
    }

    if raw.status == StatusCode::UNAUTHORIZED {
        return PaymentError::Authentication {
            provider: PROVIDER.to_string(),
            message: parsed
                .map(|p| p.summary())
                .unwrap_or_else(|| format!("HTTP {}", raw.status)),
        };
    }

    let not_found = raw.status == StatusCode::NOT_FOUND
        || parsed
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .map_or(false, |name| name == "RESOURCE_NOT_FOUND");
    if not_found {
        return PaymentError::OrderNotFound {
            order_id: order_id.unwrap_or("unknown").to_string(),
        };
    }

    match parsed {
        Some(parsed) => {
            if raw.status == StatusCode::UNPROCESSABLE_ENTITY {
                if let Some(reason) = parsed.decline_reason() {
                    return PaymentError::PaymentDeclined { reason };
                }
            }
            PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: parsed.summary(),
            }
        }
        None => PaymentError::ProviderError {
            provider: PROVIDER.to_string(),
            message: format!("HTTP {}: {}", raw.status, raw.body),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(status: u16, body: serde_json::Value) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            retry_after: None,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_declined_instrument() {
        let response = raw(
            422,
            json!({
                "name": "UNPROCESSABLE_ENTITY",
                "message": "The requested action could not be performed.",
                "debug_id": "f4a8b2c1",
                "details": [{
                    "issue": "INSTRUMENT_DECLINED",
                    "description": "The instrument presented was either declined by the processor or bank"
                }]
            }),
        );

        match map_error_response(&response, Some("ORDER-1")) {
            PaymentError::PaymentDeclined { reason } => {
                assert!(reason.starts_with("INSTRUMENT_DECLINED"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_already_captured_is_provider_error() {
        let response = raw(
            422,
            json!({
                "name": "UNPROCESSABLE_ENTITY",
                "details": [{ "issue": "ORDER_ALREADY_CAPTURED" }],
                "debug_id": "abc"
            }),
        );

        match map_error_response(&response, Some("ORDER-1")) {
            PaymentError::ProviderError { provider, message } => {
                assert_eq!(provider, "paypal");
                assert!(message.contains("ORDER_ALREADY_CAPTURED"));
                assert!(message.contains("debug_id abc"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_not_found() {
        let response = raw(404, json!({ "name": "RESOURCE_NOT_FOUND" }));

        match map_error_response(&response, Some("BOGUS")) {
            PaymentError::OrderNotFound { order_id } => assert_eq!(order_id, "BOGUS"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rate_limited_uses_retry_after() {
        let mut response = raw(429, json!({ "name": "RATE_LIMIT_REACHED" }));
        response.retry_after = Some(12);

        match map_error_response(&response, None) {
            PaymentError::RateLimited {
                retry_after_secs, ..
            } => assert_eq!(retry_after_secs, 12),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_body() {
        let response = RawResponse {
            status: StatusCode::BAD_GATEWAY,
            retry_after: None,
            body: "<html>upstream</html>".to_string(),
        };

        match map_error_response(&response, None) {
            PaymentError::ProviderError { message, .. } => {
                assert!(message.starts_with("HTTP 502"));
                assert!(message.contains("upstream"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
