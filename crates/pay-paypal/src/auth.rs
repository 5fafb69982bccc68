//! # OAuth2 Access Tokens
//!
//! PayPal REST calls are authorized with a bearer token obtained through
//! the client-credentials grant. A token is fetched per operation; nothing
//! is cached between requests.

use crate::config::PayPalConfig;
use crate::error::{RawResponse, PROVIDER};
use pay_core::{PaymentError, PaymentResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

/// Successful token response
#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl AccessToken {
    /// Authorization header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchange the configured client id/secret for an access token
pub async fn fetch_access_token(client: &Client, config: &PayPalConfig) -> PaymentResult<AccessToken> {
    let url = format!("{}/v1/oauth2/token", config.api_base_url);

    let response = client
        .post(&url)
        .basic_auth(&config.client_id, Some(&config.client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

    let raw = RawResponse::read(response).await?;

    if !raw.status.is_success() {
        error!(status = %raw.status, "PayPal token request failed");

        let message = match serde_json::from_str::<OAuthErrorResponse>(&raw.body) {
            Ok(err) => match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            },
            Err(_) => format!("HTTP {}: {}", raw.status, raw.body),
        };

        return Err(PaymentError::Authentication {
            provider: PROVIDER.to_string(),
            message,
        });
    }

    let token: AccessToken = serde_json::from_str(&raw.body).map_err(|e| {
        PaymentError::Serialization(format!("Failed to parse PayPal token response: {}", e))
    })?;

    debug!(
        token_type = ?token.token_type,
        expires_in = ?token.expires_in,
        "Obtained PayPal access token"
    );

    Ok(token)
}
