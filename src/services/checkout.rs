use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum CheckoutError {
    #[error("payment provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("payment provider returned status {0}")]
    Provider(u16),
}

/// Client for the externally hosted card checkout. The provider returns
/// a redirect URL; the outcome comes back later on the webhook.
#[derive(Debug, Clone)]
pub(crate) struct CheckoutClient {
    http: reqwest::Client,
    provider_url: String,
    success_url: String,
    cancel_url: String,
    currency: String,
}

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    reference: &'a str,
    amount_cents: i64,
    currency: &'a str,
    description: &'a str,
    success_url: &'a str,
    cancel_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    checkout_url: String,
}

impl CheckoutClient {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Option<Self>> {
        let payments = settings.payments();
        if payments.provider_url.is_empty() {
            return Ok(None);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(payments.request_timeout_seconds))
            .build()?;

        Ok(Some(Self {
            http,
            provider_url: payments.provider_url.clone(),
            success_url: payments.success_url.clone(),
            cancel_url: payments.cancel_url.clone(),
            currency: payments.currency.clone(),
        }))
    }

    /// Create a hosted checkout session for a pending card purchase and
    /// return the redirect URL.
    pub(crate) async fn create_session(
        &self,
        purchase_id: &str,
        amount_cents: i64,
        course_title: &str,
    ) -> Result<String, CheckoutError> {
        let request = CreateSessionRequest {
            reference: purchase_id,
            amount_cents,
            currency: &self.currency,
            description: course_title,
            success_url: &self.success_url,
            cancel_url: &self.cancel_url,
        };

        let response = self.http.post(&self.provider_url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(CheckoutError::Provider(response.status().as_u16()));
        }

        let body: CreateSessionResponse = response.json().await?;
        Ok(body.checkout_url)
    }
}

/// Hex digest the provider sends in `X-Webhook-Signature`: sha256 over
/// the shared secret followed by the raw body.
pub(crate) fn webhook_signature(secret: &str, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(body);
    hex::encode(hasher.finalize())
}

pub(crate) fn verify_webhook_signature(secret: &str, body: &[u8], provided: &str) -> bool {
    let expected = webhook_signature(secret, body);
    // Both strings are fixed-length hex; compare without short-circuiting.
    if expected.len() != provided.len() {
        return false;
    }
    expected
        .bytes()
        .zip(provided.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_stable_and_verifies() {
        let body = br#"{"reference":"p-1","outcome":"completed"}"#;
        let signature = webhook_signature("hook-secret", body);
        assert!(verify_webhook_signature("hook-secret", body, &signature));
    }

    #[test]
    fn tampered_body_or_secret_fails() {
        let body = br#"{"reference":"p-1","outcome":"completed"}"#;
        let signature = webhook_signature("hook-secret", body);
        assert!(!verify_webhook_signature("hook-secret", b"other", &signature));
        assert!(!verify_webhook_signature("wrong-secret", body, &signature));
        assert!(!verify_webhook_signature("hook-secret", body, "deadbeef"));
    }
}
