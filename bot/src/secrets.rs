//! Secrets service client
//!
//! The Slack tokens arrive in the environment as base64 ciphertext and are
//! recovered through the decrypt endpoint at invocation time. A decrypt
//! failure fails the whole invocation; the bot never proceeds with a
//! credential it could not recover.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::errors::BotError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DecryptRequest<'a> {
    ciphertext_blob: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecryptResponse {
    plaintext: String,
}

/// Client for the decrypt service
pub struct SecretsClient {
    client: Client,
    base_url: String,
}

impl SecretsClient {
    /// Create a new secrets client
    pub fn new(base_url: &str) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Decrypt a base64 ciphertext blob into a plaintext token
    pub async fn decrypt(&self, ciphertext: &str) -> Result<SecretString, BotError> {
        let url = format!("{}/decrypt", self.base_url);
        debug!("POST {}", url);

        // Reject garbage before it reaches the service
        BASE64
            .decode(ciphertext)
            .map_err(|e| BotError::DecryptionError(format!("ciphertext is not base64: {}", e)))?;

        let response = self
            .client
            .post(&url)
            .json(&DecryptRequest {
                ciphertext_blob: ciphertext,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("decrypt failed: {} - {}", status, body);
            return Err(BotError::DecryptionError(format!("{}: {}", status, body)));
        }

        let body: DecryptResponse = response.json().await?;
        let plaintext = BASE64
            .decode(&body.plaintext)
            .map_err(|e| BotError::DecryptionError(format!("plaintext is not base64: {}", e)))?;
        let plaintext = String::from_utf8(plaintext)
            .map_err(|e| BotError::DecryptionError(format!("plaintext is not UTF-8: {}", e)))?;

        Ok(SecretString::from(plaintext))
    }
}
