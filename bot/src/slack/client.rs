//! Slack Web API client

use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::errors::BotError;
use crate::slack::types::Attachment;

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<&'a Attachment>,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,

    #[serde(default)]
    error: Option<String>,
}

/// Client for posting new messages to a channel
///
/// Constructed per invocation, after the bot token has been decrypted.
pub struct SlackClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl SlackClient {
    /// Create a new Slack client
    pub fn new(base_url: &str, token: SecretString) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn post_message(
        &self,
        channel: &str,
        text: Option<&str>,
        attachments: Vec<&Attachment>,
    ) -> Result<(), BotError> {
        let url = format!("{}/chat.postMessage", self.base_url);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            )
            .json(&PostMessageRequest {
                channel,
                text,
                attachments,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("chat.postMessage failed: {} - {}", status, body);
            return Err(BotError::SlackError(format!("{}: {}", status, body)));
        }

        let body: PostMessageResponse = response.json().await?;
        if !body.ok {
            let reason = body.error.unwrap_or_else(|| "unknown".to_string());
            error!("chat.postMessage rejected: {}", reason);
            return Err(BotError::SlackError(reason));
        }

        Ok(())
    }

    /// Post a new message carrying a single attachment
    pub async fn post_attachment(
        &self,
        channel: &str,
        attachment: &Attachment,
    ) -> Result<(), BotError> {
        self.post_message(channel, None, vec![attachment]).await
    }

    /// Post a new plain text message
    pub async fn post_text(&self, channel: &str, text: &str) -> Result<(), BotError> {
        self.post_message(channel, Some(text), vec![]).await
    }
}
