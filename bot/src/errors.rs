//! Error types for the deploy bot

use thiserror::Error;

/// Main error type for the deploy bot
#[derive(Error, Debug)]
pub enum BotError {
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Control plane error: {0}")]
    ControlPlaneError(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid workflow state: {0}")]
    InvalidState(String),

    #[error("Decryption error: {0}")]
    DecryptionError(String),

    #[error("Slack error: {0}")]
    SlackError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),
}

impl From<anyhow::Error> for BotError {
    fn from(err: anyhow::Error) -> Self {
        BotError::ServerError(err.to_string())
    }
}
