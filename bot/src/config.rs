//! Environment-driven settings
//!
//! The bot is deployed the lambda way: everything it needs arrives through
//! environment variables. The two Slack tokens are encrypted at rest and are
//! only recovered through the secrets service per invocation.

use std::env;
use std::str::FromStr;

use crate::errors::BotError;
use crate::logs::LogLevel;

/// Bot settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Log level
    pub log_level: LogLevel,

    /// Encrypted bot user OAuth token (base64 ciphertext)
    pub bot_user_token: String,

    /// Encrypted Slack verification token (base64 ciphertext)
    pub verification_token: String,

    /// Region name, shown in the instance listing
    pub region: String,

    /// Control plane API configuration
    pub control_plane: ControlPlaneSettings,

    /// Base URL of the secrets (decrypt) service
    pub secrets_url: String,

    /// Base URL of the Slack Web API
    pub slack_api_url: String,

    /// Server bind configuration
    pub server: ServerSettings,
}

/// Control plane API settings
#[derive(Debug, Clone)]
pub struct ControlPlaneSettings {
    /// Base URL for the control plane API
    pub base_url: String,

    /// Bearer token for the control plane API
    pub api_token: String,
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

fn required(name: &str) -> Result<String, BotError> {
    env::var(name).map_err(|_| BotError::ConfigError(format!("missing required env var {}", name)))
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, BotError> {
        let log_level = match env::var("LOG_LEVEL") {
            Ok(s) => LogLevel::from_str(&s).map_err(BotError::ConfigError)?,
            Err(_) => LogLevel::default(),
        };

        let server = ServerSettings {
            host: env::var("HOST").unwrap_or_else(|_| ServerSettings::default().host),
            port: match env::var("PORT") {
                Ok(p) => p
                    .parse()
                    .map_err(|_| BotError::ConfigError(format!("invalid PORT value: {}", p)))?,
                Err(_) => ServerSettings::default().port,
            },
        };

        Ok(Self {
            log_level,
            bot_user_token: required("BOT_USER_OAUTH_TOKEN")?,
            verification_token: required("VERIFICATION_TOKEN")?,
            region: required("REGION")?,
            control_plane: ControlPlaneSettings {
                base_url: required("CONTROL_PLANE_URL")?,
                api_token: required("CONTROL_PLANE_TOKEN")?,
            },
            secrets_url: required("SECRETS_URL")?,
            slack_api_url: env::var("SLACK_API_URL")
                .unwrap_or_else(|_| "https://slack.com/api".to_string()),
            server,
        })
    }
}
