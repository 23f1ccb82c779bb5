//! Server state

use std::sync::Arc;

use crate::config::Settings;
use crate::control_plane::http::HttpControlPlane;
use crate::secrets::SecretsClient;

/// State shared across handlers
///
/// Process-scoped immutable handles, injected at startup. The Slack client
/// is not here: it needs the decrypted bot token and is built per invocation.
pub struct AppState {
    pub settings: Settings,
    pub control_plane: Arc<HttpControlPlane>,
    pub secrets: Arc<SecretsClient>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        control_plane: Arc<HttpControlPlane>,
        secrets: Arc<SecretsClient>,
    ) -> Self {
        Self {
            settings,
            control_plane,
            secrets,
        }
    }
}
