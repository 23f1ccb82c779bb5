//! Shipbot - Entry Point
//!
//! A Slack bot that walks a channel through cluster -> service -> revision
//! selection and triggers the deployment against the container control plane.

use std::sync::Arc;

use shipbot::config::Settings;
use shipbot::control_plane::http::HttpControlPlane;
use shipbot::logs::{init_logging, LogOptions};
use shipbot::secrets::SecretsClient;
use shipbot::server::serve::serve;
use shipbot::server::state::AppState;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to load settings from environment: {}", e);
            return;
        }
    };

    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    let control_plane = match HttpControlPlane::new(
        &settings.control_plane.base_url,
        &settings.control_plane.api_token,
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to build control plane client: {}", e);
            return;
        }
    };

    let secrets = match SecretsClient::new(&settings.secrets_url) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to build secrets client: {}", e);
            return;
        }
    };

    let state = Arc::new(AppState::new(settings, control_plane, secrets));

    info!("Running shipbot");
    if let Err(e) = serve(state, await_shutdown_signal()).await {
        error!("Failed to run the server: {e}");
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigint = signal(SignalKind::interrupt()).unwrap();

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        info!("Ctrl+C received, shutting down...");
    }
}
