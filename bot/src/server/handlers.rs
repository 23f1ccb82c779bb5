//! HTTP request handlers
//!
//! One dispatch point for everything Slack delivers: interaction callbacks
//! arrive form-encoded with a `payload` field, Events API requests arrive as
//! JSON. Failures are logged and surfaced as a bare 500; no error detail is
//! echoed back to the channel.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::control_plane::ControlPlane;
use tracing::{debug, error, info};

use crate::deploy::fleet;
use crate::deploy::machine::WorkflowMachine;
use crate::errors::BotError;
use crate::server::state::AppState;
use crate::slack::client::SlackClient;
use crate::slack::codec;
use crate::slack::types::{EventEnvelope, InnerEvent};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "shipbot".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// What a successfully dispatched invocation answers with
enum Dispatch {
    /// Replacement message for an interaction, returned as the response body
    Message(String),

    /// Exact echo of the URL-ownership verification challenge
    Challenge(String),

    /// Acknowledged, nothing to say
    Empty,
}

fn respond(status: StatusCode, content_type: &'static str, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// Slack events endpoint handler
pub async fn events_handler(State(state): State<Arc<AppState>>, body: String) -> Response {
    match dispatch(&state, &body).await {
        Ok(Dispatch::Message(body)) => respond(StatusCode::OK, "application/json", body),
        Ok(Dispatch::Challenge(challenge)) => respond(StatusCode::OK, "text/plain", challenge),
        Ok(Dispatch::Empty) => respond(StatusCode::OK, "application/json", String::new()),
        Err(e) => {
            error!("invocation failed: {}", e);
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                "application/json",
                String::new(),
            )
        }
    }
}

async fn dispatch(state: &AppState, body: &str) -> Result<Dispatch, BotError> {
    if body.starts_with("payload") {
        return handle_interaction(state, body).await;
    }
    handle_event(state, body).await
}

/// Interaction callback path: advance the workflow by one step
async fn handle_interaction(state: &AppState, body: &str) -> Result<Dispatch, BotError> {
    let callback = codec::parse_payload(body)?;
    let machine = WorkflowMachine::new(state.control_plane.as_ref());

    match machine.handle(&callback).await? {
        Some(outcome) => {
            debug!("workflow advanced to {:?}", outcome.step);
            Ok(Dispatch::Message(serde_json::to_string(&outcome.message)?))
        }
        None => Ok(Dispatch::Empty),
    }
}

/// Events API path: URL verification and bot mentions
async fn handle_event(state: &AppState, body: &str) -> Result<Dispatch, BotError> {
    let envelope: EventEnvelope = serde_json::from_str(body)
        .map_err(|e| BotError::MalformedPayload(format!("event is not valid JSON: {}", e)))?;

    let verification = state
        .secrets
        .decrypt(&state.settings.verification_token)
        .await?;
    if envelope.token != *verification.expose_secret() {
        return Err(BotError::MalformedPayload(
            "event verification token mismatch".to_string(),
        ));
    }

    match envelope.kind.as_str() {
        "url_verification" => {
            let challenge = envelope.challenge.ok_or_else(|| {
                BotError::MalformedPayload("url_verification without challenge".to_string())
            })?;
            Ok(Dispatch::Challenge(challenge))
        }
        "event_callback" => {
            if let Some(event) = envelope.event.filter(|e| e.kind == "app_mention") {
                handle_mention(state, &event).await?;
            }
            Ok(Dispatch::Empty)
        }
        _ => Ok(Dispatch::Empty),
    }
}

/// Bot mention path: start a deploy flow, list instances, or print usage
async fn handle_mention(state: &AppState, event: &InnerEvent) -> Result<(), BotError> {
    // Token 0 is the bot mention itself
    let args: Vec<&str> = event.text.split_whitespace().skip(1).collect();
    info!("mention args: {:?}", args);

    let bot_token = state.secrets.decrypt(&state.settings.bot_user_token).await?;
    let slack = SlackClient::new(&state.settings.slack_api_url, bot_token)?;

    match args.as_slice() {
        [] => {
            let machine = WorkflowMachine::new(state.control_plane.as_ref());
            let menu = machine.begin().await?;
            slack.post_attachment(&event.channel, &menu).await
        }
        [prefix] if *prefix != "help" => {
            let instances = state.control_plane.list_instances().await?;
            let matched = fleet::filter_instances(instances, prefix);
            debug!("{} instances match prefix {:?}", matched.len(), prefix);
            slack
                .post_attachment(
                    &event.channel,
                    &fleet::instance_list(&matched, &state.settings.region),
                )
                .await
        }
        _ => slack.post_text(&event.channel, &fleet::usage_text()).await,
    }
}
