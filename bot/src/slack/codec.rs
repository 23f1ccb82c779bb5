//! Interactive message codec
//!
//! Workflow context survives between steps only inside the outbound message:
//! the chosen cluster rides in the attachment `callback_id`, the chosen
//! revision and service ride in option values. This module owns every token
//! format and delimiter; nothing outside it splits strings.

use crate::errors::BotError;
use crate::slack::types::{
    Attachment, AttachmentAction, Field, IncomingAction, InteractionCallback, Message, OptionItem,
};

/// Version marker carried on every callback identifier
const CALLBACK_MARKER: &str = "deploy-v1";

/// Delimiter inside callback tokens and deploy-target values. Cluster,
/// service and task-family names must never contain it; the naming
/// convention this bot governs guarantees that.
const DELIMITER: char = '/';

pub const COLOR_PROMPT: &str = "#ff8c00";
pub const COLOR_CANCELLED: &str = "#808080";
pub const COLOR_STARTED: &str = "#0174DF";

/// Recognized interaction actions
///
/// Unknown action names fall through to `Unrecognized` and are acknowledged
/// without effect; Slack may deliver retries or unrelated callbacks to the
/// same endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Clusters,
    Services,
    ImgTags,
    TaskStart,
    Cancel,
    Unrecognized,
}

impl From<&str> for Action {
    fn from(name: &str) -> Self {
        match name {
            "clusters" => Action::Clusters,
            "services" => Action::Services,
            "imgTags" => Action::ImgTags,
            "taskStart" => Action::TaskStart,
            "cancel" => Action::Cancel,
            _ => Action::Unrecognized,
        }
    }
}

/// State token carried in the attachment callback identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackToken {
    /// Initial cluster-selection menu, nothing chosen yet
    Start,

    /// A cluster has been chosen in a prior step
    Cluster(String),
}

impl CallbackToken {
    pub fn encode(&self) -> String {
        match self {
            CallbackToken::Start => CALLBACK_MARKER.to_string(),
            CallbackToken::Cluster(name) => format!("{}{}{}", CALLBACK_MARKER, DELIMITER, name),
        }
    }

    /// Parse a callback identifier, rejecting anything without the marker
    pub fn parse(raw: &str) -> Result<Self, BotError> {
        if raw == CALLBACK_MARKER {
            return Ok(CallbackToken::Start);
        }
        match raw.strip_prefix(CALLBACK_MARKER).and_then(|rest| {
            rest.strip_prefix(DELIMITER)
                .filter(|cluster| !cluster.is_empty())
        }) {
            Some(cluster) => Ok(CallbackToken::Cluster(cluster.to_string())),
            None => Err(BotError::InvalidState(format!(
                "callback identifier lacks the {} marker: {:?}",
                CALLBACK_MARKER, raw
            ))),
        }
    }

    /// The cluster name this token carries, or `InvalidState` if none
    pub fn cluster(&self) -> Result<&str, BotError> {
        match self {
            CallbackToken::Cluster(name) => Ok(name),
            CallbackToken::Start => Err(BotError::InvalidState(
                "no cluster has been selected yet".to_string(),
            )),
        }
    }
}

/// Deploy target carried in option and button values after revision selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    /// Full task definition revision identifier, `family:revision`
    pub revision_id: String,

    /// Service name the revision is deployed to
    pub service: String,
}

impl DeployTarget {
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.revision_id, DELIMITER, self.service)
    }

    /// Parse a deploy-target value, rejecting ambiguous delimiter counts
    pub fn parse(raw: &str) -> Result<Self, BotError> {
        let parts: Vec<&str> = raw.split(DELIMITER).collect();
        match parts.as_slice() {
            [revision_id, service] if !revision_id.is_empty() && !service.is_empty() => Ok(Self {
                revision_id: revision_id.to_string(),
                service: service.to_string(),
            }),
            _ => Err(BotError::MalformedPayload(format!(
                "deploy target is not <revision>{}<service>: {:?}",
                DELIMITER, raw
            ))),
        }
    }
}

/// Decode an interaction request body (`payload=<url-encoded JSON>`)
pub fn parse_payload(body: &str) -> Result<InteractionCallback, BotError> {
    let json = url::form_urlencoded::parse(body.as_bytes())
        .find(|(key, _)| key == "payload")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| BotError::MalformedPayload("no payload field in body".to_string()))?;

    serde_json::from_str(&json)
        .map_err(|e| BotError::MalformedPayload(format!("payload is not valid JSON: {}", e)))
}

/// The first triggered action of a callback, with its recognized name
pub fn triggered_action(callback: &InteractionCallback) -> Result<(Action, &IncomingAction), BotError> {
    let action = callback
        .actions
        .first()
        .ok_or_else(|| BotError::MalformedPayload("callback carries no actions".to_string()))?;
    Ok((Action::from(action.name.as_str()), action))
}

/// The selected option value of a select action
pub fn selected_value(action: &IncomingAction) -> Result<&str, BotError> {
    action
        .selected_options
        .first()
        .map(|o| o.value.as_str())
        .ok_or_else(|| {
            BotError::MalformedPayload(format!("action {:?} has no selected option", action.name))
        })
}

/// The carried value of a button action
pub fn button_value(action: &IncomingAction) -> Result<&str, BotError> {
    action.value.as_deref().ok_or_else(|| {
        BotError::MalformedPayload(format!("action {:?} carries no value", action.name))
    })
}

fn cancel_button() -> AttachmentAction {
    AttachmentAction::button("cancel", "Cancel", "danger", None)
}

/// Rewrite the original message in place for the next step
///
/// `None` leaves the prior text/color/callback untouched; actions and fields
/// are always replaced. The chat platform distinguishes replace-updates from
/// new messages, so the original message object is carried through rather
/// than rebuilt.
pub fn render_update(
    original: &Message,
    text: Option<&str>,
    color: Option<&str>,
    actions: Vec<AttachmentAction>,
    fields: Vec<Field>,
    callback: Option<&CallbackToken>,
) -> Result<Message, BotError> {
    let mut message = original.clone();
    let attachment = message.attachments.first_mut().ok_or_else(|| {
        BotError::MalformedPayload("original message has no attachment".to_string())
    })?;

    if let Some(text) = text {
        attachment.text = Some(text.to_string());
    }
    if let Some(color) = color {
        attachment.color = Some(color.to_string());
    }
    if let Some(callback) = callback {
        attachment.callback_id = Some(callback.encode());
    }
    attachment.actions = actions;
    attachment.fields = fields;
    message.replace_original = true;

    Ok(message)
}

/// Initial cluster-selection menu, posted as a new message
pub fn cluster_menu(clusters: &[String]) -> Attachment {
    let options = clusters
        .iter()
        .map(|c| OptionItem {
            text: c.clone(),
            value: c.clone(),
        })
        .collect();

    Attachment {
        text: Some("Choose ECS Cluster".to_string()),
        color: Some(COLOR_PROMPT.to_string()),
        callback_id: Some(CallbackToken::Start.encode()),
        actions: vec![AttachmentAction::select("clusters", options), cancel_button()],
        ..Default::default()
    }
}

/// Service-selection menu, carrying the chosen cluster in the callback token
pub fn service_menu(
    original: &Message,
    cluster: &str,
    services: &[String],
) -> Result<Message, BotError> {
    let options = services
        .iter()
        .map(|s| OptionItem {
            text: s.clone(),
            value: s.clone(),
        })
        .collect();

    render_update(
        original,
        Some(&format!("Choose ECS Service in {}", cluster)),
        None,
        vec![AttachmentAction::select("services", options), cancel_button()],
        vec![],
        Some(&CallbackToken::Cluster(cluster.to_string())),
    )
}

/// Revision-selection menu; option values carry the deploy target
pub fn revision_menu(original: &Message, options: Vec<OptionItem>) -> Result<Message, BotError> {
    render_update(
        original,
        Some("Choose image tag (commit hash)"),
        None,
        vec![AttachmentAction::select("imgTags", options), cancel_button()],
        vec![],
        None,
    )
}

/// Final confirmation with Start/Cancel, deploy target passed through unchanged
pub fn confirmation(original: &Message, target: &DeployTarget) -> Result<Message, BotError> {
    render_update(
        original,
        Some(&format!("Deploy {}?", target.revision_id)),
        None,
        vec![
            AttachmentAction::button("taskStart", "Start", "primary", Some(target.encode())),
            cancel_button(),
        ],
        vec![],
        None,
    )
}

/// Terminal cancellation message naming the user, no residual controls
pub fn cancelled(original: &Message, user_name: &str) -> Result<Message, BotError> {
    render_update(
        original,
        None,
        Some(COLOR_CANCELLED),
        vec![],
        vec![Field {
            title: format!("@{} canceled.", user_name),
            value: String::new(),
            short: false,
        }],
        None,
    )
}

/// Terminal deploy-started message naming the user
pub fn started(original: &Message, user_name: &str) -> Result<Message, BotError> {
    render_update(
        original,
        None,
        Some(COLOR_STARTED),
        vec![],
        vec![Field {
            title: format!("@{} started deploy.", user_name),
            value: String::new(),
            short: false,
        }],
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_token_round_trip() {
        let token = CallbackToken::Cluster("prod-cluster".to_string());
        let parsed = CallbackToken::parse(&token.encode()).unwrap();
        assert_eq!(parsed, token);
        assert_eq!(parsed.cluster().unwrap(), "prod-cluster");

        assert_eq!(
            CallbackToken::parse(&CallbackToken::Start.encode()).unwrap(),
            CallbackToken::Start
        );
    }

    #[test]
    fn test_callback_token_rejects_unmarked() {
        assert!(CallbackToken::parse("prod-cluster").is_err());
        assert!(CallbackToken::parse("").is_err());
        assert!(CallbackToken::parse("deploy-v1/").is_err());
    }

    #[test]
    fn test_deploy_target_round_trip() {
        let target = DeployTarget {
            revision_id: "prod-api:14".to_string(),
            service: "api".to_string(),
        };
        assert_eq!(target.encode(), "prod-api:14/api");
        assert_eq!(DeployTarget::parse(&target.encode()).unwrap(), target);
    }

    #[test]
    fn test_deploy_target_rejects_ambiguity() {
        assert!(DeployTarget::parse("no-delimiter").is_err());
        assert!(DeployTarget::parse("a/b/c").is_err());
        assert!(DeployTarget::parse("/svc").is_err());
        assert!(DeployTarget::parse("rev/").is_err());
    }

    #[test]
    fn test_action_names() {
        assert_eq!(Action::from("clusters"), Action::Clusters);
        assert_eq!(Action::from("services"), Action::Services);
        assert_eq!(Action::from("imgTags"), Action::ImgTags);
        assert_eq!(Action::from("taskStart"), Action::TaskStart);
        assert_eq!(Action::from("cancel"), Action::Cancel);
        assert_eq!(Action::from("anything-else"), Action::Unrecognized);
    }

    #[test]
    fn test_render_update_requires_attachment() {
        let empty = Message::default();
        assert!(render_update(&empty, None, None, vec![], vec![], None).is_err());
    }
}
