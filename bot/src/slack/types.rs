//! Slack message model
//!
//! Just enough of the legacy interactive-attachment surface: a message with
//! attachments, select menus and buttons on an attachment, and the
//! interaction callback Slack posts back when a control is triggered.

use serde::{Deserialize, Serialize};

/// A chat message, either outbound or the original being updated in place
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Replace-in-place semantics for interaction responses
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replace_original: bool,
}

/// A message attachment carrying the interactive controls
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<AttachmentAction>,
}

/// A selectable control on an attachment: a menu or a button
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachmentAction {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionItem>,
}

impl AttachmentAction {
    /// A select menu named `name` over the given options
    pub fn select(name: &str, options: Vec<OptionItem>) -> Self {
        Self {
            name: name.to_string(),
            kind: "select".to_string(),
            options,
            ..Default::default()
        }
    }

    /// A button named `name` with an optional carried value
    pub fn button(name: &str, text: &str, style: &str, value: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            kind: "button".to_string(),
            text: Some(text.to_string()),
            style: Some(style.to_string()),
            value,
            ..Default::default()
        }
    }
}

/// One entry in a select menu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionItem {
    pub text: String,
    pub value: String,
}

/// A plain text field on an attachment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

/// The user who triggered an interaction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// One triggered action inside an interaction callback
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomingAction {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub value: Option<String>,

    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
}

/// A selected option inside a triggered select action
#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOption {
    pub value: String,
}

/// Interaction callback payload posted by Slack
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionCallback {
    #[serde(default)]
    pub actions: Vec<IncomingAction>,

    #[serde(default)]
    pub callback_id: String,

    #[serde(default)]
    pub user: User,

    #[serde(default)]
    pub original_message: Message,
}

/// Outer Events API envelope
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub token: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub challenge: Option<String>,

    #[serde(default)]
    pub event: Option<InnerEvent>,
}

/// Inner event of an `event_callback` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct InnerEvent {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub channel: String,
}
