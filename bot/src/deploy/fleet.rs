//! Fleet inventory listing and usage text
//!
//! The one-argument mention path: filter running instances by name prefix
//! and post a flat, non-interactive listing. No workflow state involved.

use crate::control_plane::Instance;
use crate::slack::codec::COLOR_STARTED;
use crate::slack::types::{Attachment, Field};

/// Filter instances by name prefix, sorted lexically by name
pub fn filter_instances(mut instances: Vec<Instance>, prefix: &str) -> Vec<Instance> {
    instances.retain(|i| i.name.starts_with(prefix));
    instances.sort_by(|a, b| a.name.cmp(&b.name));
    instances
}

/// Non-interactive listing attachment; zero matches means zero fields
pub fn instance_list(instances: &[Instance], region: &str) -> Attachment {
    let fields = instances
        .iter()
        .map(|i| Field {
            title: i.name.clone(),
            value: i.instance_id.clone(),
            short: false,
        })
        .collect();

    Attachment {
        pretext: Some(format!("*Instance ID List in {}*", region)),
        color: Some(COLOR_STARTED.to_string()),
        fields,
        ..Default::default()
    }
}

/// Static usage text for `help` or unrecognized argument counts
pub fn usage_text() -> String {
    [
        "```",
        "# Usage",
        "@<bot-user-name> : ECS deploy interactive menu",
        "@<bot-user-name> <instance name prefix> : Return instance Ids",
        "```",
        "",
    ]
    .join("\n")
}
