//! Workflow tests against a recording fake control plane

use std::sync::Mutex;

use async_trait::async_trait;

use shipbot::control_plane::{ControlPlane, Instance, TaskDefinition};
use shipbot::deploy::catalog::RevisionCatalog;
use shipbot::deploy::machine::{WorkflowMachine, WorkflowStep};
use shipbot::errors::BotError;
use shipbot::slack::codec;
use shipbot::slack::types::{
    Attachment, IncomingAction, InteractionCallback, Message, SelectedOption, User,
};

/// Fake control plane recording every call
#[derive(Default)]
struct FakeControlPlane {
    clusters: Vec<String>,
    services: Vec<String>,
    // (identifier, image) pairs, deliberately unordered
    task_definitions: Vec<(String, String)>,
    calls: Mutex<Vec<String>>,
    updates: Mutex<Vec<(String, String, String)>>,
}

impl FakeControlPlane {
    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn list_clusters(&self) -> Result<Vec<String>, BotError> {
        self.record("list_clusters");
        Ok(self.clusters.clone())
    }

    async fn list_services(&self, _cluster: &str) -> Result<Vec<String>, BotError> {
        self.record("list_services");
        Ok(self.services.clone())
    }

    async fn list_task_definitions(&self, family_prefix: &str) -> Result<Vec<String>, BotError> {
        self.record("list_task_definitions");
        Ok(self
            .task_definitions
            .iter()
            .filter(|(id, _)| id.starts_with(family_prefix))
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn describe_task_definition(&self, id: &str) -> Result<TaskDefinition, BotError> {
        self.record("describe_task_definition");
        self.task_definitions
            .iter()
            .find(|(known, _)| known == id)
            .map(|(_, image)| TaskDefinition {
                image: image.clone(),
            })
            .ok_or_else(|| BotError::ControlPlaneError(format!("unknown task definition {}", id)))
    }

    async fn update_service(
        &self,
        cluster: &str,
        service: &str,
        task_definition: &str,
    ) -> Result<(), BotError> {
        self.record("update_service");
        self.updates.lock().unwrap().push((
            cluster.to_string(),
            service.to_string(),
            task_definition.to_string(),
        ));
        Ok(())
    }

    async fn list_instances(&self) -> Result<Vec<Instance>, BotError> {
        self.record("list_instances");
        Ok(vec![])
    }
}

fn fake() -> FakeControlPlane {
    FakeControlPlane {
        clusters: vec!["prod-cluster".to_string(), "stg-cluster".to_string()],
        services: vec!["api".to_string(), "worker".to_string()],
        task_definitions: vec![
            ("prod-api:9".to_string(), "repo/api:aaa1111".to_string()),
            ("prod-api:10".to_string(), "repo/api:bbb2222".to_string()),
            ("prod-api:7".to_string(), "repo/api:ccc3333".to_string()),
        ],
        ..Default::default()
    }
}

fn callback(
    action_name: &str,
    selected: Option<&str>,
    button_value: Option<&str>,
    callback_id: &str,
    original: Message,
) -> InteractionCallback {
    InteractionCallback {
        actions: vec![IncomingAction {
            name: action_name.to_string(),
            value: button_value.map(|v| v.to_string()),
            selected_options: selected
                .map(|v| {
                    vec![SelectedOption {
                        value: v.to_string(),
                    }]
                })
                .unwrap_or_default(),
        }],
        callback_id: callback_id.to_string(),
        user: User {
            id: "U123".to_string(),
            name: "mipsytipsy".to_string(),
        },
        original_message: original,
    }
}

fn message_with(attachment: Attachment) -> Message {
    Message {
        attachments: vec![attachment],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_revision_order_is_numeric_descending() {
    let plane = fake();
    let catalog = RevisionCatalog::new(&plane);

    let revisions = catalog.revisions("prod-api").await.unwrap();
    let numbers: Vec<u32> = revisions.iter().map(|r| r.number).collect();
    // "9" would sort before "10" lexically; numerically it must not
    assert_eq!(numbers, vec![10, 9, 7]);
    assert_eq!(revisions[0].content_tag, "bbb2222");
}

#[tokio::test]
async fn test_full_deploy_sequence_updates_service_once() {
    let plane = fake();
    let machine = WorkflowMachine::new(&plane);

    // Mention with no arguments: cluster menu
    let menu = machine.begin().await.unwrap();
    assert_eq!(menu.callback_id.as_deref(), Some("deploy-v1"));
    assert_eq!(menu.actions[0].name, "clusters");
    let message = message_with(menu);

    // Cluster chosen
    let outcome = machine
        .handle(&callback(
            "clusters",
            Some("prod-cluster"),
            None,
            "deploy-v1",
            message,
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome.step, WorkflowStep::ServiceSelection);
    let attachment = &outcome.message.attachments[0];
    assert_eq!(attachment.callback_id.as_deref(), Some("deploy-v1/prod-cluster"));
    assert_eq!(attachment.text.as_deref(), Some("Choose ECS Service in prod-cluster"));
    let message = outcome.message;

    // Service chosen
    let outcome = machine
        .handle(&callback(
            "services",
            Some("api"),
            None,
            "deploy-v1/prod-cluster",
            message,
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome.step, WorkflowStep::RevisionSelection);
    let options = &outcome.message.attachments[0].actions[0].options;
    assert_eq!(options[0].value, "prod-api:10/api");
    assert_eq!(options[0].text, "prod-api:10 | bbb2222");
    let message = outcome.message;

    // Revision chosen
    let outcome = machine
        .handle(&callback(
            "imgTags",
            Some("prod-api:7/api"),
            None,
            "deploy-v1/prod-cluster",
            message,
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome.step, WorkflowStep::Confirmation);
    let attachment = &outcome.message.attachments[0];
    assert_eq!(attachment.text.as_deref(), Some("Deploy prod-api:7?"));
    let start = &attachment.actions[0];
    assert_eq!(start.name, "taskStart");
    assert_eq!(start.value.as_deref(), Some("prod-api:7/api"));
    let message = outcome.message;

    // Confirmed
    let outcome = machine
        .handle(&callback(
            "taskStart",
            None,
            Some("prod-api:7/api"),
            "deploy-v1/prod-cluster",
            message,
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome.step, WorkflowStep::Started);
    assert!(outcome.step.is_terminal());
    assert!(outcome.message.attachments[0].actions.is_empty());
    assert_eq!(
        outcome.message.attachments[0].fields[0].title,
        "@mipsytipsy started deploy."
    );

    let updates = plane.updates.lock().unwrap();
    assert_eq!(
        *updates,
        vec![(
            "prod-cluster".to_string(),
            "api".to_string(),
            "prod-api:7".to_string()
        )]
    );
}

#[tokio::test]
async fn test_cancel_from_every_step_clears_controls() {
    let plane = fake();
    let machine = WorkflowMachine::new(&plane);

    let steps = [
        message_with(codec::cluster_menu(&plane.clusters)),
        message_with(Attachment {
            text: Some("Choose ECS Service in prod-cluster".to_string()),
            callback_id: Some("deploy-v1/prod-cluster".to_string()),
            ..Default::default()
        }),
        message_with(Attachment {
            text: Some("Choose image tag (commit hash)".to_string()),
            callback_id: Some("deploy-v1/prod-cluster".to_string()),
            ..Default::default()
        }),
        message_with(Attachment {
            text: Some("Deploy prod-api:7?".to_string()),
            callback_id: Some("deploy-v1/prod-cluster".to_string()),
            ..Default::default()
        }),
    ];

    for original in steps {
        let outcome = machine
            .handle(&callback("cancel", None, None, "deploy-v1", original))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.step, WorkflowStep::Cancelled);
        let attachment = &outcome.message.attachments[0];
        assert!(attachment.actions.is_empty());
        assert_eq!(attachment.fields[0].title, "@mipsytipsy canceled.");
        assert!(outcome.message.replace_original);
    }
}

#[tokio::test]
async fn test_services_without_cluster_marker_is_invalid_state() {
    let plane = fake();
    let machine = WorkflowMachine::new(&plane);

    // Callback identifier lacks the deploy-v1 marker
    let err = machine
        .handle(&callback(
            "services",
            Some("api"),
            None,
            "prod-cluster",
            message_with(Attachment::default()),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, BotError::InvalidState(_)));
    assert_eq!(plane.call_count(), 0);
}

#[tokio::test]
async fn test_unrecognized_action_is_a_no_op() {
    let plane = fake();
    let machine = WorkflowMachine::new(&plane);

    let outcome = machine
        .handle(&callback(
            "something-else",
            None,
            None,
            "deploy-v1",
            message_with(Attachment::default()),
        ))
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert_eq!(plane.call_count(), 0);
}

#[tokio::test]
async fn test_select_without_option_is_malformed() {
    let plane = fake();
    let machine = WorkflowMachine::new(&plane);

    let err = machine
        .handle(&callback(
            "clusters",
            None,
            None,
            "deploy-v1",
            message_with(Attachment::default()),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, BotError::MalformedPayload(_)));
}

#[test]
fn test_menu_round_trip_preserves_options() {
    let clusters = vec!["prod-cluster".to_string(), "stg-cluster".to_string()];
    let menu = codec::cluster_menu(&clusters);

    // Encode to the wire shape and back
    let json = serde_json::to_string(&message_with(menu)).unwrap();
    let decoded: Message = serde_json::from_str(&json).unwrap();

    let options = &decoded.attachments[0].actions[0].options;
    let values: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
    assert_eq!(values, vec!["prod-cluster", "stg-cluster"]);
    let labels: Vec<_> = options.iter().map(|o| o.text.as_str()).collect();
    assert_eq!(labels, vec!["prod-cluster", "stg-cluster"]);
}

#[test]
fn test_payload_parsing_round_trip() {
    let json = r##"{
        "actions": [{"name": "clusters", "selected_options": [{"value": "prod-cluster"}]}],
        "callback_id": "deploy-v1",
        "user": {"id": "U123", "name": "mipsytipsy"},
        "original_message": {"attachments": [{"text": "Choose ECS Cluster", "callback_id": "deploy-v1"}]}
    }"##;
    let body: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("payload", json)
        .finish();

    let parsed = codec::parse_payload(&body).unwrap();
    assert_eq!(parsed.callback_id, "deploy-v1");
    assert_eq!(parsed.user.name, "mipsytipsy");
    assert_eq!(parsed.actions[0].selected_options[0].value, "prod-cluster");

    let err = codec::parse_payload("unrelated=stuff").unwrap_err();
    assert!(matches!(err, BotError::MalformedPayload(_)));
}
