//! Orchestration control plane access
//!
//! Everything the bot knows about the cluster comes through the
//! [`ControlPlane`] trait, queried fresh on every invocation. Nothing is
//! cached across requests.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::BotError;

/// A running compute instance, as reported by the fleet inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    /// Instance name tag
    pub name: String,

    /// Instance identifier
    pub instance_id: String,
}

/// One task definition revision, as described by the control plane
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    /// Primary container image reference, e.g. `repo/app:abc1234`
    pub image: String,
}

/// Control plane operations consumed by the bot
///
/// All listing operations are idempotent; `update_service` is the single
/// mutating trigger and is fire-and-forget (no completion polling).
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// List bare cluster names
    async fn list_clusters(&self) -> Result<Vec<String>, BotError>;

    /// List bare service names within a cluster
    async fn list_services(&self, cluster: &str) -> Result<Vec<String>, BotError>;

    /// List task definition identifiers (`family:revision`) matching a family prefix
    async fn list_task_definitions(&self, family_prefix: &str) -> Result<Vec<String>, BotError>;

    /// Describe a single task definition revision
    async fn describe_task_definition(&self, id: &str) -> Result<TaskDefinition, BotError>;

    /// Point a service at a task definition revision
    async fn update_service(
        &self,
        cluster: &str,
        service: &str,
        task_definition: &str,
    ) -> Result<(), BotError>;

    /// List running compute instances
    async fn list_instances(&self) -> Result<Vec<Instance>, BotError>;
}

/// Strip one resource-path prefix segment from an ARN-style identifier
///
/// `arn:aws:ecs:region:acct:cluster/foo` becomes `foo`. Identifiers without
/// a path segment are rejected rather than passed through.
pub fn strip_resource_prefix(arn: &str) -> Result<String, BotError> {
    match arn.split_once('/') {
        Some((_, name)) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(BotError::ControlPlaneError(format!(
            "resource identifier has no path segment: {}",
            arn
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_resource_prefix() {
        let name = strip_resource_prefix("arn:aws:ecs:ap-northeast-1:123:cluster/prod-cluster")
            .unwrap();
        assert_eq!(name, "prod-cluster");
    }

    #[test]
    fn test_strip_keeps_remaining_segments() {
        let name = strip_resource_prefix("arn:aws:ecs:ap-northeast-1:123:task-definition/prod-api:14")
            .unwrap();
        assert_eq!(name, "prod-api:14");
    }

    #[test]
    fn test_strip_rejects_bare_identifier() {
        assert!(strip_resource_prefix("no-path-here").is_err());
        assert!(strip_resource_prefix("trailing/").is_err());
    }
}
