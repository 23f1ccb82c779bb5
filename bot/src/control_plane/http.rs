//! HTTP implementation of the control plane client

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error};

use crate::control_plane::{strip_resource_prefix, ControlPlane, Instance, TaskDefinition};
use crate::errors::BotError;

/// HTTP client for the control plane API
pub struct HttpControlPlane {
    client: Client,
    base_url: String,
    api_token: String,
}

impl HttpControlPlane {
    /// Create a new control plane client
    pub fn new(base_url: &str, api_token: &str) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        })
    }

    /// Make a GET request
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BotError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("control plane GET failed: {} - {}", status, body);
            return Err(BotError::ControlPlaneError(format!("{}: {}", status, body)));
        }

        let body = response.json().await?;
        Ok(body)
    }

    /// Make a POST request
    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BotError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_token))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("control plane POST failed: {} - {}", status, body);
            return Err(BotError::ControlPlaneError(format!("{}: {}", status, body)));
        }

        let body = response.json().await?;
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterListResponse {
    cluster_arns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceListResponse {
    service_arns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDefinitionListResponse {
    task_definition_arns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeTaskDefinitionResponse {
    task_definition: TaskDefinition,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateServiceRequest<'a> {
    task_definition: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceListResponse {
    instances: Vec<Instance>,
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn list_clusters(&self) -> Result<Vec<String>, BotError> {
        let response: ClusterListResponse = self.get("/clusters").await?;
        response
            .cluster_arns
            .iter()
            .map(|arn| strip_resource_prefix(arn))
            .collect()
    }

    async fn list_services(&self, cluster: &str) -> Result<Vec<String>, BotError> {
        let path = format!("/clusters/{}/services", cluster);
        let response: ServiceListResponse = self.get(&path).await?;
        response
            .service_arns
            .iter()
            .map(|arn| strip_resource_prefix(arn))
            .collect()
    }

    async fn list_task_definitions(&self, family_prefix: &str) -> Result<Vec<String>, BotError> {
        let path = format!("/task-definitions?familyPrefix={}", family_prefix);
        let response: TaskDefinitionListResponse = self.get(&path).await?;
        response
            .task_definition_arns
            .iter()
            .map(|arn| strip_resource_prefix(arn))
            .collect()
    }

    async fn describe_task_definition(&self, id: &str) -> Result<TaskDefinition, BotError> {
        let path = format!("/task-definitions/{}", id);
        let response: DescribeTaskDefinitionResponse = self.get(&path).await?;
        Ok(response.task_definition)
    }

    async fn update_service(
        &self,
        cluster: &str,
        service: &str,
        task_definition: &str,
    ) -> Result<(), BotError> {
        let path = format!("/clusters/{}/services/{}/update", cluster, service);
        let _: serde_json::Value = self
            .post(&path, &UpdateServiceRequest { task_definition })
            .await?;
        debug!(
            "service update triggered: {}/{} -> {}",
            cluster, service, task_definition
        );
        Ok(())
    }

    async fn list_instances(&self) -> Result<Vec<Instance>, BotError> {
        let response: InstanceListResponse = self.get("/instances?state=running").await?;
        Ok(response.instances)
    }
}
