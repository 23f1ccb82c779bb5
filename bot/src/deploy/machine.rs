//! Deployment workflow state machine
//!
//! There is no session store. Each inbound interaction is resolved entirely
//! from the tokens the previous outbound message carried, so invocations are
//! independent and may interleave freely across workflow instances.

use tracing::{debug, info};

use crate::control_plane::ControlPlane;
use crate::deploy::catalog::{task_family, RevisionCatalog};
use crate::errors::BotError;
use crate::slack::codec;
use crate::slack::codec::{Action, CallbackToken, DeployTarget};
use crate::slack::types::{Attachment, InteractionCallback, Message, OptionItem};

/// Where in the fixed four-step flow an interaction sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    ClusterSelection,
    ServiceSelection,
    RevisionSelection,
    Confirmation,
    Cancelled,
    Started,
}

impl WorkflowStep {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStep::Cancelled | WorkflowStep::Started)
    }
}

/// The step reached by an interaction and the message replacing the original
#[derive(Debug)]
pub struct StepOutcome {
    pub step: WorkflowStep,
    pub message: Message,
}

/// Drives the deployment flow against one control plane
pub struct WorkflowMachine<'a, C: ControlPlane + ?Sized> {
    control_plane: &'a C,
}

impl<'a, C: ControlPlane + ?Sized> WorkflowMachine<'a, C> {
    pub fn new(control_plane: &'a C) -> Self {
        Self { control_plane }
    }

    /// Start a flow: the cluster-selection menu for a new message
    pub async fn begin(&self) -> Result<Attachment, BotError> {
        let clusters = self.control_plane.list_clusters().await?;
        Ok(codec::cluster_menu(&clusters))
    }

    /// Advance the flow by one inbound interaction
    ///
    /// `None` means the action was unrecognized: the caller acknowledges with
    /// an empty response and nothing changes.
    pub async fn handle(
        &self,
        callback: &InteractionCallback,
    ) -> Result<Option<StepOutcome>, BotError> {
        let (action, incoming) = codec::triggered_action(callback)?;
        debug!("interaction action {:?} from @{}", incoming.name, callback.user.name);

        let outcome = match action {
            Action::Cancel => StepOutcome {
                step: WorkflowStep::Cancelled,
                message: codec::cancelled(&callback.original_message, &callback.user.name)?,
            },

            Action::Clusters => {
                let cluster = codec::selected_value(incoming)?;
                let services = self.control_plane.list_services(cluster).await?;
                StepOutcome {
                    step: WorkflowStep::ServiceSelection,
                    message: codec::service_menu(&callback.original_message, cluster, &services)?,
                }
            }

            Action::Services => {
                // Token check comes first: a missing cluster marker must not
                // cost a control plane round trip.
                let token = CallbackToken::parse(&callback.callback_id)?;
                let cluster = token.cluster()?;
                let service = codec::selected_value(incoming)?;
                let family = task_family(cluster, service)?;

                let revisions = RevisionCatalog::new(self.control_plane)
                    .revisions(&family)
                    .await?;
                let options = revisions
                    .iter()
                    .map(|rev| OptionItem {
                        text: format!("{} | {}", rev.identifier(), rev.content_tag),
                        value: DeployTarget {
                            revision_id: rev.identifier(),
                            service: service.to_string(),
                        }
                        .encode(),
                    })
                    .collect();

                StepOutcome {
                    step: WorkflowStep::RevisionSelection,
                    message: codec::revision_menu(&callback.original_message, options)?,
                }
            }

            Action::ImgTags => {
                let target = DeployTarget::parse(codec::selected_value(incoming)?)?;
                StepOutcome {
                    step: WorkflowStep::Confirmation,
                    message: codec::confirmation(&callback.original_message, &target)?,
                }
            }

            Action::TaskStart => {
                let token = CallbackToken::parse(&callback.callback_id)?;
                let cluster = token.cluster()?;
                let target = DeployTarget::parse(codec::button_value(incoming)?)?;

                self.control_plane
                    .update_service(cluster, &target.service, &target.revision_id)
                    .await?;
                info!(
                    "@{} started deploy of {} to {}/{}",
                    callback.user.name, target.revision_id, cluster, target.service
                );

                StepOutcome {
                    step: WorkflowStep::Started,
                    message: codec::started(&callback.original_message, &callback.user.name)?,
                }
            }

            Action::Unrecognized => return Ok(None),
        };

        Ok(Some(outcome))
    }
}
