//! Revision catalog
//!
//! Derives the ordered list of deployable revisions for a service, and owns
//! the naming policy that maps a cluster + service pair onto a task
//! definition family. Raw control plane access stays in `control_plane`;
//! swapping the naming scheme touches only this module.

use futures::future::try_join_all;

use crate::control_plane::ControlPlane;
use crate::errors::BotError;

/// Cluster names end with this suffix; the part before it is the environment
/// prefix shared by the cluster's task definition families.
const CLUSTER_SUFFIX: &str = "-cluster";

/// One immutable task definition revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    /// Task definition family name
    pub family: String,

    /// Revision number, unique within the family
    pub number: u32,

    /// Image tag of the primary container, conventionally a commit hash
    pub content_tag: String,
}

impl Revision {
    /// Full revision identifier, `family:number`
    pub fn identifier(&self) -> String {
        format!("{}:{}", self.family, self.number)
    }

    /// Build a revision from its identifier and primary container image
    fn from_parts(id: &str, image: &str) -> Result<Self, BotError> {
        let (family, number) = id.rsplit_once(':').ok_or_else(|| {
            BotError::ControlPlaneError(format!("task definition id has no revision: {}", id))
        })?;
        let number: u32 = number.parse().map_err(|_| {
            BotError::ControlPlaneError(format!("revision is not numeric: {}", id))
        })?;
        let (_, content_tag) = image.rsplit_once(':').ok_or_else(|| {
            BotError::ControlPlaneError(format!("container image has no tag: {}", image))
        })?;

        Ok(Self {
            family: family.to_string(),
            number,
            content_tag: content_tag.to_string(),
        })
    }
}

/// Derive the task definition family for a service
///
/// `prod-cluster` + `api` becomes `prod-api`. A cluster name without the
/// expected suffix means the callback context is not one this bot produced.
pub fn task_family(cluster: &str, service: &str) -> Result<String, BotError> {
    match cluster.strip_suffix(CLUSTER_SUFFIX) {
        Some(prefix) if !prefix.is_empty() => Ok(format!("{}-{}", prefix, service)),
        _ => Err(BotError::InvalidState(format!(
            "cluster name {:?} lacks the {} suffix",
            cluster, CLUSTER_SUFFIX
        ))),
    }
}

/// Catalog of deployable revisions for one control plane
pub struct RevisionCatalog<'a, C: ControlPlane + ?Sized> {
    control_plane: &'a C,
}

impl<'a, C: ControlPlane + ?Sized> RevisionCatalog<'a, C> {
    pub fn new(control_plane: &'a C) -> Self {
        Self { control_plane }
    }

    /// List revisions for a family prefix, most recent first
    ///
    /// Describes run concurrently but assemble all-or-nothing: any failed
    /// lookup fails the whole list. Ordering is strictly descending by
    /// numeric revision number; the string form is never compared.
    pub async fn revisions(&self, family_prefix: &str) -> Result<Vec<Revision>, BotError> {
        let ids = self.control_plane.list_task_definitions(family_prefix).await?;

        let described = try_join_all(
            ids.iter()
                .map(|id| self.control_plane.describe_task_definition(id)),
        )
        .await?;

        let mut revisions = ids
            .iter()
            .zip(described.iter())
            .map(|(id, def)| Revision::from_parts(id, &def.image))
            .collect::<Result<Vec<_>, _>>()?;

        revisions.sort_by(|a, b| b.number.cmp(&a.number));
        Ok(revisions)
    }
}
