//! The Network trait and the provisioning steps shared by its implementations.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use kubegeth_cluster::{ClusterApi, ClusterApiExt, CreateOutcome, DeleteOutcome, Manifest, ResourceKind};
use kubegeth_core::ChecksummedAddress;
use tracing::{info, warn};

use crate::config::NetworkSettings;
use crate::error::{Action, ProvisionError, Result, Step};
use crate::light::LightClient;
use crate::private::PrivateNetwork;

/// Longest name a namespace may have.
pub const MAX_NAME_LEN: usize = 63;

/// A set of cluster objects that is created and deleted as a unit.
///
/// The network name is also the namespace holding every object, so deleting
/// the namespace deletes the network.
#[async_trait]
pub trait Network: Send + Sync {
    fn name(&self) -> &str;

    fn variant(&self) -> Variant;

    /// Create every missing object in order. Objects that already exist are
    /// left as they are. Stops at the first failing step without undoing
    /// earlier ones.
    async fn create(&self) -> Result<ProvisionReport>;

    /// Delete the network. Succeeds if it does not exist.
    async fn delete(&self) -> Result<ProvisionReport>;
}

/// Which kind of network to provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// A private clique network with a signer node.
    Full,
    /// A light client, with no accounts or genesis of its own.
    Light,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Full => f.write_str("private network"),
            Variant::Light => f.write_str("light client"),
        }
    }
}

/// How a single step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Created,
    AlreadyExisted,
    Deleted,
    AlreadyAbsent,
}

impl From<CreateOutcome> for StepOutcome {
    fn from(outcome: CreateOutcome) -> Self {
        match outcome {
            CreateOutcome::Created => StepOutcome::Created,
            CreateOutcome::AlreadyExists => StepOutcome::AlreadyExisted,
        }
    }
}

impl From<DeleteOutcome> for StepOutcome {
    fn from(outcome: DeleteOutcome) -> Self {
        match outcome {
            DeleteOutcome::Deleted => StepOutcome::Deleted,
            DeleteOutcome::NotFound => StepOutcome::AlreadyAbsent,
        }
    }
}

/// One step of a run: which object, and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub kind: ResourceKind,
    pub name: String,
    pub outcome: StepOutcome,
}

/// What a create or delete run did, step by step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub network: String,
    pub action: Action,
    pub steps: Vec<StepRecord>,
    /// Accounts generated by this run, signer first. Empty for deletes and
    /// light clients.
    pub accounts: Vec<ChecksummedAddress>,
}

impl ProvisionReport {
    pub fn new(network: impl Into<String>, action: Action) -> Self {
        Self {
            network: network.into(),
            action,
            steps: Vec::new(),
            accounts: Vec::new(),
        }
    }

    /// Number of steps that changed the cluster.
    pub fn changed(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Created | StepOutcome::Deleted))
            .count()
    }

    pub fn outcome_of(&self, kind: ResourceKind) -> Option<StepOutcome> {
        self.steps.iter().find(|s| s.kind == kind).map(|s| s.outcome)
    }
}

/// Check that `name` is usable as a namespace (a DNS-1123 label).
pub fn validate_name(name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    let valid = !bytes.is_empty()
        && bytes.len() <= MAX_NAME_LEN
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        && bytes[0].is_ascii_alphanumeric()
        && bytes[bytes.len() - 1].is_ascii_alphanumeric();

    if valid {
        Ok(())
    } else {
        Err(ProvisionError::InvalidName(name.to_string()))
    }
}

/// Build the network of the requested variant on `cluster`.
pub fn network_for<C>(
    variant: Variant,
    name: &str,
    cluster: Arc<C>,
    settings: NetworkSettings,
) -> Result<Box<dyn Network>>
where
    C: ClusterApi + ?Sized + 'static,
{
    let network: Box<dyn Network> = match variant {
        Variant::Full => Box::new(PrivateNetwork::new(name, cluster, settings)?),
        Variant::Light => Box::new(LightClient::new(name, cluster, settings.geth_image)?),
    };
    Ok(network)
}

/// Create one object, recording the outcome in `report`.
///
/// Any failure other than "already exists" is logged and returned tagged with
/// the step.
pub(crate) async fn create_step<C>(
    cluster: &C,
    report: &mut ProvisionReport,
    kind: ResourceKind,
    manifest: &Manifest,
) -> Result<()>
where
    C: ClusterApi + ?Sized,
{
    let namespace = report.network.clone();
    let name = manifest.name().unwrap_or_default().to_string();

    match cluster.ensure_created(kind, &namespace, manifest).await {
        Ok(outcome) => {
            if outcome == CreateOutcome::Created {
                info!(network = %namespace, %kind, name = %name, "created");
            }
            report.steps.push(StepRecord {
                kind,
                name,
                outcome: outcome.into(),
            });
            Ok(())
        }
        Err(source) => {
            warn!(network = %namespace, %kind, name = %name, error = %source, "create failed");
            Err(ProvisionError::Cluster {
                step: Step {
                    action: Action::Create,
                    kind,
                    name,
                },
                source,
            })
        }
    }
}

/// Delete the namespace named after the network.
pub(crate) async fn delete_namespace<C>(cluster: &C, network: &str) -> Result<ProvisionReport>
where
    C: ClusterApi + ?Sized,
{
    let mut report = ProvisionReport::new(network, Action::Delete);

    match cluster.ensure_namespace_deleted(network).await {
        Ok(outcome) => {
            if outcome == DeleteOutcome::Deleted {
                info!(network, "deleted namespace");
            }
            report.steps.push(StepRecord {
                kind: ResourceKind::Namespace,
                name: network.to_string(),
                outcome: outcome.into(),
            });
            Ok(report)
        }
        Err(source) => {
            warn!(network, error = %source, "delete failed");
            Err(ProvisionError::Cluster {
                step: Step {
                    action: Action::Delete,
                    kind: ResourceKind::Namespace,
                    name: network.to_string(),
                },
                source,
            })
        }
    }
}
