//! ClusterApi trait: the narrow interface to the cluster control plane.
//!
//! Implementations report every failure, including "already exists" and
//! "not found". Deciding which of those count as success is the job of
//! [`ClusterApiExt`].

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::resource::{Manifest, ResourceKind};

/// Result of an idempotent create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The object was created by this call.
    Created,
    /// The object was already there (not an error).
    AlreadyExists,
}

/// Result of an idempotent delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The object was deleted by this call.
    Deleted,
    /// There was nothing to delete (not an error).
    NotFound,
}

/// The cluster control-plane operations used for provisioning.
///
/// Every call is scoped to a namespace, which is also the network name.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Create a cluster-scoped namespace named by `metadata.name`.
    async fn create_namespace(&self, manifest: &Manifest) -> Result<()>;

    /// Delete a namespace and, by cascade, everything in it.
    async fn delete_namespace(&self, name: &str) -> Result<()>;

    /// Create a secret in `namespace`.
    async fn create_secret(&self, namespace: &str, manifest: &Manifest) -> Result<()>;

    /// Create a config object (a ConfigMap).
    async fn create_config(&self, namespace: &str, manifest: &Manifest) -> Result<()>;

    /// Create a service in `namespace`.
    async fn create_service(&self, namespace: &str, manifest: &Manifest) -> Result<()>;

    /// Create a deployment (`apps/v1`) in `namespace`.
    async fn create_deployment(&self, namespace: &str, manifest: &Manifest) -> Result<()>;
}

/// Idempotent create and delete on top of [`ClusterApi`].
pub trait ClusterApiExt: ClusterApi {
    /// Create `manifest` as a `kind` in `namespace`, treating
    /// `409 AlreadyExists` as success. Every other error is returned as is.
    fn ensure_created(
        &self,
        kind: ResourceKind,
        namespace: &str,
        manifest: &Manifest,
    ) -> impl std::future::Future<Output = Result<CreateOutcome>> + Send;

    /// Delete a namespace, treating `404` as success.
    fn ensure_namespace_deleted(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<DeleteOutcome>> + Send;
}

impl<C: ClusterApi + ?Sized> ClusterApiExt for C {
    async fn ensure_created(
        &self,
        kind: ResourceKind,
        namespace: &str,
        manifest: &Manifest,
    ) -> Result<CreateOutcome> {
        let result = match kind {
            ResourceKind::Namespace => self.create_namespace(manifest).await,
            ResourceKind::Secret => self.create_secret(namespace, manifest).await,
            ResourceKind::ConfigMap => self.create_config(namespace, manifest).await,
            ResourceKind::Service => self.create_service(namespace, manifest).await,
            ResourceKind::Deployment => self.create_deployment(namespace, manifest).await,
        };

        match result {
            Ok(()) => Ok(CreateOutcome::Created),
            Err(e) if e.is_already_exists() => {
                debug!(%kind, namespace, name = manifest.name(), "already exists");
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }

    async fn ensure_namespace_deleted(&self, name: &str) -> Result<DeleteOutcome> {
        match self.delete_namespace(name).await {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(e) if e.is_not_found() => {
                debug!(namespace = name, "namespace already absent");
                Ok(DeleteOutcome::NotFound)
            }
            Err(e) => Err(e),
        }
    }
}
