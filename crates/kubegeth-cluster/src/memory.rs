//! In-memory implementation of the ClusterApi trait.
//!
//! Mirrors the API server's answers for the calls provisioning makes:
//! `409 AlreadyExists` for a duplicate name, `404 NotFound` for a missing
//! namespace, and cascading delete of a namespace's contents.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{ClusterError, Result};
use crate::resource::{Manifest, ResourceKind};
use crate::traits::ClusterApi;

/// In-memory cluster.
///
/// All state is lost when dropped.
pub struct MemoryCluster {
    namespaces: RwLock<HashMap<String, NamespaceState>>,
}

struct NamespaceState {
    manifest: Manifest,
    objects: BTreeMap<(ResourceKind, String), Manifest>,
}

impl MemoryCluster {
    /// Create an empty cluster.
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    pub async fn has_namespace(&self, name: &str) -> bool {
        self.namespaces.read().await.contains_key(name)
    }

    /// All namespace names, sorted.
    pub async fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<_> = self.namespaces.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// The manifest a namespace was created with.
    pub async fn namespace_manifest(&self, name: &str) -> Option<Manifest> {
        self.namespaces
            .read()
            .await
            .get(name)
            .map(|ns| ns.manifest.clone())
    }

    /// Fetch one object.
    pub async fn get(&self, kind: ResourceKind, namespace: &str, name: &str) -> Option<Manifest> {
        self.namespaces
            .read()
            .await
            .get(namespace)?
            .objects
            .get(&(kind, name.to_string()))
            .cloned()
    }

    /// Every object in a namespace as `(kind, name)`, sorted by kind then name.
    pub async fn list(&self, namespace: &str) -> Vec<(ResourceKind, String)> {
        self.namespaces
            .read()
            .await
            .get(namespace)
            .map(|ns| ns.objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    async fn create_namespaced(
        &self,
        kind: ResourceKind,
        namespace: &str,
        manifest: &Manifest,
    ) -> Result<()> {
        let name = required_name(kind, manifest)?;
        let mut namespaces = self.namespaces.write().await;

        let ns = namespaces
            .get_mut(namespace)
            .ok_or_else(|| ClusterError::not_found(ResourceKind::Namespace, namespace))?;

        let key = (kind, name.to_string());
        if ns.objects.contains_key(&key) {
            return Err(ClusterError::already_exists(kind, name));
        }
        ns.objects.insert(key, manifest.clone());
        Ok(())
    }
}

impl Default for MemoryCluster {
    fn default() -> Self {
        Self::new()
    }
}

fn required_name(kind: ResourceKind, manifest: &Manifest) -> Result<&str> {
    manifest
        .name()
        .ok_or_else(|| ClusterError::api(422, "Invalid", format!("{kind}: metadata.name required")))
}

#[async_trait]
impl ClusterApi for MemoryCluster {
    async fn create_namespace(&self, manifest: &Manifest) -> Result<()> {
        let name = required_name(ResourceKind::Namespace, manifest)?;
        let mut namespaces = self.namespaces.write().await;

        if namespaces.contains_key(name) {
            return Err(ClusterError::already_exists(ResourceKind::Namespace, name));
        }
        namespaces.insert(
            name.to_string(),
            NamespaceState {
                manifest: manifest.clone(),
                objects: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        match self.namespaces.write().await.remove(name) {
            Some(_) => Ok(()),
            None => Err(ClusterError::not_found(ResourceKind::Namespace, name)),
        }
    }

    async fn create_secret(&self, namespace: &str, manifest: &Manifest) -> Result<()> {
        self.create_namespaced(ResourceKind::Secret, namespace, manifest)
            .await
    }

    async fn create_config(&self, namespace: &str, manifest: &Manifest) -> Result<()> {
        self.create_namespaced(ResourceKind::ConfigMap, namespace, manifest)
            .await
    }

    async fn create_service(&self, namespace: &str, manifest: &Manifest) -> Result<()> {
        self.create_namespaced(ResourceKind::Service, namespace, manifest)
            .await
    }

    async fn create_deployment(&self, namespace: &str, manifest: &Manifest) -> Result<()> {
        self.create_namespaced(ResourceKind::Deployment, namespace, manifest)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ClusterApiExt, CreateOutcome, DeleteOutcome};
    use serde_json::json;

    fn named(name: &str) -> Manifest {
        Manifest::new(json!({ "metadata": { "name": name } }))
    }

    #[tokio::test]
    async fn test_namespace_lifecycle() {
        let cluster = MemoryCluster::new();
        cluster.create_namespace(&named("dev")).await.unwrap();
        assert!(cluster.has_namespace("dev").await);

        let err = cluster.create_namespace(&named("dev")).await.unwrap_err();
        assert!(err.is_already_exists());

        cluster.delete_namespace("dev").await.unwrap();
        assert!(!cluster.has_namespace("dev").await);

        let err = cluster.delete_namespace("dev").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_namespaced_create_requires_namespace() {
        let cluster = MemoryCluster::new();
        let err = cluster
            .create_service("missing", &named("geth"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let cluster = MemoryCluster::new();
        cluster.create_namespace(&named("dev")).await.unwrap();
        cluster.create_secret("dev", &named("s")).await.unwrap();
        cluster.create_config("dev", &named("c")).await.unwrap();
        assert_eq!(cluster.list("dev").await.len(), 2);

        cluster.delete_namespace("dev").await.unwrap();
        cluster.create_namespace(&named("dev")).await.unwrap();
        assert!(cluster.list("dev").await.is_empty());
    }

    #[tokio::test]
    async fn test_same_name_different_kinds() {
        let cluster = MemoryCluster::new();
        cluster.create_namespace(&named("dev")).await.unwrap();
        cluster.create_service("dev", &named("geth")).await.unwrap();
        cluster.create_deployment("dev", &named("geth")).await.unwrap();
        assert!(cluster.get(ResourceKind::Service, "dev", "geth").await.is_some());
        assert!(cluster.get(ResourceKind::Deployment, "dev", "geth").await.is_some());
    }

    #[tokio::test]
    async fn test_missing_name_is_invalid() {
        let cluster = MemoryCluster::new();
        let err = cluster
            .create_namespace(&Manifest::new(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(422));
    }

    #[tokio::test]
    async fn test_ext_tolerates_expected_errors() {
        let cluster = MemoryCluster::new();
        let ns = named("dev");

        let first = cluster
            .ensure_created(ResourceKind::Namespace, "dev", &ns)
            .await
            .unwrap();
        let second = cluster
            .ensure_created(ResourceKind::Namespace, "dev", &ns)
            .await
            .unwrap();
        assert_eq!(first, CreateOutcome::Created);
        assert_eq!(second, CreateOutcome::AlreadyExists);

        assert_eq!(
            cluster.ensure_namespace_deleted("dev").await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert_eq!(
            cluster.ensure_namespace_deleted("dev").await.unwrap(),
            DeleteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_ext_propagates_other_errors() {
        let cluster = MemoryCluster::new();
        // Namespace missing: a 404 on create is not tolerated.
        let err = cluster
            .ensure_created(ResourceKind::Secret, "nowhere", &named("s"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
