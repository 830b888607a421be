//! Test fixtures and helpers.

use std::collections::HashMap;

use async_trait::async_trait;
use kubegeth_cluster::{ClusterApi, ClusterError, Manifest, MemoryCluster, ResourceKind, Result};
use kubegeth_core::{generate_accounts, Account};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;

/// Deterministic rng for reproducible accounts and passwords.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `n` accounts generated from `seed`.
pub fn accounts_from_seed(n: usize, seed: u64) -> Vec<Account> {
    generate_accounts(n, &mut seeded_rng(seed)).expect("seeded rng never fails")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Create,
    Delete,
}

/// One call seen by a [`ScriptedCluster`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub call: CallKind,
    pub kind: ResourceKind,
    /// Empty for namespace calls.
    pub namespace: String,
    pub name: String,
}

/// A [`MemoryCluster`] that records every call and can be told to fail
/// particular ones.
///
/// A scripted failure is returned instead of touching the inner cluster and
/// stays in place until cleared.
pub struct ScriptedCluster {
    inner: MemoryCluster,
    calls: Mutex<Vec<Call>>,
    faults: Mutex<HashMap<(CallKind, ResourceKind), (u16, String)>>,
}

impl ScriptedCluster {
    pub fn new() -> Self {
        Self {
            inner: MemoryCluster::new(),
            calls: Mutex::new(Vec::new()),
            faults: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped cluster, for inspecting state.
    pub fn inner(&self) -> &MemoryCluster {
        &self.inner
    }

    /// Make every create of `kind` fail with `code` and `reason`.
    pub async fn fail_create(&self, kind: ResourceKind, code: u16, reason: &str) {
        self.faults
            .lock()
            .await
            .insert((CallKind::Create, kind), (code, reason.to_string()));
    }

    /// Make every namespace delete fail with `code` and `reason`.
    pub async fn fail_delete(&self, code: u16, reason: &str) {
        self.faults
            .lock()
            .await
            .insert((CallKind::Delete, ResourceKind::Namespace), (code, reason.to_string()));
    }

    pub async fn clear_faults(&self) {
        self.faults.lock().await.clear();
    }

    /// Every call so far, oldest first.
    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    /// Kinds of the create calls so far, oldest first.
    pub async fn created_kinds(&self) -> Vec<ResourceKind> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.call == CallKind::Create)
            .map(|c| c.kind)
            .collect()
    }

    async fn record(&self, call: CallKind, kind: ResourceKind, namespace: &str, name: &str) -> Result<()> {
        self.calls.lock().await.push(Call {
            call,
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        });

        match self.faults.lock().await.get(&(call, kind)) {
            Some((code, reason)) => Err(ClusterError::api(
                *code,
                reason.clone(),
                format!("scripted failure for {kind} {name:?}"),
            )),
            None => Ok(()),
        }
    }

    async fn record_create(&self, kind: ResourceKind, namespace: &str, manifest: &Manifest) -> Result<()> {
        self.record(CallKind::Create, kind, namespace, manifest.name().unwrap_or_default())
            .await
    }
}

impl Default for ScriptedCluster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClusterApi for ScriptedCluster {
    async fn create_namespace(&self, manifest: &Manifest) -> Result<()> {
        self.record_create(ResourceKind::Namespace, "", manifest).await?;
        self.inner.create_namespace(manifest).await
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        self.record(CallKind::Delete, ResourceKind::Namespace, "", name).await?;
        self.inner.delete_namespace(name).await
    }

    async fn create_secret(&self, namespace: &str, manifest: &Manifest) -> Result<()> {
        self.record_create(ResourceKind::Secret, namespace, manifest).await?;
        self.inner.create_secret(namespace, manifest).await
    }

    async fn create_config(&self, namespace: &str, manifest: &Manifest) -> Result<()> {
        self.record_create(ResourceKind::ConfigMap, namespace, manifest).await?;
        self.inner.create_config(namespace, manifest).await
    }

    async fn create_service(&self, namespace: &str, manifest: &Manifest) -> Result<()> {
        self.record_create(ResourceKind::Service, namespace, manifest).await?;
        self.inner.create_service(namespace, manifest).await
    }

    async fn create_deployment(&self, namespace: &str, manifest: &Manifest) -> Result<()> {
        self.record_create(ResourceKind::Deployment, namespace, manifest).await?;
        self.inner.create_deployment(namespace, manifest).await
    }
}
