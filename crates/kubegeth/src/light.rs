//! Light client: a single light-sync node with no accounts of its own.

use std::sync::Arc;

use async_trait::async_trait;
use kubegeth_cluster::{ClusterApi, ResourceKind};
use tracing::info;

use crate::error::{Action, Result};
use crate::manifests;
use crate::network::{create_step, delete_namespace, validate_name, Network, ProvisionReport, Variant};

/// A light client on a cluster, in its own namespace.
pub struct LightClient<C: ?Sized> {
    name: String,
    cluster: Arc<C>,
    image: String,
}

impl<C: ClusterApi + ?Sized> LightClient<C> {
    pub fn new(name: impl Into<String>, cluster: Arc<C>, image: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            cluster,
            image: image.into(),
        })
    }
}

#[async_trait]
impl<C: ClusterApi + ?Sized + 'static> Network for LightClient<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn variant(&self) -> Variant {
        Variant::Light
    }

    async fn create(&self) -> Result<ProvisionReport> {
        info!(network = %self.name, "creating light client");

        let mut report = ProvisionReport::new(&self.name, Action::Create);
        let cluster = self.cluster.as_ref();
        let steps = [
            (ResourceKind::Namespace, manifests::namespace(&self.name)),
            (ResourceKind::Service, manifests::light_service()),
            (ResourceKind::Deployment, manifests::light_deployment(&self.image)),
        ];
        for (kind, manifest) in &steps {
            create_step(cluster, &mut report, *kind, manifest).await?;
        }

        info!(network = %self.name, changed = report.changed(), "light client ready");
        Ok(report)
    }

    async fn delete(&self) -> Result<ProvisionReport> {
        info!(network = %self.name, "deleting light client");
        delete_namespace(self.cluster.as_ref(), &self.name).await
    }
}
