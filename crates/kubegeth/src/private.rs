//! Private clique network: signer accounts, genesis, and one mining node.

use std::sync::Arc;

use async_trait::async_trait;
use kubegeth_cluster::{ClusterApi, ResourceKind};
use kubegeth_core::{build_genesis, generate_accounts, CredentialBundle};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::{info, warn};

use crate::config::NetworkSettings;
use crate::error::{Action, Result};
use crate::manifests;
use crate::network::{
    create_step, delete_namespace, validate_name, Network, ProvisionReport, StepOutcome, Variant,
};

/// A private network on a cluster.
pub struct PrivateNetwork<C: ?Sized> {
    name: String,
    cluster: Arc<C>,
    settings: NetworkSettings,
}

impl<C: ClusterApi + ?Sized> PrivateNetwork<C> {
    pub fn new(name: impl Into<String>, cluster: Arc<C>, settings: NetworkSettings) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            cluster,
            settings,
        })
    }

    pub fn settings(&self) -> &NetworkSettings {
        &self.settings
    }

    /// Create the network with accounts and passwords drawn from `rng`.
    ///
    /// Accounts and the genesis are generated before the first cluster call,
    /// so a generation failure leaves the cluster untouched. The accounts are
    /// reported only if this run stored their genesis; on a re-run against an
    /// existing network they are discarded and `report.accounts` is empty.
    pub async fn create_with_rng<R>(&self, rng: &mut R) -> Result<ProvisionReport>
    where
        R: RngCore + CryptoRng + Send,
    {
        info!(network = %self.name, accounts = self.settings.accounts, "creating private network");

        let accounts = generate_accounts(self.settings.accounts, rng)?;
        let genesis = build_genesis(&accounts, &self.settings.genesis)?;
        let genesis_json = genesis.to_json()?;
        // build_genesis rejects an empty account list
        let signer = CredentialBundle::materialize(&accounts[0], rng);

        let mut report = ProvisionReport::new(&self.name, Action::Create);
        let cluster = self.cluster.as_ref();
        let image = &self.settings.geth_image;
        let steps = [
            (ResourceKind::Namespace, manifests::namespace(&self.name)),
            (ResourceKind::Secret, manifests::account_secret(&signer)),
            (ResourceKind::ConfigMap, manifests::genesis_config(&genesis_json)),
            (ResourceKind::Service, manifests::signer_service()),
            (
                ResourceKind::Deployment,
                manifests::signer_deployment(image, self.settings.genesis.chain_id),
            ),
        ];
        for (kind, manifest) in &steps {
            create_step(cluster, &mut report, *kind, manifest).await?;
            if *kind != ResourceKind::ConfigMap {
                continue;
            }

            // The accounts are only live if their genesis is the one stored.
            if report.outcome_of(ResourceKind::ConfigMap) == Some(StepOutcome::Created) {
                for (index, account) in accounts.iter().enumerate() {
                    info!(
                        index,
                        address = %account.checksummed_address(),
                        private_key = %account.private_key_hex().as_str(),
                        "generated account"
                    );
                }
                report.accounts = accounts.iter().map(|a| a.checksummed_address()).collect();
            } else {
                warn!(
                    network = %self.name,
                    discarded = accounts.len(),
                    "network already has a genesis; generated accounts discarded"
                );
            }
        }

        info!(network = %self.name, changed = report.changed(), "private network ready");
        Ok(report)
    }
}

#[async_trait]
impl<C: ClusterApi + ?Sized + 'static> Network for PrivateNetwork<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn variant(&self) -> Variant {
        Variant::Full
    }

    async fn create(&self) -> Result<ProvisionReport> {
        self.create_with_rng(&mut OsRng).await
    }

    async fn delete(&self) -> Result<ProvisionReport> {
        info!(network = %self.name, "deleting private network");
        delete_namespace(self.cluster.as_ref(), &self.name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubegeth_cluster::MemoryCluster;
    use kubegeth_core::GenesisState;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings(accounts: usize) -> NetworkSettings {
        NetworkSettings {
            accounts,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_populates_namespace() {
        let cluster = Arc::new(MemoryCluster::new());
        let network = PrivateNetwork::new("dev", cluster.clone(), settings(3)).unwrap();

        let report = network.create_with_rng(&mut StdRng::seed_from_u64(1)).await.unwrap();

        assert_eq!(report.accounts.len(), 3);
        assert_eq!(report.steps.len(), 5);
        assert!(report.steps.iter().all(|s| s.outcome == StepOutcome::Created));
        assert_eq!(
            cluster.list("dev").await,
            vec![
                (ResourceKind::Secret, manifests::SECRET_NAME.to_string()),
                (ResourceKind::ConfigMap, manifests::CONFIG_NAME.to_string()),
                (ResourceKind::Service, manifests::SIGNER_NAME.to_string()),
                (ResourceKind::Deployment, manifests::SIGNER_NAME.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_secret_belongs_to_signer() {
        let cluster = Arc::new(MemoryCluster::new());
        let network = PrivateNetwork::new("dev", cluster.clone(), settings(2)).unwrap();
        let report = network.create_with_rng(&mut StdRng::seed_from_u64(2)).await.unwrap();

        let secret = cluster
            .get(ResourceKind::Secret, "dev", manifests::SECRET_NAME)
            .await
            .unwrap();
        assert_eq!(
            secret.as_value()["stringData"]["address"],
            report.accounts[0].as_str()
        );

        let config = cluster
            .get(ResourceKind::ConfigMap, "dev", manifests::CONFIG_NAME)
            .await
            .unwrap();
        let genesis = GenesisState::from_json(
            config.as_value()["data"][manifests::GENESIS_KEY].as_str().unwrap(),
        )
        .unwrap();
        assert_eq!(genesis.alloc.len(), 2);
        assert_eq!(genesis.signer().unwrap(), report.accounts[0].address());
    }

    #[tokio::test]
    async fn test_existing_genesis_discards_accounts() {
        let cluster = Arc::new(MemoryCluster::new());
        let network = PrivateNetwork::new("dev", cluster.clone(), settings(2)).unwrap();
        let first = network.create_with_rng(&mut StdRng::seed_from_u64(4)).await.unwrap();
        assert_eq!(first.accounts.len(), 2);

        let again = network.create_with_rng(&mut StdRng::seed_from_u64(5)).await.unwrap();
        assert!(again.accounts.is_empty());
        assert_eq!(again.outcome_of(ResourceKind::ConfigMap), Some(StepOutcome::AlreadyExisted));
    }

    #[tokio::test]
    async fn test_zero_accounts_fails_before_cluster_calls() {
        let cluster = Arc::new(MemoryCluster::new());
        let network = PrivateNetwork::new("dev", cluster.clone(), settings(0)).unwrap();

        assert!(network.create_with_rng(&mut StdRng::seed_from_u64(3)).await.is_err());
        assert!(cluster.namespaces().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_everything() {
        let cluster = Arc::new(MemoryCluster::new());
        let network = PrivateNetwork::new("dev", cluster.clone(), settings(1)).unwrap();
        network.create().await.unwrap();

        let report = network.delete().await.unwrap();
        assert_eq!(report.outcome_of(ResourceKind::Namespace), Some(StepOutcome::Deleted));
        assert!(!cluster.has_namespace("dev").await);
    }
}
