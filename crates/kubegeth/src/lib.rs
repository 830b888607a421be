//! # kubegeth
//!
//! Provisions private geth clique networks, or light clients of one, as
//! Kubernetes workloads.
//!
//! A network is a namespace of the same name holding everything it needs.
//! [`PrivateNetwork`] generates signer accounts and a genesis document and
//! creates namespace, secret, config map, service and deployment in that
//! order. [`LightClient`] creates only namespace, service and deployment.
//! Both implement [`Network`].
//!
//! Creating is idempotent: objects that already exist count as done, so a
//! failed run can simply be repeated. Deleting removes the namespace and
//! succeeds if it is already gone. Nothing is rolled back when a step fails;
//! the error names the step.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kubegeth::{network_for, NetworkSettings, Variant};
//! use kubegeth_cluster::MemoryCluster;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let cluster = Arc::new(MemoryCluster::new());
//! let settings = NetworkSettings { accounts: 2, ..Default::default() };
//!
//! let network = network_for(Variant::Full, "dev", cluster.clone(), settings).unwrap();
//! let report = network.create().await.unwrap();
//! assert_eq!(report.accounts.len(), 2);
//!
//! network.delete().await.unwrap();
//! assert!(!cluster.has_namespace("dev").await);
//! # });
//! ```
//!
//! The [`site`] module writes the same credentials and genesis to a local
//! directory for use with kustomize instead.

pub mod config;
pub mod error;
pub mod light;
pub mod manifests;
pub mod network;
pub mod private;
pub mod site;

pub use config::{ClusterSettings, Config, NetworkSettings};
pub use error::{Action, ConfigError, ProvisionError, Result, SiteError, Step};
pub use light::LightClient;
pub use network::{
    network_for, validate_name, Network, ProvisionReport, StepOutcome, StepRecord, Variant,
};
pub use private::PrivateNetwork;
pub use site::{bootstrap_site, SiteOutcome};
