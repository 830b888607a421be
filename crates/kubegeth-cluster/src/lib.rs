//! # kubegeth cluster
//!
//! The cluster control-plane interface used by the provisioning
//! orchestrator, behind the [`ClusterApi`] trait so the orchestrator does not
//! care which cluster (or fake) it talks to.
//!
//! ## Key Types
//!
//! - [`ClusterApi`] - the six create/delete operations provisioning needs
//! - [`ClusterApiExt`] - idempotent wrappers (`AlreadyExists`/`NotFound` as success)
//! - [`HttpCluster`] - Kubernetes REST client, configured by [`ClusterConfig`]
//! - [`MemoryCluster`] - in-memory cluster for tests
//! - [`ClusterError`] - failures with the API server's status code and reason
//!
//! ## Usage
//!
//! ```rust
//! use kubegeth_cluster::{ClusterApiExt, CreateOutcome, Manifest, MemoryCluster, ResourceKind};
//! use serde_json::json;
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let cluster = MemoryCluster::new();
//! let ns = Manifest::new(json!({ "metadata": { "name": "dev" } }));
//!
//! let first = cluster.ensure_created(ResourceKind::Namespace, "dev", &ns).await.unwrap();
//! let again = cluster.ensure_created(ResourceKind::Namespace, "dev", &ns).await.unwrap();
//! assert_eq!(first, CreateOutcome::Created);
//! assert_eq!(again, CreateOutcome::AlreadyExists);
//! # });
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod resource;
pub mod traits;

pub use config::ClusterConfig;
pub use error::{ClusterError, Result};
pub use http::HttpCluster;
pub use memory::MemoryCluster;
pub use resource::{Manifest, ResourceKind};
pub use traits::{ClusterApi, ClusterApiExt, CreateOutcome, DeleteOutcome};
