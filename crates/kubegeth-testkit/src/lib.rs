//! # kubegeth testkit
//!
//! Testing utilities for kubegeth.
//!
//! - **Golden vectors**: private keys with their addresses, EIP-55 checksums
//!   and a known `extraData` encoding
//! - **Generators**: proptest strategies for keys, accounts, addresses and
//!   network names
//! - **Fixtures**: seeded accounts and a [`ScriptedCluster`] that records
//!   calls and fails on demand
//!
//! ## Golden Vectors
//!
//! ```rust
//! use kubegeth_testkit::vectors::verify_all_vectors;
//!
//! assert!(verify_all_vectors().is_empty());
//! ```
//!
//! ## Scripted Failures
//!
//! ```rust
//! use kubegeth_cluster::{ClusterApi, Manifest, ResourceKind};
//! use kubegeth_testkit::ScriptedCluster;
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let cluster = ScriptedCluster::new();
//! cluster.fail_create(ResourceKind::Namespace, 500, "InternalError").await;
//!
//! let ns = Manifest::new(json!({ "metadata": { "name": "dev" } }));
//! assert!(cluster.create_namespace(&ns).await.is_err());
//! assert_eq!(cluster.calls().await.len(), 1);
//! # });
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{accounts_from_seed, seeded_rng, Call, CallKind, ScriptedCluster};
