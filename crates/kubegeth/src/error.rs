//! Error types for provisioning.

use std::fmt;
use std::path::PathBuf;

use kubegeth_cluster::{ClusterError, ResourceKind};
use kubegeth_core::CoreError;
use thiserror::Error;

/// What a provisioning step was doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => f.write_str("create"),
            Action::Delete => f.write_str("delete"),
        }
    }
}

/// One cluster call in a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub action: Action,
    pub kind: ResourceKind,
    pub name: String,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} \"{}\"", self.action, self.kind, self.name)
    }
}

/// Errors that abort a provisioning run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Key generation or genesis building failed.
    #[error("identity generation failed: {0}")]
    Core(#[from] CoreError),

    /// A cluster call failed with something other than the tolerated
    /// already-exists/not-found answers. Earlier steps are left in place.
    #[error("{step} failed: {source}")]
    Cluster {
        step: Step,
        #[source]
        source: ClusterError,
    },

    /// The network name is not usable as a namespace.
    #[error("invalid network name {0:?}: must be a DNS-1123 label")]
    InvalidName(String),
}

impl ProvisionError {
    /// The step that failed, for cluster errors.
    pub fn step(&self) -> Option<&Step> {
        match self {
            ProvisionError::Cluster { step, .. } => Some(step),
            _ => None,
        }
    }
}

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

/// Errors writing the local site layout.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("identity generation failed: {0}")]
    Core(#[from] CoreError),

    #[error("writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;
