//! Configuration file loading.
//!
//! # Config File Format
//!
//! ```toml
//! [cluster]
//! server = "https://127.0.0.1:6443"
//! token_file = "/path/to/token"
//! ca_file = "/path/to/ca.crt"
//! insecure_skip_tls_verify = false
//! timeout_secs = 30
//!
//! [network]
//! accounts = 10
//! geth_image = "ethereum/client-go:v1.13.15"
//! chain_id = 1213
//! clique_period = 3
//! clique_epoch = 30000
//! ```
//!
//! Every key is optional. Without a `server`, the in-cluster service
//! account is used.

use std::path::{Path, PathBuf};
use std::time::Duration;

use kubegeth_cluster::ClusterConfig;
use kubegeth_core::GenesisParams;
use serde::Deserialize;

use crate::error::ConfigError;

/// Default number of accounts for a full network.
pub const DEFAULT_ACCOUNTS: usize = 10;

/// Default node image.
pub const DEFAULT_GETH_IMAGE: &str = "ethereum/client-go:v1.13.15";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub cluster: ClusterSettings,
    pub network: NetworkSettings,
}

/// Where the API server is and how to authenticate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusterSettings {
    pub server: Option<String>,
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
    pub ca_file: Option<PathBuf>,
    pub insecure_skip_tls_verify: bool,
    pub timeout_secs: Option<u64>,
}

/// What to deploy.
///
/// Keys that neither this struct nor [`GenesisParams`] knows land in
/// `unknown`, which [`Config::validate`] requires to be empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Accounts generated for a full network; the first is the signer.
    pub accounts: usize,
    pub geth_image: String,
    #[serde(flatten)]
    pub genesis: GenesisParams,
    #[serde(flatten)]
    pub unknown: toml::Table,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            accounts: DEFAULT_ACCOUNTS,
            geth_image: DEFAULT_GETH_IMAGE.to_string(),
            genesis: GenesisParams::default(),
            unknown: toml::Table::new(),
        }
    }
}

impl Config {
    /// Load from `path`, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.network.unknown.is_empty() {
            let keys: Vec<&str> = self.network.unknown.keys().map(String::as_str).collect();
            return Err(ConfigError::Invalid(format!(
                "unknown network key(s): {}",
                keys.join(", ")
            )));
        }
        if self.network.accounts == 0 {
            return Err(ConfigError::Invalid(
                "network.accounts must be at least 1".into(),
            ));
        }
        if self.network.geth_image.trim().is_empty() {
            return Err(ConfigError::Invalid("network.geth_image is empty".into()));
        }
        if self.cluster.token.is_some() && self.cluster.token_file.is_some() {
            return Err(ConfigError::Invalid(
                "cluster.token and cluster.token_file are mutually exclusive".into(),
            ));
        }
        Ok(())
    }
}

impl ClusterSettings {
    /// Turn the settings into a client config, reading any referenced files.
    pub fn resolve(&self) -> Result<ClusterConfig, ConfigError> {
        let mut config = match &self.server {
            Some(server) => ClusterConfig::new(server.clone()),
            None => ClusterConfig::in_cluster()?,
        };

        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        if let Some(path) = &self.token_file {
            config = config.with_token_file(path)?;
        }
        if let Some(path) = &self.ca_file {
            config = config.with_ca_file(path)?;
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config.with_insecure_skip_tls_verify(self.insecure_skip_tls_verify))
    }
}
