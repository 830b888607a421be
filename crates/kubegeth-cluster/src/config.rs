//! Connection settings for a Kubernetes API server.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ClusterError, Result};

/// Service account mount inside a pod.
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Credentials and endpoint for one cluster.
///
/// Built once at startup and handed to [`HttpCluster::new`](crate::HttpCluster::new);
/// nothing is read from process-wide state afterwards.
#[derive(Clone)]
pub struct ClusterConfig {
    /// API server base URL, e.g. `https://10.0.0.1:6443`.
    pub server: String,
    /// Bearer token.
    pub token: Option<String>,
    /// PEM bundle to trust in addition to the system roots.
    pub ca_pem: Option<Vec<u8>>,
    pub insecure_skip_tls_verify: bool,
    pub timeout: Duration,
}

impl ClusterConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// A config with no credentials.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            token: None,
            ca_pem: None,
            insecure_skip_tls_verify: false,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_ca_pem(mut self, pem: Vec<u8>) -> Self {
        self.ca_pem = Some(pem);
        self
    }

    pub fn with_insecure_skip_tls_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_tls_verify = skip;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the token from a file, trimming surrounding whitespace.
    pub fn with_token_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let token = std::fs::read_to_string(path.as_ref())?;
        Ok(self.with_token(token.trim()))
    }

    pub fn with_ca_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let pem = std::fs::read(path.as_ref())?;
        Ok(self.with_ca_pem(pem))
    }

    /// Settings for a process running inside the cluster: the API server
    /// from `KUBERNETES_SERVICE_HOST`/`KUBERNETES_SERVICE_PORT` and the
    /// mounted service account token and CA.
    pub fn in_cluster() -> Result<Self> {
        Self::in_cluster_from(
            std::env::var("KUBERNETES_SERVICE_HOST").ok(),
            std::env::var("KUBERNETES_SERVICE_PORT").ok(),
            Path::new(SERVICE_ACCOUNT_DIR),
        )
    }

    fn in_cluster_from(
        host: Option<String>,
        port: Option<String>,
        account_dir: &Path,
    ) -> Result<Self> {
        let host = host.ok_or_else(|| {
            ClusterError::Config("no server configured and KUBERNETES_SERVICE_HOST unset".into())
        })?;
        let port = port.unwrap_or_else(|| "443".to_string());
        let server = if host.contains(':') {
            format!("https://[{host}]:{port}")
        } else {
            format!("https://{host}:{port}")
        };

        let config = Self::new(server).with_token_file(account_dir.join("token"))?;
        let ca: PathBuf = account_dir.join("ca.crt");
        if ca.exists() {
            config.with_ca_file(ca)
        } else {
            Ok(config)
        }
    }
}

impl std::fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("server", &self.server)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("ca_pem", &self.ca_pem.as_ref().map(Vec::len))
            .field("insecure_skip_tls_verify", &self.insecure_skip_tls_verify)
            .field("timeout", &self.timeout)
            .finish()
    }
}
