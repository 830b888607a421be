//! Kubernetes REST implementation of the ClusterApi trait.
//!
//! Each operation is a single request; failures come back as the API
//! server's `Status` object and are mapped onto [`ClusterError::Api`] with the
//! code and reason preserved.

use async_trait::async_trait;
use reqwest::{Certificate, Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;

use crate::config::ClusterConfig;
use crate::error::{ClusterError, Result};
use crate::resource::{Manifest, ResourceKind};
use crate::traits::ClusterApi;

/// The failure body the API server returns (`kind: Status`).
#[derive(Debug, Default, Deserialize)]
struct Status {
    code: Option<u16>,
    reason: Option<String>,
    message: Option<String>,
}

/// Cluster client speaking the Kubernetes REST API.
pub struct HttpCluster {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCluster {
    /// Build a client for the cluster described by `config`.
    pub fn new(config: &ClusterConfig) -> Result<Self> {
        if config.server.is_empty() {
            return Err(ClusterError::Config("server URL is empty".into()));
        }

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure_skip_tls_verify);
        if let Some(pem) = &config.ca_pem {
            let cert = Certificate::from_pem(pem)
                .map_err(|e| ClusterError::Config(format!("CA certificate: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.server.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post(&self, kind: ResourceKind, namespace: &str, manifest: &Manifest) -> Result<()> {
        let url = format!("{}{}", self.base_url, kind.collection_path(namespace));
        debug!(%kind, namespace, %url, "POST");

        let request = self.authorize(self.client.post(&url).json(manifest.as_value()));
        check(request.send().await?).await
    }
}

async fn check(response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await?;
    Err(status_error(status.as_u16(), &body))
}

/// Map a failed response onto [`ClusterError::Api`].
///
/// Falls back to the HTTP status when the body is not a `Status` object.
fn status_error(http_code: u16, body: &str) -> ClusterError {
    let status: Status = serde_json::from_str(body).unwrap_or_default();
    ClusterError::Api {
        code: status.code.unwrap_or(http_code),
        reason: status.reason.unwrap_or_default(),
        message: status.message.unwrap_or_else(|| body.to_string()),
    }
}

#[async_trait]
impl ClusterApi for HttpCluster {
    async fn create_namespace(&self, manifest: &Manifest) -> Result<()> {
        self.post(ResourceKind::Namespace, "", manifest).await
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        let url = format!(
            "{}{}/{name}",
            self.base_url,
            ResourceKind::Namespace.collection_path("")
        );
        debug!(namespace = name, %url, "DELETE");

        let request = self.authorize(self.client.delete(&url));
        check(request.send().await?).await
    }

    async fn create_secret(&self, namespace: &str, manifest: &Manifest) -> Result<()> {
        self.post(ResourceKind::Secret, namespace, manifest).await
    }

    async fn create_config(&self, namespace: &str, manifest: &Manifest) -> Result<()> {
        self.post(ResourceKind::ConfigMap, namespace, manifest).await
    }

    async fn create_service(&self, namespace: &str, manifest: &Manifest) -> Result<()> {
        self.post(ResourceKind::Service, namespace, manifest).await
    }

    async fn create_deployment(&self, namespace: &str, manifest: &Manifest) -> Result<()> {
        self.post(ResourceKind::Deployment, namespace, manifest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one canned response and report the request head and body.
    async fn serve_once(code: u16, body: &'static str) -> (String, oneshot::Receiver<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let head_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|l| {
                    let (k, v) = l.split_once(':')?;
                    k.eq_ignore_ascii_case("content-length")
                        .then(|| v.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            while buf.len() < head_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
            }
            let request_body = String::from_utf8_lossy(&buf[head_end..]).to_string();

            let response = format!(
                "HTTP/1.1 {code} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send((head, request_body));
        });

        (format!("http://{addr}"), rx)
    }

    fn cluster(server: &str) -> HttpCluster {
        HttpCluster::new(&ClusterConfig::new(server).with_token("t0k3n")).unwrap()
    }

    #[tokio::test]
    async fn test_create_posts_to_collection() {
        let (server, rx) = serve_once(201, "{}").await;
        let manifest = Manifest::new(json!({ "kind": "Secret", "metadata": { "name": "s" } }));

        cluster(&server).create_secret("dev", &manifest).await.unwrap();

        let (head, body) = rx.await.unwrap();
        assert!(head.starts_with("POST /api/v1/namespaces/dev/secrets "));
        assert!(head.to_lowercase().contains("authorization: bearer t0k3n"));
        let sent: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(sent["metadata"]["name"], "s");
    }

    #[tokio::test]
    async fn test_deployment_uses_apps_group() {
        let (server, rx) = serve_once(201, "{}").await;
        let manifest = Manifest::new(json!({ "metadata": { "name": "geth" } }));

        cluster(&server).create_deployment("dev", &manifest).await.unwrap();

        let (head, _) = rx.await.unwrap();
        assert!(head.starts_with("POST /apis/apps/v1/namespaces/dev/deployments "));
    }

    #[tokio::test]
    async fn test_conflict_status_is_already_exists() {
        let (server, _rx) = serve_once(
            409,
            r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"namespaces \"dev\" already exists","reason":"AlreadyExists","code":409}"#,
        )
        .await;
        let manifest = Manifest::new(json!({ "metadata": { "name": "dev" } }));

        let err = cluster(&server).create_namespace(&manifest).await.unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(err.status_code(), Some(409));
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let (server, rx) = serve_once(
            404,
            r#"{"kind":"Status","status":"Failure","reason":"NotFound","code":404}"#,
        )
        .await;

        let err = cluster(&server).delete_namespace("gone").await.unwrap_err();
        assert!(err.is_not_found());

        let (head, _) = rx.await.unwrap();
        assert!(head.starts_with("DELETE /api/v1/namespaces/gone "));
    }

    #[tokio::test]
    async fn test_non_status_body_keeps_http_code() {
        let (server, _rx) = serve_once(503, "upstream unavailable").await;

        let err = cluster(&server).delete_namespace("dev").await.unwrap_err();
        match err {
            ClusterError::Api { code, reason, message } => {
                assert_eq!(code, 503);
                assert!(reason.is_empty());
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_server_rejected() {
        assert!(matches!(
            HttpCluster::new(&ClusterConfig::new("")),
            Err(ClusterError::Config(_))
        ));
    }
}
