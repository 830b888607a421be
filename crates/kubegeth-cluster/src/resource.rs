//! Resource kinds and manifest bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The kinds of cluster object a network is made of.
///
/// Variants are declared in provisioning order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Namespace,
    Secret,
    ConfigMap,
    Service,
    Deployment,
}

impl ResourceKind {
    /// REST collection path. `namespace` is ignored for namespaces.
    pub fn collection_path(&self, namespace: &str) -> String {
        match self {
            ResourceKind::Namespace => "/api/v1/namespaces".to_string(),
            ResourceKind::Secret => format!("/api/v1/namespaces/{namespace}/secrets"),
            ResourceKind::ConfigMap => format!("/api/v1/namespaces/{namespace}/configmaps"),
            ResourceKind::Service => format!("/api/v1/namespaces/{namespace}/services"),
            ResourceKind::Deployment => {
                format!("/apis/apps/v1/namespaces/{namespace}/deployments")
            }
        }
    }

    /// Lowercase plural name, as the API server spells it in messages.
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "namespaces",
            ResourceKind::Secret => "secrets",
            ResourceKind::ConfigMap => "configmaps",
            ResourceKind::Service => "services",
            ResourceKind::Deployment => "deployments.apps",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Namespace => "namespace",
            ResourceKind::Secret => "secret",
            ResourceKind::ConfigMap => "configmap",
            ResourceKind::Service => "service",
            ResourceKind::Deployment => "deployment",
        };
        f.write_str(name)
    }
}

/// A resource body as sent to the API server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Value);

impl Manifest {
    /// Wrap a JSON object. Nothing is validated until the API server sees it.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// `metadata.name`, if set.
    pub fn name(&self) -> Option<&str> {
        self.0.get("metadata")?.get("name")?.as_str()
    }

    /// `kind`, if set.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind")?.as_str()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Manifest {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_paths() {
        assert_eq!(ResourceKind::Namespace.collection_path("x"), "/api/v1/namespaces");
        assert_eq!(
            ResourceKind::ConfigMap.collection_path("dev"),
            "/api/v1/namespaces/dev/configmaps"
        );
        assert_eq!(
            ResourceKind::Deployment.collection_path("dev"),
            "/apis/apps/v1/namespaces/dev/deployments"
        );
    }

    #[test]
    fn test_manifest_accessors() {
        let manifest = Manifest::new(json!({
            "kind": "Service",
            "metadata": { "name": "geth" }
        }));
        assert_eq!(manifest.name(), Some("geth"));
        assert_eq!(manifest.kind(), Some("Service"));
        assert_eq!(Manifest::new(json!({})).name(), None);
    }

    #[test]
    fn test_kinds_sort_in_provisioning_order() {
        let mut kinds = vec![
            ResourceKind::Deployment,
            ResourceKind::Namespace,
            ResourceKind::Service,
            ResourceKind::Secret,
            ResourceKind::ConfigMap,
        ];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![
                ResourceKind::Namespace,
                ResourceKind::Secret,
                ResourceKind::ConfigMap,
                ResourceKind::Service,
                ResourceKind::Deployment,
            ]
        );
    }
}
