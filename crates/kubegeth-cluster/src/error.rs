//! Error types for cluster operations.

use thiserror::Error;

use crate::resource::ResourceKind;

/// Reason string the API server uses for a create that collides.
pub const REASON_ALREADY_EXISTS: &str = "AlreadyExists";

/// Reason string the API server uses for a missing object.
pub const REASON_NOT_FOUND: &str = "NotFound";

/// Errors returned by a [`ClusterApi`](crate::ClusterApi) implementation.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The API server answered with a failure status.
    #[error("cluster API error {code} {reason}: {message}")]
    Api {
        code: u16,
        reason: String,
        message: String,
    },

    /// The request never got a status back (connect, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Client configuration is unusable.
    #[error("invalid cluster configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClusterError {
    pub fn api(code: u16, reason: impl Into<String>, message: impl Into<String>) -> Self {
        ClusterError::Api {
            code,
            reason: reason.into(),
            message: message.into(),
        }
    }

    /// The 409 the API server returns when creating an existing object.
    pub fn already_exists(kind: ResourceKind, name: &str) -> Self {
        Self::api(
            409,
            REASON_ALREADY_EXISTS,
            format!("{} \"{name}\" already exists", kind.plural()),
        )
    }

    /// The 404 the API server returns for a missing object.
    pub fn not_found(kind: ResourceKind, name: &str) -> Self {
        Self::api(
            404,
            REASON_NOT_FOUND,
            format!("{} \"{name}\" not found", kind.plural()),
        )
    }

    /// HTTP status code, for `Api` errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClusterError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Machine-readable reason, for `Api` errors.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ClusterError::Api { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// A create hit an object that is already there.
    ///
    /// Only `409 AlreadyExists` qualifies; a 409 with another reason (e.g. an
    /// optimistic-concurrency `Conflict`) is a real failure.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ClusterError::Api { code: 409, reason, .. } if reason == REASON_ALREADY_EXISTS)
    }

    /// The target object does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Result type for cluster operations.
pub type Result<T> = std::result::Result<T, ClusterError>;
