//! Error types for the management client.
//!
//! # Design
//! Every failure a call can produce is an `ApiError`: the name of the
//! operation that failed plus one of five kinds. The kind tells the caller
//! whether any network traffic happened:
//!
//! - `Validation` and `Preparation`: nothing was sent.
//! - `Transport`: a request may have been sent, but no interpretable response
//!   came back (this includes cancellation and authorizer failures).
//! - `Status`: a response arrived with a status outside the operation's
//!   accepted set.
//! - `Decode`: the status was accepted but the body did not match the
//!   expected shape.

use serde::{Deserialize, Serialize};

/// Errors returned by every operation on a management client.
#[derive(Debug, thiserror::Error)]
#[error("{operation}: {kind}")]
pub struct ApiError {
    operation: String,
    #[source]
    kind: ErrorKind,
}

impl ApiError {
    pub fn new(operation: impl Into<String>, kind: impl Into<ErrorKind>) -> Self {
        Self {
            operation: operation.into(),
            kind: kind.into(),
        }
    }

    /// The `Client.Operation` name the error originated from.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// The HTTP status, for status errors only.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The parsed service error payload, when the service sent one.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match &self.kind {
            ErrorKind::Status { error, .. } => error.as_ref(),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport(TransportError::Cancelled))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// The five failure classes of the request pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("failure preparing request: {0}")]
    Preparation(#[from] PrepareError),

    #[error("failure sending request: {0}")]
    Transport(#[from] TransportError),

    #[error("unexpected status {status}{}", describe_service_error(.error))]
    Status {
        status: u16,
        error: Option<ServiceError>,
        body: String,
    },

    #[error("failure decoding response: {0}")]
    Decode(#[source] serde_json::Error),
}

fn describe_service_error(error: &Option<ServiceError>) -> String {
    match error {
        Some(e) => format!(": {e}"),
        None => String::new(),
    }
}

/// A caller-supplied value violated a declared constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} violates {rule} (expected {expected})")]
pub struct ValidationError {
    pub field: String,
    pub rule: &'static str,
    pub expected: String,
}

/// The request could not be built.
#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    #[error("malformed path template {0:?}")]
    MalformedTemplate(String),

    #[error("missing value for path parameter {0}")]
    MissingPathParameter(String),

    #[error("invalid request url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request body could not be serialized: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// No interpretable response was obtained.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request cancelled")]
    Cancelled,

    #[error("authorization failed: {0}")]
    Authorization(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Io(String),
}

/// Error payload returned by the management endpoints.
///
/// Accepts both the wrapped `{"error": {...}}` form and the bare
/// `{"code": ..., "message": ...}` form older services return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ServiceError>,
}

impl ServiceError {
    pub fn from_body(body: &[u8]) -> Option<Self> {
        #[derive(Deserialize)]
        struct Wrapped {
            error: ServiceError,
        }

        if body.is_empty() {
            return None;
        }
        if let Ok(wrapped) = serde_json::from_slice::<Wrapped>(body) {
            return Some(wrapped.error);
        }
        serde_json::from_slice::<ServiceError>(body)
            .ok()
            .filter(|e| !e.code.is_empty() || !e.message.is_empty())
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.message)?;
        if let Some(target) = &self.target {
            write!(f, " (target: {target})")?;
        }
        Ok(())
    }
}
