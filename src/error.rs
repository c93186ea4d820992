// Error types
// -----------
// Every failure the library can produce is a typed value. The binary and the
// interactive shell wrap these in `anyhow` only at the outermost layer.

use crate::api::Operation;
use std::path::PathBuf;

/// Failure while locating the client or reading its credentials.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed credentials: {0}")]
    Malformed(String),
    #[error("process scan failed: {0}")]
    Process(String),
}

/// Failure of a single HTTP exchange with the local service.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("HTTP {status}{}", body_suffix(.body))]
    Status { status: u16, body: String },
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("response body is not JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("cannot build request header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(" - {body}")
    }
}

impl HttpError {
    /// Status code of the response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when no HTTP response was received (refused, DNS, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, HttpError::Transport(_))
    }
}

/// The response parsed as JSON but lacked the documented field.
#[derive(Debug, thiserror::Error)]
pub enum ResponseShapeError {
    #[error("response has no `{0}` field")]
    MissingField(&'static str),
    #[error("field `{field}` is not {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("`{value}` is not a valid {field}")]
    UnknownOption { field: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum OperationErrorKind {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Shape(#[from] ResponseShapeError),
    #[error(transparent)]
    InvalidProfile(#[from] ProfileError),
}

/// Failure of one operation, tagged with the operation's name.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed: {kind}")]
pub struct OperationError {
    pub operation: Operation,
    #[source]
    pub kind: OperationErrorKind,
}

impl OperationError {
    pub fn new(operation: Operation, kind: impl Into<OperationErrorKind>) -> Self {
        Self {
            operation,
            kind: kind.into(),
        }
    }

    /// HTTP status carried by the underlying failure, if any.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            OperationErrorKind::Http(e) => e.status(),
            _ => None,
        }
    }

    pub fn http(&self) -> Option<&HttpError> {
        match &self.kind {
            OperationErrorKind::Http(e) => Some(e),
            _ => None,
        }
    }
}
