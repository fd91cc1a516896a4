//! Error types for the Developool API client.
//!
//! # Design
//! Local failures (`InvalidArgument`, `SerializationError`) are produced
//! before anything is sent. Server statuses the operation knows about become
//! `Status` with the operation's own message; statuses it does not know about
//! keep the raw status and body in `UnexpectedStatus` for debugging.

use thiserror::Error;

/// Classification of a status code the server is documented to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidParameter,
    InvalidCredentials,
    EmailNotVerified,
    UserAlreadyExists,
    ProjectAlreadyExists,
    ProfileAlreadyExists,
    NotAuthenticated,
    NotFound,
    IllegalAccess,
    ServerError,
}

/// Errors delivered for a Developool operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A required argument was missing or empty. No request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced an HTTP response (DNS, connect, I/O).
    #[error("transport failure: {0}")]
    TransportError(String),

    /// The server answered 2xx but sent no body.
    #[error("no response from server")]
    EmptyResponse,

    /// The server returned a status listed in the operation's table.
    #[error("{message} (HTTP {status})")]
    Status {
        status: u16,
        kind: ErrorKind,
        message: String,
    },

    /// The server returned a non-2xx status the operation has no entry for.
    #[error("HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be decoded into the requested type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

impl ApiError {
    /// The mapped kind, if this error came from a status table.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Status { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The HTTP status behind this error, if the server answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } | ApiError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
