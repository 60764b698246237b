//! Error types for the docente admin client.
//!
//! # Design
//! The variants follow how a failure has to be handled by the caller:
//! `Validation` is raised before any network call, `Transport` means no
//! response came back and carries the transport's error unchanged, `Http`
//! is a received response mapped through `classify`, and `Fallback` means
//! the local mirror itself could not be used.

use thiserror::Error;

use crate::classify::{Classification, ErrorKind};
use crate::http::TransportError;
use crate::mirror::StorageError;

/// Errors returned by `DocenteClient` and `DocenteService`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller-supplied input failed a precondition; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http {
        status: u16,
        kind: ErrorKind,
        message: String,
    },

    /// A 2xx response whose envelope did not report success.
    #[error("{0}")]
    InvalidResponse(String),

    /// The local mirror could not be read or written; the storage failure
    /// is kept as the source.
    #[error("{context}")]
    Fallback {
        context: &'static str,
        #[source]
        source: StorageError,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub(crate) fn from_classification(status: u16, classification: Classification) -> Self {
        ApiError::Http {
            status,
            kind: classification.kind,
            message: classification.message,
        }
    }

    pub(crate) fn validation(message: &str) -> Self {
        ApiError::Validation(message.to_string())
    }

    /// HTTP status of a classified failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Category of a classified failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Http { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}
