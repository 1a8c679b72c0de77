use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::CodecError;

/// Registry error code: the subject does not exist.
pub const SUBJECT_NOT_FOUND: i32 = 40401;
/// Registry error code: the subject has no such version.
pub const VERSION_NOT_FOUND: i32 = 40402;
/// Registry error code: no schema has the requested id.
pub const SCHEMA_NOT_FOUND: i32 = 40403;

/// Message used when an error response body cannot be parsed.
pub const UNRECOGNIZED_ERROR: &str = "Unrecognized error found";

/// Error type for registry operations.
///
/// Every failure is scoped to the call that produced it. Layers above the
/// transport pass these errors through untouched, so the registry's own
/// error code always reaches the caller.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network interaction error.
    ///
    /// The request never produced a response (DNS, refused connection,
    /// per-attempt timeout) on the final attempt.
    #[error(transparent)]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The subject cannot be addressed as a URL path segment.
    ///
    /// URL normalization removes `.` and `..` segments (encoded or not), so
    /// such a request would reach a different route. Rejected before any
    /// request is sent.
    #[error("invalid subject name {0:?}")]
    InvalidSubject(String),

    /// The whole call, retries included, ran past its deadline.
    #[error("registry call exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),

    /// Well-formed error response from the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The response body did not have the expected shape.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ClientError {
    /// Wraps a connection-level failure.
    pub fn transport<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Transport(source.into())
    }

    /// Returns the registry error, if the registry answered with one.
    pub fn registry_error(&self) -> Option<&RegistryError> {
        match self {
            Self::Registry(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` when the registry reported a missing subject,
    /// version or schema.
    pub fn is_not_found(&self) -> bool {
        self.registry_error().is_some_and(RegistryError::is_not_found)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(DecodeError::Json(err))
    }
}

impl From<CodecError> for ClientError {
    fn from(err: CodecError) -> Self {
        Self::Decode(DecodeError::Codec(err))
    }
}

/// Error response returned by the registry.
///
/// Codes are the registry's own (`40402` for a missing version and so on);
/// they are never reinterpreted on the client side.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{error_code} - {message}")]
pub struct RegistryError {
    /// Registry error code.
    pub error_code: i32,
    /// Human readable message.
    pub message: String,
}

impl RegistryError {
    /// Creates a registry error.
    pub fn new(error_code: i32, message: impl Into<String>) -> Self {
        Self {
            error_code,
            message: message.into(),
        }
    }

    /// Parses an error response body.
    ///
    /// A body that is not `{"error_code": .., "message": ..}` yields an error
    /// carrying the HTTP status code instead.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        serde_json::from_slice(body)
            .unwrap_or_else(|_| Self::new(i32::from(status), UNRECOGNIZED_ERROR))
    }

    /// Returns `true` for HTTP 404 and the registry's `404xx` codes.
    pub fn is_not_found(&self) -> bool {
        self.error_code == 404 || (40400..40500).contains(&self.error_code)
    }
}

/// Response body could not be turned into the expected value.
///
/// Never retried: repeating the request cannot fix a malformed body.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body was not the expected JSON shape.
    #[error("malformed registry response: {0}")]
    Json(#[from] serde_json::Error),
    /// The schema text did not compile.
    #[error(transparent)]
    Codec(#[from] CodecError),
}
