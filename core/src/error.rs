//! Error types for the shitposts API client.
//!
//! # Design
//! Every failure an operation can end in is one variant of `ApiError`, so
//! callers match on the variant instead of inspecting strings. The status
//! line decides between `RateLimited` and `RemoteFailure`; a 2xx response
//! whose JSON lacks a required field becomes `UnrecognizedPayload`.
//! Transport failures (DNS, connection reset, TLS, timeouts) are carried
//! through untouched in `Transport`.

use std::time::Duration;

use thiserror::Error;

use crate::http::HttpResponse;

/// Native error of whichever transport executed the request, boxed as-is.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by every shitposts operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An operation was attempted while the session had no live transport.
    /// Detected locally; nothing was sent.
    #[error("no initialised session: enter the session before calling the API")]
    SessionNotReady,

    /// The server answered 429.
    #[error("rate limited ({status} {reason})")]
    RateLimited {
        status: u16,
        reason: String,
        /// Parsed from a `Retry-After` header given in seconds.
        retry_after: Option<Duration>,
        response: HttpResponse,
    },

    /// The server answered with a non-2xx status other than 429.
    #[error("HTTP {status} {reason}: {body}")]
    RemoteFailure { status: u16, reason: String, body: String },

    /// A successful response did not contain a field the operation needs.
    #[error("unrecognized response payload: missing field `{missing}`")]
    UnrecognizedPayload {
        missing: &'static str,
        response: HttpResponse,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// HTTP status carried by the error, if it came from a response.
    ///
    /// `UnrecognizedPayload` always reports 200.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RateLimited { status, .. } | ApiError::RemoteFailure { status, .. } => Some(*status),
            ApiError::UnrecognizedPayload { .. } => Some(200),
            _ => None,
        }
    }

    /// The raw response behind the error, where one is kept.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            ApiError::RateLimited { response, .. } | ApiError::UnrecognizedPayload { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }
}
