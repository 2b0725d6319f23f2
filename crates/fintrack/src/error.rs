//! Error types for the fintrack client.
//!
//! Request paths never return these to callers; they are folded into
//! [`ApiResponse`](crate::ApiResponse) at the client boundary. They surface
//! from construction, from the credential store, and from the explicit
//! [`ApiClient::refresh_session`](crate::ApiClient::refresh_session) call.

use std::path::PathBuf;

use thiserror::Error;

/// The unified error type for fintrack operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (missing or rejected tokens).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Credential store errors.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    /// Rejected configuration input.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Failures talking to the server, keyed by where the request broke.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not connect to server: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// The request or the HTTP client could not be assembled.
    #[error("could not build request: {0}")]
    Builder(#[source] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        match err {
            e if e.is_timeout() => Self::Timeout(e),
            e if e.is_connect() => Self::Connection(e),
            e if e.is_builder() => Self::Builder(e),
            e => Self::Http(e),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.into())
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The refresh endpoint rejected the session; tokens were cleared.
    #[error("session expired")]
    SessionExpired,

    /// The refresh endpoint is temporarily unavailable; tokens were kept.
    #[error("session refresh unavailable: {message}")]
    RefreshUnavailable { message: String },
}

/// Credential store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored session could not be encoded or decoded.
    #[error("invalid session data: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid base URL format.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },
}
