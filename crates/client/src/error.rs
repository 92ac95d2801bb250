//! Client Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A client error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server wants a session (HTTP 401). Prompt for a login.
    #[display("login required")]
    Unauthorized,
    /// The server refused the supplied credentials.
    #[display("login failed: {_0}")]
    LoginRejected(#[error(not(source))] String),
    /// The request never got a response, or the response body could not be read.
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// The server answered with an error status; its body is kept verbatim.
    #[display("server rejected request ({status}): {body}")]
    ServerRejected { status: u16, body: String },
    /// The response arrived but could not be decoded.
    #[display("invalid response from {_0}")]
    InvalidResponse(#[error(not(source))] String),
    /// A remote path escapes the root or contains invalid characters.
    #[display("invalid path: {_0}")]
    InvalidPath(#[error(not(source))] String),
    /// The server base URL could not be parsed.
    #[display("invalid server URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// The request was malformed before it was sent (nothing selected,
    /// version list does not line up with the files, ...).
    #[display("invalid request: {_0}")]
    InvalidRequest(#[error(not(source))] String),
    /// The background hash worker has shut down.
    #[display("hash worker is no longer running")]
    WorkerGone,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Nothing in this crate retries on its own; this is for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Text to show the user. Server rejections surface the body as-is.
    pub fn user_message(&self) -> String {
        match self {
            Self::ServerRejected { body, .. } if !body.is_empty() => body.clone(),
            Self::LoginRejected(body) if !body.is_empty() => body.clone(),
            other => other.to_string(),
        }
    }
}
