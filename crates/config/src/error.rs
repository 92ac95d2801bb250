//! Configuration Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration loading.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A layer could not be read or a value has the wrong shape (unknown
    /// profile, unknown algorithm, malformed TOML). Fix the file or variable.
    #[display("invalid configuration")]
    Invalid,
    /// The values parse but don't make sense together.
    #[display("invalid configuration value for '{key}': {reason}")]
    Value {
        key: &'static str,
        reason: String,
    },
    /// An explicitly requested config file does not exist.
    #[display("config file not found: {_0}")]
    NotFound(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Nothing changes until the user edits something.
        false
    }
}
