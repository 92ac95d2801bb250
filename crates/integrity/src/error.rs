//! Integrity Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An integrity-model error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for integrity operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value could not be parsed (unknown algorithm or profile name).
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// The offending input.
        value: String,
    },
    /// The edit form has no such field, or the field is read-only (computed
    /// hashes can never be edited by hand).
    #[display("field is not editable: {_0}")]
    NotEditable(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Bad input is bad input.
        false
    }
}
