//! Controller Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use filestation_client::error::{Error as ClientError, ErrorKind as ClientErrorKind};
use filestation_integrity::error::{Error as IntegrityError, ErrorKind as IntegrityErrorKind};

/// A controller error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No session; show the login prompt. Nothing else happened.
    #[display("login required")]
    Unauthorized,
    /// A request failed. Holds the text to show the user; state is unchanged.
    #[display("{_0}")]
    Request(#[error(not(source))] String),
    /// The operation makes no sense in the controller's current state
    /// (saving a closed drawer, renaming with two items selected, ...).
    #[display("not available right now: {_0}")]
    InvalidState(#[error(not(source))] String),
    /// The edit form rejected a field.
    #[display("field is not editable: {_0}")]
    NotEditable(#[error(not(source))] String),
    /// A view template failed to compile or render.
    #[display("template error")]
    Template,
}
impl ErrorKind {
    /// Convert a client error into a controller error, keeping the client's
    /// `Exn` frame as a child in the error tree.
    #[track_caller]
    pub fn client(err: ClientError) -> Error {
        let kind = match &*err {
            ClientErrorKind::Unauthorized => Self::Unauthorized,
            other => Self::Request(other.user_message()),
        };
        err.raise(kind)
    }

    /// Convert an edit-form error, keeping its frame.
    #[track_caller]
    pub fn integrity(err: IntegrityError) -> Error {
        let kind = match &*err {
            IntegrityErrorKind::NotEditable(key) => Self::NotEditable(key.clone()),
            other => Self::InvalidState(other.to_string()),
        };
        err.raise(kind)
    }

    pub(crate) fn invalid_state(what: impl Into<String>) -> Self {
        Self::InvalidState(what.into())
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_meaning() {
        let err = ErrorKind::client(exn::Exn::from(ClientErrorKind::Unauthorized));
        assert!(matches!(&*err, ErrorKind::Unauthorized));
        let err = ErrorKind::client(exn::Exn::from(ClientErrorKind::ServerRejected {
            status: 500,
            body: "Error moving item".to_string(),
        }));
        assert_eq!(&*err, &ErrorKind::Request("Error moving item".to_string()));
    }
}
