//! CLI Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use filestation_client::error::{Error as ClientError, ErrorKind as ClientErrorKind};
use filestation_controller::Notice;
use filestation_controller::error::Error as ControllerError;

/// A command error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for commands.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Something the user should be told, exactly as the server or controller
    /// phrased it.
    #[display("{_0}")]
    Notice(#[error(not(source))] Notice),
    /// Configuration could not be loaded.
    #[display("configuration error")]
    Config,
    /// A local file could not be read or written.
    #[display("{_0}")]
    Io(#[error(not(source))] String),
    /// The command line makes no sense as given.
    #[display("invalid argument: {_0}")]
    Argument(#[error(not(source))] String),
    /// At least one computed hash disagrees with its attestation.
    #[display("hash mismatch: {_0}")]
    Mismatch(#[error(not(source))] String),
}
impl ErrorKind {
    #[track_caller]
    pub fn controller(err: ControllerError) -> Error {
        let notice = Notice::from(&err);
        err.raise(Self::Notice(notice))
    }

    #[track_caller]
    pub fn client(err: ClientError) -> Error {
        let notice = match &*err {
            ClientErrorKind::Unauthorized => Notice::LoginRequired,
            other => Notice::Error(other.user_message()),
        };
        err.raise(Self::Notice(notice))
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Notice(Notice::LoginRequired) => 3,
            Self::Mismatch(_) => 4,
            Self::Argument(_) | Self::Config => 2,
            _ => 1,
        }
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Notice(Notice::Error(_)))
    }
}
