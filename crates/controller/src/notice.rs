use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Something to tell the user after an action, toast-style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Ask the user to log in.
    LoginRequired,
    Info(String),
    Error(String),
}
impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self::Info(text.into())
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Info(_))
    }
}
impl From<&ErrorKind> for Notice {
    fn from(kind: &ErrorKind) -> Self {
        match kind {
            ErrorKind::Unauthorized => Self::LoginRequired,
            other => Self::Error(other.to_string()),
        }
    }
}
impl From<&Error> for Notice {
    fn from(err: &Error) -> Self {
        Self::from(&**err)
    }
}
impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::LoginRequired => f.write_str("Please log in to continue."),
            Self::Info(text) | Self::Error(text) => f.write_str(text),
        }
    }
}
