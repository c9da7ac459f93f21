// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for backend operations.

use std::borrow::Cow;
use std::time::Duration;

/// A specialized [`Result`] type for backend operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A backend could not complete an operation.
///
/// Backends report connectivity problems through this type. It is never used to signal
/// that a key is absent.
///
/// # Examples
///
/// ```
/// use readthru_tier::Error;
/// use std::time::Duration;
///
/// let error = Error::timeout(Duration::from_millis(250));
/// assert!(error.is_timeout());
///
/// let error = Error::from_message("connection reset");
/// assert_eq!(error.to_string(), "connection reset");
/// ```
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(ErrorKind);

#[derive(Debug, thiserror::Error)]
pub(crate) enum ErrorKind {
    #[error("backend connection failed")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("backend did not respond within {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Other(Cow<'static, str>),
}

impl Error {
    /// Creates an error for a failed or dropped connection.
    pub fn connection(cause: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self(ErrorKind::Connection(cause.into()))
    }

    /// Creates an error for an operation that exceeded `elapsed`.
    #[must_use]
    pub fn timeout(elapsed: Duration) -> Self {
        Self(ErrorKind::Timeout(elapsed))
    }

    /// Creates an error from a message.
    pub fn from_message(message: impl Into<Cow<'static, str>>) -> Self {
        Self(ErrorKind::Other(message.into()))
    }

    /// Returns `true` if the operation timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.0, ErrorKind::Timeout(_))
    }
}
