// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for read-through cache operations.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// A specialized [`Result`] type for read-through cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error accepted from data sources.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The backend call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    /// Reading a payload.
    Get,
    /// Writing a freshly populated payload.
    Set,
    /// Removing a payload.
    Remove,
}

impl BackendOperation {
    /// Returns the operation name as used in messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for BackendOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A read-through cache operation failed.
///
/// Every failure is reported through this type and none of them is ever turned into an
/// empty result: `Ok(None)` always means the data source had nothing for the key.
///
/// The type is cheap to clone. When several callers wait on the same population they all
/// receive a clone of the same error.
///
/// # Examples
///
/// ```
/// use readthru::{Error, ReadThroughCache};
///
/// # futures::executor::block_on(async {
/// let cache = ReadThroughCache::builder().memory().build();
/// let result = cache.get_cached::<u32>("").await;
///
/// let error = result.unwrap_err();
/// assert!(matches!(error, Error::InvalidKey { .. }));
/// assert!(!error.is_transient());
/// # });
/// ```
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The key was rejected before any backend call was made.
    #[error("invalid cache key: {reason}")]
    InvalidKey {
        /// Why the key was rejected.
        reason: &'static str,
    },

    /// The expiration policy has a zero duration.
    #[error("invalid expiration policy: durations must be positive")]
    InvalidTtl,

    /// The backend could not be reached or failed while serving the request.
    #[error("cache backend unavailable during {operation} of '{key}'")]
    BackendUnavailable {
        /// The key being processed.
        key: String,
        /// The backend call that failed.
        operation: BackendOperation,
        /// The error reported by the backend.
        #[source]
        source: Arc<readthru_tier::Error>,
    },

    /// A stored payload exists but does not decode into the requested type.
    #[error("cache entry '{key}' could not be decoded")]
    CorruptEntry {
        /// The key whose payload is corrupt.
        key: String,
        /// The decoding failure.
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// A value returned by the data source could not be encoded for storage.
    #[error("value for '{key}' could not be encoded")]
    Encode {
        /// The key being populated.
        key: String,
        /// The encoding failure.
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// The data source failed or panicked while producing a value.
    #[error("data source failed for '{key}'")]
    DataSource {
        /// The key being populated.
        key: String,
        /// The error raised by the data source.
        #[source]
        source: Arc<dyn StdError + Send + Sync + 'static>,
    },

    /// The caller stopped waiting through its cancellation token.
    #[error("operation on '{key}' was cancelled")]
    Cancelled {
        /// The key being processed.
        key: String,
    },
}

impl Error {
    pub(crate) fn backend(key: &str, operation: BackendOperation, source: readthru_tier::Error) -> Self {
        Self::BackendUnavailable {
            key: key.to_owned(),
            operation,
            source: Arc::new(source),
        }
    }

    pub(crate) fn data_source(key: &str, source: impl Into<BoxError>) -> Self {
        Self::DataSource {
            key: key.to_owned(),
            source: Arc::from(source.into()),
        }
    }

    pub(crate) fn cancelled(key: &str) -> Self {
        Self::Cancelled { key: key.to_owned() }
    }

    /// Returns the key the failed operation targeted, if it got far enough to have one.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::InvalidKey { .. } | Self::InvalidTtl => None,
            Self::BackendUnavailable { key, .. }
            | Self::CorruptEntry { key, .. }
            | Self::Encode { key, .. }
            | Self::DataSource { key, .. }
            | Self::Cancelled { key } => Some(key),
        }
    }

    /// Returns `true` if retrying the same call may succeed.
    ///
    /// Only backend outages are transient. A corrupt entry stays corrupt until it is
    /// invalidated, and data-source errors are left for the caller to classify.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }
}
