// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock backend for testing.
//!
//! This module provides `MockBackend`, an in-memory backend that records every operation
//! and supports failure injection, so error paths of a read-through cache can be driven
//! deterministically.

use std::{collections::HashMap, sync::Arc};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::{CacheBackend, Error, TtlPolicy};

/// Recorded backend operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOp {
    /// A get was performed for the key.
    Get(String),
    /// A set was performed.
    Set {
        /// The key that was written.
        key: String,
        /// The payload that was written.
        payload: Bytes,
        /// The expiration policy requested by the caller.
        ttl: TtlPolicy,
    },
    /// A remove was performed for the key.
    Remove(String),
}

impl BackendOp {
    /// Returns the key the operation targeted.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Get(key) | Self::Remove(key) | Self::Set { key, .. } => key,
        }
    }
}

type FailPredicate = Box<dyn Fn(&BackendOp) -> bool + Send + Sync>;

/// A configurable mock backend.
///
/// Payloads live in a plain map and never expire; the requested [`TtlPolicy`] is only
/// recorded. Clones share state, so a test can keep a handle while the cache owns another.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use readthru_tier::testing::{BackendOp, MockBackend};
/// use readthru_tier::{CacheBackend, TtlPolicy};
///
/// # futures::executor::block_on(async {
/// let backend = MockBackend::new();
/// backend.set("k", Bytes::from_static(b"1"), TtlPolicy::Never).await.unwrap();
/// assert_eq!(backend.get("k").await.unwrap(), Some(Bytes::from_static(b"1")));
///
/// // Fail every read from now on.
/// backend.fail_when(|op| matches!(op, BackendOp::Get(_)));
/// assert!(backend.get("k").await.is_err());
/// # });
/// ```
pub struct MockBackend {
    data: Arc<Mutex<HashMap<String, Bytes>>>,
    operations: Arc<Mutex<Vec<BackendOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl Clone for MockBackend {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Creates an empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_data(HashMap::new())
    }

    /// Creates a mock backend with pre-populated payloads.
    #[must_use]
    pub fn with_data(data: HashMap<String, Bytes>) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the number of stored payloads.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns the stored payload without recording an operation.
    #[must_use]
    pub fn payload(&self, key: &str) -> Option<Bytes> {
        self.data.lock().get(key).cloned()
    }

    /// Stores a payload without recording an operation.
    pub fn put_payload(&self, key: impl Into<String>, payload: impl Into<Bytes>) {
        self.data.lock().insert(key.into(), payload.into());
    }

    /// Sets a predicate that decides which operations fail.
    ///
    /// A failing operation is still recorded but does not touch the stored data.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&BackendOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<BackendOp> {
        self.operations.lock().clone()
    }

    /// Returns the recorded `set` operations.
    #[must_use]
    pub fn writes(&self) -> Vec<BackendOp> {
        self.operations
            .lock()
            .iter()
            .filter(|op| matches!(op, BackendOp::Set { .. }))
            .cloned()
            .collect()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    /// Records `op` and reports whether it should fail.
    fn admit(&self, op: BackendOp) -> Result<(), Error> {
        let fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        let message = match &op {
            BackendOp::Get(_) => "mock: get failed",
            BackendOp::Set { .. } => "mock: set failed",
            BackendOp::Remove(_) => "mock: remove failed",
        };
        self.operations.lock().push(op);
        if fail {
            Err(Error::connection(message))
        } else {
            Ok(())
        }
    }
}

impl CacheBackend for MockBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
        self.admit(BackendOp::Get(key.to_owned()))?;
        Ok(self.data.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, payload: Bytes, ttl: TtlPolicy) -> Result<(), Error> {
        self.admit(BackendOp::Set {
            key: key.to_owned(),
            payload: payload.clone(),
            ttl,
        })?;
        self.data.lock().insert(key.to_owned(), payload);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        self.admit(BackendOp::Remove(key.to_owned()))?;
        self.data.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_operations_in_order() {
        let backend = MockBackend::new();
        backend.set("k", Bytes::from_static(b"v"), TtlPolicy::Never).await.unwrap();
        let _ = backend.get("k").await.unwrap();
        backend.remove("k").await.unwrap();

        assert_eq!(
            backend.operations(),
            vec![
                BackendOp::Set {
                    key: "k".to_owned(),
                    payload: Bytes::from_static(b"v"),
                    ttl: TtlPolicy::Never,
                },
                BackendOp::Get("k".to_owned()),
                BackendOp::Remove("k".to_owned()),
            ]
        );
        assert_eq!(backend.entry_count(), 0);
    }

    #[tokio::test]
    async fn failed_set_leaves_data_untouched() {
        let backend = MockBackend::new();
        backend.fail_when(|op| matches!(op, BackendOp::Set { .. }));

        let result = backend.set("k", Bytes::from_static(b"v"), TtlPolicy::Never).await;

        assert!(result.is_err());
        assert_eq!(backend.entry_count(), 0);
        assert_eq!(backend.writes().len(), 1);
    }

    #[tokio::test]
    async fn clear_failures_restores_success() {
        let backend = MockBackend::new();
        backend.fail_when(|_| true);
        assert!(backend.get("k").await.is_err());

        backend.clear_failures();
        assert_eq!(backend.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn failures_can_target_single_keys() {
        let backend = MockBackend::new();
        backend.fail_when(|op| op.key() == "forbidden");

        assert!(backend.remove("forbidden").await.is_err());
        assert!(backend.remove("allowed").await.is_ok());
    }
}
