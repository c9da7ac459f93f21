// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory backend implementation using moka.

use std::sync::Arc;

use bytes::Bytes;
use moka::future::Cache;
use readthru_tier::{CacheBackend, Error, TtlPolicy};

use crate::builder::InMemoryBackendBuilder;
use crate::expiry::{PolicyExpiry, StoredPayload};

/// An in-memory backend backed by moka.
///
/// Clones share the same storage. Operations never fail.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use readthru_memory::InMemoryBackend;
/// use readthru_tier::{CacheBackend, TtlPolicy};
///
/// # futures::executor::block_on(async {
/// let backend = InMemoryBackend::new();
/// backend.set("k", Bytes::from_static(b"1"), TtlPolicy::Never).await?;
/// backend.remove("k").await?;
/// assert_eq!(backend.get("k").await?, None);
/// # Ok::<(), readthru_tier::Error>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    inner: Arc<Cache<String, StoredPayload>>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// Creates a new unbounded backend.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new backend that holds at most `max_capacity` entries.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::builder().max_capacity(max_capacity).build()
    }

    /// Creates a builder for configuring a backend.
    #[must_use]
    pub fn builder() -> InMemoryBackendBuilder {
        InMemoryBackendBuilder::new()
    }

    pub(crate) fn from_builder(builder: &InMemoryBackendBuilder) -> Self {
        let mut moka_builder = Cache::builder().expire_after(PolicyExpiry);

        if let Some(capacity) = builder.max_capacity {
            moka_builder = moka_builder.max_capacity(capacity);
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: Arc::new(moka_builder.build()),
        }
    }

    /// Returns the backend name, if one was configured.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.inner.name()
    }

    /// Returns the approximate number of stored entries.
    ///
    /// The count is maintained lazily by moka and may briefly include expired entries.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Returns `true` if `key` holds an unexpired payload, without refreshing it.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }
}

impl CacheBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
        Ok(self.inner.get(key).await.map(|stored| stored.payload))
    }

    async fn set(&self, key: &str, payload: Bytes, ttl: TtlPolicy) -> Result<(), Error> {
        self.inner.insert(key.to_owned(), StoredPayload { payload, ttl }).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        self.inner.invalidate(key).await;
        Ok(())
    }
}
