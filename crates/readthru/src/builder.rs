// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for [`ReadThroughCache`].

use readthru_tier::CacheBackend;
#[cfg(feature = "memory")]
use readthru_memory::InMemoryBackend;

use crate::cache::{CacheName, ReadThroughCache};
use crate::telemetry::CacheTelemetry;

const DEFAULT_NAME: CacheName = "readthru";

/// What a lookup does when the stored payload does not decode into the requested type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum CorruptEntryPolicy {
    /// Fail the lookup with [`Error::CorruptEntry`](crate::Error::CorruptEntry).
    #[default]
    Surface,
    /// Log a warning and continue as if the key were absent. The next population
    /// overwrites the bad payload.
    ///
    /// Applies to reads that populate. [`ReadThroughCache::get_cached`](crate::ReadThroughCache::get_cached)
    /// always fails on a corrupt payload.
    TreatAsMiss,
}

/// Builder for a [`ReadThroughCache`].
///
/// Created by [`ReadThroughCache::builder`]. A backend must be chosen before the cache
/// can be built.
///
/// # Examples
///
/// ```
/// use readthru::{CorruptEntryPolicy, ReadThroughCache};
///
/// let cache = ReadThroughCache::builder()
///     .memory()
///     .name("student-courses")
///     .corrupt_entries(CorruptEntryPolicy::TreatAsMiss)
///     .build();
///
/// assert_eq!(cache.name(), "student-courses");
/// ```
#[derive(Debug)]
pub struct CacheBuilder<B = ()> {
    name: Option<CacheName>,
    backend: B,
    corrupt_entries: CorruptEntryPolicy,
    telemetry: Option<CacheTelemetry>,
}

impl CacheBuilder<()> {
    pub(crate) fn new() -> Self {
        Self {
            name: None,
            backend: (),
            corrupt_entries: CorruptEntryPolicy::default(),
            telemetry: None,
        }
    }

    /// Uses `backend` for storage.
    ///
    /// The cache owns the backend. To share one connection between caches, pass an
    /// `Arc<B>`.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[cfg(feature = "test-util")]
    /// # fn main() {
    /// use readthru::ReadThroughCache;
    /// use readthru_tier::testing::MockBackend;
    ///
    /// let backend = MockBackend::new();
    /// let cache = ReadThroughCache::builder().backend(backend.clone()).build();
    /// # }
    /// # #[cfg(not(feature = "test-util"))]
    /// # fn main() {}
    /// ```
    pub fn backend<B: CacheBackend>(self, backend: B) -> CacheBuilder<B> {
        CacheBuilder {
            name: self.name,
            backend,
            corrupt_entries: self.corrupt_entries,
            telemetry: self.telemetry,
        }
    }

    /// Uses a new unbounded [`InMemoryBackend`] for storage.
    #[cfg(feature = "memory")]
    #[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
    #[must_use]
    pub fn memory(self) -> CacheBuilder<InMemoryBackend> {
        self.backend(InMemoryBackend::new())
    }
}

impl<B> CacheBuilder<B> {
    /// Sets the name reported in telemetry. Defaults to `"readthru"`.
    #[must_use]
    pub fn name(mut self, name: CacheName) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets how undecodable payloads are handled. Defaults to [`CorruptEntryPolicy::Surface`].
    #[must_use]
    pub fn corrupt_entries(mut self, policy: CorruptEntryPolicy) -> Self {
        self.corrupt_entries = policy;
        self
    }

    /// Enables telemetry.
    #[must_use]
    pub fn telemetry(mut self, telemetry: CacheTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }
}

impl<B: CacheBackend> CacheBuilder<B> {
    /// Builds the cache.
    #[must_use]
    pub fn build(self) -> ReadThroughCache<B> {
        ReadThroughCache::new(
            self.name.unwrap_or(DEFAULT_NAME),
            self.backend,
            self.corrupt_entries,
            self.telemetry,
        )
    }
}

#[cfg(test)]
mod tests {
    use readthru_tier::testing::MockBackend;

    use super::*;

    #[test]
    fn defaults() {
        let builder = CacheBuilder::new().backend(MockBackend::new());

        assert_eq!(builder.name, None);
        assert_eq!(builder.corrupt_entries, CorruptEntryPolicy::Surface);
        assert!(builder.telemetry.is_none());

        let cache = builder.build();
        assert_eq!(cache.name(), "readthru");
    }

    #[test]
    fn settings_survive_backend_choice() {
        let builder = CacheBuilder::new()
            .name("courses")
            .corrupt_entries(CorruptEntryPolicy::TreatAsMiss)
            .telemetry(CacheTelemetry::new(false))
            .backend(MockBackend::new());

        assert_eq!(builder.name, Some("courses"));
        assert_eq!(builder.corrupt_entries, CorruptEntryPolicy::TreatAsMiss);
        assert!(builder.telemetry.is_some());
    }

    #[cfg(feature = "memory")]
    #[test]
    fn memory_backend() {
        let cache = CacheBuilder::new().memory().name("mem").build();

        assert_eq!(cache.name(), "mem");
        assert_eq!(cache.backend().entry_count(), 0);
    }
}
