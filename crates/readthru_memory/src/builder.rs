// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory backends.
//!
//! This module provides a builder API for `InMemoryBackend` that abstracts the
//! underlying moka configuration.

use crate::backend::InMemoryBackend;

/// Builder for configuring an [`InMemoryBackend`].
///
/// Expiration is not configured here: every payload carries its own
/// [`TtlPolicy`](readthru_tier::TtlPolicy).
///
/// # Examples
///
/// ```
/// use readthru_memory::InMemoryBackend;
///
/// let backend = InMemoryBackend::builder()
///     .max_capacity(1000)
///     .initial_capacity(100)
///     .name("student-courses")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackendBuilder {
    pub(crate) max_capacity: Option<u64>,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) name: Option<String>,
}

impl InMemoryBackendBuilder {
    /// Creates a new builder for an unbounded backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of entries.
    ///
    /// Once reached, moka evicts entries using its `TinyLFU` policy. If not set, the
    /// backend is limited only by available memory.
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Sets the initial capacity (pre-allocation hint).
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets a name for the backend, useful when debugging.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the configured backend.
    #[must_use]
    pub fn build(self) -> InMemoryBackend {
        InMemoryBackend::from_builder(&self)
    }
}
