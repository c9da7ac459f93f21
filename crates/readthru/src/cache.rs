// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The read-through cache.

use std::convert::Infallible;
use std::sync::Arc;

use futures::FutureExt;
use readthru_tier::{CacheBackend, TtlPolicy};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::builder::{CacheBuilder, CorruptEntryPolicy};
use crate::error::{BackendOperation, BoxError};
use crate::inflight::{Attachment, PendingPopulations, PopulationOutcome};
use crate::telemetry::{CacheActivity, CacheOperation, CacheTelemetry, CacheTelemetryExt};
use crate::{Error, codec};

/// Type alias for cache names used in telemetry.
pub type CacheName = &'static str;

/// A cache-aside cache in front of a slow data source.
///
/// Values are looked up in the backend first. On a miss the caller's fallback produces
/// the value, which is stored under the key and returned. Concurrent misses on the same
/// key share one fallback call: the first caller starts a population, every other caller
/// waits for its outcome, value or error alike.
///
/// A fallback that returns `None` stores nothing, so the next lookup calls the data
/// source again.
///
/// Values are stored as JSON. A key should always be read with the same type.
///
/// # Examples
///
/// ```
/// use readthru::ReadThroughCache;
/// use readthru_key::KeyShape;
/// use readthru_tier::TtlPolicy;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), readthru::Error> {
/// const STUDENT_COURSES: KeyShape = KeyShape::new('S', 'C');
///
/// let cache = ReadThroughCache::builder().memory().build();
/// let key = STUDENT_COURSES.key(42);
///
/// let courses = cache
///     .get(key, TtlPolicy::sliding(Duration::from_secs(3600)), || async {
///         Some(vec!["CS".to_string()])
///     })
///     .await?;
/// assert_eq!(courses, Some(vec!["CS".to_string()]));
///
/// // Served from the backend without calling the data source.
/// let cached: Option<Vec<String>> = cache.get_cached("S_42_C").await?;
/// assert_eq!(cached, courses);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ReadThroughCache<B> {
    name: CacheName,
    backend: Arc<B>,
    pending: PendingPopulations,
    corrupt_entries: CorruptEntryPolicy,
    telemetry: Option<CacheTelemetry>,
}

impl ReadThroughCache<()> {
    /// Creates a builder for a read-through cache.
    #[must_use]
    pub fn builder() -> CacheBuilder<()> {
        CacheBuilder::new()
    }
}

impl<B> ReadThroughCache<B> {
    pub(crate) fn new(name: CacheName, backend: B, corrupt_entries: CorruptEntryPolicy, telemetry: Option<CacheTelemetry>) -> Self {
        Self {
            name,
            backend: Arc::new(backend),
            pending: PendingPopulations::new(),
            corrupt_entries,
            telemetry,
        }
    }

    /// Returns the name reported in telemetry.
    #[must_use]
    pub fn name(&self) -> CacheName {
        self.name
    }

    /// Returns the backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the number of keys currently being populated.
    #[must_use]
    pub fn pending_populations(&self) -> usize {
        self.pending.len()
    }
}

impl<B: CacheBackend + 'static> ReadThroughCache<B> {
    /// Returns the value for `key`, populating it from `fallback` on a miss.
    ///
    /// `fallback` runs at most once per key at a time across all callers of this cache.
    /// It returns `None` when the data source has nothing for the key; nothing is stored
    /// then and `Ok(None)` is returned.
    ///
    /// Dropping the returned future stops waiting but does not stop a population that
    /// already started: the value is still stored.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidKey`] or [`Error::InvalidTtl`] when the arguments are rejected.
    /// * [`Error::BackendUnavailable`] when the backend fails. A failing read never
    ///   falls through to the data source.
    /// * [`Error::CorruptEntry`] when the stored payload does not decode into `T`.
    /// * [`Error::Encode`] when the produced value cannot be encoded, or its encoding does
    ///   not decode back into `T` (for example a non-finite float). Nothing is stored then.
    /// * [`Error::DataSource`] when the fallback panics.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context, since a population runs as
    /// its own task.
    pub async fn get<T, F, Fut>(&self, key: impl AsRef<str>, ttl: TtlPolicy, fallback: F) -> Result<Option<T>, Error>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Option<T>> + Send + 'static,
    {
        self.try_get(key, ttl, move || fallback().map(Ok::<_, Infallible>)).await
    }

    /// Like [`get`](Self::get), for a data source that can fail.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get). An error returned by `fallback` is reported as
    /// [`Error::DataSource`] to every caller waiting on the population, and nothing is
    /// stored.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context, since a population runs as
    /// its own task.
    pub async fn try_get<T, E, F, Fut>(&self, key: impl AsRef<str>, ttl: TtlPolicy, fallback: F) -> Result<Option<T>, Error>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        E: Into<BoxError> + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<T>, E>> + Send + 'static,
    {
        let key = key.as_ref();
        validate_key(key)?;
        validate_ttl(ttl)?;

        if let Some(value) = self.lookup(key, self.corrupt_entries).await? {
            return Ok(Some(value));
        }

        let owned_key = key.to_owned();
        let produce = async move {
            match fallback().await {
                Ok(Some(value)) => codec::encode_checked(&owned_key, &value).map(Some),
                Ok(None) => Ok(None),
                Err(source) => Err(Error::data_source(&owned_key, source)),
            }
        };

        match self.populate(key, ttl, produce).await? {
            Some(payload) => codec::decode(key, &payload).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`try_get`](Self::try_get), for a synchronous data source.
    ///
    /// `fallback` runs on Tokio's blocking pool.
    ///
    /// # Errors
    ///
    /// As [`try_get`](Self::try_get).
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    pub async fn try_get_blocking<T, E, F>(&self, key: impl AsRef<str>, ttl: TtlPolicy, fallback: F) -> Result<Option<T>, Error>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        E: Into<BoxError> + Send + 'static,
        F: FnOnce() -> Result<Option<T>, E> + Send + 'static,
    {
        self.try_get(key, ttl, move || async move {
            match tokio::task::spawn_blocking(fallback).await {
                Ok(outcome) => outcome.map_err(Into::into),
                Err(aborted) => Err(BoxError::from(aborted)),
            }
        })
        .await
    }

    /// Like [`try_get`](Self::try_get), but stops waiting once `cancellation` fires.
    ///
    /// Cancelling affects only this caller. A population already started keeps running
    /// for the other callers and still stores its value.
    ///
    /// # Errors
    ///
    /// As [`try_get`](Self::try_get), plus [`Error::Cancelled`] when the token fires first.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    pub async fn try_get_cancellable<T, E, F, Fut>(
        &self,
        key: impl AsRef<str>,
        ttl: TtlPolicy,
        cancellation: &CancellationToken,
        fallback: F,
    ) -> Result<Option<T>, Error>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        E: Into<BoxError> + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<T>, E>> + Send + 'static,
    {
        let key = key.as_ref();
        validate_key(key)?;
        validate_ttl(ttl)?;
        let started = Instant::now();

        tokio::select! {
            biased;
            () = cancellation.cancelled() => {
                self.telemetry.record(self.name, CacheOperation::Get, CacheActivity::Cancelled, key, started.elapsed());
                Err(Error::cancelled(key))
            }
            result = self.try_get(key, ttl, fallback) => result,
        }
    }

    /// Returns the stored value for `key` without ever calling a data source.
    ///
    /// `Ok(None)` means nothing is stored. A corrupt payload is always an error here,
    /// whatever [`CorruptEntryPolicy`] the cache was built with, since there is no
    /// population to replace it.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKey`], [`Error::BackendUnavailable`] or [`Error::CorruptEntry`],
    /// with the same meaning as for [`get`](Self::get).
    pub async fn get_cached<T: DeserializeOwned>(&self, key: impl AsRef<str>) -> Result<Option<T>, Error> {
        let key = key.as_ref();
        validate_key(key)?;
        self.lookup(key, CorruptEntryPolicy::Surface).await
    }

    /// Removes the stored value for `key`.
    ///
    /// Removing an absent key succeeds. A population in flight for the key is not
    /// affected and may store its value afterwards.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKey`] or [`Error::BackendUnavailable`].
    pub async fn invalidate(&self, key: impl AsRef<str>) -> Result<(), Error> {
        let key = key.as_ref();
        validate_key(key)?;

        let started = Instant::now();
        let result = self.backend.remove(key).await;
        let elapsed = started.elapsed();

        match result {
            Ok(()) => {
                self.telemetry.record(self.name, CacheOperation::Invalidate, CacheActivity::Invalidated, key, elapsed);
                Ok(())
            }
            Err(source) => {
                self.telemetry.record(self.name, CacheOperation::Invalidate, CacheActivity::Error, key, elapsed);
                Err(Error::backend(key, BackendOperation::Remove, source))
            }
        }
    }

    /// Like [`invalidate`](Self::invalidate), but stops waiting once `cancellation` fires.
    ///
    /// The removal may still reach the backend after cancellation.
    ///
    /// # Errors
    ///
    /// As [`invalidate`](Self::invalidate), plus [`Error::Cancelled`].
    pub async fn invalidate_cancellable(&self, key: impl AsRef<str>, cancellation: &CancellationToken) -> Result<(), Error> {
        let key = key.as_ref();
        validate_key(key)?;
        let started = Instant::now();

        tokio::select! {
            biased;
            () = cancellation.cancelled() => {
                self.telemetry.record(self.name, CacheOperation::Invalidate, CacheActivity::Cancelled, key, started.elapsed());
                Err(Error::cancelled(key))
            }
            result = self.invalidate(key) => result,
        }
    }

    /// Runs `write` against the data source, then invalidates `key`.
    ///
    /// Use this for commands that change what `key` would load, so the next read
    /// repopulates it.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidKey`] before `write` runs.
    /// * [`Error::DataSource`] when `write` fails; the stored value is left untouched.
    /// * [`Error::BackendUnavailable`] when the write succeeded but the invalidation failed.
    pub async fn update_then_invalidate<R, E, W>(&self, key: impl AsRef<str>, write: W) -> Result<R, Error>
    where
        E: Into<BoxError>,
        W: Future<Output = Result<R, E>>,
    {
        let key = key.as_ref();
        validate_key(key)?;

        let outcome = write.await.map_err(|source| Error::data_source(key, source))?;
        self.invalidate(key).await?;
        Ok(outcome)
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str, corrupt_entries: CorruptEntryPolicy) -> Result<Option<T>, Error> {
        let started = Instant::now();
        let fetched = self.backend.get(key).await;
        let elapsed = started.elapsed();

        let payload = match fetched {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                self.telemetry.record(self.name, CacheOperation::Get, CacheActivity::Miss, key, elapsed);
                return Ok(None);
            }
            Err(source) => {
                self.telemetry.record(self.name, CacheOperation::Get, CacheActivity::Error, key, elapsed);
                return Err(Error::backend(key, BackendOperation::Get, source));
            }
        };

        match codec::decode(key, &payload) {
            Ok(value) => {
                self.telemetry.record(self.name, CacheOperation::Get, CacheActivity::Hit, key, elapsed);
                Ok(Some(value))
            }
            Err(error) => match corrupt_entries {
                CorruptEntryPolicy::Surface => {
                    self.telemetry.record(self.name, CacheOperation::Get, CacheActivity::Error, key, elapsed);
                    Err(error)
                }
                CorruptEntryPolicy::TreatAsMiss => {
                    // Logged regardless of telemetry settings, the caller never sees this error.
                    tracing::warn!(
                        cache.name = self.name,
                        cache.key = key,
                        error = %error,
                        "corrupt cache entry replaced by a fresh population"
                    );
                    self.telemetry.record(self.name, CacheOperation::Get, CacheActivity::Corrupt, key, elapsed);
                    Ok(None)
                }
            },
        }
    }

    async fn populate<P>(&self, key: &str, ttl: TtlPolicy, produce: P) -> PopulationOutcome
    where
        P: Future<Output = PopulationOutcome> + Send + 'static,
    {
        let attachment = self.pending.join_or_start(key, || {
            run_population(
                Arc::clone(&self.backend),
                self.telemetry.clone(),
                self.name,
                key.to_owned(),
                ttl,
                produce,
            )
            .boxed()
        });

        match attachment {
            Attachment::Started(population) => population.await,
            Attachment::Joined(population) => {
                let started = Instant::now();
                let outcome = population.await;
                self.telemetry.record(self.name, CacheOperation::Populate, CacheActivity::Joined, key, started.elapsed());
                outcome
            }
        }
    }
}

/// Produces a value and stores it. Runs as its own task, detached from any caller.
async fn run_population<B, P>(
    backend: Arc<B>,
    telemetry: Option<CacheTelemetry>,
    name: CacheName,
    key: String,
    ttl: TtlPolicy,
    produce: P,
) -> PopulationOutcome
where
    B: CacheBackend,
    P: Future<Output = PopulationOutcome>,
{
    let started = Instant::now();
    let outcome = store(&*backend, &key, ttl, produce).await;

    let activity = match &outcome {
        Ok(Some(_)) => CacheActivity::Populated,
        Ok(None) => CacheActivity::Absent,
        Err(_) => CacheActivity::Error,
    };
    telemetry.record(name, CacheOperation::Populate, activity, &key, started.elapsed());

    outcome
}

async fn store<B, P>(backend: &B, key: &str, ttl: TtlPolicy, produce: P) -> PopulationOutcome
where
    B: CacheBackend,
    P: Future<Output = PopulationOutcome>,
{
    let Some(payload) = produce.await? else {
        return Ok(None);
    };

    backend
        .set(key, payload.clone(), ttl)
        .await
        .map_err(|source| Error::backend(key, BackendOperation::Set, source))?;

    Ok(Some(payload))
}

fn validate_key(key: &str) -> Result<(), Error> {
    if key.is_empty() {
        return Err(Error::InvalidKey {
            reason: "key must not be empty",
        });
    }
    Ok(())
}

fn validate_ttl(ttl: TtlPolicy) -> Result<(), Error> {
    if ttl.is_valid() { Ok(()) } else { Err(Error::InvalidTtl) }
}
