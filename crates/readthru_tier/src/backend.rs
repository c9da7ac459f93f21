// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for cache backends.

use std::sync::Arc;

use bytes::Bytes;

use crate::{Error, TtlPolicy};

/// A key-value store with per-entry expiration.
///
/// Every method may fail with a connectivity [`Error`]. A failed `get` must never be
/// reported as `Ok(None)`: callers rely on `Ok(None)` meaning the key really is absent.
///
/// `remove` of an absent key succeeds.
pub trait CacheBackend: Send + Sync {
    /// Reads the payload stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Bytes>, Error>> + Send;

    /// Stores `payload` under `key`, replacing any previous payload, with the given policy.
    fn set(&self, key: &str, payload: Bytes, ttl: TtlPolicy) -> impl Future<Output = Result<(), Error>> + Send;

    /// Removes `key`.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), Error>> + Send;
}

impl<B: CacheBackend> CacheBackend for Arc<B> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Bytes>, Error>> + Send {
        self.as_ref().get(key)
    }

    fn set(&self, key: &str, payload: Bytes, ttl: TtlPolicy) -> impl Future<Output = Result<(), Error>> + Send {
        self.as_ref().set(key, payload, ttl)
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), Error>> + Send {
        self.as_ref().remove(key)
    }
}
