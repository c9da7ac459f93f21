// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Backend abstractions for read-through caches.
//!
//! This crate defines the [`CacheBackend`] trait that every store placed behind a
//! read-through cache must satisfy, the [`TtlPolicy`] attached to each stored payload,
//! and the [`Error`] a backend reports when it cannot be reached.
//!
//! # Overview
//!
//! Backends are deliberately dumb: they store bytes under string keys and expire them.
//! Serialization, stampede protection and the error taxonomy seen by callers live in
//! `readthru`.
//!
//! The one thing a backend must get right is the difference between a key that is absent
//! (`Ok(None)`) and a store that could not be asked (`Err(_)`).
//!
//! # Implementing a Backend
//!
//! ```
//! use bytes::Bytes;
//! use readthru_tier::{CacheBackend, Error, TtlPolicy};
//! use std::collections::HashMap;
//! use std::sync::RwLock;
//!
//! struct SimpleBackend(RwLock<HashMap<String, Bytes>>);
//!
//! impl CacheBackend for SimpleBackend {
//!     async fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
//!         Ok(self.0.read().unwrap().get(key).cloned())
//!     }
//!
//!     async fn set(&self, key: &str, payload: Bytes, _ttl: TtlPolicy) -> Result<(), Error> {
//!         self.0.write().unwrap().insert(key.to_owned(), payload);
//!         Ok(())
//!     }
//!
//!     async fn remove(&self, key: &str) -> Result<(), Error> {
//!         self.0.write().unwrap().remove(key);
//!         Ok(())
//!     }
//! }
//! ```

mod backend;
pub mod error;
#[cfg(any(feature = "test-util", test))]
pub mod testing;
mod ttl;

#[doc(inline)]
pub use backend::CacheBackend;
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use ttl::TtlPolicy;
