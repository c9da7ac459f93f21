// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! In-memory cache backend backed by moka.
//!
//! This crate provides [`InMemoryBackend`], a concurrent in-memory implementation of
//! [`readthru_tier::CacheBackend`] that honors each entry's [`readthru_tier::TtlPolicy`].
//! Use [`InMemoryBackendBuilder`] to bound capacity without exposing moka types.
//!
//! # Quick Start
//!
//! ```
//! use bytes::Bytes;
//! use readthru_memory::InMemoryBackend;
//! use readthru_tier::{CacheBackend, TtlPolicy};
//! use std::time::Duration;
//!
//! # futures::executor::block_on(async {
//! let backend = InMemoryBackend::builder().max_capacity(1000).build();
//!
//! backend
//!     .set("S_42_C", Bytes::from_static(b"[]"), TtlPolicy::sliding(Duration::from_secs(300)))
//!     .await?;
//! assert_eq!(backend.get("S_42_C").await?, Some(Bytes::from_static(b"[]")));
//! # Ok::<(), readthru_tier::Error>(())
//! # });
//! ```

pub mod backend;
pub mod builder;
mod expiry;

#[doc(inline)]
pub use backend::InMemoryBackend;
#[doc(inline)]
pub use builder::InMemoryBackendBuilder;
