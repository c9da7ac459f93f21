// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Read-through caching with per-key population coalescing.
//!
//! [`ReadThroughCache`] sits in front of a slow data source. Reads go to a
//! [`CacheBackend`](readthru_tier::CacheBackend) first; on a miss the caller's fallback
//! loads the value, which is stored as JSON under the key with the caller's
//! [`TtlPolicy`](readthru_tier::TtlPolicy) and returned.
//!
//! - Concurrent misses on one key share a single fallback call and its outcome.
//! - "Not found" is never cached.
//! - Backend failures surface as errors and never look like misses.
//! - Callers can stop waiting without cancelling the shared population.
//!
//! Keys are plain strings. The [`readthru_key`] crate renders the conventional
//! `prefix_uniqueId_suffix` shape.
//!
//! # Examples
//!
//! ```
//! use readthru::ReadThroughCache;
//! use readthru_tier::TtlPolicy;
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Course {
//!     id: u32,
//!     name: String,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), readthru::Error> {
//! let cache = ReadThroughCache::builder().memory().name("student-courses").build();
//! let ttl = TtlPolicy::sliding(Duration::from_secs(3600));
//!
//! let courses = cache
//!     .get("S_42_C", ttl, || async {
//!         Some(vec![Course { id: 1, name: "CS".into() }])
//!     })
//!     .await?;
//! assert_eq!(courses.map(|c| c.len()), Some(1));
//!
//! // Enrolling changes the list, so the entry is dropped and reloaded on the next read.
//! cache
//!     .update_then_invalidate("S_42_C", async { Ok::<_, std::io::Error>(()) })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `memory` (default): [`CacheBuilder::memory`] with the moka-backed
//!   [`InMemoryBackend`].
//! - `metrics`: OpenTelemetry counters and histograms through [`CacheTelemetry`].
//! - `test-util`: enables `readthru_tier::testing::MockBackend`.

pub mod builder;
pub mod cache;
mod codec;
pub mod error;
mod inflight;
mod telemetry;

#[doc(inline)]
pub use builder::{CacheBuilder, CorruptEntryPolicy};
#[doc(inline)]
pub use cache::{CacheName, ReadThroughCache};
#[doc(inline)]
pub use error::{BackendOperation, BoxError, Error, Result};
#[cfg(feature = "memory")]
#[doc(inline)]
pub use readthru_memory::InMemoryBackend;
#[doc(inline)]
pub use readthru_key::{CacheKey, KeyShape};
#[doc(inline)]
pub use readthru_tier::{CacheBackend, TtlPolicy};
#[doc(inline)]
pub use telemetry::CacheTelemetry;
#[doc(inline)]
pub use tokio_util::sync::CancellationToken;
