// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Structured cache keys.
//!
//! A cache key is a triple of a prefix tag, a unique identifier and a suffix tag, rendered
//! as `"{prefix}_{unique_id}_{suffix}"`. The rendering is deterministic: equal triples
//! always produce the same string and therefore address the same cache entry.
//!
//! Key families are modeled as [`KeyShape`] constants rather than one type per family:
//!
//! ```
//! use readthru_key::KeyShape;
//!
//! const STUDENT_COURSES: KeyShape = KeyShape::new('S', 'C');
//!
//! let key = STUDENT_COURSES.key(42);
//! assert_eq!(key.as_str(), "S_42_C");
//!
//! let parsed = STUDENT_COURSES.parse::<u32>("S_42_C")?;
//! assert_eq!(*parsed.unique_id(), 42);
//! # Ok::<(), readthru_key::KeyError>(())
//! ```
//!
//! # Limitations
//!
//! The unique id is written verbatim, the delimiter is not escaped. Since both tags are
//! exactly one character wide, parsing still recovers ids that contain the delimiter, but
//! no normalization is applied to the id's textual form.

mod error;
mod key;
mod shape;

#[doc(inline)]
pub use error::KeyError;
#[doc(inline)]
pub use key::{CacheKey, parse, serialize};
#[doc(inline)]
pub use shape::KeyShape;

/// Separates the prefix, unique id and suffix of a rendered key.
pub const DELIMITER: char = '_';
