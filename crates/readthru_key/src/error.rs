// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::KeyShape;

/// An error produced while building or parsing a cache key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum KeyError {
    /// A tag was set to the delimiter character.
    #[error("'{tag}' cannot be used as a key tag, it is the key delimiter")]
    ReservedTag {
        /// The rejected tag.
        tag: char,
    },

    /// The input is not of the form `{prefix}_{unique_id}_{suffix}`.
    #[error("'{raw}' is not a structured cache key")]
    Malformed {
        /// The rejected input.
        raw: String,
    },

    /// The input parsed, but its tags belong to another key family.
    #[error("key '{raw}' does not belong to the {expected} key family")]
    ShapeMismatch {
        /// The family the caller asked for.
        expected: KeyShape,
        /// The rejected input.
        raw: String,
    },

    /// The unique id could not be converted to the requested type.
    #[error("unique id '{unique_id}' is invalid: {reason}")]
    InvalidUniqueId {
        /// The textual id taken from the key.
        unique_id: String,
        /// Why the conversion failed.
        reason: String,
    },

    /// The unique id parsed, but renders to a different key.
    #[error("key '{raw}' is not canonical, it renders as '{canonical}'")]
    NonCanonical {
        /// The rejected input.
        raw: String,
        /// The rendering of the parsed parts.
        canonical: String,
    },
}
