// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::{DELIMITER, KeyError, KeyShape};

/// Renders a key triple as `"{prefix}_{unique_id}_{suffix}"`.
///
/// This never fails and never escapes anything.
///
/// ```
/// assert_eq!(readthru_key::serialize('S', 42, 'C'), "S_42_C");
/// ```
pub fn serialize(prefix: char, unique_id: impl Display, suffix: char) -> String {
    format!("{prefix}{DELIMITER}{unique_id}{DELIMITER}{suffix}")
}

/// Parses a rendered key back into its parts.
///
/// The prefix and suffix are the first and last characters, the unique id is everything
/// between the first and the last delimiter.
///
/// Only canonical renderings are accepted: rendering the parsed id again must give back
/// `raw`. `"S_042_C"` is rejected for a numeric id, because [`serialize`] renders 42 as
/// `"S_42_C"` and the two strings would address different backend entries.
///
/// # Errors
///
/// Returns [`KeyError::Malformed`] when `raw` does not have the key layout,
/// [`KeyError::ReservedTag`] when a tag is the delimiter,
/// [`KeyError::InvalidUniqueId`] when the id does not parse as `I`, and
/// [`KeyError::NonCanonical`] when the id parses but renders differently.
///
/// ```
/// let key = readthru_key::parse::<String>("S_a_b_C")?;
/// assert_eq!(key.unique_id(), "a_b");
/// # Ok::<(), readthru_key::KeyError>(())
/// ```
pub fn parse<I>(raw: &str) -> Result<CacheKey<I>, KeyError>
where
    I: FromStr + Display,
    I::Err: Display,
{
    let malformed = || KeyError::Malformed { raw: raw.to_owned() };

    let mut chars = raw.chars();
    let prefix = chars.next().ok_or_else(malformed)?;
    let suffix = chars.next_back().ok_or_else(malformed)?;
    let id = chars
        .as_str()
        .strip_prefix(DELIMITER)
        .and_then(|rest| rest.strip_suffix(DELIMITER))
        .ok_or_else(malformed)?;

    let shape = KeyShape::try_new(prefix, suffix)?;
    let unique_id = id.parse::<I>().map_err(|e| KeyError::InvalidUniqueId {
        unique_id: id.to_owned(),
        reason: e.to_string(),
    })?;

    let key = CacheKey::new(shape, unique_id);
    if key.as_str() != raw {
        return Err(KeyError::NonCanonical {
            raw: raw.to_owned(),
            canonical: key.into_string(),
        });
    }
    Ok(key)
}

/// An immutable cache key: a [`KeyShape`] plus a unique id, together with its rendering.
///
/// The rendered form is computed once at construction. It is what backends store under,
/// and what `AsRef<str>` and `Display` expose.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey<I> {
    shape: KeyShape,
    unique_id: I,
    rendered: String,
}

impl<I: Display> CacheKey<I> {
    /// Creates a key of the given family.
    pub fn new(shape: KeyShape, unique_id: I) -> Self {
        let rendered = serialize(shape.prefix(), &unique_id, shape.suffix());
        Self {
            shape,
            unique_id,
            rendered,
        }
    }
}

impl<I> CacheKey<I> {
    /// Returns the key family.
    #[must_use]
    pub fn shape(&self) -> KeyShape {
        self.shape
    }

    /// Returns the prefix tag.
    #[must_use]
    pub fn prefix(&self) -> char {
        self.shape.prefix()
    }

    /// Returns the suffix tag.
    #[must_use]
    pub fn suffix(&self) -> char {
        self.shape.suffix()
    }

    /// Returns the unique id.
    #[must_use]
    pub fn unique_id(&self) -> &I {
        &self.unique_id
    }

    /// Returns the rendered key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// Consumes the key and returns the rendered form.
    #[must_use]
    pub fn into_string(self) -> String {
        self.rendered
    }
}

impl<I> AsRef<str> for CacheKey<I> {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

impl<I> Display for CacheKey<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl<I> From<CacheKey<I>> for String {
    fn from(key: CacheKey<I>) -> Self {
        key.rendered
    }
}
