// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::{CacheKey, DELIMITER, KeyError, key};

/// The prefix and suffix tags that identify a family of cache keys.
///
/// Families differ only in their tags, so each one is a constant of this type:
///
/// ```
/// use readthru_key::KeyShape;
///
/// const STUDENT_COURSES: KeyShape = KeyShape::new('S', 'C');
/// const INSTRUCTOR_CLASSES: KeyShape = KeyShape::new('T', 'K');
///
/// assert_ne!(STUDENT_COURSES.key(7).as_str(), INSTRUCTOR_CLASSES.key(7).as_str());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyShape {
    prefix: char,
    suffix: char,
}

impl KeyShape {
    /// Creates a key family from its tags.
    ///
    /// # Panics
    ///
    /// Panics if either tag is the [`DELIMITER`]. When used to initialize a `const`, this is
    /// reported at compile time. Use [`KeyShape::try_new`] for tags that come from input.
    #[must_use]
    pub const fn new(prefix: char, suffix: char) -> Self {
        assert!(prefix != DELIMITER && suffix != DELIMITER, "key tags cannot be the delimiter");
        Self { prefix, suffix }
    }

    /// Creates a key family from tags that are not known to be valid.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::ReservedTag`] if either tag is the [`DELIMITER`].
    pub fn try_new(prefix: char, suffix: char) -> Result<Self, KeyError> {
        for tag in [prefix, suffix] {
            if tag == DELIMITER {
                return Err(KeyError::ReservedTag { tag });
            }
        }
        Ok(Self { prefix, suffix })
    }

    /// Returns the prefix tag.
    #[must_use]
    pub const fn prefix(self) -> char {
        self.prefix
    }

    /// Returns the suffix tag.
    #[must_use]
    pub const fn suffix(self) -> char {
        self.suffix
    }

    /// Builds the key of this family for `unique_id`.
    pub fn key<I: Display>(self, unique_id: I) -> CacheKey<I> {
        CacheKey::new(self, unique_id)
    }

    /// Parses a rendered key and checks that it belongs to this family.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::ShapeMismatch`] when the tags differ from this family's tags,
    /// or any error [`parse`](crate::parse) can return.
    pub fn parse<I>(self, raw: &str) -> Result<CacheKey<I>, KeyError>
    where
        I: FromStr + Display,
        I::Err: Display,
    {
        let key = key::parse::<I>(raw)?;
        if key.shape() == self {
            Ok(key)
        } else {
            Err(KeyError::ShapeMismatch {
                expected: self,
                raw: raw.to_owned(),
            })
        }
    }
}

impl Display for KeyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{DELIMITER}*{DELIMITER}{}", self.prefix, self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUDENT_COURSES: KeyShape = KeyShape::new('S', 'C');

    #[test]
    fn try_new_rejects_delimiter_tags() {
        assert_eq!(KeyShape::try_new('_', 'C'), Err(KeyError::ReservedTag { tag: '_' }));
        assert_eq!(KeyShape::try_new('S', '_'), Err(KeyError::ReservedTag { tag: '_' }));
        assert_eq!(KeyShape::try_new('S', 'C'), Ok(STUDENT_COURSES));
    }

    #[test]
    #[should_panic]
    fn new_panics_on_delimiter_tag() {
        let _ = KeyShape::new('S', DELIMITER);
    }

    #[test]
    fn display_shows_the_family_pattern() {
        assert_eq!(STUDENT_COURSES.to_string(), "S_*_C");
    }

    #[test]
    fn parse_rejects_other_families() {
        let err = STUDENT_COURSES.parse::<u32>("T_42_C").unwrap_err();
        assert_eq!(
            err,
            KeyError::ShapeMismatch {
                expected: STUDENT_COURSES,
                raw: "T_42_C".to_owned(),
            }
        );
    }
}
