// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// How long a stored payload stays in a backend.
///
/// # Examples
///
/// ```
/// use readthru_tier::TtlPolicy;
/// use std::time::Duration;
///
/// let ttl = TtlPolicy::sliding(Duration::from_secs(3600));
/// assert_eq!(ttl.duration(), Some(Duration::from_secs(3600)));
/// assert!(ttl.is_valid());
///
/// assert!(!TtlPolicy::absolute(Duration::ZERO).is_valid());
/// assert!(TtlPolicy::Never.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtlPolicy {
    /// Expires once the entry has not been read for the given duration.
    /// Every read pushes the deadline out again.
    Sliding(Duration),
    /// Expires the given duration after the entry was written, regardless of reads.
    Absolute(Duration),
    /// Stays until removed.
    Never,
}

impl TtlPolicy {
    /// Creates a sliding expiration policy.
    #[must_use]
    pub const fn sliding(idle: Duration) -> Self {
        Self::Sliding(idle)
    }

    /// Creates an absolute expiration policy.
    #[must_use]
    pub const fn absolute(lifetime: Duration) -> Self {
        Self::Absolute(lifetime)
    }

    /// Returns the configured duration, or `None` for [`TtlPolicy::Never`].
    #[must_use]
    pub const fn duration(self) -> Option<Duration> {
        match self {
            Self::Sliding(d) | Self::Absolute(d) => Some(d),
            Self::Never => None,
        }
    }

    /// Returns `true` if the policy can be applied: durations must be positive.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        match self.duration() {
            Some(d) => !d.is_zero(),
            None => true,
        }
    }

    /// Returns `true` for sliding expiration.
    #[must_use]
    pub const fn is_sliding(self) -> bool {
        matches!(self, Self::Sliding(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_durations_are_invalid() {
        assert!(!TtlPolicy::sliding(Duration::ZERO).is_valid());
        assert!(!TtlPolicy::absolute(Duration::ZERO).is_valid());
        assert!(TtlPolicy::sliding(Duration::from_nanos(1)).is_valid());
    }

    #[test]
    fn never_has_no_duration() {
        assert_eq!(TtlPolicy::Never.duration(), None);
        assert!(!TtlPolicy::Never.is_sliding());
        assert!(TtlPolicy::sliding(Duration::from_secs(1)).is_sliding());
    }
}
