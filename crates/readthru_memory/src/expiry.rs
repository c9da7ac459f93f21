// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-entry expiration driven by the policy stored with each payload.

use std::time::{Duration, Instant};

use bytes::Bytes;
use moka::Expiry;
use readthru_tier::TtlPolicy;

/// A payload together with the policy it was written with.
#[derive(Debug, Clone)]
pub(crate) struct StoredPayload {
    pub(crate) payload: Bytes,
    pub(crate) ttl: TtlPolicy,
}

/// Maps [`TtlPolicy`] onto moka's per-entry expiration hooks.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PolicyExpiry;

impl Expiry<String, StoredPayload> for PolicyExpiry {
    fn expire_after_create(&self, _key: &String, value: &StoredPayload, _created_at: Instant) -> Option<Duration> {
        value.ttl.duration()
    }

    fn expire_after_read(
        &self,
        _key: &String,
        value: &StoredPayload,
        _read_at: Instant,
        duration_until_expiry: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        match value.ttl {
            TtlPolicy::Sliding(idle) => Some(idle),
            TtlPolicy::Absolute(_) | TtlPolicy::Never => duration_until_expiry,
        }
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredPayload,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // An overwrite starts a fresh lifetime under the new policy.
        value.ttl.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(ttl: TtlPolicy) -> StoredPayload {
        StoredPayload {
            payload: Bytes::from_static(b"v"),
            ttl,
        }
    }

    #[test]
    fn sliding_read_resets_deadline() {
        let now = Instant::now();
        let value = stored(TtlPolicy::sliding(Duration::from_secs(10)));
        let remaining = PolicyExpiry.expire_after_read(&"k".to_owned(), &value, now, Some(Duration::from_secs(1)), now);
        assert_eq!(remaining, Some(Duration::from_secs(10)));
    }

    #[test]
    fn absolute_read_keeps_deadline() {
        let now = Instant::now();
        let value = stored(TtlPolicy::absolute(Duration::from_secs(10)));
        let remaining = PolicyExpiry.expire_after_read(&"k".to_owned(), &value, now, Some(Duration::from_secs(1)), now);
        assert_eq!(remaining, Some(Duration::from_secs(1)));
    }

    #[test]
    fn never_has_no_deadline() {
        let value = stored(TtlPolicy::Never);
        assert_eq!(PolicyExpiry.expire_after_create(&"k".to_owned(), &value, Instant::now()), None);
    }
}
