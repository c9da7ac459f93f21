// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache telemetry.
//!
//! Every cache activity is emitted as a structured `tracing` event. With the `metrics`
//! feature enabled, activities are also counted and timed through OpenTelemetry.

use std::sync::Arc;
use std::time::Duration;

#[cfg(any(feature = "metrics", test))]
use opentelemetry::KeyValue;
#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::{Counter, Histogram, Meter, MeterProvider};

use crate::cache::CacheName;

pub(crate) mod attributes;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

/// Telemetry sink for a read-through cache.
///
/// Pass it to [`CacheBuilder::telemetry`](crate::CacheBuilder::telemetry). A cache built
/// without one records nothing.
///
/// # Examples
///
/// ```
/// use readthru::{CacheTelemetry, ReadThroughCache};
///
/// let cache = ReadThroughCache::builder()
///     .memory()
///     .name("student-courses")
///     .telemetry(CacheTelemetry::new(true))
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct CacheTelemetry {
    inner: Arc<CacheTelemetryInner>,
}

#[derive(Debug)]
struct CacheTelemetryInner {
    logging_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    event_counter: Option<Counter<u64>>,
    #[cfg(any(feature = "metrics", test))]
    operation_duration: Option<Histogram<f64>>,
}

impl CacheTelemetry {
    /// Creates a telemetry sink that emits `tracing` events when `logging_enabled` is set.
    #[must_use]
    pub fn new(logging_enabled: bool) -> Self {
        Self {
            inner: Arc::new(CacheTelemetryInner {
                logging_enabled,
                #[cfg(any(feature = "metrics", test))]
                event_counter: None,
                #[cfg(any(feature = "metrics", test))]
                operation_duration: None,
            }),
        }
    }

    /// Creates a telemetry sink that also records metrics on `meter`.
    #[cfg(any(feature = "metrics", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    #[must_use]
    pub fn with_meter(logging_enabled: bool, meter: &Meter) -> Self {
        Self {
            inner: Arc::new(CacheTelemetryInner {
                logging_enabled,
                event_counter: Some(metrics::create_event_counter(meter)),
                operation_duration: Some(metrics::create_operation_duration_histogram(meter)),
            }),
        }
    }

    /// Creates a telemetry sink that records metrics on a `readthru` meter obtained from
    /// `meter_provider`.
    #[cfg(any(feature = "metrics", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    #[must_use]
    pub fn with_meter_provider(logging_enabled: bool, meter_provider: &dyn MeterProvider) -> Self {
        Self::with_meter(logging_enabled, &metrics::create_meter(meter_provider))
    }

    pub(crate) fn record(&self, cache_name: CacheName, operation: CacheOperation, activity: CacheActivity, key: &str, duration: Duration) {
        #[cfg(any(feature = "metrics", test))]
        {
            let attrs = [
                KeyValue::new(attributes::CACHE_NAME, cache_name),
                KeyValue::new(attributes::CACHE_OPERATION_NAME, operation.as_str()),
                KeyValue::new(attributes::CACHE_ACTIVITY_NAME, activity.as_str()),
            ];

            if let Some(c) = &self.inner.event_counter {
                c.add(1, &attrs);
            }

            if let Some(h) = &self.inner.operation_duration {
                h.record(duration.as_secs_f64(), &attrs);
            }
        }

        if self.inner.logging_enabled {
            Self::emit(cache_name, operation, activity, key, duration);
        }
    }

    fn emit(cache_name: CacheName, operation: CacheOperation, activity: CacheActivity, key: &str, duration: Duration) {
        let op = operation.as_str();
        let ev = activity.as_str();
        let duration_ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

        // Tracing levels must be constant. Field names must match attributes.rs.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    cache.name = cache_name,
                    cache.operation = op,
                    cache.activity = ev,
                    cache.key = key,
                    cache.duration_ns = duration_ns,
                    "cache.event"
                )
            };
        }

        match activity.severity() {
            Severity::Error => emit_event!(error),
            Severity::Warn => emit_event!(warn),
            Severity::Info => emit_event!(info),
            Severity::Debug => emit_event!(debug),
        }
    }
}

pub(crate) trait CacheTelemetryExt {
    /// Records a cache activity if telemetry is configured.
    fn record(&self, name: CacheName, operation: CacheOperation, activity: CacheActivity, key: &str, duration: Duration);
}

impl CacheTelemetryExt for Option<CacheTelemetry> {
    fn record(&self, name: CacheName, operation: CacheOperation, activity: CacheActivity, key: &str, duration: Duration) {
        if let Some(t) = self {
            t.record(name, operation, activity, key, duration);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheOperation {
    Get,
    Populate,
    Invalidate,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "cache.get",
            Self::Populate => "cache.populate",
            Self::Invalidate => "cache.invalidate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    Hit,
    Miss,
    Corrupt,
    Joined,
    Populated,
    Absent,
    Invalidated,
    Cancelled,
    Error,
}

impl CacheActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::Corrupt => "cache.corrupt",
            Self::Joined => "cache.joined",
            Self::Populated => "cache.populated",
            Self::Absent => "cache.absent",
            Self::Invalidated => "cache.invalidated",
            Self::Cancelled => "cache.cancelled",
            Self::Error => "cache.error",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::Hit | Self::Miss | Self::Joined | Self::Absent => Severity::Debug,
            Self::Populated | Self::Invalidated | Self::Cancelled => Severity::Info,
            Self::Corrupt => Severity::Warn,
            Self::Error => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}
