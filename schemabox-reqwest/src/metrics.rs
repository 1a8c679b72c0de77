//! Metrics declaration and recording for the transport.

use std::time::Duration;

use reqwest::Url;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of request attempts per endpoint and outcome.
    pub static ref TRANSPORT_ATTEMPTS: &'static str = {
        metrics::describe_counter!(
            "schemabox_transport_attempts_total",
            "Total number of registry request attempts."
        );
        "schemabox_transport_attempts_total"
    };
    /// Track number of retried attempts.
    pub static ref TRANSPORT_RETRIES: &'static str = {
        metrics::describe_counter!(
            "schemabox_transport_retries_total",
            "Total number of registry request attempts that were retried."
        );
        "schemabox_transport_retries_total"
    };
    /// Histogram of logical call duration, retries included.
    pub static ref TRANSPORT_CALL_DURATION: &'static str = {
        metrics::describe_histogram!(
            "schemabox_transport_call_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of registry calls in seconds, retries included."
        );
        "schemabox_transport_call_duration_seconds"
    };
}

/// Record one attempt against `endpoint`.
#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_attempt(endpoint: &Url, outcome: &'static str) {
    metrics::counter!(
        *TRANSPORT_ATTEMPTS,
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_attempt(_endpoint: &Url, _outcome: &'static str) {}

/// Record that an attempt is about to be retried.
#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_retry() {
    metrics::counter!(*TRANSPORT_RETRIES).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_retry() {}

/// Record the duration of a whole logical call.
#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_call(route: &'static str, duration: Duration) {
    metrics::histogram!(*TRANSPORT_CALL_DURATION, "route" => route)
        .record(duration.as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_call(_route: &'static str, _duration: Duration) {}
