//! Metrics declaration and recording for the schema cache.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of schema cache hits.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "schemabox_cache_hit_total",
            "Total number of schema cache hits."
        );
        "schemabox_cache_hit_total"
    };
    /// Track number of schema cache misses.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "schemabox_cache_miss_total",
            "Total number of schema cache misses."
        );
        "schemabox_cache_miss_total"
    };
    /// Track number of misses served by another caller's in-flight fetch.
    pub static ref CACHE_COALESCED_COUNTER: &'static str = {
        metrics::describe_counter!(
            "schemabox_cache_coalesced_total",
            "Total number of cache misses served by an in-flight fetch."
        );
        "schemabox_cache_coalesced_total"
    };
}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_hit() {
    metrics::counter!(*CACHE_HIT_COUNTER).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_hit() {}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_miss() {
    metrics::counter!(*CACHE_MISS_COUNTER).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_miss() {}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_coalesced() {
    metrics::counter!(*CACHE_COALESCED_COUNTER).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_coalesced() {}
