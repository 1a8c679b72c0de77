#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Synchronous calling model.
///
/// [`BlockingClient`](blocking::BlockingClient) runs any registry client on
/// its own runtime so plain threads can share it.
pub mod blocking;

mod cache;

/// Coordination of concurrent cache misses.
///
/// When many callers miss on the same uncached id at once, each of them
/// calls the registry by default. [`BroadcastConcurrencyManager`](concurrency::BroadcastConcurrencyManager)
/// lets one caller fetch while the others wait for its result.
pub mod concurrency;

/// Metrics collection for cache observability.
///
/// When the `metrics` feature is enabled, this module provides counters for
/// cache hits, misses and coalesced misses.
pub mod metrics;

pub use cache::CachedClient;
pub use concurrency::{BroadcastConcurrencyManager, ConcurrencyManager, NoopConcurrencyManager};

#[cfg(feature = "avro")]
pub use schemabox_core::AvroCodec;
pub use schemabox_core::{
    ClientError, CodecError, DecodeError, RawSchema, RegistryClient, RegistryError,
    RegistryResult, SchemaCodec, SchemaId, Version, error,
};
pub use schemabox_reqwest::{BuildError, CONTENT_TYPE, HttpTransport, HttpTransportBuilder, Url};

/// The `schemabox` prelude.
///
/// Provides convenient access to the most commonly used types:
///
/// ```rust
/// use schemabox::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "avro")]
    pub use crate::AvroCodec;
    pub use crate::{
        CachedClient, ClientError, HttpTransport, RawSchema, RegistryClient, SchemaCodec,
        SchemaId, Version,
    };
}
