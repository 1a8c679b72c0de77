#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// The [`RegistryClient`] trait and its forwarding implementations.
pub mod client;

/// Compiling registry schema text into ready-to-use codecs.
///
/// Defines the [`SchemaCodec`] seam and the codecs shipped with schemabox:
/// - [`RawSchema`]: keeps well-formed JSON schema text as-is
/// - [`AvroCodec`]: parses the text with `apache-avro` (feature `avro`)
pub mod codec;

/// Error types for registry operations.
///
/// Defines [`ClientError`] which covers:
/// - Transport errors (connection failures, timeouts)
/// - Registry errors (well-formed error responses)
/// - Decode errors (malformed bodies, uncompilable schemas)
pub mod error;

mod id;

pub use client::{RegistryClient, RegistryResult};
#[cfg(feature = "avro")]
pub use codec::AvroCodec;
pub use codec::{CodecError, RawSchema, SchemaCodec};
pub use error::{ClientError, DecodeError, RegistryError};
pub use id::{SchemaId, Version};
