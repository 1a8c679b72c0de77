use std::fmt;
use std::sync::Arc;

use serde::de::IgnoredAny;
use thiserror::Error;

/// Schema text that could not be compiled into a codec.
#[derive(Debug, Error)]
#[error("invalid schema: {source}")]
pub struct CodecError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl CodecError {
    /// Wraps the error reported by a schema compiler.
    pub fn new<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self {
            source: source.into(),
        }
    }
}

/// Compiled, ready-to-use form of registry schema text.
///
/// The registry stores schemas as text; a codec is what a caller actually
/// works with. Codecs are immutable once compiled and are cloned out of the
/// cache on every hit, so implementations should make `Clone` cheap
/// (usually by sharing the compiled form behind an [`Arc`]).
///
/// Two codecs are equal when their schema text is equal.
pub trait SchemaCodec: Clone + Send + Sync + 'static {
    /// Compiles schema text as returned by the registry.
    fn compile(schema: &str) -> Result<Self, CodecError>;

    /// Returns the schema text this codec was compiled from.
    fn schema(&self) -> &str;
}

/// Codec that keeps the schema text without interpreting it.
///
/// Compilation only checks that the text is well-formed JSON, which holds
/// for every schema format the registry serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawSchema(Arc<str>);

impl SchemaCodec for RawSchema {
    fn compile(schema: &str) -> Result<Self, CodecError> {
        serde_json::from_str::<IgnoredAny>(schema).map_err(CodecError::new)?;
        Ok(Self(Arc::from(schema)))
    }

    fn schema(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RawSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Avro codec backed by [`apache_avro::Schema`].
///
/// Keeps the registry's original text next to the parsed schema, so
/// [`schema`](SchemaCodec::schema) returns exactly what the registry sent.
#[cfg(feature = "avro")]
#[cfg_attr(docsrs, doc(cfg(feature = "avro")))]
#[derive(Clone)]
pub struct AvroCodec {
    text: Arc<str>,
    parsed: Arc<apache_avro::Schema>,
}

#[cfg(feature = "avro")]
impl AvroCodec {
    /// Returns the parsed avro schema.
    pub fn avro_schema(&self) -> &apache_avro::Schema {
        &self.parsed
    }
}

#[cfg(feature = "avro")]
impl SchemaCodec for AvroCodec {
    fn compile(schema: &str) -> Result<Self, CodecError> {
        let parsed = apache_avro::Schema::parse_str(schema).map_err(CodecError::new)?;
        Ok(Self {
            text: Arc::from(schema),
            parsed: Arc::new(parsed),
        })
    }

    fn schema(&self) -> &str {
        &self.text
    }
}

#[cfg(feature = "avro")]
impl PartialEq for AvroCodec {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

#[cfg(feature = "avro")]
impl Eq for AvroCodec {}

#[cfg(feature = "avro")]
impl fmt::Debug for AvroCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvroCodec")
            .field("schema", &self.text)
            .finish()
    }
}
