#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use schemabox::{CachedClient, HttpTransport, RegistryClient, SchemaCodec};
use serde::{Deserialize, Serialize};

mod error;

pub use error::ConfigError;

/// Registry client configuration.
///
/// Durations use the humantime format (`"500ms"`, `"5s"`, `"1m"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Registry replica base URLs.
    pub endpoints: Vec<String>,
    /// Extra attempts after a connection failure or `5xx` response.
    #[serde(default)]
    pub retries: u32,
    /// Timeout for a single attempt.
    #[serde(default, with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
    /// Upper bound on a whole call, retries included.
    #[serde(default, with = "humantime_serde")]
    pub deadline: Option<Duration>,
    /// Schema cache settings.
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Schema cache settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheSettings {
    /// Cache compiled schemas by id.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Share one registry fetch between concurrent misses on the same id.
    /// Ignored when the cache is disabled.
    #[serde(default)]
    pub coalesce: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            coalesce: false,
        }
    }
}

impl RegistryConfig {
    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_saphyr::from_str(yaml)?)
    }

    /// Builds the configured transport, without a cache.
    pub fn into_transport<C>(self) -> Result<HttpTransport<C>, ConfigError>
    where
        C: SchemaCodec,
    {
        let mut builder = HttpTransport::<C>::builder()
            .endpoints(self.endpoints)
            .retries(self.retries);
        if let Some(timeout) = self.request_timeout {
            builder = builder.request_timeout(timeout);
        }
        if let Some(deadline) = self.deadline {
            builder = builder.deadline(deadline);
        }
        Ok(builder.build()?)
    }

    /// Builds the configured client: a transport, wrapped in a cache unless
    /// caching is disabled.
    pub fn into_client<C>(self) -> Result<Arc<dyn RegistryClient<Codec = C>>, ConfigError>
    where
        C: SchemaCodec,
    {
        let cache = self.cache;
        let transport = self.into_transport::<C>()?;
        let client: Arc<dyn RegistryClient<Codec = C>> = match cache {
            CacheSettings { enabled: false, .. } => Arc::new(transport),
            CacheSettings { coalesce: false, .. } => Arc::new(CachedClient::new(transport)),
            CacheSettings { coalesce: true, .. } => Arc::new(CachedClient::coalescing(transport)),
        };
        Ok(client)
    }
}
