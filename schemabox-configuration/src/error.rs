use schemabox::BuildError;
use thiserror::Error;

/// Errors raised while loading a configuration or building a client from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document did not match the configuration schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_saphyr::Error),
    /// The configuration parsed but describes an unusable transport.
    #[error(transparent)]
    Build(#[from] BuildError),
}
