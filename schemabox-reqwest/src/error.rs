//! Errors raised while building a transport.

use thiserror::Error;

/// Error returned by [`HttpTransportBuilder::build`](crate::HttpTransportBuilder::build).
#[derive(Debug, Error)]
pub enum BuildError {
    /// No endpoint was configured.
    #[error("at least one registry endpoint is required")]
    NoEndpoints,

    /// An endpoint is not a valid URL.
    #[error("invalid registry endpoint `{endpoint}`: {source}")]
    InvalidEndpoint {
        /// The endpoint as configured.
        endpoint: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// An endpoint URL has no path to append registry routes to
    /// (e.g. `mailto:` or `data:` URLs).
    #[error("registry endpoint `{0}` cannot be used as a base URL")]
    NotABase(String),

    /// The underlying HTTP client could not be created.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
