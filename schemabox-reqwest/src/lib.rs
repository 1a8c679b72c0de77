#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
pub mod metrics;
mod route;
mod transport;
mod wire;

pub use error::BuildError;
pub use transport::{HttpTransport, HttpTransportBuilder};
pub use wire::CONTENT_TYPE;

/// Re-export of the URL type endpoints are parsed into.
pub use reqwest::Url;
