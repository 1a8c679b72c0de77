//! JSON bodies exchanged with the registry.

use serde::{Deserialize, Serialize};
use schemabox_core::SchemaId;

/// Media type of every registry request and response.
pub const CONTENT_TYPE: &str = "application/vnd.schemaregistry.v1+json";

/// Request body of schema registration and lookup.
#[derive(Debug, Serialize)]
pub(crate) struct SchemaPayload<'a> {
    pub(crate) schema: &'a str,
}

/// Response of `GET /schemas/ids/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct SchemaResponse {
    pub(crate) schema: String,
}

/// Response of `GET /subjects/{subject}/versions/{version}`.
#[derive(Debug, Deserialize)]
pub(crate) struct SubjectVersionResponse {
    pub(crate) subject: String,
    pub(crate) version: u32,
    pub(crate) schema: String,
    pub(crate) id: SchemaId,
}

/// Response carrying the id of a registered schema.
#[derive(Debug, Deserialize)]
pub(crate) struct IdResponse {
    pub(crate) id: SchemaId,
}
