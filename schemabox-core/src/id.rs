//! Identifiers used to address schemas in the registry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Registry-wide unique identifier of one schema.
///
/// Ids are assigned by the registry, independent of subject and version, and
/// are never reused for a different schema. This makes an id a safe key for
/// caching compiled schemas forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(pub u32);

impl SchemaId {
    /// Creates a new schema id.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw numeric id.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for SchemaId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<SchemaId> for u32 {
    fn from(id: SchemaId) -> Self {
        id.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Version selector for a subject.
///
/// Versions start at 1 and increase monotonically per subject. The registry
/// also accepts `latest` wherever a version number is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// An exact version number.
    Number(u32),
    /// The most recent version of the subject.
    Latest,
}

impl From<u32> for Version {
    fn from(version: u32) -> Self {
        Self::Number(version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(version) => version.fmt(f),
            Self::Latest => f.write_str("latest"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_renders_as_path_segment() {
        assert_eq!(Version::from(3).to_string(), "3");
        assert_eq!(Version::Latest.to_string(), "latest");
    }

    #[test]
    fn schema_id_is_a_plain_json_number() {
        let id: SchemaId = serde_json::from_str("42").unwrap();
        assert_eq!(id, SchemaId::new(42));
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }
}
