use std::sync::Arc;

use async_trait::async_trait;

use crate::{ClientError, SchemaCodec, SchemaId, Version};

/// Result type of registry operations.
pub type RegistryResult<T> = Result<T, ClientError>;

/// The operations a schema registry client offers.
///
/// Implemented by the HTTP transport and by the caching client that wraps
/// it. Anything generic over `RegistryClient` can be handed a test double.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Codec produced for schemas returned by the registry.
    type Codec: SchemaCodec;

    /// Fetches the schema with the given id.
    async fn get_schema(&self, id: SchemaId) -> RegistryResult<Self::Codec>;

    /// Lists every subject, in registry order.
    async fn get_subjects(&self) -> RegistryResult<Vec<String>>;

    /// Lists the versions registered under a subject.
    async fn get_versions(&self, subject: &str) -> RegistryResult<Vec<u32>>;

    /// Fetches one version of a subject.
    async fn get_schema_by_version(
        &self,
        subject: &str,
        version: Version,
    ) -> RegistryResult<Self::Codec>;

    /// Registers schema text under a subject and returns its id.
    ///
    /// Registering text the subject already holds returns the existing id;
    /// that is a registry guarantee the client relies on, not something it
    /// enforces.
    async fn create_subject(&self, subject: &str, schema: &str) -> RegistryResult<SchemaId>;

    /// Returns the id of identical schema text already registered under a
    /// subject.
    async fn is_schema_registered(&self, subject: &str, schema: &str)
    -> RegistryResult<SchemaId>;

    /// Deletes a subject together with all of its versions.
    async fn delete_subject(&self, subject: &str) -> RegistryResult<()>;

    /// Deletes one version of a subject.
    async fn delete_version(&self, subject: &str, version: Version) -> RegistryResult<()>;
}

macro_rules! forward_registry_client {
    ($($ty:ty),+ $(,)?) => {$(
        #[async_trait]
        impl<T> RegistryClient for $ty
        where
            T: RegistryClient + ?Sized,
        {
            type Codec = T::Codec;

            async fn get_schema(&self, id: SchemaId) -> RegistryResult<Self::Codec> {
                (**self).get_schema(id).await
            }

            async fn get_subjects(&self) -> RegistryResult<Vec<String>> {
                (**self).get_subjects().await
            }

            async fn get_versions(&self, subject: &str) -> RegistryResult<Vec<u32>> {
                (**self).get_versions(subject).await
            }

            async fn get_schema_by_version(
                &self,
                subject: &str,
                version: Version,
            ) -> RegistryResult<Self::Codec> {
                (**self).get_schema_by_version(subject, version).await
            }

            async fn create_subject(
                &self,
                subject: &str,
                schema: &str,
            ) -> RegistryResult<SchemaId> {
                (**self).create_subject(subject, schema).await
            }

            async fn is_schema_registered(
                &self,
                subject: &str,
                schema: &str,
            ) -> RegistryResult<SchemaId> {
                (**self).is_schema_registered(subject, schema).await
            }

            async fn delete_subject(&self, subject: &str) -> RegistryResult<()> {
                (**self).delete_subject(subject).await
            }

            async fn delete_version(&self, subject: &str, version: Version) -> RegistryResult<()> {
                (**self).delete_version(subject, version).await
            }
        }
    )+};
}

forward_registry_client!(&T, Box<T>, Arc<T>);
