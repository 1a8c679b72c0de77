//! Blocking facade over any [`RegistryClient`].

use schemabox_core::{RegistryClient, RegistryResult, SchemaId, Version};
use tokio::runtime::{Builder, Runtime};

/// Drives a [`RegistryClient`] from synchronous code.
///
/// Owns a multi-threaded tokio runtime and blocks the calling thread for the
/// whole call, retries included. Any number of threads may call into one
/// shared `BlockingClient` at the same time.
///
/// # Panics
///
/// Every method panics when called from within an asynchronous context, and
/// the client must not be dropped there either; use the wrapped client
/// directly in async code.
///
/// # Examples
///
/// ```no_run
/// use schemabox::blocking::BlockingClient;
/// use schemabox::{CachedClient, HttpTransport, RawSchema, SchemaId};
///
/// let transport = HttpTransport::<RawSchema>::new(["http://localhost:8081"]).unwrap();
/// let client = BlockingClient::new(CachedClient::new(transport)).unwrap();
/// let schema = client.get_schema(SchemaId::new(1));
/// ```
pub struct BlockingClient<T> {
    inner: T,
    runtime: Runtime,
}

impl<T> BlockingClient<T>
where
    T: RegistryClient,
{
    /// Wraps `inner` with a dedicated runtime.
    pub fn new(inner: T) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .thread_name("schemabox-blocking")
            .build()?;
        Ok(Self::with_runtime(inner, runtime))
    }

    /// Wraps `inner` with a caller-provided runtime.
    pub fn with_runtime(inner: T, runtime: Runtime) -> Self {
        Self { inner, runtime }
    }

    /// The wrapped client.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// See [`RegistryClient::get_schema`].
    pub fn get_schema(&self, id: SchemaId) -> RegistryResult<T::Codec> {
        self.runtime.block_on(self.inner.get_schema(id))
    }

    /// See [`RegistryClient::get_subjects`].
    pub fn get_subjects(&self) -> RegistryResult<Vec<String>> {
        self.runtime.block_on(self.inner.get_subjects())
    }

    /// See [`RegistryClient::get_versions`].
    pub fn get_versions(&self, subject: &str) -> RegistryResult<Vec<u32>> {
        self.runtime.block_on(self.inner.get_versions(subject))
    }

    /// See [`RegistryClient::get_schema_by_version`].
    pub fn get_schema_by_version(
        &self,
        subject: &str,
        version: Version,
    ) -> RegistryResult<T::Codec> {
        self.runtime
            .block_on(self.inner.get_schema_by_version(subject, version))
    }

    /// See [`RegistryClient::create_subject`].
    pub fn create_subject(&self, subject: &str, schema: &str) -> RegistryResult<SchemaId> {
        self.runtime
            .block_on(self.inner.create_subject(subject, schema))
    }

    /// See [`RegistryClient::is_schema_registered`].
    pub fn is_schema_registered(&self, subject: &str, schema: &str) -> RegistryResult<SchemaId> {
        self.runtime
            .block_on(self.inner.is_schema_registered(subject, schema))
    }

    /// See [`RegistryClient::delete_subject`].
    pub fn delete_subject(&self, subject: &str) -> RegistryResult<()> {
        self.runtime.block_on(self.inner.delete_subject(subject))
    }

    /// See [`RegistryClient::delete_version`].
    pub fn delete_version(&self, subject: &str, version: Version) -> RegistryResult<()> {
        self.runtime
            .block_on(self.inner.delete_version(subject, version))
    }
}

impl<T> std::fmt::Debug for BlockingClient<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingClient")
            .field("inner", &self.inner)
            .finish()
    }
}
