//! Read-through schema cache.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use schemabox_core::{RegistryClient, RegistryResult, SchemaId, Version};
use tracing::debug;

use crate::concurrency::{
    BroadcastConcurrencyManager, ConcurrencyDecision, ConcurrencyManager, NoopConcurrencyManager,
};
use crate::metrics;

/// Registry client that caches compiled schemas by id.
///
/// Schema ids are immutable once issued, so an entry never goes stale: the
/// map only grows and lives as long as the client. Subjects and versions
/// change over time, so every other operation goes straight to the wrapped
/// client.
///
/// The map sits behind a single reader/writer lock that is never held
/// across a registry call. A hit takes one read lock; a miss takes a read
/// lock, calls the registry with no lock held, then takes a write lock to
/// insert.
///
/// # Type Parameters
///
/// * `T` - Wrapped client, usually an [`HttpTransport`](crate::HttpTransport)
/// * `M` - How concurrent misses on one id are coordinated. The default
///   [`NoopConcurrencyManager`] lets each miss fetch on its own;
///   [`BroadcastConcurrencyManager`] shares one fetch between them.
///
/// # Examples
///
/// ```no_run
/// use schemabox::{CachedClient, HttpTransport, RawSchema, RegistryClient, SchemaId};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::<RawSchema>::new(["http://localhost:8081"])?;
/// let client = CachedClient::coalescing(transport);
///
/// let schema = client.get_schema(SchemaId::new(1)).await?;
/// assert!(client.contains(SchemaId::new(1)));
/// # Ok(())
/// # }
/// ```
pub struct CachedClient<T, M = NoopConcurrencyManager>
where
    T: RegistryClient,
{
    inner: T,
    schemas: RwLock<HashMap<SchemaId, T::Codec>>,
    concurrency: M,
}

impl<T> CachedClient<T>
where
    T: RegistryClient,
{
    /// Wraps `inner` with an empty cache.
    pub fn new(inner: T) -> Self {
        Self::with_concurrency_manager(inner, NoopConcurrencyManager)
    }
}

impl<T> CachedClient<T, BroadcastConcurrencyManager<T::Codec>>
where
    T: RegistryClient,
{
    /// Wraps `inner` with an empty cache that shares one registry fetch
    /// between concurrent misses on the same id.
    pub fn coalescing(inner: T) -> Self {
        Self::with_concurrency_manager(inner, BroadcastConcurrencyManager::new())
    }
}

impl<T, M> CachedClient<T, M>
where
    T: RegistryClient,
{
    /// Wraps `inner` with an empty cache and a custom concurrency manager.
    pub fn with_concurrency_manager(inner: T, concurrency: M) -> Self {
        Self {
            inner,
            schemas: RwLock::new(HashMap::new()),
            concurrency,
        }
    }

    /// The wrapped client.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consumes the cache and returns the wrapped client.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Number of cached schemas.
    pub fn len(&self) -> usize {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the schema with `id` is cached.
    pub fn contains(&self, id: SchemaId) -> bool {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    // A poisoned lock is recovered: every write is a single insert, so the
    // map is never observed half-updated.
    fn lookup(&self, id: SchemaId) -> Option<T::Codec> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn store(&self, id: SchemaId, codec: T::Codec) {
        self.schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, codec);
    }

    async fn fetch(&self, id: SchemaId) -> RegistryResult<T::Codec> {
        let codec = self.inner.get_schema(id).await?;
        self.store(id, codec.clone());
        Ok(codec)
    }
}

impl<T, M> std::fmt::Debug for CachedClient<T, M>
where
    T: RegistryClient + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedClient")
            .field("inner", &self.inner)
            .field("cached", &self.len())
            .field("concurrency", &std::any::type_name::<M>())
            .finish()
    }
}

/// Marks an id as being fetched until completed or dropped.
///
/// Dropping without completing (the caller's future was cancelled) releases
/// waiters empty-handed so they fetch on their own.
struct InFlight<'a, C, M>
where
    M: ConcurrencyManager<C>,
{
    manager: &'a M,
    id: SchemaId,
    done: bool,
    codec: PhantomData<fn(&C)>,
}

impl<'a, C, M> InFlight<'a, C, M>
where
    M: ConcurrencyManager<C>,
{
    fn new(manager: &'a M, id: SchemaId) -> Self {
        Self {
            manager,
            id,
            done: false,
            codec: PhantomData,
        }
    }

    fn complete(mut self, codec: Option<&C>) {
        self.done = true;
        self.manager.complete(self.id, codec);
    }
}

impl<C, M> Drop for InFlight<'_, C, M>
where
    M: ConcurrencyManager<C>,
{
    fn drop(&mut self) {
        if !self.done {
            self.manager.complete(self.id, None);
        }
    }
}

#[async_trait]
impl<T, M> RegistryClient for CachedClient<T, M>
where
    T: RegistryClient,
    M: ConcurrencyManager<T::Codec>,
{
    type Codec = T::Codec;

    async fn get_schema(&self, id: SchemaId) -> RegistryResult<Self::Codec> {
        if let Some(codec) = self.lookup(id) {
            debug!(%id, "schema cache hit");
            metrics::record_hit();
            return Ok(codec);
        }
        debug!(%id, "schema cache miss");
        metrics::record_miss();

        if let ConcurrencyDecision::Await(waiting) = self.concurrency.check(id) {
            if let Some(codec) = waiting.await {
                debug!(%id, "schema served by in-flight fetch");
                metrics::record_coalesced();
                return Ok(codec);
            }
            return self.fetch(id).await;
        }

        let in_flight = InFlight::new(&self.concurrency, id);
        let result = self.fetch(id).await;
        in_flight.complete(result.as_ref().ok());
        result
    }

    async fn get_subjects(&self) -> RegistryResult<Vec<String>> {
        self.inner.get_subjects().await
    }

    async fn get_versions(&self, subject: &str) -> RegistryResult<Vec<u32>> {
        self.inner.get_versions(subject).await
    }

    async fn get_schema_by_version(
        &self,
        subject: &str,
        version: Version,
    ) -> RegistryResult<Self::Codec> {
        self.inner.get_schema_by_version(subject, version).await
    }

    async fn create_subject(&self, subject: &str, schema: &str) -> RegistryResult<SchemaId> {
        self.inner.create_subject(subject, schema).await
    }

    async fn is_schema_registered(&self, subject: &str, schema: &str) -> RegistryResult<SchemaId> {
        self.inner.is_schema_registered(subject, schema).await
    }

    async fn delete_subject(&self, subject: &str) -> RegistryResult<()> {
        self.inner.delete_subject(subject).await
    }

    async fn delete_version(&self, subject: &str, version: Version) -> RegistryResult<()> {
        self.inner.delete_version(subject, version).await
    }
}
