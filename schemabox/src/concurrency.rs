use std::future::Future;
use std::pin::Pin;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use schemabox_core::SchemaId;
use tokio::sync::broadcast;

/// Result of concurrency check - whether to fetch from the registry or await
/// a fetch already in flight.
pub enum ConcurrencyDecision<C> {
    /// Proceed with the registry call.
    Proceed,
    /// Await the codec fetched by another in-flight call.
    ///
    /// Resolves to `None` when that call failed or was cancelled; the waiter
    /// then fetches on its own so it observes its own error.
    Await(Pin<Box<dyn Future<Output = Option<C>> + Send>>),
}

/// Trait for coordinating concurrent cache misses on the same schema id.
pub trait ConcurrencyManager<C>: Send + Sync {
    /// Check if this miss should fetch from the registry or await an
    /// existing fetch.
    fn check(&self, id: SchemaId) -> ConcurrencyDecision<C>;

    /// Notify waiting callers that the fetch for `id` finished.
    ///
    /// `codec` is `None` when the fetch failed.
    fn complete(&self, id: SchemaId, codec: Option<&C>);
}

/// No-op implementation that always allows misses to fetch.
///
/// Concurrent misses on one uncached id each call the registry; the results
/// are equal, so the cache simply keeps whichever insert lands last.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopConcurrencyManager;

impl<C> ConcurrencyManager<C> for NoopConcurrencyManager {
    fn check(&self, _id: SchemaId) -> ConcurrencyDecision<C> {
        ConcurrencyDecision::Proceed
    }

    fn complete(&self, _id: SchemaId, _codec: Option<&C>) {}
}

/// Coalesces concurrent misses so at most one fetch per id is in flight.
///
/// The first miss on an id becomes the leader and fetches; later misses
/// subscribe to a broadcast channel and receive the leader's codec.
/// When the leader fails, its waiters each fetch on their own at once,
/// without electing a new leader.
pub struct BroadcastConcurrencyManager<C> {
    in_flight: DashMap<SchemaId, broadcast::Sender<C>>,
}

impl<C> BroadcastConcurrencyManager<C> {
    /// Create a manager with no fetches in flight.
    pub fn new() -> Self {
        Self {
            in_flight: DashMap::new(),
        }
    }

    /// Number of ids with a fetch currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

impl<C> Default for BroadcastConcurrencyManager<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for BroadcastConcurrencyManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastConcurrencyManager")
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl<C> ConcurrencyManager<C> for BroadcastConcurrencyManager<C>
where
    C: Clone + Send + Sync + 'static,
{
    fn check(&self, id: SchemaId) -> ConcurrencyDecision<C> {
        match self.in_flight.entry(id) {
            Entry::Occupied(entry) => {
                let mut receiver = entry.get().subscribe();
                ConcurrencyDecision::Await(Box::pin(async move { receiver.recv().await.ok() }))
            }
            Entry::Vacant(entry) => {
                let (sender, _) = broadcast::channel(1);
                entry.insert(sender);
                ConcurrencyDecision::Proceed
            }
        }
    }

    fn complete(&self, id: SchemaId, codec: Option<&C>) {
        // Dropping the sender without a message wakes waiters with `None`.
        if let Some((_, sender)) = self.in_flight.remove(&id)
            && let Some(codec) = codec
        {
            let _ = sender.send(codec.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn waiters_receive_leader_result() {
        let manager = BroadcastConcurrencyManager::<String>::new();
        let id = SchemaId::new(1);

        assert!(matches!(manager.check(id), ConcurrencyDecision::Proceed));
        let ConcurrencyDecision::Await(waiting) = manager.check(id) else {
            panic!("second miss should await the leader");
        };
        assert_eq!(manager.in_flight(), 1);

        manager.complete(id, Some(&"schema".to_owned()));
        assert_eq!(waiting.await.as_deref(), Some("schema"));
        assert_eq!(manager.in_flight(), 0);
    }

    #[tokio::test]
    async fn failed_leader_releases_waiters_empty_handed() {
        let manager = BroadcastConcurrencyManager::<String>::new();
        let id = SchemaId::new(1);

        assert!(matches!(manager.check(id), ConcurrencyDecision::Proceed));
        let ConcurrencyDecision::Await(waiting) = manager.check(id) else {
            panic!("second miss should await the leader");
        };

        manager.complete(id, None);
        assert_eq!(waiting.await, None);
        assert!(matches!(manager.check(id), ConcurrencyDecision::Proceed));
    }

    #[test]
    fn noop_always_proceeds() {
        let manager = NoopConcurrencyManager;
        let id = SchemaId::new(1);
        for _ in 0..3 {
            assert!(matches!(
                ConcurrencyManager::<String>::check(&manager, id),
                ConcurrencyDecision::Proceed
            ));
        }
    }
}
