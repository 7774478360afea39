use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

type Flight<V> = Shared<BoxFuture<'static, V>>;

struct Slot<V: Clone> {
    id: u64,
    flight: Flight<V>,
}

/// Coalesces concurrent calls for the same key into one in-flight operation.
///
/// The first caller for a key starts the operation; every caller that arrives while it is still
/// running awaits the same result. The slot is released as the operation finishes, so the next
/// caller after that starts a fresh one.
pub struct SingleFlight<K, V: Clone> {
    inflight: Arc<DashMap<K, Slot<V>>>,
    next_id: AtomicU64,
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self { inflight: Arc::new(DashMap::new()), next_id: AtomicU64::new(0) }
    }

    /// Joins the operation running for `key`, or starts one with `start`.
    ///
    /// `start` runs while the key's entry is locked, so it must not call back into this map.
    /// The returned future is lazy; whichever waiter polls it first drives the work.
    pub fn join_or_start<F, Fut>(&self, key: K, start: F) -> Flight<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        match self.inflight.entry(key.clone()) {
            Entry::Occupied(entry) => entry.get().flight.clone(),
            Entry::Vacant(entry) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let work = start();
                let inflight = Arc::clone(&self.inflight);

                let flight = async move {
                    let out = work.await;
                    inflight.remove_if(&key, |_, slot| slot.id == id);
                    out
                }
                .boxed()
                .shared();

                entry.insert(Slot { id, flight: flight.clone() });
                flight
            }
        }
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V: Clone> fmt::Debug for SingleFlight<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlight").field("next_id", &self.next_id).finish_non_exhaustive()
    }
}
