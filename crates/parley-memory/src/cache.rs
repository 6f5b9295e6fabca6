//! Bounded, time-limited cache for recall results.
//!
//! Keys are the full normalized query tuple, so two recalls that differ in
//! any option hit different slots. A hit inside the TTL returns the cached
//! context unchanged apart from the `cache_hit` flag; staleness up to the TTL
//! is accepted by contract.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace};

use parley_types::MemoryContext;

/// How long a cached recall stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Maximum number of cached recalls before oldest-insertion eviction.
pub const CACHE_CAPACITY: usize = 20;

/// Normalized recall query key.
///
/// `min_confidence` is stored in thousandths so the key is hashable and two
/// float spellings of the same threshold normalize to one slot. The tag
/// filter and kind filter are sorted at construction for the same reason.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecallKey {
    pub agent_id: String,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub topic: Option<String>,
    pub matching: &'static str,
    pub min_confidence_milli: u32,
    pub limit: usize,
    pub time_window: &'static str,
    pub tag_filter: Vec<String>,
    /// Stable string forms of the kind filter.
    pub kinds: Vec<&'static str>,
}

impl RecallKey {
    /// Normalize the tag and kind filters (sorted) for slot identity.
    pub fn normalize(mut self) -> Self {
        self.tag_filter.sort();
        self.kinds.sort_unstable();
        self
    }
}

struct CachedRecall {
    context: MemoryContext,
    inserted_at: Instant,
}

struct CacheInner {
    slots: HashMap<RecallKey, CachedRecall>,
    /// Insertion order for oldest-eviction.
    order: VecDeque<RecallKey>,
}

/// Bounded TTL cache keyed by normalized recall query.
pub struct RecallCache {
    inner: Mutex<CacheInner>,
    ttl: Duration,
    capacity: usize,
}

impl Default for RecallCache {
    fn default() -> Self {
        Self::new(CACHE_TTL, CACHE_CAPACITY)
    }
}

impl RecallCache {
    /// Create a cache with the given TTL and capacity.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                slots: HashMap::new(),
                order: VecDeque::new(),
            }),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Look up a cached recall. A hit returns the context with
    /// `cache_hit = true` and zeroed query time; expired slots are removed.
    pub fn get(&self, key: &RecallKey) -> Option<MemoryContext> {
        let mut inner = self.inner.lock();

        let expired = match inner.slots.get(key) {
            Some(cached) => cached.inserted_at.elapsed() > self.ttl,
            None => return None,
        };

        if expired {
            trace!(agent_id = %key.agent_id, "Recall cache entry expired");
            inner.slots.remove(key);
            inner.order.retain(|k| k != key);
            return None;
        }

        inner.slots.get(key).map(|cached| {
            let mut context = cached.context.clone();
            context.cache_hit = true;
            context.query_time_ms = 0;
            trace!(agent_id = %key.agent_id, "Recall cache hit");
            context
        })
    }

    /// Insert a recall result, evicting the oldest slot at capacity.
    pub fn insert(&self, key: RecallKey, context: MemoryContext) {
        let mut inner = self.inner.lock();

        if inner.slots.contains_key(&key) {
            inner.order.retain(|k| k != &key);
        } else if inner.slots.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                debug!(agent_id = %oldest.agent_id, "Evicting oldest recall cache entry");
                inner.slots.remove(&oldest);
            }
        }

        inner.order.push_back(key.clone());
        inner.slots.insert(
            key,
            CachedRecall {
                context,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of live slots (including not-yet-collected expired ones).
    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().slots.is_empty()
    }

    /// Drop every cached recall.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.slots.clear();
        inner.order.clear();
    }
}

impl std::fmt::Debug for RecallCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecallCache")
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
