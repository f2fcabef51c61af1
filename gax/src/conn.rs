use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// A connection identity the pool tracks per node.
pub trait Connection: Clone + Debug + Send + Sync {
    fn node_id(&self) -> u32;
    fn location(&self) -> &str;
}

/// Selection preferences for [`Pool::acquire`], honored in this order:
/// `prefer_node_id`, then `prefer_locations`, then `prefer_local_dc`.
#[derive(Clone, Debug, Default)]
pub struct AcquireOptions {
    pub prefer_node_id: Option<u32>,
    pub prefer_locations: Vec<String>,
    pub prefer_local_dc: bool,
    /// When a preference above is given but matches nothing, fall back to
    /// the unfiltered candidate set instead of failing. Has no effect when
    /// no preference is given at all — that case always uses the full set.
    pub allow_fallback: bool,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PoolError {
    #[error("no connection matches the requested preferences")]
    NoMatchingConnection,
}

struct Entry<C> {
    conn: C,
    pessimized_until: Option<Instant>,
}

/// Holds `nodeId -> Connection` plus pessimization and local-DC state, the
/// precedence-aware round-robin selector section 4.2 describes.
///
/// The round-robin counter is a single monotonic `AtomicU64` shared across
/// every candidate filter, so `acquire` stays stable across calls even as
/// the filtered candidate set changes between them — matching the ring
/// counter idiom, generalized from a fixed vector to a filtered view over
/// a live map.
pub struct Pool<C> {
    entries: RwLock<HashMap<u32, Entry<C>>>,
    local_dc: RwLock<Option<String>>,
    counter: AtomicU64,
}

impl<C> Pool<C>
where
    C: Connection,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            local_dc: RwLock::new(None),
            counter: AtomicU64::new(0),
        }
    }

    /// Idempotent: re-adding a known node id refreshes its connection but
    /// preserves any active pessimization.
    pub fn add(&self, conn: C) {
        let mut entries = self.entries.write();
        entries
            .entry(conn.node_id())
            .and_modify(|e| e.conn = conn.clone())
            .or_insert(Entry {
                conn,
                pessimized_until: None,
            });
    }

    /// Idempotent: removing an unknown node id is a no-op.
    pub fn remove(&self, node_id: u32) {
        self.entries.write().remove(&node_id);
    }

    pub fn pessimize(&self, node_id: u32, duration: Duration) {
        if let Some(entry) = self.entries.write().get_mut(&node_id) {
            entry.pessimized_until = Some(Instant::now() + duration);
        }
    }

    pub fn set_local_dc(&self, location: impl Into<String>) {
        *self.local_dc.write() = Some(location.into());
    }

    pub fn local_dc(&self) -> Option<String> {
        self.local_dc.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Node ids currently held, for callers that need to reconcile the pool
    /// against a freshly discovered endpoint list (remove what's stale).
    pub fn node_ids(&self) -> Vec<u32> {
        self.entries.read().keys().copied().collect()
    }

    /// Selects a connection per the precedence rule in section 4.2: try
    /// `prefer_node_id`, then `prefer_locations`, then `prefer_local_dc`,
    /// falling through each in turn until a non-empty, non-pessimized
    /// candidate set is found. Pessimized connections are excluded unless
    /// doing so would leave the set empty.
    pub fn acquire(&self, options: &AcquireOptions) -> Result<C, PoolError> {
        let entries = self.entries.read();
        let now = Instant::now();

        let has_preference =
            options.prefer_node_id.is_some() || !options.prefer_locations.is_empty() || options.prefer_local_dc;

        if let Some(node_id) = options.prefer_node_id {
            if let Some(entry) = entries.get(&node_id) {
                if !Self::is_pessimized(entry, now) {
                    return Ok(entry.conn.clone());
                }
            }
        }

        if !options.prefer_locations.is_empty() {
            let filtered: Vec<&Entry<C>> = entries
                .values()
                .filter(|e| options.prefer_locations.iter().any(|l| l == e.conn.location()))
                .collect();
            if let Some(conn) = self.pick_round_robin(&filtered, now) {
                return Ok(conn);
            }
        }

        if options.prefer_local_dc {
            if let Some(dc) = self.local_dc() {
                let filtered: Vec<&Entry<C>> = entries.values().filter(|e| e.conn.location() == dc).collect();
                if let Some(conn) = self.pick_round_robin(&filtered, now) {
                    return Ok(conn);
                }
            }
        }

        // No preference at all isn't a fallback, it's the default path, so it
        // always tries the full set. An explicit preference that failed to
        // match only falls through to the full set when allowed.
        if !has_preference || options.allow_fallback {
            let all: Vec<&Entry<C>> = entries.values().collect();
            if let Some(conn) = self.pick_round_robin(&all, now) {
                return Ok(conn);
            }
        }

        Err(PoolError::NoMatchingConnection)
    }

    fn is_pessimized(entry: &Entry<C>, now: Instant) -> bool {
        matches!(entry.pessimized_until, Some(until) if until > now)
    }

    /// Round-robins over `candidates`, preferring non-pessimized entries
    /// but falling back to the full filtered set if every candidate is
    /// currently pessimized (section 4.2: "excluded unless the filtered
    /// set is empty").
    fn pick_round_robin(&self, candidates: &[&Entry<C>], now: Instant) -> Option<C> {
        if candidates.is_empty() {
            return None;
        }
        let healthy: Vec<&&Entry<C>> = candidates.iter().filter(|e| !Self::is_pessimized(e, now)).collect();
        let pool = if healthy.is_empty() { candidates.iter().collect() } else { healthy };
        let idx = (self.counter.fetch_add(1, Ordering::Relaxed) as usize) % pool.len();
        Some(pool[idx].conn.clone())
    }
}

impl<C> Default for Pool<C>
where
    C: Connection,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct TestConn {
        node_id: u32,
        location: String,
    }

    impl Connection for TestConn {
        fn node_id(&self) -> u32 {
            self.node_id
        }
        fn location(&self) -> &str {
            &self.location
        }
    }

    fn conn(node_id: u32, location: &str) -> TestConn {
        TestConn {
            node_id,
            location: location.to_string(),
        }
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let pool: Pool<TestConn> = Pool::new();
        pool.add(conn(1, "dc1"));
        pool.add(conn(1, "dc1"));
        assert_eq!(pool.len(), 1);
        pool.remove(1);
        pool.remove(1);
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn acquire_fails_on_empty_pool() {
        let pool: Pool<TestConn> = Pool::new();
        assert_eq!(pool.acquire(&AcquireOptions::default()), Err(PoolError::NoMatchingConnection));
    }

    #[test]
    fn prefer_node_id_wins_over_everything_else() {
        let pool: Pool<TestConn> = Pool::new();
        pool.add(conn(1, "dc1"));
        pool.add(conn(2, "dc2"));
        let options = AcquireOptions {
            prefer_node_id: Some(2),
            prefer_locations: vec!["dc1".to_string()],
            ..Default::default()
        };
        assert_eq!(pool.acquire(&options).unwrap().node_id, 2);
    }

    #[test]
    fn round_robin_is_stable_across_calls() {
        let pool: Pool<TestConn> = Pool::new();
        pool.add(conn(1, "dc1"));
        pool.add(conn(2, "dc1"));
        pool.add(conn(3, "dc1"));
        let options = AcquireOptions {
            prefer_locations: vec!["dc1".to_string()],
            ..Default::default()
        };
        let mut seen = vec![];
        for _ in 0..3 {
            seen.push(pool.acquire(&options).unwrap().node_id);
        }
        let mut sorted = seen.clone();
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3]);
    }

    #[test]
    fn pessimized_connections_are_skipped_unless_set_is_empty() {
        let pool: Pool<TestConn> = Pool::new();
        pool.add(conn(1, "dc1"));
        pool.add(conn(2, "dc1"));
        pool.pessimize(1, Duration::from_secs(60));
        for _ in 0..4 {
            let picked = pool
                .acquire(&AcquireOptions {
                    prefer_locations: vec!["dc1".to_string()],
                    ..Default::default()
                })
                .unwrap();
            assert_eq!(picked.node_id, 2);
        }
    }

    #[test]
    fn all_pessimized_falls_back_to_full_set() {
        let pool: Pool<TestConn> = Pool::new();
        pool.add(conn(1, "dc1"));
        pool.pessimize(1, Duration::from_secs(60));
        let picked = pool.acquire(&AcquireOptions::default()).unwrap();
        assert_eq!(picked.node_id, 1);
    }

    #[test]
    fn local_dc_preference_filters_candidates() {
        let pool: Pool<TestConn> = Pool::new();
        pool.add(conn(1, "dc1"));
        pool.add(conn(2, "dc2"));
        pool.set_local_dc("dc2");
        let picked = pool
            .acquire(&AcquireOptions {
                prefer_local_dc: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(picked.node_id, 2);
    }

    #[test]
    fn unmatched_preference_fails_without_fallback() {
        let pool: Pool<TestConn> = Pool::new();
        pool.add(conn(1, "dc1"));
        pool.add(conn(2, "dc1"));
        let options = AcquireOptions {
            prefer_node_id: Some(999),
            allow_fallback: false,
            ..Default::default()
        };
        assert_eq!(pool.acquire(&options), Err(PoolError::NoMatchingConnection));
    }
}
