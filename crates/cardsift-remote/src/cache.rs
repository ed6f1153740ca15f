//! TTL-bounded request cache with stale fallback.
//!
//! [`RemoteDataCache`] is the only way the resolver reaches the transport.
//! Each successful fetch is stored under the request's identity, in memory
//! and mirrored into persistent settings so a fresh page load can still fall
//! back to the last known payload.
//!
//! # Freshness
//!
//! An entry is *live* for [`CACHE_TTL_MILLIS`] after it was written; a live
//! entry short-circuits the transport entirely. An expired entry is never a
//! hit, but it is deliberately retained until a successful refresh
//! overwrites it: on fetch failure a stale payload beats no payload.

use cardsift_core::LOG_TARGET;
use cardsift_core::settings::{PersistentSettings, SettingsStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::transport::{RemoteRequest, Transport};

/// How long a cache entry counts as live: five minutes.
pub const CACHE_TTL_MILLIS: i64 = 5 * 60 * 1000;

/// One cached payload with its write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Milliseconds timestamp at which the payload was stored.
    pub timestamp_millis: i64,
    /// The payload exactly as fetched.
    pub payload: serde_json::Value,
}

impl CacheEntry {
    /// Whether this entry is still live at `now_millis` for the given TTL.
    #[must_use]
    pub const fn is_live(&self, now_millis: i64, ttl_millis: i64) -> bool {
        now_millis.saturating_sub(self.timestamp_millis) <= ttl_millis
    }
}

/// Outcome of a cached fetch. Never an error: failure degrades to stale or
/// absent data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// Live cache hit or fresh fetch.
    Fresh(serde_json::Value),
    /// Fetch failed; this is the last known payload, past its TTL.
    Stale(serde_json::Value),
    /// Fetch failed and nothing was ever cached for this request.
    Absent,
}

impl Fetched {
    /// The payload regardless of freshness, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Fresh(payload) | Self::Stale(payload) => Some(payload),
            Self::Absent => None,
        }
    }
}

/// Transport wrapper with TTL caching and stale fallback.
#[derive(Debug)]
pub struct RemoteDataCache<T: Transport> {
    transport: T,
    entries: BTreeMap<String, CacheEntry>,
}

impl<T: Transport> RemoteDataCache<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            entries: BTreeMap::new(),
        }
    }

    /// Fetch `request`, preferring a live cache entry.
    ///
    /// 1. Live entry under this identity → return it, transport untouched.
    /// 2. Otherwise invoke the transport (which enforces the time budget).
    /// 3. Success → store `{timestamp, payload}` in memory and settings,
    ///    return [`Fetched::Fresh`].
    /// 4. Failure → log the category, return the newest known entry as
    ///    [`Fetched::Stale`], or [`Fetched::Absent`] when there is none.
    pub fn fetch_with_cache<S: SettingsStore>(
        &mut self,
        settings: &mut PersistentSettings<S>,
        request: &RemoteRequest,
        ttl_millis: i64,
        now_millis: i64,
    ) -> Fetched {
        let key = request.cache_key();

        if let Some(entry) = self.lookup(settings, &key) {
            if entry.is_live(now_millis, ttl_millis) {
                tracing::debug!(target: LOG_TARGET, request = %request, "cache hit");
                return Fetched::Fresh(entry.payload.clone());
            }
            tracing::debug!(target: LOG_TARGET, request = %request, "cache entry expired");
        }

        match self.transport.get(request) {
            Ok(payload) => {
                let entry = CacheEntry {
                    timestamp_millis: now_millis,
                    payload: payload.clone(),
                };
                settings.set_json(&key, &entry);
                self.entries.insert(key, entry);
                Fetched::Fresh(payload)
            }
            Err(e) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    code = %e.failure_code(),
                    request = %request,
                    error = %e,
                    "fetch failed"
                );
                match self.lookup(settings, &key) {
                    Some(entry) => {
                        tracing::info!(
                            target: LOG_TARGET,
                            request = %request,
                            age_millis = now_millis.saturating_sub(entry.timestamp_millis),
                            "serving stale cache entry"
                        );
                        Fetched::Stale(entry.payload.clone())
                    }
                    None => Fetched::Absent,
                }
            }
        }
    }

    /// Look up an entry in memory, falling back to the persisted mirror.
    fn lookup<S: SettingsStore>(
        &mut self,
        settings: &PersistentSettings<S>,
        key: &str,
    ) -> Option<&CacheEntry> {
        if !self.entries.contains_key(key) {
            let raw = settings.get_string(key)?;
            let entry: CacheEntry = serde_json::from_str(&raw)
                .map_err(|e| {
                    tracing::warn!(
                        target: LOG_TARGET,
                        key,
                        error = %e,
                        "persisted cache entry malformed, ignoring"
                    );
                })
                .ok()?;
            self.entries.insert(key.to_string(), entry);
        }
        self.entries.get(key)
    }

    /// Number of entries currently held in memory.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// The wrapped transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::{CACHE_TTL_MILLIS, CacheEntry, Fetched, RemoteDataCache};
    use crate::transport::{FetchError, RemoteRequest, Transport};
    use cardsift_core::settings::{MemoryStore, PersistentSettings};
    use serde_json::json;
    use std::collections::VecDeque;

    /// Scripted transport: pops one outcome per call, counts calls.
    struct Scripted {
        outcomes: VecDeque<Result<serde_json::Value, FetchError>>,
        calls: usize,
    }

    impl Scripted {
        fn new(outcomes: Vec<Result<serde_json::Value, FetchError>>) -> Self {
            Self {
                outcomes: outcomes.into(),
                calls: 0,
            }
        }
    }

    impl Transport for Scripted {
        fn get(&mut self, _request: &RemoteRequest) -> Result<serde_json::Value, FetchError> {
            self.calls += 1;
            self.outcomes
                .pop_front()
                .unwrap_or(Err(FetchError::Connectivity("script exhausted".to_string())))
        }
    }

    fn settings() -> PersistentSettings<MemoryStore> {
        PersistentSettings::new(MemoryStore::new())
    }

    #[test]
    fn live_entry_short_circuits_transport() {
        let mut settings = settings();
        let mut cache = RemoteDataCache::new(Scripted::new(vec![Ok(json!({"n": 1}))]));
        let request = RemoteRequest::new("board/1/sprint");

        let first = cache.fetch_with_cache(&mut settings, &request, CACHE_TTL_MILLIS, 1_000);
        assert_eq!(first, Fetched::Fresh(json!({"n": 1})));
        assert_eq!(cache.transport.calls, 1);

        // Any lookup at write time + TTL or earlier is a verbatim hit.
        let hit = cache.fetch_with_cache(
            &mut settings,
            &request,
            CACHE_TTL_MILLIS,
            1_000 + CACHE_TTL_MILLIS,
        );
        assert_eq!(hit, Fetched::Fresh(json!({"n": 1})));
        assert_eq!(cache.transport.calls, 1);
    }

    #[test]
    fn expired_entry_refetches() {
        let mut settings = settings();
        let mut cache =
            RemoteDataCache::new(Scripted::new(vec![Ok(json!({"n": 1})), Ok(json!({"n": 2}))]));
        let request = RemoteRequest::new("board/1/sprint");

        cache.fetch_with_cache(&mut settings, &request, CACHE_TTL_MILLIS, 1_000);
        let refreshed = cache.fetch_with_cache(
            &mut settings,
            &request,
            CACHE_TTL_MILLIS,
            1_000 + CACHE_TTL_MILLIS + 1,
        );
        assert_eq!(refreshed, Fetched::Fresh(json!({"n": 2})));
        assert_eq!(cache.transport.calls, 2);
    }

    #[test]
    fn failure_falls_back_to_stale_entry() {
        let mut settings = settings();
        let mut cache = RemoteDataCache::new(Scripted::new(vec![
            Ok(json!({"n": 1})),
            Err(FetchError::Timeout { budget_secs: 30 }),
        ]));
        let request = RemoteRequest::new("board/1/sprint");

        cache.fetch_with_cache(&mut settings, &request, CACHE_TTL_MILLIS, 1_000);
        let stale = cache.fetch_with_cache(
            &mut settings,
            &request,
            CACHE_TTL_MILLIS,
            1_000 + CACHE_TTL_MILLIS + 1,
        );
        assert_eq!(stale, Fetched::Stale(json!({"n": 1})));
    }

    #[test]
    fn failure_without_history_is_absent() {
        let mut settings = settings();
        let mut cache = RemoteDataCache::new(Scripted::new(vec![Err(FetchError::Status(503))]));
        let request = RemoteRequest::new("board/1/sprint");

        let outcome = cache.fetch_with_cache(&mut settings, &request, CACHE_TTL_MILLIS, 1_000);
        assert_eq!(outcome, Fetched::Absent);
        assert!(outcome.payload().is_none());
    }

    #[test]
    fn persisted_mirror_survives_new_cache_instance() {
        let mut settings = settings();
        let request = RemoteRequest::new("board/1/sprint");

        {
            let mut cache = RemoteDataCache::new(Scripted::new(vec![Ok(json!({"n": 7}))]));
            cache.fetch_with_cache(&mut settings, &request, CACHE_TTL_MILLIS, 1_000);
        }

        // Fresh instance, dead transport: the persisted entry still serves.
        let mut revived =
            RemoteDataCache::new(Scripted::new(vec![Err(FetchError::Connectivity(
                "offline".to_string(),
            ))]));
        let hit = cache_hit_at(&mut revived, &mut settings, &request, 2_000);
        assert_eq!(hit, Fetched::Fresh(json!({"n": 7})));
    }

    #[test]
    fn malformed_persisted_entry_is_ignored() {
        let mut settings = settings();
        let request = RemoteRequest::new("board/1/sprint");
        settings.set_string(&request.cache_key(), "{broken");

        let mut cache = RemoteDataCache::new(Scripted::new(vec![Err(FetchError::Status(500))]));
        let outcome = cache.fetch_with_cache(&mut settings, &request, CACHE_TTL_MILLIS, 1_000);
        assert_eq!(outcome, Fetched::Absent);
    }

    #[test]
    fn entry_liveness_boundary() {
        let entry = CacheEntry {
            timestamp_millis: 10_000,
            payload: json!(null),
        };
        assert!(entry.is_live(10_000 + CACHE_TTL_MILLIS, CACHE_TTL_MILLIS));
        assert!(!entry.is_live(10_000 + CACHE_TTL_MILLIS + 1, CACHE_TTL_MILLIS));
    }

    fn cache_hit_at(
        cache: &mut RemoteDataCache<Scripted>,
        settings: &mut PersistentSettings<MemoryStore>,
        request: &RemoteRequest,
        now_millis: i64,
    ) -> Fetched {
        cache.fetch_with_cache(settings, request, CACHE_TTL_MILLIS, now_millis)
    }
}
