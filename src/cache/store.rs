//! Fetch-level response cache.
//!
//! Stores raw GraphQL response bodies keyed by request. Freshness comes from
//! the policy the caller passed; tags come from the same policy and are
//! tracked in the [`TagRegistry`] so revalidation can drop dependent entries.

use std::sync::RwLock;
use std::time::Instant;

use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use tracing::debug;

use super::config::CacheConfig;
use super::keys::FetchKey;
use super::lock::{rw_read, rw_write};
use super::policy::{CachePolicy, Revalidate};
use super::registry::TagRegistry;

const SOURCE: &str = "cache::store";

const METRIC_HIT: &str = "presswire_fetch_cache_hit_total";
const METRIC_MISS: &str = "presswire_fetch_cache_miss_total";
const METRIC_EVICT: &str = "presswire_fetch_cache_evict_total";
const METRIC_STALE: &str = "presswire_fetch_cache_stale_total";
const METRIC_INVALIDATED: &str = "presswire_fetch_cache_invalidated_total";

/// A stored response body and the instant it stops being fresh.
#[derive(Debug, Clone)]
pub struct CachedBody {
    pub body: Bytes,
    /// `None` means fresh until evicted or invalidated.
    pub expires_at: Option<Instant>,
}

impl CachedBody {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// Bodies and their tags live under one guard so an entry is never stored
/// without its tags, nor tagged after it is gone.
struct CacheState {
    entries: LruCache<FetchKey, CachedBody>,
    tags: TagRegistry,
}

pub struct FetchCache {
    enabled: bool,
    state: RwLock<CacheState>,
}

impl FetchCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            state: RwLock::new(CacheState {
                entries: LruCache::new(config.entry_limit),
                tags: TagRegistry::new(),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Fetch a fresh body. Stale entries are dropped on the way out.
    pub fn get(&self, key: &FetchKey) -> Option<Bytes> {
        if !self.enabled {
            return None;
        }

        let now = Instant::now();
        let mut state = rw_write(&self.state, SOURCE, "get");
        let lookup = state
            .entries
            .get(key)
            .map(|entry| (entry.is_fresh(now), entry.body.clone()));
        match lookup {
            Some((true, body)) => {
                counter!(METRIC_HIT).increment(1);
                Some(body)
            }
            Some((false, _)) => {
                state.entries.pop(key);
                state.tags.unregister(key);
                drop(state);
                counter!(METRIC_STALE).increment(1);
                counter!(METRIC_MISS).increment(1);
                None
            }
            None => {
                counter!(METRIC_MISS).increment(1);
                None
            }
        }
    }

    /// Store a body under the policy's freshness window and tags.
    ///
    /// No-store policies and a disabled cache leave the store untouched.
    pub fn put(&self, key: FetchKey, body: Bytes, policy: &CachePolicy) {
        if !self.enabled {
            return;
        }
        let Some(window) = policy.revalidate() else {
            return;
        };

        let expires_at = match window {
            Revalidate::After(duration) => Some(Instant::now() + duration),
            Revalidate::Never => None,
        };

        let mut state = rw_write(&self.state, SOURCE, "put");
        state.tags.register(&key, policy.tags());
        let evicted = state
            .entries
            .push(key.clone(), CachedBody { body, expires_at })
            .map(|(evicted_key, _)| evicted_key)
            .filter(|evicted_key| *evicted_key != key);
        if let Some(evicted_key) = &evicted {
            state.tags.unregister(evicted_key);
        }
        drop(state);

        if evicted.is_some() {
            counter!(METRIC_EVICT).increment(1);
        }
    }

    /// Drop every entry carrying `tag`. Returns how many entries were removed.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let mut state = rw_write(&self.state, SOURCE, "invalidate_tag");
        let keys = state.tags.take_tag(tag);
        let removed = keys
            .iter()
            .filter(|key| state.entries.pop(*key).is_some())
            .count();
        drop(state);

        if removed > 0 {
            counter!(METRIC_INVALIDATED).increment(removed as u64);
        }
        debug!(target: "presswire::cache", tag, removed, "Invalidated cache tag");
        removed
    }

    pub fn invalidate_tags<'a>(&self, tags: impl IntoIterator<Item = &'a str>) -> usize {
        tags.into_iter().map(|tag| self.invalidate_tag(tag)).sum()
    }

    pub fn invalidate_all(&self) {
        let mut state = rw_write(&self.state, SOURCE, "invalidate_all");
        state.entries.clear();
        state.tags.clear();
    }

    pub fn len(&self) -> usize {
        rw_read(&self.state, SOURCE, "len").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::cache::policy::CacheMode;

    fn key(name: &str) -> FetchKey {
        FetchKey::new("https://cms.example.com/graphql", name.as_bytes())
    }

    fn cache_with_limit(limit: usize) -> FetchCache {
        FetchCache::new(&CacheConfig {
            enabled: true,
            entry_limit: NonZeroUsize::new(limit).expect("non-zero limit"),
        })
    }

    #[test]
    fn stores_and_returns_fresh_bodies() {
        let cache = FetchCache::new(&CacheConfig::default());
        let key = key("posts");

        assert!(cache.get(&key).is_none());
        cache.put(key.clone(), Bytes::from_static(b"{}"), &CachePolicy::POSTS);

        assert_eq!(cache.get(&key), Some(Bytes::from_static(b"{}")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn no_store_policy_is_never_cached() {
        let cache = FetchCache::new(&CacheConfig::default());
        let key = key("search");

        cache.put(key.clone(), Bytes::from_static(b"{}"), &CachePolicy::DYNAMIC);
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let cache = FetchCache::new(&CacheConfig {
            enabled: false,
            ..Default::default()
        });
        let key = key("posts");

        cache.put(key.clone(), Bytes::from_static(b"{}"), &CachePolicy::POSTS);
        assert!(!cache.is_enabled());
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = FetchCache::new(&CacheConfig::default());
        let key = key("expired");
        let policy = CachePolicy::post("hello");
        let expired = CachedBody {
            body: Bytes::from_static(b"{}"),
            expires_at: Some(Instant::now() - Duration::from_millis(5)),
        };

        {
            let mut state = rw_write(&cache.state, SOURCE, "test");
            state.tags.register(&key, policy.tags());
            state.entries.push(key.clone(), expired);
        }

        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
        assert!(
            rw_read(&cache.state, SOURCE, "test")
                .tags
                .keys_for_tag("post-hello")
                .is_empty()
        );
    }

    #[test]
    fn invalidate_tag_drops_only_tagged_entries() {
        let cache = FetchCache::new(&CacheConfig::default());
        let listing = key("listing");
        let post = key("post");
        let slugs = key("slugs");

        cache.put(listing.clone(), Bytes::from_static(b"1"), &CachePolicy::POSTS);
        cache.put(post.clone(), Bytes::from_static(b"2"), &CachePolicy::post("hello"));
        cache.put(slugs.clone(), Bytes::from_static(b"3"), &CachePolicy::POST_SLUGS);

        assert_eq!(cache.invalidate_tag("posts"), 1);
        assert_eq!(cache.invalidate_tags(["post-hello", "unknown"]), 1);

        assert!(cache.get(&listing).is_none());
        assert!(cache.get(&post).is_none());
        assert!(cache.get(&slugs).is_some());
    }

    #[test]
    fn eviction_unregisters_tags() {
        let cache = cache_with_limit(1);
        let first = key("first");
        let second = key("second");

        cache.put(first.clone(), Bytes::from_static(b"1"), &CachePolicy::POSTS);
        cache.put(second.clone(), Bytes::from_static(b"2"), &CachePolicy::RELATED_POSTS);

        assert!(cache.get(&first).is_none());
        assert_eq!(cache.invalidate_tag("posts"), 0);
        assert_eq!(cache.invalidate_tag("related-posts"), 1);
    }

    #[test]
    fn pinned_entries_have_no_deadline() {
        let cache = FetchCache::new(&CacheConfig::default());
        let policy = CachePolicy::PINNED;
        assert_eq!(policy.mode(), CacheMode::Revalidate(Revalidate::Never));

        let key = key("forever");
        cache.put(key.clone(), Bytes::from_static(b"{}"), &policy);
        let entry = rw_write(&cache.state, SOURCE, "test")
            .entries
            .get(&key)
            .cloned()
            .expect("entry stored");
        assert!(entry.expires_at.is_none());
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn windowed_entries_carry_a_deadline() {
        let cache = FetchCache::new(&CacheConfig::default());
        let key = key("hourly");

        cache.put(key.clone(), Bytes::from_static(b"{}"), &CachePolicy::DEFAULT);
        let entry = rw_write(&cache.state, SOURCE, "test")
            .entries
            .get(&key)
            .cloned()
            .expect("entry stored");
        assert!(entry.expires_at.is_some_and(|deadline| deadline > Instant::now()));
    }

    #[test]
    fn concurrent_put_and_invalidate_never_orphan_an_entry() {
        let key = key("raced");
        for round in 0..2_000 {
            let cache = Arc::new(FetchCache::new(&CacheConfig::default()));
            let barrier = Arc::new(Barrier::new(2));

            let writer = {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                let key = key.clone();
                thread::spawn(move || {
                    barrier.wait();
                    cache.put(key, Bytes::from_static(b"{}"), &CachePolicy::POSTS);
                })
            };
            let invalidator = {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.invalidate_tag("posts")
                })
            };
            writer.join().expect("writer thread");
            invalidator.join().expect("invalidator thread");

            if cache.get(&key).is_some() {
                assert_eq!(
                    cache.invalidate_tag("posts"),
                    1,
                    "round {round}: stored entry lost its tag"
                );
                assert!(cache.get(&key).is_none());
            }
        }
    }

    #[test]
    fn stale_read_does_not_strip_tags_from_a_fresh_put() {
        let cache = FetchCache::new(&CacheConfig::default());
        let key = key("refreshed");
        let stale = CachedBody {
            body: Bytes::from_static(b"old"),
            expires_at: Some(Instant::now() - Duration::from_millis(5)),
        };
        let posts = CachePolicy::POSTS;
        {
            let mut state = rw_write(&cache.state, SOURCE, "test");
            state.tags.register(&key, posts.tags());
            state.entries.push(key.clone(), stale);
        }

        assert!(cache.get(&key).is_none());
        cache.put(key.clone(), Bytes::from_static(b"new"), &posts);

        assert_eq!(cache.invalidate_tag("posts"), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn store_recovers_from_poisoned_lock() {
        let cache = FetchCache::new(&CacheConfig::default());

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = cache.state.write().expect("cache lock should be acquired");
            panic!("poison cache lock");
        }));

        let key = key("after-poison");
        cache.put(key.clone(), Bytes::from_static(b"{}"), &CachePolicy::POSTS);
        assert!(cache.get(&key).is_some());
        cache.invalidate_all();
        assert!(cache.is_empty());
    }
}
