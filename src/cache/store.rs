//! In-process storage for filtered catalog payloads.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use uuid::Uuid;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

pub const CACHE_HIT_TOTAL: &str = "aula_cache_hit_total";
pub const CACHE_MISS_TOTAL: &str = "aula_cache_miss_total";
pub const CACHE_EVICT_TOTAL: &str = "aula_cache_evict_total";
pub const CACHE_EXPIRED_TOTAL: &str = "aula_cache_expired_total";

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Bytes,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => deadline <= now,
            None => false,
        }
    }
}

/// Serialized catalog payload cache.
///
/// Holds the filtered JSON for single courses (bounded LRU with a TTL) and
/// for the whole catalog (singleton slot, no TTL). Payloads are opaque
/// bytes; the service layer decides what they decode to. An expired entry
/// reads as absent and is dropped on that read.
pub struct CourseCache {
    enabled: bool,
    course_ttl: Duration,
    courses: RwLock<LruCache<Uuid, CacheEntry>>,
    catalog: RwLock<Option<CacheEntry>>,
}

impl CourseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            course_ttl: Duration::from_secs(config.course_ttl_seconds),
            courses: RwLock::new(LruCache::new(config.course_limit_non_zero())),
            catalog: RwLock::new(None),
        }
    }

    pub fn get_course(&self, id: Uuid) -> Option<Bytes> {
        if !self.enabled {
            return None;
        }
        let now = Instant::now();
        let mut courses = rw_write(&self.courses, "get_course");
        match courses.get(&id) {
            Some(entry) if entry.is_expired(now) => {}
            Some(entry) => {
                counter!(CACHE_HIT_TOTAL).increment(1);
                return Some(entry.payload.clone());
            }
            None => {
                counter!(CACHE_MISS_TOTAL).increment(1);
                return None;
            }
        }
        courses.pop(&id);
        counter!(CACHE_EXPIRED_TOTAL).increment(1);
        None
    }

    pub fn set_course(&self, id: Uuid, payload: Bytes) {
        if !self.enabled {
            return;
        }
        let entry = CacheEntry {
            payload,
            // saturate rather than panic on absurd TTLs
            expires_at: Instant::now().checked_add(self.course_ttl),
        };
        let mut courses = rw_write(&self.courses, "set_course");
        if let Some((evicted, _)) = courses.push(id, entry)
            && evicted != id
        {
            counter!(CACHE_EVICT_TOTAL).increment(1);
        }
    }

    pub fn evict_course(&self, id: Uuid) {
        rw_write(&self.courses, "evict_course").pop(&id);
    }

    pub fn get_catalog(&self) -> Option<Bytes> {
        if !self.enabled {
            return None;
        }
        let guard = rw_read(&self.catalog, "get_catalog");
        match guard.as_ref() {
            Some(entry) => {
                counter!(CACHE_HIT_TOTAL).increment(1);
                Some(entry.payload.clone())
            }
            None => {
                counter!(CACHE_MISS_TOTAL).increment(1);
                None
            }
        }
    }

    pub fn set_catalog(&self, payload: Bytes) {
        if !self.enabled {
            return;
        }
        *rw_write(&self.catalog, "set_catalog") = Some(CacheEntry {
            payload,
            expires_at: None,
        });
    }
}
