//! In-process cache for public catalog reads.
//!
//! Single-course payloads live behind a seven-day TTL; the catalog payload
//! has no expiry and is only replaced when a read misses. Writes never
//! touch this cache, so stored payloads can lag the database until expiry
//! or explicit eviction on course deletion.

mod config;
mod lock;
mod store;

pub use config::CacheConfig;
pub use store::{
    CACHE_EVICT_TOTAL, CACHE_EXPIRED_TOTAL, CACHE_HIT_TOTAL, CACHE_MISS_TOTAL, CourseCache,
};
