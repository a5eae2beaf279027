//! Cache configuration.
//!
//! Controls the in-process catalog cache via `aula.toml`.

use std::num::NonZeroUsize;

use serde::Deserialize;

// Default values for cache configuration
const DEFAULT_COURSE_LIMIT: usize = 500;
const DEFAULT_COURSE_TTL_SECONDS: u64 = 604_800; // seven days

/// Cache configuration from `aula.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the in-process catalog cache.
    pub enabled: bool,
    /// Maximum filtered course payloads held at once.
    pub course_limit: usize,
    /// Lifetime of a single-course payload, in seconds. The catalog
    /// payload never expires.
    pub course_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            course_limit: DEFAULT_COURSE_LIMIT,
            course_ttl_seconds: DEFAULT_COURSE_TTL_SECONDS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            course_limit: settings.course_limit,
            course_ttl_seconds: settings.course_ttl_seconds,
        }
    }
}

impl CacheConfig {
    /// Returns the course limit as NonZeroUsize, clamping to 1 if zero.
    pub fn course_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.course_limit).unwrap_or(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.course_limit, 500);
        assert_eq!(config.course_ttl_seconds, 604_800);
    }

    #[test]
    fn zero_limit_clamps_to_one() {
        let config = CacheConfig {
            course_limit: 0,
            ..Default::default()
        };
        assert_eq!(config.course_limit_non_zero().get(), 1);
    }
}
