use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Catalog data is considered stale after one hour.
pub const CATALOG_TTL_SECONDS: i64 = 60 * 60;

pub trait CacheService {
    /// Removes all expired entries and returns how many were removed.
    fn cleanup_cache(&self, now: DateTime<Utc>) -> Result<usize, Error>;
}

pub trait CacheRepository {
    fn cache_keys(&self) -> Result<Vec<String>, Error>;
    fn read_cache_entry<T: DeserializeOwned>(&self, key: &str)
    -> Result<Option<CacheEntry<T>>, Error>;
    fn write_cache_entry<T: Serialize>(&self, key: &str, entry: &CacheEntry<T>)
    -> Result<(), Error>;
    fn remove_cache_entry(&self, key: &str) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("cache storage failed: {0}")]
    Storage(String),
    #[error("invalid cache entry: {0}")]
    Invalid(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub stored_at: DateTime<Utc>,
    pub ttl_seconds: i64,
    pub value: T,
}

impl<T> CacheEntry<T> {
    #[must_use]
    pub fn new(value: T, now: DateTime<Utc>) -> Self {
        Self {
            stored_at: now,
            ttl_seconds: CATALOG_TTL_SECONDS,
            value,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.stored_at >= TimeDelta::seconds(self.ttl_seconds)
    }

    #[must_use]
    pub fn into_fresh(self, now: DateTime<Utc>) -> Option<T> {
        if self.is_expired(now) {
            None
        } else {
            Some(self.value)
        }
    }
}
