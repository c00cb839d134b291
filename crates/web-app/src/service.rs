use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use ::log::{debug, warn};
use serde::de::IgnoredAny;

use crate::{
    Settings, SettingsRepository, SettingsService,
    cache::{self, CacheRepository, CacheService},
    log,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

impl<R: log::Repository> log::Service for Service<R> {
    fn get_log_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.repository.read_entries()
    }

    fn add_log_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        self.repository.write_entry(entry)
    }
}

impl<R: SettingsRepository> SettingsService for Service<R> {
    async fn get_settings(&self) -> Result<Settings, String> {
        self.repository.read_settings().await
    }

    async fn set_settings(&self, settings: Settings) -> Result<(), String> {
        self.repository.write_settings(settings).await
    }
}

impl<R: CacheRepository> CacheService for Service<R> {
    fn cleanup_cache(&self, now: DateTime<Utc>) -> Result<usize, cache::Error> {
        let mut removed = 0;

        for key in self.repository.cache_keys()? {
            let expired = match self.repository.read_cache_entry::<IgnoredAny>(&key) {
                Ok(Some(entry)) => entry.is_expired(now),
                Ok(None) => false,
                Err(cache::Error::Invalid(err)) => {
                    warn!("removing invalid cache entry {key}: {err}");
                    true
                }
                Err(err) => return Err(err),
            };

            if expired {
                self.repository.remove_cache_entry(&key)?;
                removed += 1;
            }
        }

        debug!("removed {removed} expired cache entries");

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::BTreeMap};

    use chrono::{TimeDelta, TimeZone};
    use pretty_assertions::assert_eq;
    use serde::{Serialize, de::DeserializeOwned};

    use super::*;
    use crate::cache::CacheEntry;

    #[derive(Default)]
    struct FakeCache {
        entries: RefCell<BTreeMap<String, serde_json::Value>>,
    }

    impl CacheRepository for FakeCache {
        fn cache_keys(&self) -> Result<Vec<String>, cache::Error> {
            Ok(self.entries.borrow().keys().cloned().collect())
        }

        fn read_cache_entry<T: DeserializeOwned>(
            &self,
            key: &str,
        ) -> Result<Option<CacheEntry<T>>, cache::Error> {
            self.entries
                .borrow()
                .get(key)
                .map(|value| {
                    serde_json::from_value(value.clone())
                        .map_err(|err| cache::Error::Invalid(err.to_string()))
                })
                .transpose()
        }

        fn write_cache_entry<T: Serialize>(
            &self,
            key: &str,
            entry: &CacheEntry<T>,
        ) -> Result<(), cache::Error> {
            let value = serde_json::to_value(entry)
                .map_err(|err| cache::Error::Invalid(err.to_string()))?;
            self.entries.borrow_mut().insert(key.to_string(), value);
            Ok(())
        }

        fn remove_cache_entry(&self, key: &str) -> Result<(), cache::Error> {
            self.entries.borrow_mut().remove(key);
            Ok(())
        }
    }

    #[test]
    fn test_cleanup_cache() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let repository = FakeCache::default();
        repository
            .write_cache_entry("machines", &CacheEntry::new(vec!["Leg Press"], now))
            .unwrap();
        repository
            .write_cache_entry(
                "exercises",
                &CacheEntry::new(vec![1, 2], now - TimeDelta::hours(2)),
            )
            .unwrap();
        repository
            .entries
            .borrow_mut()
            .insert("categories".to_string(), serde_json::json!({"broken": true}));
        let service = Service::new(repository);

        assert_eq!(service.cleanup_cache(now), Ok(2));
        assert_eq!(
            service.repository.cache_keys(),
            Ok(vec!["machines".to_string()])
        );
        assert_eq!(service.cleanup_cache(now + TimeDelta::hours(1)), Ok(1));
        assert_eq!(service.repository.cache_keys(), Ok(vec![]));
    }
}
