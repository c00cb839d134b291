use std::collections::VecDeque;

use gloo_storage::{Storage as GlooStorage, errors::StorageError};
use ironlog_web_app::{Settings, SettingsRepository, cache, log};
use serde::{Serialize, de::DeserializeOwned};

use crate::auth::StoredSession;

const KEY_SETTINGS: &str = "settings";
const KEY_LOG: &str = "log";
const KEY_SESSION: &str = "session";
const CACHE_PREFIX: &str = "cache:";

#[must_use]
pub fn cache_key(name: &str) -> String {
    format!("{CACHE_PREFIX}{name}")
}

fn get<T: DeserializeOwned>(key: &str) -> Result<Option<T>, StorageError> {
    match gloo_storage::LocalStorage::get(key) {
        Ok(value) => Ok(Some(value)),
        Err(StorageError::KeyNotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

fn set<T: Serialize>(key: &str, value: T) -> Result<(), StorageError> {
    gloo_storage::LocalStorage::set(key, value)
}

/// Browser local storage holding settings, the log, the session and cached catalog data.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn read_session(&self) -> Result<Option<StoredSession>, String> {
        get(KEY_SESSION).map_err(|err| err.to_string())
    }

    pub fn write_session(&self, session: &StoredSession) -> Result<(), String> {
        set(KEY_SESSION, session).map_err(|err| err.to_string())
    }

    pub fn remove_session(&self) -> Result<(), String> {
        gloo_storage::LocalStorage::delete(KEY_SESSION);
        Ok(())
    }
}

impl SettingsRepository for LocalStorage {
    async fn read_settings(&self) -> Result<Settings, String> {
        get(KEY_SETTINGS)
            .map(Option::unwrap_or_default)
            .map_err(|err| err.to_string())
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        set(KEY_SETTINGS, settings).map_err(|err| err.to_string())
    }
}

impl log::Repository for LocalStorage {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        get(KEY_LOG)
            .map(Option::unwrap_or_default)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::push_entry(&mut entries, entry);
        set(KEY_LOG, entries).map_err(|err| log::Error::Unknown(err.to_string()))
    }
}

impl cache::CacheRepository for LocalStorage {
    fn cache_keys(&self) -> Result<Vec<String>, cache::Error> {
        let storage = gloo_storage::LocalStorage::raw();
        let length = storage
            .length()
            .map_err(|err| cache::Error::Storage(format!("{err:?}")))?;
        Ok((0..length)
            .filter_map(|index| storage.key(index).ok().flatten())
            .filter(|key| key.starts_with(CACHE_PREFIX))
            .collect())
    }

    fn read_cache_entry<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<cache::CacheEntry<T>>, cache::Error> {
        get(key).map_err(|err| match err {
            StorageError::SerdeError(err) => cache::Error::Invalid(err.to_string()),
            err => cache::Error::Storage(err.to_string()),
        })
    }

    fn write_cache_entry<T: Serialize>(
        &self,
        key: &str,
        entry: &cache::CacheEntry<T>,
    ) -> Result<(), cache::Error> {
        set(key, entry).map_err(|err| cache::Error::Storage(err.to_string()))
    }

    fn remove_cache_entry(&self, key: &str) -> Result<(), cache::Error> {
        gloo_storage::LocalStorage::delete(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("machines"), "cache:machines");
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    mod wasm {
        use chrono::{TimeZone, Utc};
        use ironlog_web_app::cache::{CacheEntry, CacheRepository};
        use ironlog_web_app::log::Repository;
        use pretty_assertions::assert_eq;
        use wasm_bindgen_test::wasm_bindgen_test;

        use super::*;

        #[wasm_bindgen_test]
        async fn test_settings() {
            gloo_storage::LocalStorage::clear();

            assert_eq!(LocalStorage.read_settings().await, Ok(Settings::default()));

            let settings = Settings {
                notifications: true,
                ..Settings::default()
            };
            LocalStorage.write_settings(settings).await.unwrap();

            assert_eq!(LocalStorage.read_settings().await, Ok(settings));
        }

        #[wasm_bindgen_test]
        fn test_session() {
            gloo_storage::LocalStorage::clear();

            assert_eq!(LocalStorage.read_session(), Ok(None));

            let session = StoredSession {
                user_id: "u1".to_string(),
                email: "alice@example.com".to_string(),
                id_token: "id".to_string(),
                refresh_token: "refresh".to_string(),
                expires_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            };
            LocalStorage.write_session(&session).unwrap();
            assert_eq!(LocalStorage.read_session(), Ok(Some(session)));

            LocalStorage.remove_session().unwrap();
            assert_eq!(LocalStorage.read_session(), Ok(None));
        }

        #[wasm_bindgen_test]
        fn test_log() {
            gloo_storage::LocalStorage::clear();

            for i in 0..105 {
                LocalStorage
                    .write_entry(ironlog_web_app::log::Entry {
                        time: format!("12:00:{i:03}"),
                        level: ::log::Level::Info,
                        message: format!("entry {i}"),
                    })
                    .unwrap();
            }

            let entries = LocalStorage.read_entries().unwrap();
            assert_eq!(entries.len(), ironlog_web_app::log::MAX_ENTRIES);
            assert_eq!(entries[0].message, "entry 104");
        }

        #[wasm_bindgen_test]
        fn test_cache_entries() {
            gloo_storage::LocalStorage::clear();
            let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

            LocalStorage
                .write_cache_entry(&cache_key("categories"), &CacheEntry::new(vec![1, 2], now))
                .unwrap();
            gloo_storage::LocalStorage::set(KEY_SETTINGS, Settings::default()).unwrap();
            gloo_storage::LocalStorage::set(cache_key("machines"), "invalid").unwrap();

            assert_eq!(
                LocalStorage.cache_keys().unwrap(),
                vec![cache_key("categories"), cache_key("machines")]
            );
            assert_eq!(
                LocalStorage
                    .read_cache_entry::<Vec<u32>>(&cache_key("categories"))
                    .unwrap(),
                Some(CacheEntry::new(vec![1, 2], now))
            );
            assert!(matches!(
                LocalStorage.read_cache_entry::<Vec<u32>>(&cache_key("machines")),
                Err(cache::Error::Invalid(_))
            ));
            assert_eq!(
                LocalStorage
                    .read_cache_entry::<Vec<u32>>(&cache_key("exercises"))
                    .unwrap(),
                None
            );

            LocalStorage
                .remove_cache_entry(&cache_key("categories"))
                .unwrap();
            assert_eq!(LocalStorage.cache_keys().unwrap(), vec![cache_key("machines")]);
        }
    }
}
