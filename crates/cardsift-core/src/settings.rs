//! Durable key-value settings, scoped to one board origin.
//!
//! [`SettingsStore`] is the raw string store the host platform provides
//! (browser-local storage, a JSON file, or in-memory for tests).
//! [`PersistentSettings`] layers typed accessors on top: scalars and JSON
//! values, with corrupt persisted data replaced by defaults and logged,
//! never surfaced as an error.

use crate::LOG_TARGET;
use crate::error::FailureCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Well-known persisted keys.
pub mod keys {
    /// Currently selected assignee display name.
    pub const ASSIGNEE: &str = "filter.assignee";
    /// Unestimated-only flag.
    pub const UNESTIMATED_ONLY: &str = "filter.unestimated-only";
    /// Selected fix versions, JSON array of strings.
    pub const SELECTED_VERSIONS: &str = "filter.versions";
    /// Reviewer-assignment snapshot, JSON.
    pub const REVIEWER_SNAPSHOT: &str = "reviewers.snapshot";
    /// Prefix for per-request remote cache entries.
    pub const CACHE_PREFIX: &str = "cache.";
}

/// Raw durable string store.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and the simulation harness.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// File-backed store: one JSON object per board origin, written through on
/// every change so state survives reloads and navigations.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open or create the store at `path`.
    ///
    /// An unreadable or corrupt file starts the store empty (logged); it is
    /// rewritten on the next `set`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let values = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!(
                        target: LOG_TARGET,
                        code = %FailureCode::SettingsDecode,
                        path = %path.display(),
                        error = %e,
                        "settings file corrupt, starting empty"
                    );
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        Ok(Self { path, values })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) {
        let rendered = match serde_json::to_string_pretty(&self.values) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::error!(target: LOG_TARGET, error = %e, "settings serialize failed");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, rendered) {
            tracing::error!(
                target: LOG_TARGET,
                path = %self.path.display(),
                error = %e,
                "settings write failed"
            );
        }
    }
}

impl SettingsStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.flush();
        }
    }
}

/// Typed accessors over a raw [`SettingsStore`].
#[derive(Debug)]
pub struct PersistentSettings<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> PersistentSettings<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.store.set(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.store.remove(key);
    }

    /// Read a boolean, defaulting on absence or garbage.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.store.get(key).as_deref() {
            None => default,
            Some("true") => true,
            Some("false") => false,
            Some(other) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    code = %FailureCode::SettingsDecode,
                    key,
                    value = other,
                    "persisted boolean malformed, using default"
                );
                default
            }
        }
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.store.set(key, if value { "true" } else { "false" });
    }

    /// Read a JSON value, falling back to `T::default()` on absence or
    /// corruption. Corruption is logged and the bad value left in place; the
    /// next write overwrites it.
    #[must_use]
    pub fn get_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.store.get(key) else {
            return T::default();
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    code = %FailureCode::SettingsDecode,
                    key,
                    error = %e,
                    "persisted JSON malformed, using default"
                );
                T::default()
            }
        }
    }

    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(rendered) => self.store.set(key, &rendered),
            Err(e) => {
                tracing::error!(target: LOG_TARGET, key, error = %e, "JSON serialize failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStore, MemoryStore, PersistentSettings, SettingsStore, keys};
    use std::collections::BTreeSet;

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store.set(keys::ASSIGNEE, "Ayşe");
        assert_eq!(store.get(keys::ASSIGNEE), Some("Ayşe".to_string()));
        store.remove(keys::ASSIGNEE);
        assert_eq!(store.get(keys::ASSIGNEE), None);
    }

    #[test]
    fn bool_accessor_tolerates_garbage() {
        let mut settings = PersistentSettings::new(MemoryStore::new());
        assert!(!settings.get_bool(keys::UNESTIMATED_ONLY, false));

        settings.set_bool(keys::UNESTIMATED_ONLY, true);
        assert!(settings.get_bool(keys::UNESTIMATED_ONLY, false));

        settings.set_string(keys::UNESTIMATED_ONLY, "maybe");
        assert!(!settings.get_bool(keys::UNESTIMATED_ONLY, false));
        assert!(settings.get_bool(keys::UNESTIMATED_ONLY, true));
    }

    #[test]
    fn json_accessor_defaults_on_corruption() {
        let mut settings = PersistentSettings::new(MemoryStore::new());

        let versions = BTreeSet::from(["4.8.6".to_string(), "4.9.0".to_string()]);
        settings.set_json(keys::SELECTED_VERSIONS, &versions);
        let loaded: BTreeSet<String> = settings.get_json(keys::SELECTED_VERSIONS);
        assert_eq!(loaded, versions);

        settings.set_string(keys::SELECTED_VERSIONS, "{not json");
        let fallback: BTreeSet<String> = settings.get_json(keys::SELECTED_VERSIONS);
        assert!(fallback.is_empty());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("overlay/settings.json");

        {
            let mut store = FileStore::open(&path).expect("open store");
            store.set(keys::ASSIGNEE, "Mehmet");
            store.set("cache.board/1/sprint", "{\"timestamp\":1}");
        }

        let reopened = FileStore::open(&path).expect("reopen store");
        assert_eq!(reopened.get(keys::ASSIGNEE), Some("Mehmet".to_string()));
        assert!(reopened.get("cache.board/1/sprint").is_some());
    }

    #[test]
    fn file_store_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "][ not json").expect("write corrupt file");

        let store = FileStore::open(&path).expect("open store");
        assert_eq!(store.get(keys::ASSIGNEE), None);
    }
}
