//! Observable key-value store over browser `localStorage`.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session container persists its token/user pair here. Every successful
//! mutation is re-broadcast to same-tab subscribers, and changes made by other
//! tabs arrive through the same listener interface, so consumers resynchronize
//! without a page reload.
//!
//! ERROR HANDLING
//! ==============
//! Storage is best-effort. `read*`, `write*`, and `remove` log failures and
//! fall back to defaults; the `try_*` variants surface `StorageError` for the
//! few callers that must roll back a partial write.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::listeners::{ListenerSet, Subscription};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage quota exceeded writing {key}")]
    QuotaExceeded { key: String },
    #[error("storage rejected {key}: {reason}")]
    Rejected { key: String, reason: String },
    #[error("failed to encode {key}: {reason}")]
    Encode { key: String, reason: String },
}

/// Where a change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Written through this store, in this tab.
    Local,
    /// Written by another tab or window sharing the same origin.
    External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// Changed key; `None` means the whole storage area was cleared.
    pub key: Option<String>,
    pub origin: ChangeOrigin,
}

impl StorageChange {
    /// Whether this change may have touched `key`.
    pub fn affects(&self, key: &str) -> bool {
        self.key.as_deref().map_or(true, |k| k == key)
    }
}

pub type ExternalListener = Arc<dyn Fn(Option<&str>) + Send + Sync>;

/// Raw string storage primitive.
pub trait StorageBackend: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Register for changes made by other tabs sharing this storage.
    ///
    /// Backends whose cross-tab events are delivered some other way (the
    /// browser's `storage` window event) keep the default no-op.
    fn watch_external(&self, _on_change: ExternalListener) -> Subscription {
        Subscription::detached()
    }
}

/// `window.localStorage`, resolved on every call.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

#[cfg(feature = "hydrate")]
impl BrowserStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(feature = "hydrate")]
impl StorageBackend for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Rejected { key: key.to_owned(), reason: format!("{e:?}") })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?.set_item(key, value).map_err(|e| {
            let reason = format!("{e:?}");
            if reason.contains("QuotaExceeded") {
                StorageError::QuotaExceeded { key: key.to_owned() }
            } else {
                StorageError::Rejected { key: key.to_owned(), reason }
            }
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Rejected { key: key.to_owned(), reason: format!("{e:?}") })
    }
}

/// In-memory storage area for tests and non-browser builds.
///
/// Clones share one map and count as the same tab. [`MemoryStorage::new_tab`]
/// returns a handle onto the same map that behaves like a second tab: its
/// writes are reported to the other tabs as external changes, and vice versa.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    area: Arc<MemoryArea>,
    tab: u64,
}

#[derive(Default)]
struct MemoryArea {
    entries: Mutex<HashMap<String, String>>,
    watchers: Mutex<Vec<(u64, Weak<dyn Fn(Option<&str>) + Send + Sync>)>>,
    quota_bytes: Mutex<Option<usize>>,
    next_tab: AtomicU64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Another tab onto the same storage area.
    pub fn new_tab(&self) -> Self {
        let tab = self.area.next_tab.fetch_add(1, Ordering::SeqCst) + 1;
        Self { area: Arc::clone(&self.area), tab }
    }

    /// Cap the total size (keys plus values, in bytes) of the storage area.
    pub fn set_quota(&self, quota_bytes: Option<usize>) {
        *lock(&self.area.quota_bytes) = quota_bytes;
    }

    /// Raw snapshot of a key, bypassing any store.
    pub fn peek(&self, key: &str) -> Option<String> {
        lock(&self.area.entries).get(key).cloned()
    }

    fn broadcast(&self, key: &str) {
        let targets: Vec<_> = {
            let mut watchers = lock(&self.area.watchers);
            watchers.retain(|(_, w)| w.strong_count() > 0);
            watchers
                .iter()
                .filter(|(tab, _)| *tab != self.tab)
                .filter_map(|(_, w)| w.upgrade())
                .collect()
        };
        for watcher in targets {
            watcher(Some(key));
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.peek(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        {
            let mut entries = lock(&self.area.entries);
            if let Some(quota) = *lock(&self.area.quota_bytes) {
                let others: usize = entries
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(k, v)| k.len() + v.len())
                    .sum();
                if others + key.len() + value.len() > quota {
                    return Err(StorageError::QuotaExceeded { key: key.to_owned() });
                }
            }
            entries.insert(key.to_owned(), value.to_owned());
        }
        self.broadcast(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = lock(&self.area.entries).remove(key).is_some();
        if removed {
            self.broadcast(key);
        }
        Ok(())
    }

    fn watch_external(&self, on_change: ExternalListener) -> Subscription {
        let weak: Weak<dyn Fn(Option<&str>) + Send + Sync> = Arc::downgrade(&on_change);
        lock(&self.area.watchers).push((self.tab, weak));
        // The strong reference lives in the subscription; dropping it lets the
        // weak entry lapse and be pruned on the next broadcast.
        Subscription::new(move || drop(on_change))
    }
}

/// JSON-typed, observable handle onto a [`StorageBackend`].
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn StorageBackend>,
    listeners: Arc<ListenerSet<StorageChange>>,
    _external: Arc<Subscription>,
}

impl LocalStore {
    pub fn new<B: StorageBackend>(backend: B) -> Self {
        let backend: Arc<dyn StorageBackend> = Arc::new(backend);
        let listeners = ListenerSet::new();
        let weak = Arc::downgrade(&listeners);
        let external = backend.watch_external(Arc::new(move |key: Option<&str>| {
            if let Some(listeners) = weak.upgrade() {
                listeners.emit(&StorageChange { key: key.map(str::to_owned), origin: ChangeOrigin::External });
            }
        }));
        Self { backend, listeners, _external: Arc::new(external) }
    }

    /// Store backed by `window.localStorage`.
    #[cfg(feature = "hydrate")]
    pub fn browser() -> Self {
        Self::new(BrowserStorage)
    }

    /// Read and deserialize `key`, or `default` when absent or unreadable.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.read_text(key) else {
            return default;
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("discarding malformed JSON in storage key {key}: {e}");
                default
            }
        }
    }

    /// Read the raw string stored at `key`.
    pub fn read_text(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("error reading storage key {key}: {e}");
                None
            }
        }
    }

    /// Serialize and store `value` at `key`.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if encoding fails or the backend rejects the write.
    pub fn try_write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| StorageError::Encode { key: key.to_owned(), reason: e.to_string() })?;
        self.try_write_text(key, &raw)
    }

    /// Store `value` verbatim at `key`.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the backend rejects the write.
    pub fn try_write_text(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend.set(key, value)?;
        self.emit_local(key);
        Ok(())
    }

    /// Best-effort [`LocalStore::try_write`]; failures are logged.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_write(key, value) {
            log::warn!("error setting storage key {key}: {e}");
        }
    }

    /// Best-effort [`LocalStore::try_write_text`]; failures are logged.
    pub fn write_text(&self, key: &str, value: &str) {
        if let Err(e) = self.try_write_text(key, value) {
            log::warn!("error setting storage key {key}: {e}");
        }
    }

    /// Remove `key`; failures are logged.
    pub fn remove(&self, key: &str) {
        match self.backend.remove(key) {
            Ok(()) => self.emit_local(key),
            Err(e) => log::warn!("error removing storage key {key}: {e}"),
        }
    }

    /// Listen for local and cross-tab changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StorageChange) + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }

    /// Forward a native cross-tab `storage` event.
    pub fn notify_external(&self, key: Option<&str>) {
        self.listeners.emit(&StorageChange { key: key.map(str::to_owned), origin: ChangeOrigin::External });
    }

    fn emit_local(&self, key: &str) {
        self.listeners.emit(&StorageChange { key: Some(key.to_owned()), origin: ChangeOrigin::Local });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
