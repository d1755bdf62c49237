//! Write-through settings cache over a single [`SettingsBackend`].

use std::collections::BTreeMap;

use futures::future::{ready, Ready};

use super::backend::{BackendKind, SettingsBackend, StorageError};
use crate::log_once::{LogOnce, LogSeverity};

/// User-facing warning emitted the first time any storage operation is denied.
pub const STORAGE_DENIED_WARNING: &str = "Couldn't access settings, are cookies disabled?";

/// In-memory view of named settings backed by one persistent store.
///
/// The backend is fixed at construction. Reads against a local store miss through once per name
/// and cache the answer (absence included); a synchronized store is never read per name, its
/// values reach the cache through [`SettingsCache::seed`] or writes. Nothing is invalidated when
/// the store changes behind the cache's back.
#[derive(Debug)]
pub struct SettingsCache<B> {
    backend: B,
    entries: BTreeMap<String, Option<String>>,
    log: LogOnce,
}

impl<B: SettingsBackend> SettingsCache<B> {
    /// Creates an empty cache over `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            entries: BTreeMap::new(),
            log: LogOnce::new(),
        }
    }

    /// Kind of the active backing store.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Borrows the active backing store.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Storage warnings logged so far.
    pub fn logged_messages(&self) -> &[String] {
        self.log.emitted()
    }

    /// Drops every cached entry. The returned future is already resolved.
    pub fn initialize(&mut self) -> Ready<()> {
        self.entries.clear();
        ready(())
    }

    /// Populates the cache from a store snapshot without writing anything back.
    pub fn seed<I, K, V>(&mut self, snapshot: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in snapshot {
            self.entries.insert(name.into(), Some(value.into()));
        }
    }

    /// Updates the cached value only. The store is not touched.
    pub fn set(&mut self, name: &str, value: Option<&str>) {
        self.entries.insert(name.to_string(), value.map(str::to_string));
    }

    /// Caches `value` and writes it through to the store, unless it is already cached.
    ///
    /// # Errors
    ///
    /// Returns store failures other than [`StorageError::AccessDenied`].
    pub fn write(&mut self, name: &str, value: &str) -> Result<(), StorageError> {
        if matches!(self.entries.get(name), Some(Some(cached)) if cached == value) {
            return Ok(());
        }
        self.entries.insert(name.to_string(), Some(value.to_string()));

        let result = match self.backend.kind() {
            BackendKind::Synchronized => {
                let snapshot: Vec<(&str, &str)> = self
                    .entries
                    .iter()
                    .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
                    .collect();
                self.backend.set(&snapshot)
            }
            BackendKind::Local => self.backend.set(&[(name, value)]),
        };
        self.absorb_denied(result, || format!("set({name}, {value})"))
            .map(|_| ())
    }

    /// Returns the value for `name`, falling back to `default` when none is stored.
    ///
    /// # Errors
    ///
    /// Returns store failures other than [`StorageError::AccessDenied`].
    pub fn read(
        &mut self,
        name: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, StorageError> {
        let value = match self.entries.get(name).cloned() {
            Some(cached) => cached,
            None if self.backend.kind() == BackendKind::Synchronized => None,
            None => {
                let fetched = self
                    .absorb_denied(self.backend.get(name), || format!("get({name})"))?
                    .flatten();
                self.entries.insert(name.to_string(), fetched.clone());
                fetched
            }
        };
        Ok(value.or_else(|| default.map(str::to_string)))
    }

    /// Forgets `name` and removes it from the store.
    ///
    /// The next read against a local store fetches again, so a value written by another tab in
    /// between becomes visible.
    ///
    /// # Errors
    ///
    /// Returns store failures other than [`StorageError::AccessDenied`].
    pub fn erase(&mut self, name: &str) -> Result<(), StorageError> {
        self.entries.remove(name);
        let result = self.backend.remove(name);
        self.absorb_denied(result, || format!("remove({name})"))
            .map(|_| ())
    }

    /// Turns an access-denied failure into `Ok(None)` after logging it once.
    fn absorb_denied<T>(
        &mut self,
        result: Result<T, StorageError>,
        operation: impl FnOnce() -> String,
    ) -> Result<Option<T>, StorageError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::AccessDenied(reason)) => {
                self.log.log(STORAGE_DENIED_WARNING, LogSeverity::Warn);
                self.log.log(
                    &format!("'{}' failed: {reason}", operation()),
                    LogSeverity::Debug,
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
