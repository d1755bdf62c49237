//! Settings backing-store contracts and in-memory adapters.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use thiserror::Error;

/// Which kind of persistent store backs a settings cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Host-provided store that propagates values across devices. Values held by the cache are
    /// authoritative and never re-fetched per name.
    Synchronized,
    /// Browser-local, per-origin store. Reads miss through to the store once per name.
    Local,
}

/// Failure reported by a [`SettingsBackend`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The host refused persistent-storage access (privacy settings, disabled cookies).
    #[error("storage access denied: {0}")]
    AccessDenied(String),
    /// Any other host failure.
    #[error("storage host failure: {0}")]
    Host(String),
}

impl StorageError {
    /// Returns `true` for failures the settings cache absorbs instead of propagating.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied(_))
    }
}

/// Persistent key/value store consulted by [`crate::SettingsCache`].
///
/// Implementations are synchronous and single-threaded; they serialize their own access.
pub trait SettingsBackend {
    /// Kind of store, fixed for the lifetime of the instance.
    fn kind(&self) -> BackendKind;

    /// Reads the stored value for `name`.
    ///
    /// # Errors
    ///
    /// Returns an error when the host store cannot be read.
    fn get(&self, name: &str) -> Result<Option<String>, StorageError>;

    /// Stores every entry of `entries`, leaving other names untouched.
    ///
    /// # Errors
    ///
    /// Returns an error when the host store rejects the write.
    fn set(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    /// Removes `name` from the store.
    ///
    /// # Errors
    ///
    /// Returns an error when the host store rejects the removal.
    fn remove(&self, name: &str) -> Result<(), StorageError>;
}

impl<B: SettingsBackend + ?Sized> SettingsBackend for Rc<B> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn get(&self, name: &str) -> Result<Option<String>, StorageError> {
        (**self).get(name)
    }

    fn set(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        (**self).set(entries)
    }

    fn remove(&self, name: &str) -> Result<(), StorageError> {
        (**self).remove(name)
    }
}

/// Failure mode injected into a [`MemorySettingsBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Every operation fails with [`StorageError::AccessDenied`].
    AccessDenied(String),
    /// Every operation fails with [`StorageError::Host`].
    Host(String),
}

#[derive(Debug, Default)]
struct MemoryBackendState {
    values: BTreeMap<String, String>,
    failure: Option<InjectedFailure>,
    gets: usize,
    sets: usize,
    removes: usize,
    last_set_len: usize,
}

#[derive(Debug, Clone)]
/// In-memory store keyed by setting name.
///
/// Clones share state, so a test can keep a handle while the cache owns another. Operation
/// counters record every attempt, including failed ones.
pub struct MemorySettingsBackend {
    kind: BackendKind,
    inner: Rc<RefCell<MemoryBackendState>>,
}

impl MemorySettingsBackend {
    /// Creates an empty store of the given kind.
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            inner: Rc::new(RefCell::new(MemoryBackendState::default())),
        }
    }

    /// Creates an empty local store.
    pub fn local() -> Self {
        Self::new(BackendKind::Local)
    }

    /// Creates an empty synchronized store.
    pub fn synchronized() -> Self {
        Self::new(BackendKind::Synchronized)
    }

    /// Writes a value directly, bypassing any cache. Models another tab or device.
    pub fn put_external(&self, name: &str, value: &str) {
        self.inner
            .borrow_mut()
            .values
            .insert(name.to_string(), value.to_string());
    }

    /// Reads a value directly, bypassing counters and injected failures.
    pub fn peek(&self, name: &str) -> Option<String> {
        self.inner.borrow().values.get(name).cloned()
    }

    /// Makes every later operation fail with `failure`; `None` restores normal behavior.
    pub fn inject_failure(&self, failure: Option<InjectedFailure>) {
        self.inner.borrow_mut().failure = failure;
    }

    /// Number of `get` calls seen.
    pub fn get_count(&self) -> usize {
        self.inner.borrow().gets
    }

    /// Number of `set` calls seen.
    pub fn set_count(&self) -> usize {
        self.inner.borrow().sets
    }

    /// Number of `remove` calls seen.
    pub fn remove_count(&self) -> usize {
        self.inner.borrow().removes
    }

    /// Entry count of the most recent `set` call.
    pub fn last_set_len(&self) -> usize {
        self.inner.borrow().last_set_len
    }

    fn check(&self) -> Result<(), StorageError> {
        match &self.inner.borrow().failure {
            None => Ok(()),
            Some(InjectedFailure::AccessDenied(msg)) => {
                Err(StorageError::AccessDenied(msg.clone()))
            }
            Some(InjectedFailure::Host(msg)) => Err(StorageError::Host(msg.clone())),
        }
    }
}

impl SettingsBackend for MemorySettingsBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn get(&self, name: &str) -> Result<Option<String>, StorageError> {
        self.inner.borrow_mut().gets += 1;
        self.check()?;
        Ok(self.inner.borrow().values.get(name).cloned())
    }

    fn set(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        {
            let mut state = self.inner.borrow_mut();
            state.sets += 1;
            state.last_set_len = entries.len();
        }
        self.check()?;
        let mut state = self.inner.borrow_mut();
        for (name, value) in entries {
            state.values.insert((*name).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StorageError> {
        self.inner.borrow_mut().removes += 1;
        self.check()?;
        self.inner.borrow_mut().values.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_round_trip_and_remove() {
        let store = MemorySettingsBackend::local();
        let store_obj: &dyn SettingsBackend = &store;

        store_obj
            .set(&[("view_only", "true"), ("shared", "false")])
            .expect("set");
        assert_eq!(
            store_obj.get("view_only").expect("get"),
            Some("true".to_string())
        );
        store_obj.remove("view_only").expect("remove");
        assert_eq!(store_obj.get("view_only").expect("get"), None);
        assert_eq!(store.peek("shared"), Some("false".to_string()));
        assert_eq!(store.last_set_len(), 2);
    }

    #[test]
    fn injected_failures_surface_as_typed_errors() {
        let store = MemorySettingsBackend::local();
        store.inject_failure(Some(InjectedFailure::AccessDenied("SecurityError".into())));
        let err = store.get("k").expect_err("denied");
        assert!(err.is_access_denied());

        store.inject_failure(Some(InjectedFailure::Host("quota".into())));
        let err = store.set(&[("k", "v")]).expect_err("host failure");
        assert_eq!(err, StorageError::Host("quota".into()));
        assert!(!err.is_access_denied());
        assert_eq!(store.get_count(), 1);
        assert_eq!(store.set_count(), 1);
    }
}
