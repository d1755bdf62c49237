use webutil_host::{BackendKind, SettingsBackend, SettingsCache, StorageError};

use crate::{ExtensionSyncBackend, LocalStorageBackend};

/// Adapter enum that erases the concrete settings store behind [`SettingsBackend`].
#[derive(Debug, Clone)]
pub enum SettingsBackendAdapter {
    /// Extension-host synchronized storage.
    Extension(ExtensionSyncBackend),
    /// Browser `localStorage`.
    Browser(LocalStorageBackend),
}

impl SettingsBackendAdapter {
    /// Stable name of the selected store, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Extension(_) => "extension-sync",
            Self::Browser(_) => "local-storage",
        }
    }
}

impl SettingsBackend for SettingsBackendAdapter {
    fn kind(&self) -> BackendKind {
        match self {
            Self::Extension(store) => store.kind(),
            Self::Browser(store) => store.kind(),
        }
    }

    fn get(&self, name: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Extension(store) => store.get(name),
            Self::Browser(store) => store.get(name),
        }
    }

    fn set(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        match self {
            Self::Extension(store) => store.set(entries),
            Self::Browser(store) => store.set(entries),
        }
    }

    fn remove(&self, name: &str) -> Result<(), StorageError> {
        match self {
            Self::Extension(store) => store.remove(name),
            Self::Browser(store) => store.remove(name),
        }
    }
}

/// Selects the settings store once: synchronized extension storage when the host exposes it,
/// `localStorage` otherwise.
pub fn settings_backend() -> SettingsBackendAdapter {
    let adapter = if ExtensionSyncBackend::is_available() {
        SettingsBackendAdapter::Extension(ExtensionSyncBackend::default())
    } else {
        SettingsBackendAdapter::Browser(LocalStorageBackend)
    };
    tracing::debug!(backend = adapter.name(), "settings store selected");
    adapter
}

/// Builds an empty settings cache over the selected store.
pub fn settings_cache() -> SettingsCache<SettingsBackendAdapter> {
    SettingsCache::new(settings_backend())
}

/// Clears `cache` and, for the synchronized store, hydrates it from the host snapshot.
///
/// # Errors
///
/// Returns an error when the synchronized store snapshot cannot be read.
pub async fn initialize_settings(
    cache: &mut SettingsCache<SettingsBackendAdapter>,
) -> Result<(), StorageError> {
    cache.initialize().await;
    let extension = match cache.backend() {
        SettingsBackendAdapter::Extension(store) => store.clone(),
        SettingsBackendAdapter::Browser(_) => return Ok(()),
    };
    let snapshot = extension.load_snapshot().await?;
    tracing::debug!(entries = snapshot.len(), "settings hydrated from extension storage");
    cache.seed(snapshot);
    Ok(())
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_selection_falls_back_to_local_storage() {
        let adapter = settings_backend();
        assert_eq!(adapter.name(), "local-storage");
        assert_eq!(adapter.kind(), BackendKind::Local);

        let mut cache = settings_cache();
        cache.set("transient", Some("1"));
        block_on(initialize_settings(&mut cache)).expect("initialize");
        assert_eq!(cache.read("transient", None).expect("read"), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn extension_adapter_initialization_seeds_from_snapshot() {
        let mut cache = SettingsCache::new(SettingsBackendAdapter::Extension(
            ExtensionSyncBackend::default(),
        ));
        cache.set("transient", Some("1"));
        block_on(initialize_settings(&mut cache)).expect("initialize");
        assert_eq!(cache.backend_kind(), BackendKind::Synchronized);
        assert_eq!(
            cache.read("transient", Some("d")).expect("read"),
            Some("d".to_string())
        );
    }
}
