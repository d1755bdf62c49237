//! Extension-provided synchronized settings store (`chrome.storage.sync`).

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use webutil_host::{BackendKind, SettingsBackend, StorageError};

use crate::bridge;

#[derive(Debug, Clone, Default)]
/// Settings store backed by the extension host's synchronized storage area.
///
/// The host API is asynchronous for reads, so `get` answers from the snapshot taken by the last
/// [`ExtensionSyncBackend::load_snapshot`] plus the writes made through this instance. Writes
/// and removals are handed to the host without waiting for completion.
pub struct ExtensionSyncBackend {
    mirror: Rc<RefCell<BTreeMap<String, String>>>,
}

impl ExtensionSyncBackend {
    /// Returns `true` when the page runs inside an extension host exposing synchronized storage.
    pub fn is_available() -> bool {
        bridge::extension_storage_available()
    }

    /// Fetches every stored setting and refreshes the local mirror.
    ///
    /// # Errors
    ///
    /// Returns an error when the host storage read fails.
    pub async fn load_snapshot(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let items = bridge::extension_storage_snapshot()
            .await
            .map_err(StorageError::Host)?;
        *self.mirror.borrow_mut() = items.clone();
        Ok(items)
    }
}

impl SettingsBackend for ExtensionSyncBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Synchronized
    }

    fn get(&self, name: &str) -> Result<Option<String>, StorageError> {
        Ok(self.mirror.borrow().get(name).cloned())
    }

    fn set(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        bridge::extension_storage_set(entries).map_err(StorageError::Host)?;
        let mut mirror = self.mirror.borrow_mut();
        for (name, value) in entries {
            mirror.insert((*name).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StorageError> {
        bridge::extension_storage_remove(name).map_err(StorageError::Host)?;
        self.mirror.borrow_mut().remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_extension_store_reports_host_failures() {
        let store = ExtensionSyncBackend::default();
        assert!(!ExtensionSyncBackend::is_available());
        assert_eq!(store.kind(), BackendKind::Synchronized);
        assert!(block_on(store.load_snapshot()).expect("snapshot").is_empty());
        assert!(matches!(
            store.set(&[("quality", "6")]),
            Err(StorageError::Host(_))
        ));
        assert_eq!(store.get("quality").expect("get"), None);
    }
}
