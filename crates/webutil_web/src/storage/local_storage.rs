//! `localStorage`-backed settings store.
//!
//! A `DOMException` from the storage API (or from merely touching `window.localStorage`) means
//! the browser refuses persistent storage and is reported as [`StorageError::AccessDenied`], so
//! the settings cache can keep working in memory. Any other exception is a host failure.

use webutil_host::{BackendKind, SettingsBackend, StorageError};

#[derive(Debug, Clone, Copy, Default)]
/// Settings store backed by `window.localStorage`.
pub struct LocalStorageBackend;

#[cfg(target_arch = "wasm32")]
impl LocalStorageBackend {
    fn storage(self) -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Host("window unavailable".to_string()))?;
        window
            .local_storage()
            .map_err(|err| classify("window.localStorage", err))?
            .ok_or_else(|| StorageError::AccessDenied("localStorage unavailable".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
fn classify(operation: &str, err: wasm_bindgen::JsValue) -> StorageError {
    use wasm_bindgen::JsCast;

    let detail = match err.dyn_ref::<web_sys::DomException>() {
        Some(exception) => format!("{operation}: {}: {}", exception.name(), exception.message()),
        None => return StorageError::Host(format!("{operation}: {err:?}")),
    };
    StorageError::AccessDenied(detail)
}

impl SettingsBackend for LocalStorageBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn get(&self, name: &str) -> Result<Option<String>, StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            self.storage()?
                .get_item(name)
                .map_err(|err| classify("localStorage.getItem", err))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = name;
            Ok(None)
        }
    }

    fn set(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = self.storage()?;
            for (name, value) in entries {
                storage
                    .set_item(name, value)
                    .map_err(|err| classify("localStorage.setItem", err))?;
            }
            Ok(())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = entries;
            Ok(())
        }
    }

    fn remove(&self, name: &str) -> Result<(), StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            self.storage()?
                .remove_item(name)
                .map_err(|err| classify("localStorage.removeItem", err))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = name;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use webutil_host::SettingsCache;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_local_storage_is_empty_and_successful() {
        let store = LocalStorageBackend;
        let store_obj: &dyn SettingsBackend = &store;
        assert_eq!(store_obj.kind(), BackendKind::Local);
        assert_eq!(store_obj.get("quality").expect("get"), None);
        store_obj.set(&[("quality", "6")]).expect("set");
        store_obj.remove("quality").expect("remove");

        let mut cache = SettingsCache::new(store);
        cache.write("quality", "6").expect("write");
        assert_eq!(
            cache.read("quality", None).expect("read"),
            Some("6".to_string())
        );
    }
}
