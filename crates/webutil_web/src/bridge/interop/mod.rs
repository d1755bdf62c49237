//! Target routing for the extension-storage bridge.

use std::collections::BTreeMap;

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

pub fn extension_storage_available() -> bool {
    imp::extension_storage_available()
}

pub fn extension_storage_set(entries: &[(&str, &str)]) -> Result<(), String> {
    imp::extension_storage_set(entries)
}

pub fn extension_storage_remove(name: &str) -> Result<(), String> {
    imp::extension_storage_remove(name)
}

pub async fn extension_storage_snapshot() -> Result<BTreeMap<String, String>, String> {
    imp::extension_storage_snapshot().await
}
